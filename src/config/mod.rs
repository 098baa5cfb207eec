//! Configuration module for Sitemaper
//!
//! This module handles loading, merging, and validating configuration. Values
//! come from an optional TOML file, then command-line overrides, then defaults.
//!
//! # Example
//!
//! ```no_run
//! use sitemaper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemaper.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ChangeFreq, Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_OUTPUT_PATH,
    DEFAULT_WEBSITE,
};

// Re-export parser functions
pub use parser::{load_config, resolve_config, ConfigOverrides};
pub use validation::validate;
