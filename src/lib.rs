//! Sitemaper: a breadth-first sitemap generator
//!
//! This crate crawls a website from a root URL, follows same-origin links up to
//! a bounded depth, and serializes the pages it found into a sitemaps.org
//! `urlset` document. It also ships a validator for existing sitemap files.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemaper operations
#[derive(Debug, Error)]
pub enum SitemaperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch root page {url}: {reason}")]
    RootFetchFailed { url: String, reason: String },

    #[error("Failed to serialize sitemap: {0}")]
    Serialization(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: String,
        source: tempfile::PersistError,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid changefreq '{0}'. Accepted values are: always, hourly, daily, weekly, monthly, yearly, never")]
    InvalidChangeFreq(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Failed to replace origin of {url}: {reason}")]
    Replace { url: String, reason: String },
}

/// Result type alias for Sitemaper operations
pub type Result<T> = std::result::Result<T, SitemaperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ChangeFreq, Config, CrawlerConfig};
pub use crawler::{crawl, CrawlOutcome, HttpFetcher, PageFetcher};
pub use sitemap::{serialize, validate, SitemapEntry, ValidationResult};
pub use state::PageState;
pub use crate::url::{normalize_url, NormalizedUrl, UrlNormalizer};
