//! Sitemap module for Sitemaper
//!
//! This module handles:
//! - The `SitemapEntry` data model
//! - Serializing entries into sitemaps.org `urlset` XML
//! - Validating existing sitemap documents

mod types;
mod validator;
mod writer;

pub use types::{
    SitemapEntry, ValidationResult, MAX_SITEMAP_BYTES, MAX_URLS_PER_SITEMAP, SITEMAP_NAMESPACE,
};
pub use validator::{validate, validate_file};
pub use writer::serialize;
