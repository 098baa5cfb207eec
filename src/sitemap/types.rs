use crate::config::ChangeFreq;
use chrono::{DateTime, Utc};

/// XML namespace of the sitemaps.org protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Maximum number of `<url>` entries one sitemap file may hold
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// Maximum uncompressed size of one sitemap file in bytes
pub const MAX_SITEMAP_BYTES: usize = 50 * 1024 * 1024;

/// One `<url>` element of a sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Published URL of the page
    pub loc: String,

    /// When the page was fetched
    pub lastmod: DateTime<Utc>,

    /// How often the page is expected to change
    pub changefreq: ChangeFreq,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>, lastmod: DateTime<Utc>, changefreq: ChangeFreq) -> Self {
        Self {
            loc: loc.into(),
            lastmod,
            changefreq,
        }
    }

    /// `lastmod` rendered as an ISO-8601 calendar date (`YYYY-MM-DD`)
    pub fn lastmod_date(&self) -> String {
        self.lastmod.format("%Y-%m-%d").to_string()
    }
}

/// Outcome of validating a sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// True when `errors` is empty
    pub valid: bool,

    /// Every violation found, in document order
    pub errors: Vec<String>,

    /// Number of `<url>` elements seen
    pub url_count: usize,
}

impl ValidationResult {
    pub(crate) fn from_errors(errors: Vec<String>, url_count: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            url_count,
        }
    }
}
