//! URL handling module for Sitemaper
//!
//! This module provides URL normalization, origin comparison, and origin
//! replacement. Every discovered URL has two forms:
//!
//! - the *fetch* URL, which is what the crawler requests and always stays on
//!   the real site, and
//! - the *published* URL, which is what ends up in `<loc>` and may carry the
//!   replacer's origin instead.

mod normalize;
mod origin;

use crate::config::CrawlerConfig;
use crate::UrlError;
use url::Url;

// Re-export main functions
pub use normalize::{normalize_url, parse_absolute};
pub use origin::{replace_origin, same_origin};

/// A URL after normalization, in both its fetch and published forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// URL requested while crawling
    pub fetch: Url,

    /// URL written to the sitemap
    pub published: Url,
}

/// Normalizer bound to one crawl's root origin and optional replacer
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    root: Url,
    replacer: Option<Url>,
}

impl UrlNormalizer {
    /// Creates a normalizer for the given root and replacer
    pub fn new(root: Url, replacer: Option<Url>) -> Self {
        Self { root, replacer }
    }

    /// Creates a normalizer from the crawler configuration
    ///
    /// An empty replacer string is treated as "no replacer".
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, UrlError> {
        let root = parse_absolute(&config.website)?;
        let replacer = config
            .replacer
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(parse_absolute)
            .transpose()?;

        Ok(Self::new(root, replacer))
    }

    /// The normalized root URL of the crawl
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The configured replacement origin, if any
    pub fn replacer(&self) -> Option<&Url> {
        self.replacer.as_ref()
    }

    /// Returns true if `url` is on the root's origin
    pub fn in_scope(&self, url: &Url) -> bool {
        same_origin(&self.root, url)
    }

    /// Normalizes `raw` against `base` and computes its published form
    ///
    /// # Arguments
    ///
    /// * `raw` - The URL string as found in the page
    /// * `base` - The URL the page was served from
    ///
    /// # Returns
    ///
    /// * `Ok(NormalizedUrl)` - Fetch and published URLs
    /// * `Err(UrlError)` - The URL is malformed or not HTTP(S)
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemaper::url::UrlNormalizer;
    /// use url::Url;
    ///
    /// let root = Url::parse("https://staging.test/").unwrap();
    /// let replacer = Url::parse("https://www.prod.test").unwrap();
    /// let normalizer = UrlNormalizer::new(root.clone(), Some(replacer));
    ///
    /// let url = normalizer.normalize("/pricing#plans", &root).unwrap();
    /// assert_eq!(url.fetch.as_str(), "https://staging.test/pricing");
    /// assert_eq!(url.published.as_str(), "https://www.prod.test/pricing");
    /// ```
    pub fn normalize(&self, raw: &str, base: &Url) -> Result<NormalizedUrl, UrlError> {
        let fetch = normalize_url(raw, base)?;
        let published = self.publish(&fetch)?;
        Ok(NormalizedUrl { fetch, published })
    }

    /// Computes the published form of an already-normalized fetch URL
    ///
    /// Only URLs on the root origin are rewritten.
    pub fn publish(&self, fetch: &Url) -> Result<Url, UrlError> {
        match &self.replacer {
            Some(replacer) if self.in_scope(fetch) => replace_origin(fetch, replacer),
            _ => Ok(fetch.clone()),
        }
    }
}
