//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page fetching through the `PageFetcher` capability
//! - HTML link extraction
//! - Breadth-first frontier scheduling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{CrawlOutcome, CrawledPage, Coordinator};
pub use fetcher::{
    build_http_client, fetch_url, FetchError, FetchedPage, HttpFetcher, PageFetcher, MAX_REDIRECTS,
};
pub use parser::extract_links;
pub use scheduler::{QueuedUrl, Scheduler, VisitedSet};

use crate::config::{Config, CrawlerConfig};
use crate::output::{log_statistics, write_sitemap};
use crate::sitemap::serialize;
use std::path::Path;
use std::time::Duration;

/// Crawls a site breadth-first and returns its pages
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fetcher` - Capability used to retrieve pages
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Pages in discovery order, root first
/// * `Err(SitemaperError)` - Invalid configuration or the root could not be fetched
pub async fn crawl<F: PageFetcher>(
    config: &CrawlerConfig,
    fetcher: &F,
) -> crate::Result<CrawlOutcome> {
    Coordinator::new(config, fetcher)?.run().await
}

/// Runs a complete sitemap generation
///
/// This is the main entry point for producing a sitemap file. It will:
/// 1. Build the HTTP client
/// 2. Crawl the site
/// 3. Serialize the sitemap
/// 4. Write it to the configured output path in one atomic step
///
/// Nothing is written if any earlier step fails.
pub async fn generate_sitemap(config: &Config) -> crate::Result<CrawlOutcome> {
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        Duration::from_secs(config.crawler.fetch_timeout_secs),
    )?;

    generate_sitemap_with(config, &fetcher).await
}

/// Same as [`generate_sitemap`] with a caller-supplied fetcher
pub async fn generate_sitemap_with<F: PageFetcher>(
    config: &Config,
    fetcher: &F,
) -> crate::Result<CrawlOutcome> {
    let outcome = crawl(&config.crawler, fetcher).await?;
    log_statistics(&outcome.statistics);

    let xml = serialize(&outcome.entries())?;
    write_sitemap(Path::new(&config.output.path), &xml)?;

    Ok(outcome)
}
