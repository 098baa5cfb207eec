//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier with the root
//! - Fetching each breadth-first level with bounded parallelism
//! - Extracting, normalizing, and scoping links
//! - Recording one sitemap entry per dequeued page
//!
//! Pages of one level are fetched concurrently, but their results are
//! consumed in queue order on this task alone. Visited-set updates therefore
//! never race, and the output order is exactly the sequential BFS order.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::output::CrawlStatistics;
use crate::sitemap::SitemapEntry;
use crate::state::PageState;
use crate::url::{NormalizedUrl, UrlNormalizer};
use crate::{ConfigError, SitemaperError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use url::Url;

/// One page the crawl dequeued, with its sitemap entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    /// URL that was requested
    pub fetch_url: Url,

    /// Entry written to the sitemap for this page
    pub entry: SitemapEntry,

    /// Link hops from the root
    pub depth: u32,

    /// How the fetch ended
    pub state: PageState,
}

/// Result of a finished crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Pages in discovery order, root first
    pub pages: Vec<CrawledPage>,

    /// Counters collected during the crawl
    pub statistics: CrawlStatistics,
}

impl CrawlOutcome {
    /// Sitemap entries in discovery order
    pub fn entries(&self) -> Vec<SitemapEntry> {
        self.pages.iter().map(|page| page.entry.clone()).collect()
    }

    /// URLs that were requested, in discovery order
    pub fn fetched_urls(&self) -> impl Iterator<Item = &Url> {
        self.pages.iter().map(|page| &page.fetch_url)
    }
}

/// Main crawler coordinator structure
///
/// A coordinator owns all mutable state of one crawl run (frontier, visited
/// set, collected pages) and is consumed by [`Coordinator::run`], so no state
/// is shared between runs.
pub struct Coordinator<'a, F> {
    config: &'a CrawlerConfig,
    fetcher: &'a F,
    normalizer: UrlNormalizer,
    scheduler: Scheduler,
    fetch_timeout: Duration,
    pages: Vec<CrawledPage>,
    statistics: CrawlStatistics,
}

impl<'a, F: PageFetcher> Coordinator<'a, F> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Capability used to retrieve pages
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SitemaperError::Config)` - The root URL or depth is invalid
    pub fn new(config: &'a CrawlerConfig, fetcher: &'a F) -> Result<Self, SitemaperError> {
        if config.depth < 1 {
            return Err(ConfigError::Validation(
                "Depth must be a positive integer greater than 0.".to_string(),
            )
            .into());
        }

        let normalizer = UrlNormalizer::from_config(config)
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        let root = NormalizedUrl {
            fetch: normalizer.root().clone(),
            published: normalizer.publish(normalizer.root())?,
        };

        let scheduler = Scheduler::new(root, config.depth, config.max_concurrent_fetches as usize);

        Ok(Self {
            config,
            fetcher,
            normalizer,
            scheduler,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs.max(1)),
            pages: Vec::new(),
            statistics: CrawlStatistics::default(),
        })
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Pages in breadth-first discovery order
    /// * `Err(SitemaperError::RootFetchFailed)` - The root page could not be fetched
    pub async fn run(mut self) -> Result<CrawlOutcome, SitemaperError> {
        tracing::info!(
            "Starting crawl of {} (max depth {}, {} concurrent fetches)",
            self.normalizer.root(),
            self.config.depth,
            self.scheduler.max_concurrent()
        );
        if let Some(replacer) = self.normalizer.replacer() {
            tracing::info!("Publishing URLs under {}", replacer.origin().ascii_serialization());
        }

        let fetcher = self.fetcher;
        let timeout = self.fetch_timeout;

        while let Some(level) = self.scheduler.next_level() {
            let depth = level.first().map_or(0, |queued| queued.depth);
            tracing::debug!("Fetching {} page(s) at depth {}", level.len(), depth);

            let results: Vec<_> = stream::iter(level.into_iter().map(move |queued| async move {
                let fetched_at = Utc::now();
                let result = fetch_with_timeout(fetcher, &queued.url, timeout).await;
                (queued, fetched_at, result)
            }))
            .buffered(self.scheduler.max_concurrent())
            .collect()
            .await;

            for (queued, fetched_at, result) in results {
                self.process(queued, fetched_at, result)?;
            }
        }

        tracing::info!(
            "Crawl finished: {} page(s), {} URL(s) visited",
            self.pages.len(),
            self.scheduler.visited_count()
        );

        Ok(CrawlOutcome {
            pages: self.pages,
            statistics: self.statistics,
        })
    }

    /// Records the fetch result for one page and expands its links
    fn process(
        &mut self,
        queued: QueuedUrl,
        fetched_at: DateTime<Utc>,
        result: Result<FetchedPage, FetchError>,
    ) -> Result<(), SitemaperError> {
        let state = match result {
            Err(error) if queued.depth == 0 => {
                tracing::error!("Root page {} could not be fetched: {}", queued.url, error);
                return Err(SitemaperError::RootFetchFailed {
                    url: queued.url.to_string(),
                    reason: error.to_string(),
                });
            }
            Err(error) => {
                tracing::warn!("Failed to fetch {}: {}", queued.url, error);
                error.page_state()
            }
            Ok(page) if !page.is_html() => {
                tracing::debug!(
                    "Not expanding {}: content type {}",
                    queued.url,
                    page.content_type.as_deref().unwrap_or("unknown")
                );
                PageState::ContentMismatch
            }
            Ok(page) => {
                if queued.depth == 0 && !self.normalizer.in_scope(&page.final_url) {
                    tracing::warn!(
                        "Root {} redirected to {}, which is outside the crawl origin",
                        queued.url,
                        page.final_url
                    );
                }
                if self.scheduler.can_expand(queued.depth) {
                    self.expand(&page, queued.depth);
                }
                PageState::Processed
            }
        };

        tracing::debug!("{} [{}] at depth {}", queued.url, state, queued.depth);
        self.statistics.record_page(state, queued.depth);
        self.pages.push(CrawledPage {
            entry: SitemapEntry::new(queued.published.as_str(), fetched_at, self.config.changefreq),
            fetch_url: queued.url,
            depth: queued.depth,
            state,
        });

        Ok(())
    }

    /// Enqueues the same-origin, unseen links of a page at `depth + 1`
    fn expand(&mut self, page: &FetchedPage, depth: u32) {
        let links = extract_links(&page.body, &page.final_url);
        self.statistics.links_discovered += links.len() as u64;

        for raw in links {
            let url = match self.normalizer.normalize(&raw, &page.final_url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Skipping link {:?} on {}: {}", raw, page.final_url, e);
                    self.statistics.invalid_links_skipped += 1;
                    continue;
                }
            };

            if !self.normalizer.in_scope(&url.fetch) {
                tracing::trace!("Skipping external link {}", url.fetch);
                self.statistics.external_links_skipped += 1;
                continue;
            }

            if self.scheduler.enqueue(url, depth + 1) {
                tracing::trace!("Queued link from {} at depth {}", page.final_url, depth + 1);
            } else {
                self.statistics.duplicate_links_skipped += 1;
            }
        }
    }
}

/// Fetches a page, turning an elapsed deadline into [`FetchError::Timeout`]
async fn fetch_with_timeout<F: PageFetcher>(
    fetcher: &F,
    url: &Url,
    timeout: Duration,
) -> Result<FetchedPage, FetchError> {
    match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChangeFreq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory site: URL -> response
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, FakePage>,
        fetched: Mutex<Vec<String>>,
    }

    #[derive(Clone)]
    enum FakePage {
        Html(String),
        Redirect { to: String, html: String },
        Binary,
        Status(u16),
        Hang,
    }

    impl FakeSite {
        fn html(mut self, url: &str, links: &[&str]) -> Self {
            let body = links
                .iter()
                .map(|href| format!(r#"<a href="{}">link</a>"#, href))
                .collect::<String>();
            self.pages.insert(
                url.to_string(),
                FakePage::Html(format!("<html><body>{}</body></html>", body)),
            );
            self
        }

        fn page(mut self, url: &str, page: FakePage) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            let page = self.pages.get(url.as_str()).cloned();

            match page {
                Some(FakePage::Html(html)) => Ok(FetchedPage::html(url.clone(), html)),
                Some(FakePage::Redirect { to, html }) => {
                    Ok(FetchedPage::html(Url::parse(&to).unwrap(), html))
                }
                Some(FakePage::Binary) => Ok(FetchedPage {
                    final_url: url.clone(),
                    status_code: 200,
                    content_type: Some("application/pdf".to_string()),
                    body: r#"<a href="/never">hidden</a>"#.to_string(),
                }),
                Some(FakePage::Status(status_code)) => Err(FetchError::Http { status_code }),
                Some(FakePage::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(FetchError::Network("unreachable".to_string()))
                }
                None => Err(FetchError::Http { status_code: 404 }),
            }
        }
    }

    fn config(website: &str, depth: u32) -> CrawlerConfig {
        CrawlerConfig {
            website: website.to_string(),
            depth,
            ..Default::default()
        }
    }

    async fn run(config: &CrawlerConfig, site: &FakeSite) -> Result<CrawlOutcome, SitemaperError> {
        Coordinator::new(config, site)?.run().await
    }

    fn locs(outcome: &CrawlOutcome) -> Vec<String> {
        outcome.pages.iter().map(|p| p.entry.loc.clone()).collect()
    }

    #[tokio::test]
    async fn test_same_origin_scoping_and_back_links() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/x", "https://other.test/y"])
            .html("https://a.test/x", &["/"]);

        let outcome = run(&config("https://a.test/", 2), &site).await.unwrap();

        assert_eq!(locs(&outcome), vec!["https://a.test/", "https://a.test/x"]);
        assert!(!site.fetched().iter().any(|u| u.contains("other.test")));
        assert_eq!(outcome.statistics.external_links_skipped, 1);
        assert_eq!(outcome.statistics.duplicate_links_skipped, 1);
    }

    #[tokio::test]
    async fn test_depth_one_never_fetches_grandchildren() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/x"])
            .html("https://a.test/x", &["/y"])
            .html("https://a.test/y", &[]);

        let outcome = run(&config("https://a.test/", 1), &site).await.unwrap();

        assert_eq!(locs(&outcome), vec!["https://a.test/", "https://a.test/x"]);
        assert_eq!(site.fetched(), vec!["https://a.test/", "https://a.test/x"]);
    }

    #[tokio::test]
    async fn test_linear_chain_bounded_by_depth() {
        // Chain of L = 6 pages: /p0 -> /p1 -> ... -> /p5
        let mut site = FakeSite::default();
        for i in 0..6 {
            let next = format!("/p{}", i + 1);
            let links: Vec<&str> = if i < 5 { vec![next.as_str()] } else { vec![] };
            site = site.html(&format!("https://a.test/p{}", i), &links);
        }

        for depth in 1..=8u32 {
            let outcome = run(&config("https://a.test/p0", depth), &site).await.unwrap();
            let expected = 6.min(depth as usize + 1);
            assert_eq!(outcome.pages.len(), expected, "depth {}", depth);
            assert!(outcome.pages.iter().all(|p| p.depth <= depth));
        }
    }

    #[tokio::test]
    async fn test_cycles_produce_no_duplicates() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/a", "/b", "/a#frag"])
            .html("https://a.test/a", &["/b", "/", "/a"])
            .html("https://a.test/b", &["/a", "/"]);

        let outcome = run(&config("https://a.test/", 10), &site).await.unwrap();

        assert_eq!(
            locs(&outcome),
            vec!["https://a.test/", "https://a.test/a", "https://a.test/b"]
        );
        let mut fetched = site.fetched();
        fetched.sort();
        fetched.dedup();
        assert_eq!(fetched.len(), site.fetched().len());
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/a", "/b"])
            .html("https://a.test/a", &["/a1", "/a2"])
            .html("https://a.test/b", &["/b1"])
            .html("https://a.test/a1", &[])
            .html("https://a.test/a2", &[])
            .html("https://a.test/b1", &[]);

        let mut cfg = config("https://a.test/", 3);
        cfg.max_concurrent_fetches = 3;
        let outcome = run(&cfg, &site).await.unwrap();

        let paths: Vec<&str> = outcome.fetched_urls().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/", "/a", "/b", "/a1", "/a2", "/b1"]);
        let depths: Vec<u32> = outcome.pages.iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 2, 2]);
    }

    #[tokio::test]
    async fn test_root_failure_aborts() {
        let site = FakeSite::default().page("https://a.test/", FakePage::Status(500));

        let err = run(&config("https://a.test/", 2), &site).await.unwrap_err();
        assert!(matches!(err, SitemaperError::RootFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_failed_child_recorded_without_expansion() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/broken", "/missing", "/ok"])
            .page("https://a.test/broken", FakePage::Status(503))
            .html("https://a.test/ok", &[]);

        let outcome = run(&config("https://a.test/", 3), &site).await.unwrap();

        let states: Vec<(String, PageState)> = outcome
            .pages
            .iter()
            .map(|p| (p.fetch_url.path().to_string(), p.state))
            .collect();
        assert_eq!(
            states,
            vec![
                ("/".to_string(), PageState::Processed),
                ("/broken".to_string(), PageState::Failed),
                ("/missing".to_string(), PageState::DeadLink),
                ("/ok".to_string(), PageState::Processed),
            ]
        );
        assert_eq!(outcome.statistics.failed_pages(), 2);
    }

    #[tokio::test]
    async fn test_replacer_is_cosmetic() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/x?q=1", "https://a.test/y"])
            .html("https://a.test/x?q=1", &["/y"])
            .html("https://a.test/y", &[]);

        let plain = run(&config("https://a.test/", 3), &site).await.unwrap();

        let mut replaced_cfg = config("https://a.test/", 3);
        replaced_cfg.replacer = Some("https://www.prod.test".to_string());
        let replaced = run(&replaced_cfg, &site).await.unwrap();

        let plain_fetched: Vec<&Url> = plain.fetched_urls().collect();
        let replaced_fetched: Vec<&Url> = replaced.fetched_urls().collect();
        assert_eq!(plain_fetched, replaced_fetched);

        assert_eq!(
            locs(&replaced),
            vec![
                "https://www.prod.test/",
                "https://www.prod.test/x?q=1",
                "https://www.prod.test/y"
            ]
        );
    }

    #[tokio::test]
    async fn test_links_resolve_against_final_url() {
        let site = FakeSite::default()
            .page(
                "https://a.test/old",
                FakePage::Redirect {
                    to: "https://a.test/new/section/".to_string(),
                    html: r#"<a href="child">child</a>"#.to_string(),
                },
            )
            .html("https://a.test/new/section/child", &[]);

        let outcome = run(&config("https://a.test/old", 2), &site).await.unwrap();
        assert_eq!(
            locs(&outcome),
            vec!["https://a.test/old", "https://a.test/new/section/child"]
        );
    }

    #[tokio::test]
    async fn test_non_html_not_expanded() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/doc.pdf"])
            .page("https://a.test/doc.pdf", FakePage::Binary);

        let outcome = run(&config("https://a.test/", 5), &site).await.unwrap();
        assert_eq!(outcome.pages.len(), 2);
        assert_eq!(outcome.pages[1].state, PageState::ContentMismatch);
        assert!(!site.fetched().iter().any(|u| u.ends_with("/never")));
    }

    #[tokio::test]
    async fn test_hanging_fetch_times_out() {
        let site = FakeSite::default()
            .html("https://a.test/", &["/slow", "/fast"])
            .page("https://a.test/slow", FakePage::Hang)
            .html("https://a.test/fast", &[]);

        let mut cfg = config("https://a.test/", 2);
        cfg.fetch_timeout_secs = 1;
        let outcome = run(&cfg, &site).await.unwrap();

        assert_eq!(outcome.pages.len(), 3);
        assert_eq!(outcome.pages[1].state, PageState::Unreachable);
        assert_eq!(outcome.pages[2].state, PageState::Processed);
    }

    #[tokio::test]
    async fn test_entries_carry_changefreq() {
        let site = FakeSite::default().html("https://a.test/", &[]);
        let mut cfg = config("https://a.test/", 1);
        cfg.changefreq = ChangeFreq::Monthly;

        let outcome = run(&cfg, &site).await.unwrap();
        let entries = outcome.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].changefreq, ChangeFreq::Monthly);
    }

    #[test]
    fn test_zero_depth_is_invalid_config() {
        let site = FakeSite::default();
        let cfg = config("https://a.test/", 0);
        assert!(matches!(
            Coordinator::new(&cfg, &site),
            Err(SitemaperError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_invalid_root_is_invalid_config() {
        let site = FakeSite::default();
        let cfg = config("not a url", 2);
        assert!(matches!(
            Coordinator::new(&cfg, &site),
            Err(SitemaperError::Config(ConfigError::InvalidUrl(_)))
        ));
    }
}
