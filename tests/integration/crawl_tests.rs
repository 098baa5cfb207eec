//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl-serialize-write cycle end-to-end.

use sitemaper::config::{ChangeFreq, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use sitemaper::crawler::{crawl, generate_sitemap, generate_sitemap_with, HttpFetcher};
use sitemaper::sitemap::{validate, validate_file};
use sitemaper::state::PageState;
use sitemaper::SitemaperError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `website` and writing to `output`
fn create_test_config(website: &str, depth: u32, output: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            website: website.to_string(),
            replacer: None,
            depth,
            changefreq: ChangeFreq::Weekly,
            max_concurrent_fetches: 4,
            fetch_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            path: output.to_string(),
        },
    }
}

fn test_fetcher(config: &Config) -> HttpFetcher {
    HttpFetcher::new(&config.user_agent, Duration::from_secs(5)).expect("Failed to build client")
}

/// Mounts an HTML page at `route`
async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html"),
        )
        .mount(server)
        .await;
}

fn locs(outcome: &sitemaper::CrawlOutcome) -> Vec<String> {
    outcome.entries().into_iter().map(|e| e.loc).collect()
}

#[tokio::test]
async fn test_full_crawl_writes_valid_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        &format!(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="{}/blog">Blog</a>
            <a href="https://elsewhere.example.org/">External</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_html(&mock_server, "/about", r#"<a href="/">Home</a>"#).await;
    mount_html(&mock_server, "/blog", r#"<a href="/blog/post#comments">Post</a>"#).await;
    mount_html(&mock_server, "/blog/post", "<p>Hello</p>").await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("sitemap.xml");
    let config = create_test_config(&base_url, 10, output.to_str().unwrap());

    let outcome = generate_sitemap_with(&config, &test_fetcher(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(
        locs(&outcome),
        vec![
            format!("{}/", base_url),
            format!("{}/about", base_url),
            format!("{}/blog", base_url),
            format!("{}/blog/post", base_url),
        ]
    );
    assert!(outcome.pages.iter().all(|p| p.state == PageState::Processed));
    assert_eq!(outcome.statistics.external_links_skipped, 1);

    let result = validate_file(&output);
    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(result.url_count, 4);

    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<changefreq>weekly</changefreq>"));
    assert!(!xml.contains("elsewhere.example.org"));
    assert!(!xml.contains("#comments"));
}

#[tokio::test]
async fn test_generate_sitemap_builds_its_own_client() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<p>Only page</p>").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("sitemap.xml");
    let config = create_test_config(&mock_server.uri(), 3, output.to_str().unwrap());

    let outcome = generate_sitemap(&config).await.expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 1);
    assert!(validate_file(&output).valid);
}

#[tokio::test]
async fn test_root_failure_writes_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("sitemap.xml");
    let config = create_test_config(&mock_server.uri(), 2, output.to_str().unwrap());

    let result = generate_sitemap_with(&config, &test_fetcher(&config)).await;

    assert!(matches!(result, Err(SitemaperError::RootFetchFailed { .. })));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_dead_child_is_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/ok">Ok</a>"#,
    )
    .await;
    mount_html(&mock_server, "/ok", "ok").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 2, "./unused.xml");
    let outcome = crawl(&config.crawler, &test_fetcher(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 3);
    assert_eq!(outcome.pages[1].entry.loc, format!("{}/missing", base_url));
    assert_eq!(outcome.pages[1].state, PageState::DeadLink);
    assert_eq!(outcome.pages[2].state, PageState::Processed);
    assert_eq!(outcome.statistics.failed_pages(), 1);
}

#[tokio::test]
async fn test_replacer_only_changes_published_locations() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/docs/intro?lang=en">Docs</a>"#).await;
    mount_html(&mock_server, "/docs/intro", "<p>Intro</p>").await;

    let mut config = create_test_config(&base_url, 3, "./unused.xml");
    config.crawler.replacer = Some("https://public.example.org".to_string());

    let outcome = crawl(&config.crawler, &test_fetcher(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(
        locs(&outcome),
        vec![
            "https://public.example.org/".to_string(),
            "https://public.example.org/docs/intro?lang=en".to_string(),
        ]
    );
    // Fetches still went to the mock server
    assert!(outcome
        .fetched_urls()
        .all(|url| url.as_str().starts_with(&base_url)));

    let xml = sitemaper::serialize(&outcome.entries()).unwrap();
    assert!(validate(&xml).valid);
    assert!(!xml.contains(&base_url));
}

#[tokio::test]
async fn test_depth_limit_is_respected() {
    let mock_server = MockServer::start().await;

    mount_html(&mock_server, "/", r#"<a href="/one">1</a>"#).await;
    mount_html(&mock_server, "/one", r#"<a href="/two">2</a>"#).await;
    mount_html(&mock_server, "/two", r#"<a href="/three">3</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(ResponseTemplate::new(200).set_body_string("never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2, "./unused.xml");
    let outcome = crawl(&config.crawler, &test_fetcher(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 3);
    assert_eq!(outcome.pages.last().unwrap().depth, 2);
    assert_eq!(outcome.statistics.max_depth_reached, 2);
    // Dropping the server verifies the `expect(0)` above
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/old/">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new/", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/new/", r#"<a href="child">Child</a>"#).await;
    mount_html(&mock_server, "/new/child", "leaf").await;

    let config = create_test_config(&base_url, 5, "./unused.xml");
    let outcome = crawl(&config.crawler, &test_fetcher(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(
        locs(&outcome),
        vec![
            format!("{}/", base_url),
            format!("{}/old/", base_url),
            format!("{}/new/child", base_url),
        ]
    );
}

#[tokio::test]
async fn test_non_html_pages_are_listed_but_not_expanded() {
    let mock_server = MockServer::start().await;

    mount_html(&mock_server, "/", r#"<a href="/report.pdf">Report</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">not html</a>"#.as_bytes().to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5, "./unused.xml");
    let outcome = crawl(&config.crawler, &test_fetcher(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(outcome.pages[1].state, PageState::ContentMismatch);
}
