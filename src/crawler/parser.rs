//! HTML link extraction
//!
//! Produces the raw link targets of a page. Normalization and origin scoping
//! happen later in the coordinator, so this module needs no crawl state.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts link targets from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">`, in document order
///
/// **Exclude:**
/// - `<link>`, `<script src>`, `<img src>` and other non-anchor elements
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:`, `data:` links
/// - Empty and fragment-only hrefs
///
/// Repeated targets are reported once, at their first position.
///
/// When the document declares `<base href>`, relative targets are resolved
/// against it (the base itself being resolved against `page_url`), since that
/// is what a browser would follow. Otherwise targets are returned verbatim.
/// Malformed HTML is parsed leniently; whatever anchors survive are returned.
///
/// # Example
///
/// ```
/// use sitemaper::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/a">A</a><a href="mailto:x@y.z">mail</a><a href="/a#top">A</a>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &page), vec!["/a", "/a#top"]);
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(anchor_selector) = Selector::parse("a[href], area[href]") {
        for element in document.select(&anchor_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href").map(str::trim) else {
                continue;
            };

            if !is_navigational(href) {
                continue;
            }

            let link = match &base {
                Some(base) => base
                    .join(href)
                    .map(String::from)
                    .unwrap_or_else(|_| href.to_string()),
                None => href.to_string(),
            };

            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

/// Resolves the first `<base href>` of the document, if any
fn document_base(document: &Html, page_url: &Url) -> Option<Url> {
    let base_selector = Selector::parse("base[href]").ok()?;

    document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
}

/// Returns false for hrefs that never lead to another page
fn is_navigational(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lowered = href.to_ascii_lowercase();
    !["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}
