//! Structural validation of sitemap documents
//!
//! The validator never fails: every problem it finds becomes a human-readable
//! string in [`ValidationResult::errors`]. It performs no network access.

use crate::config::ChangeFreq;
use crate::sitemap::types::{
    ValidationResult, MAX_SITEMAP_BYTES, MAX_URLS_PER_SITEMAP, SITEMAP_NAMESPACE,
};
use chrono::{DateTime, NaiveDate};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Child elements of `<url>` whose text is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

impl Field {
    fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "loc" => Some(Self::Loc),
            "lastmod" => Some(Self::Lastmod),
            "changefreq" => Some(Self::Changefreq),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Values collected for one `<url>` element
#[derive(Debug, Default)]
struct UrlRecord {
    locs: Vec<String>,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
}

impl UrlRecord {
    fn store(&mut self, field: Field, value: String) {
        match field {
            Field::Loc => self.locs.push(value),
            Field::Lastmod => self.lastmod = Some(value),
            Field::Changefreq => self.changefreq = Some(value),
            Field::Priority => self.priority = Some(value),
        }
    }
}

/// Walks the XML event stream and accumulates violations
#[derive(Debug, Default)]
struct Validator {
    errors: Vec<String>,
    /// Local names of currently open elements
    open: Vec<String>,
    root_seen: bool,
    root_is_urlset: bool,
    root_prefix: Option<String>,
    url_count: usize,
    current: Option<UrlRecord>,
    capture: Option<(Field, String)>,
    seen_locs: HashSet<String>,
}

impl Validator {
    fn open_element(&mut self, element: &BytesStart<'_>) -> String {
        let qname = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let (prefix, local) = match qname.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qname.clone()),
        };

        match self.open.len() {
            0 => self.open_root(element, prefix.as_deref(), &local),
            1 if self.root_is_urlset => {
                if local == "url" && prefix == self.root_prefix {
                    self.url_count += 1;
                    self.current = Some(UrlRecord::default());
                } else {
                    self.errors
                        .push(format!("Unexpected element <{}> inside <urlset>", qname));
                }
            }
            2 if self.current.is_some() && prefix == self.root_prefix => {
                if let Some(field) = Field::from_local_name(&local) {
                    self.capture = Some((field, String::new()));
                }
            }
            _ => {}
        }

        self.open.push(local.clone());
        local
    }

    fn open_root(&mut self, element: &BytesStart<'_>, prefix: Option<&str>, local: &str) {
        if self.root_seen {
            self.errors
                .push(format!("Multiple root elements: found another <{}>", local));
            // Children of a rejected root are not sitemap entries
            self.root_is_urlset = false;
            return;
        }
        self.root_seen = true;

        match local {
            "urlset" => {
                self.root_is_urlset = true;
                self.root_prefix = prefix.map(str::to_string);
            }
            "sitemapindex" => {
                self.errors
                    .push("Root element is <sitemapindex>; sitemap index files are not supported, expected <urlset>".to_string());
                return;
            }
            other => {
                self.errors
                    .push(format!("Root element is <{}>, expected <urlset>", other));
                return;
            }
        }

        let xmlns_key = match prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };

        let mut namespace = None;
        for attribute in element.attributes() {
            match attribute {
                Ok(attr) if attr.key.as_ref() == xmlns_key.as_bytes() => {
                    namespace = Some(String::from_utf8_lossy(&attr.value).into_owned());
                }
                Ok(_) => {}
                Err(e) => self.errors.push(format!("Malformed attribute on <urlset>: {}", e)),
            }
        }

        match namespace {
            Some(ns) if ns == SITEMAP_NAMESPACE => {}
            Some(ns) => self.errors.push(format!(
                "<urlset> namespace is '{}', expected '{}'",
                ns, SITEMAP_NAMESPACE
            )),
            None => self.errors.push(format!(
                "<urlset> is missing the namespace declaration '{}'",
                SITEMAP_NAMESPACE
            )),
        }
    }

    /// Called after the element has been popped from `open`
    fn close_element(&mut self, local: &str) {
        match self.open.len() {
            2 => {
                if let Some((field, text)) = self.capture.take() {
                    if let Some(record) = self.current.as_mut() {
                        record.store(field, text.trim().to_string());
                    }
                }
            }
            1 if local == "url" => {
                if let Some(record) = self.current.take() {
                    self.check_record(record);
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        // Only direct text of a captured field counts.
        if self.open.len() == 3 {
            if let Some((_, buffer)) = self.capture.as_mut() {
                buffer.push_str(text);
            }
        }
    }

    fn check_record(&mut self, record: UrlRecord) {
        let n = self.url_count;

        match record.locs.len() {
            0 => self.errors.push(format!("URL entry #{} is missing <loc>", n)),
            1 => {}
            count => self.errors.push(format!(
                "URL entry #{} has {} <loc> elements, expected exactly one",
                n, count
            )),
        }

        if let Some(loc) = record.locs.first() {
            self.check_loc(n, loc);
        }

        if let Some(changefreq) = &record.changefreq {
            if changefreq.parse::<ChangeFreq>().is_err() {
                self.errors.push(format!(
                    "URL entry #{} has invalid <changefreq> '{}'",
                    n, changefreq
                ));
            }
        }

        if let Some(lastmod) = &record.lastmod {
            if !is_w3c_datetime(lastmod) {
                self.errors.push(format!(
                    "URL entry #{} has invalid <lastmod> '{}' (expected W3C datetime)",
                    n, lastmod
                ));
            }
        }

        if let Some(priority) = &record.priority {
            let in_range = priority
                .parse::<f64>()
                .map(|p| (0.0..=1.0).contains(&p))
                .unwrap_or(false);
            if !in_range {
                self.errors.push(format!(
                    "URL entry #{} has invalid <priority> '{}' (expected 0.0 to 1.0)",
                    n, priority
                ));
            }
        }
    }

    fn check_loc(&mut self, n: usize, loc: &str) {
        if loc.is_empty() {
            self.errors.push(format!("URL entry #{} has an empty <loc>", n));
            return;
        }

        if let Err(e) = Url::parse(loc) {
            self.errors.push(format!(
                "URL entry #{} <loc> '{}' is not a valid absolute URL: {}",
                n, loc, e
            ));
        }

        if !self.seen_locs.insert(loc.to_string()) {
            self.errors.push(format!("Duplicate <loc>: {}", loc));
        }
    }

    fn finish(mut self, reached_eof: bool) -> ValidationResult {
        if reached_eof {
            if !self.root_seen {
                self.errors.push("Document has no root element".to_string());
            }
            for name in self.open.iter().rev() {
                self.errors.push(format!("Unclosed element <{}>", name));
            }
        }

        if self.url_count > MAX_URLS_PER_SITEMAP {
            self.errors.push(format!(
                "Sitemap contains {} URLs, maximum is {}",
                self.url_count, MAX_URLS_PER_SITEMAP
            ));
        }

        ValidationResult::from_errors(self.errors, self.url_count)
    }
}

/// Validates sitemap XML text against the sitemaps.org `urlset` rules
///
/// # Checks
///
/// - The document parses as XML
/// - The root element is `<urlset>` in the sitemap namespace
/// - Every `<url>` has exactly one non-empty `<loc>` holding an absolute URL
/// - `<changefreq>` values belong to the protocol's fixed set
/// - `<lastmod>` values are W3C datetimes
/// - `<priority>` values lie in `0.0..=1.0`
/// - No `<loc>` appears twice
/// - At most 50,000 URLs and 50 MiB per file
///
/// Validation continues past the first problem so that one call reports
/// every violation; only an XML syntax error stops the scan.
///
/// # Example
///
/// ```
/// use sitemaper::sitemap::validate;
///
/// let result = validate("<urlset><url></url></urlset>");
/// assert!(!result.valid);
/// assert_eq!(result.errors.len(), 2);
/// ```
pub fn validate(xml: &str) -> ValidationResult {
    let mut validator = Validator::default();

    if xml.len() > MAX_SITEMAP_BYTES {
        validator.errors.push(format!(
            "Sitemap is {} bytes, maximum is {}",
            xml.len(),
            MAX_SITEMAP_BYTES
        ));
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let reached_eof = loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                validator.open_element(&e);
            }
            Ok(Event::Empty(e)) => {
                let local = validator.open_element(&e);
                validator.open.pop();
                validator.close_element(&local);
            }
            Ok(Event::End(_)) => {
                if let Some(local) = validator.open.pop() {
                    validator.close_element(&local);
                }
            }
            Ok(Event::Text(e)) => match e.unescape() {
                Ok(text) => validator.push_text(&text),
                Err(err) => validator.errors.push(format!(
                    "Invalid character data near byte {}: {}",
                    reader.buffer_position(),
                    err
                )),
            },
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                validator.push_text(&text);
            }
            Ok(Event::Eof) => break true,
            Err(e) => {
                validator.errors.push(format!(
                    "XML parse error near byte {}: {}",
                    reader.buffer_position(),
                    e
                ));
                break false;
            }
            _ => {}
        }
    };

    validator.finish(reached_eof)
}

/// Reads a sitemap file and validates its contents
///
/// A file that cannot be read or is not UTF-8 yields an invalid result whose
/// single error describes the problem.
pub fn validate_file(path: &Path) -> ValidationResult {
    match std::fs::read_to_string(path) {
        Ok(xml) => validate(&xml),
        Err(e) => ValidationResult::from_errors(
            vec![format!("Failed to read {}: {}", path.display(), e)],
            0,
        ),
    }
}

/// Accepts the date and datetime profiles of ISO-8601 allowed by W3C
fn is_w3c_datetime(value: &str) -> bool {
    let is_year = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());

    match value.len() {
        4 => is_year(value),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok(),
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        _ => {
            DateTime::parse_from_rfc3339(value).is_ok()
                || DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z").is_ok()
                || DateTime::parse_from_str(&value.replace('Z', "+00:00"), "%Y-%m-%dT%H:%M%:z")
                    .is_ok()
        }
    }
}
