use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute URL, normalizing it the same way discovered links are
///
/// Used for the crawl root, which has no base to resolve against.
pub fn parse_absolute(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    finish(url)
}

/// Normalizes a URL according to Sitemaper's normalization rules
///
/// # Normalization Steps
///
/// 1. Resolve `raw` against `base` if it is relative; reject if malformed
/// 2. Require the http or https scheme
/// 3. Require a host
/// 4. Remove fragment (everything after #)
///
/// Host lowercasing, default-port removal and dot-segment removal are
/// performed by the URL parser itself.
///
/// # Arguments
///
/// * `raw` - The URL string as found in the page
/// * `base` - The URL of the page the link was found on (after redirects)
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use sitemaper::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://EXAMPLE.com/docs/intro").unwrap();
/// let url = normalize_url("../about#team", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn normalize_url(raw: &str, base: &Url) -> UrlResult<Url> {
    let url = base
        .join(raw.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    finish(url)
}

fn finish(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}
