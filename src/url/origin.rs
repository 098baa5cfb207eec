use crate::UrlError;
use url::Url;

/// Returns true when both URLs share scheme, host and (effective) port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemaper::url::same_origin;
///
/// let a = Url::parse("https://a.test/x").unwrap();
/// let b = Url::parse("https://a.test:443/y?z=1").unwrap();
/// let c = Url::parse("http://a.test/x").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Rewrites the scheme, host and port of `url` to those of `replacer`
///
/// Path and query are preserved. Any path or query on `replacer` itself is
/// ignored; only its origin is used.
pub fn replace_origin(url: &Url, replacer: &Url) -> Result<Url, UrlError> {
    let mut published = replacer.clone();
    published.set_path(url.path());
    published.set_query(url.query());
    published.set_fragment(None);

    if published.origin() != replacer.origin() {
        return Err(UrlError::Replace {
            url: url.to_string(),
            reason: format!("result {} left replacer origin", published),
        });
    }

    Ok(published)
}
