use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a link target against the page it was found on
///
/// # Resolution Steps
///
/// 1. Trim surrounding whitespace; an empty target is rejected
/// 2. Join against `base` with standard URL resolution (`..`, `/path`, `?query`,
///    `//host/path`); a query-only target replaces the base's query rather than merging
/// 3. Reject anything that is not http(s) with a host (`mailto:`, `javascript:`, `tel:`,
///    `data:`)
/// 4. Remove the fragment
///
/// An absolute http(s) URL without a fragment comes back unchanged whatever the base.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_harvest::url::resolve;
///
/// let base = Url::parse("http://ex.com/docs/").unwrap();
/// let url = resolve("report.pdf#page=2", &base).unwrap();
/// assert_eq!(url.as_str(), "http://ex.com/docs/report.pdf");
///
/// assert!(resolve("mailto:clerk@ex.com", &base).is_err());
/// ```
pub fn resolve(raw_href: &str, base: &Url) -> UrlResult<Url> {
    let href = raw_href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
