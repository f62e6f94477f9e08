use url::Url;

/// Lowercased host of a URL, or None for host-less links such as `mailto:`
///
/// ```
/// use url::Url;
/// use pdf_harvest::url::extract_domain;
///
/// let url = Url::parse("https://WWW.City.GOV/council").unwrap();
/// assert_eq!(extract_domain(&url).as_deref(), Some("www.city.gov"));
///
/// let url = Url::parse("mailto:clerk@city.gov").unwrap();
/// assert_eq!(extract_domain(&url), None);
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// True when both URLs have the same host
///
/// Ports and schemes are not compared, and subdomains count as different hosts.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Short site name used for profile files and default download folders
///
/// The host is lowercased, a leading `www.` is dropped and so is the last label when
/// it is alphabetic (`www.city.gov` becomes `city`).
///
/// ```
/// use url::Url;
/// use pdf_harvest::url::site_stem;
///
/// let url = Url::parse("https://www.city.gov/council").unwrap();
/// assert_eq!(site_stem(&url), Some("city".to_string()));
/// ```
pub fn site_stem(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let stem = match host.rsplit_once('.') {
        Some((rest, tld))
            if !rest.is_empty() && !tld.is_empty() && tld.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            rest
        }
        _ => host,
    };

    Some(stem.to_string())
}
