//! URL handling module for pdf-harvest
//!
//! This module resolves link targets into absolute URLs and decides whether a
//! resolved URL is in scope for a crawl.

mod domain;
mod matcher;
mod normalize;

use crate::config::CrawlConfig;
use ::url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_host, site_stem};
pub use matcher::{match_patterns, PatternVerdict};
pub use normalize::resolve;

/// Why a URL was judged in or out of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Same host as the base URL and passes the patterns
    InScope,
    /// Different host (subdomains included)
    OffSite,
    /// Matched the ignore pattern
    Ignored,
    /// Did not match the follow pattern
    NotFollowed,
}

impl Scope {
    pub fn is_in_scope(&self) -> bool {
        matches!(self, Self::InScope)
    }
}

/// Determines the scope of a resolved URL for a crawl
///
/// Checks run in this order:
/// 1. Host must equal the base URL's host
/// 2. Ignore pattern (a match excludes)
/// 3. Follow pattern (must match when set)
pub fn scope_of(url: &Url, config: &CrawlConfig) -> Scope {
    if !same_host(url, &config.base_url) {
        return Scope::OffSite;
    }

    match match_patterns(
        url.as_str(),
        config.follow_pattern.as_ref(),
        config.ignore_pattern.as_ref(),
    ) {
        PatternVerdict::Allowed => Scope::InScope,
        PatternVerdict::Ignored => Scope::Ignored,
        PatternVerdict::NotFollowed => Scope::NotFollowed,
    }
}

/// Returns true if the crawl may collect or follow `url`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_harvest::config::{CrawlConfig, CrawlMode};
/// use pdf_harvest::url::in_scope;
///
/// let config = CrawlConfig::new(Url::parse("http://ex.com/docs").unwrap(), CrawlMode::Simple);
///
/// assert!(in_scope(&Url::parse("http://ex.com/other").unwrap(), &config));
/// assert!(!in_scope(&Url::parse("http://files.ex.com/a.pdf").unwrap(), &config));
/// ```
pub fn in_scope(url: &Url, config: &CrawlConfig) -> bool {
    scope_of(url, config).is_in_scope()
}
