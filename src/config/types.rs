use crate::config::validation;
use crate::ConfigResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default timeout for a single page or file fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default navigation depth when a profile does not specify one
pub const DEFAULT_MAX_DEPTH: i64 = 2;

/// How far the crawler is allowed to wander from the base URL
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Only the base URL is fetched; PDFs linked from it are collected
    #[default]
    Simple,
    /// Same-domain links are followed breadth-first up to the depth bound
    Navigation,
}

/// Immutable settings for one crawl run
///
/// Build one with [`CrawlConfig::new`] and adjust the public fields, or compile a
/// [`Profile`] with [`Profile::to_crawl_config`]. Patterns are already compiled here, so
/// the only thing [`CrawlConfig::validate`] still has to check is the base URL.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts; also defines the only in-scope host
    pub base_url: Url,

    pub mode: CrawlMode,

    /// Maximum number of link hops from the base URL (ignored in simple mode)
    pub max_depth: u32,

    /// If set, only URLs matching this pattern are in scope
    pub follow_pattern: Option<Regex>,

    /// If set, URLs matching this pattern are out of scope, even if they match the follow pattern
    pub ignore_pattern: Option<Regex>,

    /// Stop after fetching this many pages
    pub max_pages: Option<usize>,

    /// Stop once the run has been going for this long
    pub max_duration: Option<Duration>,

    /// Upper bound on any single page fetch
    pub fetch_timeout: Duration,

    /// Pause between consecutive page fetches
    pub request_delay: Duration,

    /// How many pages of the same depth may be in flight at once
    pub max_concurrent_fetches: usize,
}

impl CrawlConfig {
    /// Creates a configuration with no patterns, no budgets and sequential fetching
    pub fn new(base_url: Url, mode: CrawlMode) -> Self {
        Self {
            base_url,
            mode,
            max_depth: 0,
            follow_pattern: None,
            ignore_pattern: None,
            max_pages: None,
            max_duration: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            request_delay: Duration::ZERO,
            max_concurrent_fetches: 1,
        }
    }

    /// Sets the depth bound
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The depth bound actually applied to the run
    ///
    /// Simple mode is navigation mode with the depth forced to zero.
    pub fn effective_max_depth(&self) -> u32 {
        match self.mode {
            CrawlMode::Simple => 0,
            CrawlMode::Navigation => self.max_depth,
        }
    }

    /// Rejects a configuration the engine must not start with
    pub fn validate(&self) -> ConfigResult<()> {
        validation::validate(self)
    }
}

/// Serializable, string-typed crawl settings as stored in a profile file
///
/// ```toml
/// base-url = "https://www.city.gov/council/minutes"
/// mode = "navigation"
/// max-depth = 2
/// ignore-pattern = "login|facebook"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    pub base_url: String,

    #[serde(default)]
    pub mode: CrawlMode,

    /// Signed so that a negative depth can be reported instead of failing to parse
    #[serde(default = "default_max_depth")]
    pub max_depth: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_pattern: Option<String>,

    /// Destination for downloaded files; defaults to `<site>_pdfs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_secs: Option<u64>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub request_delay_ms: u64,

    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_max_depth() -> i64 {
    DEFAULT_MAX_DEPTH
}

fn default_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_concurrency() -> u32 {
    1
}

impl Profile {
    /// A simple-mode profile for `base_url` with every other setting at its default
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            mode: CrawlMode::Simple,
            max_depth: DEFAULT_MAX_DEPTH,
            follow_pattern: None,
            ignore_pattern: None,
            download_folder: None,
            max_pages: None,
            max_duration_secs: None,
            timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            concurrency: default_concurrency(),
            user_agent: None,
        }
    }

    /// Validates the profile and compiles it into a [`CrawlConfig`]
    pub fn to_crawl_config(&self) -> ConfigResult<CrawlConfig> {
        validation::build_crawl_config(self)
    }

    /// The download folder, falling back to `<site>_pdfs` derived from the base URL
    pub fn download_folder_or_default(&self) -> PathBuf {
        match self.download_folder.as_deref().map(str::trim) {
            Some(folder) if !folder.is_empty() => PathBuf::from(folder),
            _ => default_download_folder(&self.base_url),
        }
    }
}

/// `<site>_pdfs`, or `downloaded_pdfs` when the URL has no usable host
pub fn default_download_folder(base_url: &str) -> PathBuf {
    Url::parse(base_url)
        .ok()
        .and_then(|url| crate::url::site_stem(&url))
        .map(|stem| PathBuf::from(format!("{}_pdfs", stem)))
        .unwrap_or_else(|| PathBuf::from("downloaded_pdfs"))
}
