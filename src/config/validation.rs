use crate::config::types::{CrawlConfig, Profile};
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use std::time::Duration;
use url::Url;

/// Upper bound on same-depth fetches in flight
const MAX_CONCURRENCY: u32 = 32;

/// Validates a compiled configuration before a run starts
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    if config.max_concurrent_fetches == 0 {
        return Err(ConfigError::Validation(
            "max_concurrent_fetches must be at least 1".to_string(),
        ));
    }

    if config.fetch_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "fetch_timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates a profile and compiles it into a crawl configuration
pub(crate) fn build_crawl_config(profile: &Profile) -> Result<CrawlConfig, ConfigError> {
    let base_url = parse_base_url(&profile.base_url)?;
    let max_depth = validate_depth(profile.max_depth)?;

    if profile.concurrency < 1 || profile.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, profile.concurrency
        )));
    }

    if profile.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if profile.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    let mut config = CrawlConfig::new(base_url, profile.mode).with_max_depth(max_depth);
    config.follow_pattern = compile_pattern("follow", profile.follow_pattern.as_deref())?;
    config.ignore_pattern = compile_pattern("ignore", profile.ignore_pattern.as_deref())?;
    config.max_pages = profile.max_pages.map(|n| n as usize);
    config.max_duration = profile.max_duration_secs.map(Duration::from_secs);
    config.fetch_timeout = Duration::from_secs(profile.timeout_secs);
    config.request_delay = Duration::from_millis(profile.request_delay_ms);
    config.max_concurrent_fetches = profile.concurrency as usize;

    Ok(config)
}

/// Parses the base URL and checks that it can start a crawl
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::InvalidUrl("base URL is required".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", raw, e)))?;
    validate_base_url(&url)?;
    Ok(url)
}

/// A base URL must be http(s) with a non-empty host
fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use http or https, got '{}'",
            url,
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' has no host",
            url
        ))),
    }
}

fn validate_depth(depth: i64) -> Result<u32, ConfigError> {
    if depth < 0 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 0, got {}",
            depth
        )));
    }

    u32::try_from(depth)
        .map_err(|_| ConfigError::Validation(format!("max_depth {} is too large", depth)))
}

/// Compiles an optional link pattern, treating a blank pattern as absent
///
/// Patterns match case-insensitively.
pub fn compile_pattern(name: &str, pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    let pattern = match pattern.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(None),
    };

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| ConfigError::InvalidPattern(format!("{} pattern '{}': {}", name, pattern, e)))
}
