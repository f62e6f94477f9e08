//! pdf-harvest: find and download the PDFs a website links to
//!
//! This crate crawls a single site, either just the start page (simple mode) or
//! breadth-first through same-domain links up to a depth bound (navigation mode),
//! classifies every in-scope link as a PDF or a page, and downloads the PDFs it found.

pub mod config;
pub mod crawler;
pub mod download;
pub mod url;

#[cfg(test)]
mod test_support;

use thiserror::Error;

/// Main error type for pdf-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// All of these are raised before any network activity takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors (the malformed URL family)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty link target")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Failure to retrieve a single page or file
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Request timed out")]
    Timeout,
}

/// Result type alias for pdf-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlConfig, CrawlMode, Profile};
pub use crawler::{crawl, CrawlReport, Crawler, PdfResultSet, StopReason};
pub use download::{download_all, DownloadOutcome, DownloadStatus, Downloader};
pub use crate::url::{in_scope, resolve};
