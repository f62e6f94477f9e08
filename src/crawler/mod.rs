//! Crawler module for discovering PDF links
//!
//! This module contains the core crawling logic, including:
//! - PDF-or-page classification of links
//! - The frontier and visited set of a run
//! - HTTP fetching and HTML anchor extraction capabilities
//! - The breadth-first crawl engine

mod classifier;
mod engine;
mod fetcher;
mod frontier;
mod parser;

pub use classifier::{is_pdf_content_type, Classifier, DiscoveredLink, LinkKind, Rule};
pub use engine::{Budget, CrawlReport, Crawler, PageFailure, PdfResultSet, StopReason};
pub use fetcher::{build_http_client, FetchedPage, HttpFetcher, PageFetcher, DEFAULT_USER_AGENT};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{Anchor, HtmlLinkExtractor, LinkExtractor};

use crate::config::CrawlConfig;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a crawl with default collaborators. It will:
/// 1. Validate the configuration
/// 2. Build an HTTP client honouring the configured fetch timeout
/// 3. Traverse the site and collect PDF links
///
/// Use [`Crawler`] directly for a custom fetcher, classifier or cancellation token.
pub async fn crawl(config: &CrawlConfig) -> crate::Result<CrawlReport> {
    config.validate()?;
    let fetcher = HttpFetcher::with_user_agent(DEFAULT_USER_AGENT, config.fetch_timeout)?;
    Crawler::new(fetcher).crawl(config).await
}
