//! Download module for persisting discovered PDFs
//!
//! This module provides:
//! - Sequential, single-attempt downloading with per-URL outcomes
//! - Local file naming with in-run collision handling
//! - The file-writing capability the downloader is generic over

mod coordinator;
mod filename;
mod writer;

pub use coordinator::{DownloadOutcome, DownloadStatus, DownloadSummary, Downloader};
pub use filename::{derive_file_name, FileNamer};
pub use writer::{FileWriter, FsWriter};

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::crawler::{HttpFetcher, DEFAULT_USER_AGENT};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Pause between consecutive downloads when using the default downloader
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_millis(500);

/// Downloads every URL into `destination` over HTTP
///
/// Only failing to build the HTTP client is an error; per-URL failures are
/// reported in the returned outcomes, one per input URL.
pub async fn download_all<'a, I>(urls: I, destination: &Path) -> crate::Result<Vec<DownloadOutcome>>
where
    I: IntoIterator<Item = &'a Url>,
{
    let fetcher = HttpFetcher::with_user_agent(DEFAULT_USER_AGENT, DEFAULT_FETCH_TIMEOUT)?;
    let downloader = Downloader::new(fetcher).with_delay(DEFAULT_DOWNLOAD_DELAY);
    Ok(downloader.download_all(urls, destination).await)
}
