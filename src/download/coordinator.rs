//! Download coordinator
//!
//! Fetches each discovered PDF once and writes it into the destination
//! directory. Every input URL yields exactly one [`DownloadOutcome`].

use crate::crawler::{FetchedPage, PageFetcher};
use crate::download::filename::{derive_file_name, FileNamer};
use crate::download::writer::{FileWriter, FsWriter};
use crate::FetchError;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// How a single download ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Success,
    /// The server answered with a non-2xx status
    HttpError(u16),
    /// The request failed or timed out
    NetworkError(String),
    /// The bytes arrived but could not be written
    WriteError(String),
}

impl DownloadStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<FetchError> for DownloadStatus {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Http { status } => Self::HttpError(status),
            FetchError::Network(message) => Self::NetworkError(message),
            FetchError::Timeout => Self::NetworkError(FetchError::Timeout.to_string()),
        }
    }
}

/// Result of downloading one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub url: Url,
    pub status: DownloadStatus,
    /// Where the file was written; set only on success
    pub local_path: Option<PathBuf>,
}

/// Outcome counts for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub http_errors: usize,
    pub network_errors: usize,
    pub write_errors: usize,
}

impl DownloadSummary {
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match outcome.status {
                    DownloadStatus::Success => summary.succeeded += 1,
                    DownloadStatus::HttpError(_) => summary.http_errors += 1,
                    DownloadStatus::NetworkError(_) => summary.network_errors += 1,
                    DownloadStatus::WriteError(_) => summary.write_errors += 1,
                }
                summary
            })
    }

    pub fn failed(&self) -> usize {
        self.http_errors + self.network_errors + self.write_errors
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed()
    }
}

/// Fetches PDFs and persists them, one attempt per URL
pub struct Downloader<F, W = FsWriter> {
    fetcher: F,
    writer: W,
    delay: Duration,
    timeout: Option<Duration>,
    prefetched: HashMap<Url, FetchedPage>,
}

impl<F: PageFetcher> Downloader<F> {
    /// Creates a downloader that writes to the local filesystem
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            writer: FsWriter,
            delay: Duration::ZERO,
            timeout: None,
            prefetched: HashMap::new(),
        }
    }
}

impl<F: PageFetcher, W: FileWriter> Downloader<F, W> {
    /// Replaces the file writer
    pub fn with_writer<V: FileWriter>(self, writer: V) -> Downloader<F, V> {
        Downloader {
            fetcher: self.fetcher,
            writer,
            delay: self.delay,
            timeout: self.timeout,
            prefetched: self.prefetched,
        }
    }

    /// Pause between consecutive downloads
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Upper bound on each fetch, on top of whatever the fetcher enforces
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Responses the crawl already received in full, written without another request
    pub fn with_prefetched(mut self, pages: HashMap<Url, FetchedPage>) -> Self {
        self.prefetched = pages;
        self
    }

    /// Downloads every URL into `destination`
    ///
    /// Failures are reported per URL and never stop the remaining downloads.
    pub async fn download_all<'a, I>(&self, urls: I, destination: &Path) -> Vec<DownloadOutcome>
    where
        I: IntoIterator<Item = &'a Url>,
    {
        let mut namer = FileNamer::new();
        let mut outcomes = Vec::new();

        for (i, url) in urls.into_iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let outcome = self.download_one(url, destination, &mut namer).await;
            match &outcome.status {
                DownloadStatus::Success => {
                    if let Some(path) = &outcome.local_path {
                        tracing::info!("Downloaded: {}", path.display());
                    }
                }
                status => tracing::warn!("Failed to download {}: {:?}", url, status),
            }
            outcomes.push(outcome);
        }

        let summary = DownloadSummary::from_outcomes(&outcomes);
        tracing::info!(
            "Downloads finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed()
        );

        outcomes
    }

    async fn download_one(
        &self,
        url: &Url,
        destination: &Path,
        namer: &mut FileNamer,
    ) -> DownloadOutcome {
        let fetched = match self.prefetched.get(url) {
            Some(page) => {
                tracing::debug!("Reusing body of {} from the crawl", url);
                Ok(Cow::Borrowed(page))
            }
            None => self.fetch(url).await.map(Cow::Owned),
        };

        let page = match fetched {
            Ok(page) => page,
            Err(error) => {
                return DownloadOutcome {
                    url: url.clone(),
                    status: error.into(),
                    local_path: None,
                }
            }
        };

        let name = namer.reserve(&derive_file_name(url, page.content_type.as_deref()));
        let path = destination.join(&name);

        match self.writer.write_file(&path, &page.body).await {
            Ok(()) => DownloadOutcome {
                url: url.clone(),
                status: DownloadStatus::Success,
                local_path: Some(path),
            },
            Err(e) => {
                namer.release(&name);
                DownloadOutcome {
                    url: url.clone(),
                    status: DownloadStatus::WriteError(e.to_string()),
                    local_path: None,
                }
            }
        }
    }

    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch(url))
                .await
                .unwrap_or(Err(FetchError::Timeout)),
            None => self.fetcher.fetch(url).await,
        }
    }
}
