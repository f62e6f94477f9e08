//! In-memory stand-ins for the network and the filesystem

use crate::crawler::{FetchedPage, PageFetcher};
use crate::download::FileWriter;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fake website keyed by exact URL string; unknown URLs answer 404
#[derive(Default)]
pub struct FakeSite {
    responses: HashMap<String, Result<FetchedPage, FetchError>>,
    latency: HashMap<String, Duration>,
    cancel_on: Option<(String, CancellationToken)>,
    log: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(self, url: &str, body: &str) -> Self {
        self.resource(url, "text/html; charset=utf-8", body.as_bytes())
    }

    pub fn pdf(self, url: &str) -> Self {
        self.resource(url, "application/pdf", b"%PDF-1.4 fake")
    }

    pub fn resource(mut self, url: &str, content_type: &str, body: &[u8]) -> Self {
        let parsed = Url::parse(url).unwrap();
        self.responses.insert(
            parsed.to_string(),
            Ok(FetchedPage {
                url: parsed.clone(),
                final_url: parsed,
                status: 200,
                content_type: Some(content_type.to_string()),
                body: body.to_vec(),
            }),
        );
        self
    }

    /// Serves `target`'s response for `url`, reporting `target` as the final URL
    pub fn redirect(mut self, url: &str, target: &str) -> Self {
        let parsed = Url::parse(url).unwrap();
        if let Some(Ok(page)) = self.responses.get(Url::parse(target).unwrap().as_str()) {
            let mut page = page.clone();
            page.url = parsed.clone();
            self.responses.insert(parsed.to_string(), Ok(page));
        }
        self
    }

    pub fn error(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    /// Makes fetches of `url` hang far longer than any test timeout
    pub fn slow(self, url: &str) -> Self {
        self.delayed(url, Duration::from_secs(30))
    }

    /// Makes fetches of `url` take `latency`
    pub fn delayed(mut self, url: &str, latency: Duration) -> Self {
        self.latency.insert(url.to_string(), latency);
        self
    }

    /// Cancels `token` as soon as `url` is requested
    pub fn cancel_on(mut self, url: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((url.to_string(), token));
        self
    }

    /// Every URL requested so far, in request order
    pub fn fetched(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.log.lock().unwrap().push(url.to_string());

        if let Some((target, token)) = &self.cancel_on {
            if target == url.as_str() {
                token.cancel();
            }
        }

        if let Some(latency) = self.latency.get(url.as_str()) {
            tokio::time::sleep(*latency).await;
        }

        self.responses
            .get(url.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Http { status: 404 }))
    }
}

/// Records writes in memory; paths listed in `fail_on` fail with permission denied
#[derive(Default)]
pub struct MemoryWriter {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    fail_on: HashSet<PathBuf>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_on.insert(path.into());
        self
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl FileWriter for MemoryWriter {
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.fail_on.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }

        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
