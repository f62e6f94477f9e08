//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler and the downloader:
//! - The `PageFetcher` capability the engine and downloader are generic over
//! - Building HTTP clients with a user agent and timeouts
//! - Mapping responses and transport failures onto `FetchError`

use crate::crawler::classifier::is_pdf_content_type;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("pdf-harvest/", env!("CARGO_PKG_VERSION"));

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// A successfully retrieved resource (2xx after redirects)
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: Url,

    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Response body
    ///
    /// Markup is decoded with the charset the server declared and stored as UTF-8;
    /// anything else (PDFs included) is kept as the raw bytes.
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body as text, replacing invalid UTF-8 sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// True if the server says this is a PDF
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_pdf_content_type)
    }

    /// True if the body may contain links worth parsing
    ///
    /// A missing content type is given the benefit of the doubt.
    pub fn is_markup(&self) -> bool {
        self.content_type.as_deref().map_or(true, is_markup_content_type)
    }
}

/// True for HTML, XML and other textual content types
fn is_markup_content_type(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.contains("html") || ct.contains("xml") || ct.starts_with("text/")
}

/// Retrieves a URL
///
/// Implementations follow redirects and report anything other than a final 2xx as
/// `FetchError::Http`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use pdf_harvest::crawler::{build_http_client, DEFAULT_USER_AGENT};
///
/// let client = build_http_client(DEFAULT_USER_AGENT, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, timeout)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // text() honours the charset in Content-Type and falls back to UTF-8
        let body = if content_type.as_deref().map_or(true, is_markup_content_type) {
            response.text().await.map_err(classify_error)?.into_bytes()
        } else {
            response.bytes().await.map_err(classify_error)?.to_vec()
        };

        Ok(FetchedPage {
            url: url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = e.status() {
        FetchError::Http {
            status: status.as_u16(),
        }
    } else if e.is_connect() {
        FetchError::Network(format!("Connection failed: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}
