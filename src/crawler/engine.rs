//! Crawl engine
//!
//! Breadth-first traversal of one site from its base URL:
//! 1. Dequeue a batch of same-depth pages from the frontier
//! 2. Fetch them (bounded by the per-fetch timeout)
//! 3. Extract anchors, resolve and scope them
//! 4. Collect PDF links, enqueue page links while depth remains
//!
//! The loop ends when the frontier is empty, a page or time budget runs out, or the
//! cancellation token fires. Every ending returns the PDFs found so far.
//!
//! Links are resolved against the URL that was requested, not the address a redirect
//! ended on, so a base URL that redirects to another host still yields in-scope links.

use crate::config::CrawlConfig;
use crate::crawler::classifier::{Classifier, DiscoveredLink, LinkKind};
use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::url::{resolve, scope_of, Scope};
use crate::FetchError;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// PDF URLs found during one run, without duplicates
pub type PdfResultSet = BTreeSet<Url>;

/// A caller-supplied limit on how much work a run may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Maximum number of pages fetched
    Pages(usize),
    /// Maximum wall-clock time; fetches still in flight when it runs out are abandoned
    Time(Duration),
}

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The frontier was exhausted
    Completed,
    /// A budget ran out before the frontier was exhausted
    BudgetExceeded(Budget),
    /// The cancellation token fired
    Cancelled,
}

/// A page that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: Url,
    pub depth: u32,
    pub error: FetchError,
}

/// Everything a crawl run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// PDF URLs discovered
    pub pdfs: PdfResultSet,

    /// Every page fetch attempted, in dequeue order
    pub fetch_log: Vec<FrontierEntry>,

    /// Fetches that failed; their pages contributed no links
    pub failures: Vec<PageFailure>,

    /// Responses already holding a PDF body, keyed by the URL that was requested
    ///
    /// These come from links that looked like pages but were served as
    /// `application/pdf`; hand them to the downloader to avoid a second request.
    pub prefetched: HashMap<Url, FetchedPage>,

    pub stop_reason: StopReason,

    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of pages fetched (successfully or not)
    pub fn pages_fetched(&self) -> usize {
        self.fetch_log.len()
    }

    /// True if the run stopped before the frontier was exhausted
    pub fn is_truncated(&self) -> bool {
        !matches!(self.stop_reason, StopReason::Completed)
    }
}

/// Mutable state owned by a single run
#[derive(Debug, Default)]
struct CrawlRun {
    frontier: Frontier,
    pdfs: PdfResultSet,
    fetch_log: Vec<FrontierEntry>,
    failures: Vec<PageFailure>,
    prefetched: HashMap<Url, FetchedPage>,
}

/// The crawl engine, generic over how pages are fetched and parsed
///
/// # Example
///
/// ```no_run
/// use pdf_harvest::config::{CrawlConfig, CrawlMode};
/// use pdf_harvest::crawler::{Crawler, HttpFetcher, DEFAULT_USER_AGENT};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::with_user_agent(DEFAULT_USER_AGENT, Duration::from_secs(30))?;
/// let config = CrawlConfig::new(Url::parse("https://example.com/docs/")?, CrawlMode::Navigation)
///     .with_max_depth(2);
///
/// let report = Crawler::new(fetcher).crawl(&config).await?;
/// for pdf in &report.pdfs {
///     println!("{}", pdf);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Crawler<F, P = HtmlLinkExtractor> {
    fetcher: F,
    extractor: P,
    classifier: Classifier,
    cancel: CancellationToken,
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates an engine with the HTML link extractor and the default classifier
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            extractor: HtmlLinkExtractor::new(),
            classifier: Classifier::default(),
            cancel: CancellationToken::new(),
        }
    }
}

impl<F: PageFetcher, P: LinkExtractor> Crawler<F, P> {
    /// Replaces the anchor extractor
    pub fn with_extractor<Q: LinkExtractor>(self, extractor: Q) -> Crawler<F, Q> {
        Crawler {
            fetcher: self.fetcher,
            extractor,
            classifier: self.classifier,
            cancel: self.cancel,
        }
    }

    /// Replaces the PDF-or-page policy
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Uses `token` to stop runs between page fetches
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels runs of this engine
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls the site described by `config`
    ///
    /// Only an invalid configuration is an error; fetch failures are recorded in the
    /// report and the crawl moves on.
    pub async fn crawl(&self, config: &CrawlConfig) -> crate::Result<CrawlReport> {
        config.validate()?;

        let max_depth = config.effective_max_depth();
        let batch_size = config.max_concurrent_fetches.max(1);
        let started = Instant::now();

        let mut run = CrawlRun::default();
        run.frontier.enqueue(config.base_url.clone(), 0);

        tracing::info!(
            "Starting {:?} crawl of {} (max depth {})",
            config.mode,
            config.base_url,
            max_depth
        );

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled");
                break StopReason::Cancelled;
            }

            if run.frontier.is_empty() {
                break StopReason::Completed;
            }

            let time_left = match config.max_duration {
                Some(limit) => {
                    let left = limit.saturating_sub(started.elapsed());
                    if left.is_zero() {
                        tracing::warn!("Time budget of {:?} exhausted", limit);
                        break StopReason::BudgetExceeded(Budget::Time(limit));
                    }
                    Some((limit, left))
                }
                None => None,
            };

            let mut limit = batch_size;
            if let Some(max_pages) = config.max_pages {
                let remaining = max_pages.saturating_sub(run.fetch_log.len());
                if remaining == 0 {
                    tracing::warn!(
                        "Page budget of {} exhausted with {} pages still queued",
                        max_pages,
                        run.frontier.len()
                    );
                    break StopReason::BudgetExceeded(Budget::Pages(max_pages));
                }
                limit = limit.min(remaining);
            }

            let batch = run.frontier.dequeue_batch(limit);
            let fetches = join_all(
                batch
                    .iter()
                    .map(|entry| self.fetch_bounded(&entry.url, config.fetch_timeout)),
            );

            // The time budget also bounds fetches that are already in flight
            let results = match time_left {
                Some((budget, left)) => match tokio::time::timeout(left, fetches).await {
                    Ok(results) => results,
                    Err(_) => {
                        tracing::warn!(
                            "Time budget of {:?} exhausted with {} fetches in flight",
                            budget,
                            batch.len()
                        );
                        break StopReason::BudgetExceeded(Budget::Time(budget));
                    }
                },
                None => fetches.await,
            };

            for (entry, result) in batch.into_iter().zip(results) {
                tracing::info!(
                    "Fetched {} (depth {}/{})",
                    entry.url,
                    entry.depth,
                    max_depth
                );

                match result {
                    Ok(page) => self.process_page(&entry, page, config, max_depth, &mut run),
                    Err(error) => {
                        tracing::warn!("Failed to fetch {}: {}", entry.url, error);
                        run.failures.push(PageFailure {
                            url: entry.url.clone(),
                            depth: entry.depth,
                            error,
                        });
                    }
                }

                run.fetch_log.push(entry);
            }

            if !config.request_delay.is_zero() && !run.frontier.is_empty() {
                let pause = match config.max_duration {
                    Some(limit) => config
                        .request_delay
                        .min(limit.saturating_sub(started.elapsed())),
                    None => config.request_delay,
                };
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        };

        let report = CrawlReport {
            pdfs: run.pdfs,
            fetch_log: run.fetch_log,
            failures: run.failures,
            prefetched: run.prefetched,
            stop_reason,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Crawl finished: {} pages fetched, {} failed, {} URLs seen, {} PDFs found in {:?}",
            report.pages_fetched(),
            report.failures.len(),
            run.frontier.visited_count(),
            report.pdfs.len(),
            report.elapsed
        );

        Ok(report)
    }

    /// Fetches one URL, turning an elapsed timeout into `FetchError::Timeout`
    async fn fetch_bounded(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        match tokio::time::timeout(timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    /// Handles a fetched page: collects its PDF links and queues its page links
    fn process_page(
        &self,
        entry: &FrontierEntry,
        page: FetchedPage,
        config: &CrawlConfig,
        max_depth: u32,
        run: &mut CrawlRun,
    ) {
        // An extensionless link that turned out to serve a PDF
        if page.is_pdf() {
            tracing::debug!("{} is served as a PDF", entry.url);
            run.pdfs.insert(entry.url.clone());
            run.prefetched.insert(entry.url.clone(), page);
            return;
        }

        if !page.is_markup() {
            tracing::debug!(
                "Skipping links of {} (content type {:?})",
                entry.url,
                page.content_type
            );
            return;
        }

        let anchors = self.extractor.extract_anchors(&page.text());
        let mut found = 0usize;
        let mut queued = 0usize;

        for anchor in anchors {
            let resolved = match resolve(&anchor.href, &entry.url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Dropping link '{}': {}", anchor.href, e);
                    continue;
                }
            };

            let scope = scope_of(&resolved, config);
            if scope != Scope::InScope {
                tracing::trace!("Out of scope ({:?}): {}", scope, resolved);
                continue;
            }

            let link = DiscoveredLink {
                url: resolved,
                text: anchor.text,
                content_type_hint: anchor.type_hint,
            };

            match self.classifier.explain(&link) {
                (LinkKind::Pdf, rule) => {
                    if run.pdfs.insert(link.url.clone()) {
                        tracing::debug!("Found PDF {} (rule {:?})", link.url, rule);
                        found += 1;
                    }
                }
                (LinkKind::Page, _) => {
                    if entry.depth < max_depth && run.frontier.enqueue(link.url, entry.depth + 1) {
                        queued += 1;
                    }
                }
            }
        }

        tracing::debug!(
            "{}: {} new PDFs, {} pages queued",
            entry.url,
            found,
            queued
        );
    }
}
