//! pdf-harvest main entry point
//!
//! This is the command-line interface for the pdf-harvest crawler.

use anyhow::{bail, Context};
use clap::Parser;
use pdf_harvest::config::{list_profiles, load_profile, profile_display_name, save_profile};
use pdf_harvest::crawler::{CrawlReport, Crawler, HttpFetcher, StopReason, DEFAULT_USER_AGENT};
use pdf_harvest::download::{DownloadStatus, DownloadSummary, Downloader, DEFAULT_DOWNLOAD_DELAY};
use pdf_harvest::{CrawlMode, Profile};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// pdf-harvest: find and download the PDFs a website links to
///
/// In simple mode only the start page is scanned. In navigation mode same-site
/// links are followed breadth-first up to the configured depth.
#[derive(Parser, Debug)]
#[command(name = "pdf-harvest")]
#[command(version)]
#[command(about = "Find and download the PDFs a website links to", long_about = None)]
struct Cli {
    /// Start URL of the crawl
    #[arg(long, value_name = "URL", required_unless_present_any = ["config", "list_profiles"])]
    url: Option<String>,

    /// Load settings from a saved TOML profile; other flags override it
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    config: Option<PathBuf>,

    /// Crawl mode
    #[arg(long, value_enum)]
    mode: Option<CrawlMode>,

    /// Maximum link depth followed in navigation mode
    #[arg(long, allow_negative_numbers = true)]
    depth: Option<i64>,

    /// Only follow pages whose URL matches this regular expression
    #[arg(long, value_name = "REGEX")]
    follow: Option<String>,

    /// Never visit or download URLs matching this regular expression
    #[arg(long, value_name = "REGEX")]
    ignore: Option<String>,

    /// Directory to save PDFs into (defaults to <site>_pdfs)
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Stop after fetching this many pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u64>,

    /// Stop crawling after this many seconds
    #[arg(long, value_name = "N")]
    max_seconds: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Delay between page fetches in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Number of same-depth pages fetched at once
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Save the effective settings as a profile in this directory
    #[arg(long, value_name = "DIR")]
    save_profile: Option<PathBuf>,

    /// List saved profiles in this directory and exit
    #[arg(long, value_name = "DIR", exclusive = true)]
    list_profiles: Option<PathBuf>,

    /// Crawl and print discovered PDF links without downloading them
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Builds the effective profile from `--config` (if any) and the override flags
    fn profile(&self) -> anyhow::Result<Profile> {
        let mut profile = match (&self.config, &self.url) {
            (Some(path), _) => load_profile(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))?,
            (None, Some(url)) => Profile::new(url.clone()),
            (None, None) => bail!("Either --url or --config is required"),
        };

        if let Some(mode) = self.mode {
            profile.mode = mode;
        }
        if let Some(depth) = self.depth {
            profile.max_depth = depth;
        }
        if let Some(pattern) = &self.follow {
            profile.follow_pattern = Some(pattern.clone());
        }
        if let Some(pattern) = &self.ignore {
            profile.ignore_pattern = Some(pattern.clone());
        }
        if let Some(folder) = &self.output {
            profile.download_folder = Some(folder.clone());
        }
        if let Some(pages) = self.max_pages {
            profile.max_pages = Some(pages);
        }
        if let Some(secs) = self.max_seconds {
            profile.max_duration_secs = Some(secs);
        }
        if let Some(secs) = self.timeout {
            profile.timeout_secs = secs;
        }
        if let Some(ms) = self.delay_ms {
            profile.request_delay_ms = ms;
        }
        if let Some(n) = self.concurrency {
            profile.concurrency = n;
        }

        Ok(profile)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(dir) = &cli.list_profiles {
        return handle_list_profiles(dir);
    }

    let profile = cli.profile()?;
    let config = profile
        .to_crawl_config()
        .context("Invalid crawl settings")?;

    if let Some(dir) = &cli.save_profile {
        let path = save_profile(&profile, dir)?;
        println!("Profile saved to {}", path.display());
    }

    let user_agent = profile.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    let fetcher = HttpFetcher::with_user_agent(user_agent, config.fetch_timeout)
        .context("Failed to build HTTP client")?;

    // Ctrl-C stops the crawl; PDFs found so far are still reported
    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    tracing::info!(
        "Crawling {} in {:?} mode (max depth {})",
        config.base_url,
        config.mode,
        config.effective_max_depth()
    );

    let mut report = Crawler::new(fetcher.clone())
        .with_cancellation(cancel)
        .crawl(&config)
        .await?;

    print_report(&report);

    if report.pdfs.is_empty() {
        return Ok(());
    }

    if cli.dry_run {
        for pdf in &report.pdfs {
            println!("{}", pdf);
        }
        return Ok(());
    }

    if report.stop_reason == StopReason::Cancelled {
        println!("Crawl interrupted; skipping downloads. Found:");
        for pdf in &report.pdfs {
            println!("  {}", pdf);
        }
        return Ok(());
    }

    let destination = profile.download_folder_or_default();
    let prefetched = std::mem::take(&mut report.prefetched);
    let downloader = Downloader::new(fetcher)
        .with_delay(DEFAULT_DOWNLOAD_DELAY)
        .with_prefetched(prefetched);
    handle_downloads(downloader, &report, &destination).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pdf_harvest=info,warn"),
            1 => EnvFilter::new("pdf_harvest=debug,info"),
            2 => EnvFilter::new("pdf_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing current pages");
            cancel.cancel();
        }
    });
}

/// Handles --list-profiles: prints saved profiles and exits
fn handle_list_profiles(dir: &Path) -> anyhow::Result<()> {
    let profiles = list_profiles(dir)?;
    if profiles.is_empty() {
        println!("No saved profiles in {}", dir.display());
        return Ok(());
    }

    println!("Saved profiles in {}:", dir.display());
    for path in &profiles {
        let name = profile_display_name(path).unwrap_or("?");
        match load_profile(path) {
            Ok(profile) => println!("  - {} ({})", name, profile.base_url),
            Err(e) => println!("  - {} (unreadable: {})", name, e),
        }
    }

    Ok(())
}

fn print_report(report: &CrawlReport) {
    println!("\n=== Crawl Finished ===");
    println!("  Pages fetched: {}", report.pages_fetched());
    println!("  Page failures: {}", report.failures.len());
    println!("  PDFs found: {}", report.pdfs.len());
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    match &report.stop_reason {
        StopReason::Completed => {}
        StopReason::BudgetExceeded(budget) => {
            println!("  Stopped early: {:?} budget reached, results are partial", budget)
        }
        StopReason::Cancelled => println!("  Stopped early: cancelled, results are partial"),
    }
}

async fn handle_downloads(
    downloader: Downloader<HttpFetcher>,
    report: &CrawlReport,
    destination: &Path,
) -> anyhow::Result<()> {
    println!("\nDownloading {} PDFs to {}", report.pdfs.len(), destination.display());

    let outcomes = downloader.download_all(&report.pdfs, destination).await;

    for outcome in &outcomes {
        match (&outcome.status, &outcome.local_path) {
            (DownloadStatus::Success, Some(path)) => println!("  ✓ {}", path.display()),
            (status, _) => println!("  ✗ {} ({:?})", outcome.url, status),
        }
    }

    let summary = DownloadSummary::from_outcomes(&outcomes);
    println!("\n=== Download Summary ===");
    println!("  Succeeded: {}", summary.succeeded);
    println!("  HTTP errors: {}", summary.http_errors);
    println!("  Network errors: {}", summary.network_errors);
    println!("  Write errors: {}", summary.write_errors);

    Ok(())
}
