//! Integration tests for the crawler and downloader
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl-then-download cycle end-to-end.

use pdf_harvest::config::{load_profile, save_profile};
use pdf_harvest::crawler::{Crawler, HttpFetcher, DEFAULT_USER_AGENT};
use pdf_harvest::download::{DownloadStatus, DownloadSummary, Downloader};
use pdf_harvest::{crawl, download_all, CrawlConfig, CrawlMode, FetchError, Profile, StopReason};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page at `route`
async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html"))
        .mount(server)
        .await;
}

/// Mounts a PDF at `route` whose body starts with `%PDF` followed by `marker`
async fn mount_pdf(server: &MockServer, route: &str, marker: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("%PDF-1.4 {}", marker).into_bytes(), "application/pdf"),
        )
        .mount(server)
        .await;
}

/// Mounts a route that must never be requested
async fn mount_forbidden(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"<html></html>".to_vec(), "text/html"))
        .expect(0)
        .mount(server)
        .await;
}

fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse mock server URL")
}

fn site_url(server: &MockServer, route: &str) -> Url {
    base_url(server).join(route).expect("Failed to join route")
}

#[tokio::test]
async fn test_simple_mode_collects_pdfs_from_start_page_only() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/a.pdf">Agenda</a>
        <a href="docs/b.PDF">Budget</a>
        <a href="/minutes">Minutes</a>
        </body></html>"#,
    )
    .await;
    mount_forbidden(&server, "/minutes").await;

    let config = CrawlConfig::new(base_url(&server), CrawlMode::Simple);
    let report = crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.pages_fetched(), 1);
    assert_eq!(report.pdfs.len(), 2);
    assert!(report.pdfs.contains(&site_url(&server, "/a.pdf")));
    assert!(report.pdfs.contains(&site_url(&server, "/docs/b.PDF")));
}

#[tokio::test]
async fn test_navigation_respects_depth_limit() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/level1">Archive</a></body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/level1",
        r#"<html><body>
        <a href="/level1/report.pdf">Report</a>
        <a href="/level2">Older</a>
        <a href="/">Home</a>
        </body></html>"#,
    )
    .await;
    mount_forbidden(&server, "/level2").await;

    let config =
        CrawlConfig::new(base_url(&server), CrawlMode::Navigation).with_max_depth(1);
    let report = crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.pages_fetched(), 2);
    let depths: Vec<u32> = report.fetch_log.iter().map(|entry| entry.depth).collect();
    assert_eq!(depths, vec![0, 1]);
    assert_eq!(
        report.pdfs.iter().cloned().collect::<Vec<_>>(),
        vec![site_url(&server, "/level1/report.pdf")]
    );
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/broken">Broken</a>
        <a href="/ok">Fine</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/ok",
        r#"<html><body><a href="/c.pdf">C</a></body></html>"#,
    )
    .await;

    let config = CrawlConfig::new(base_url(&server), CrawlMode::Navigation).with_max_depth(2);
    let report = crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Completed);
    assert!(report.pdfs.contains(&site_url(&server, "/c.pdf")));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, site_url(&server, "/broken"));
    assert_eq!(report.failures[0].error, FetchError::Http { status: 500 });
}

#[tokio::test]
async fn test_ignore_pattern_excludes_pages_and_pdfs() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/public/a.pdf">A</a>
        <a href="/PRIVATE/b.pdf">B</a>
        <a href="/private/area">Members</a>
        </body></html>"#,
    )
    .await;
    mount_forbidden(&server, "/private/area").await;

    let profile = Profile {
        mode: CrawlMode::Navigation,
        ignore_pattern: Some("private".to_string()),
        ..Profile::new(base_url(&server).to_string())
    };
    let config = profile.to_crawl_config().expect("Invalid profile");
    let report = crawl(&config).await.expect("Crawl failed");

    assert_eq!(
        report.pdfs.iter().cloned().collect::<Vec<_>>(),
        vec![site_url(&server, "/public/a.pdf")]
    );
}

#[tokio::test]
async fn test_page_budget_truncates_run() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/one">One</a>
        <a href="/two">Two</a>
        <a href="/root.pdf">Root</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/one", r#"<a href="/one.pdf">One</a>"#).await;
    mount_forbidden(&server, "/two").await;

    let mut config =
        CrawlConfig::new(base_url(&server), CrawlMode::Navigation).with_max_depth(2);
    config.max_pages = Some(2);
    let report = crawl(&config).await.expect("Crawl failed");

    assert!(report.is_truncated());
    assert_eq!(report.pages_fetched(), 2);
    assert!(report.pdfs.contains(&site_url(&server, "/root.pdf")));
    assert!(report.pdfs.contains(&site_url(&server, "/one.pdf")));
}

#[tokio::test]
async fn test_extensionless_pdf_is_found_and_downloaded() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/files/annual">Annual report</a></body></html>"#,
    )
    .await;
    mount_pdf(&server, "/files/annual", "annual").await;

    let config = CrawlConfig::new(base_url(&server), CrawlMode::Navigation).with_max_depth(2);
    let report = crawl(&config).await.expect("Crawl failed");

    let pdf_url = site_url(&server, "/files/annual");
    assert!(report.pdfs.contains(&pdf_url));

    let dir = TempDir::new().expect("Failed to create temp dir");
    let outcomes = download_all(&report.pdfs, dir.path())
        .await
        .expect("Failed to build downloader");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, DownloadStatus::Success);
    assert_eq!(
        outcomes[0].local_path.as_deref(),
        Some(dir.path().join("annual.pdf").as_path())
    );
}

#[tokio::test]
async fn test_extensionless_pdf_is_requested_once() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/files/budget">Budget 2024</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/budget"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 budget".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = CrawlConfig::new(base_url(&server), CrawlMode::Navigation).with_max_depth(1);
    let mut report = crawl(&config).await.expect("Crawl failed");
    assert!(report.prefetched.contains_key(&site_url(&server, "/files/budget")));

    let fetcher = HttpFetcher::with_user_agent(DEFAULT_USER_AGENT, Duration::from_secs(5))
        .expect("Failed to build fetcher");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let outcomes = Downloader::new(fetcher)
        .with_prefetched(std::mem::take(&mut report.prefetched))
        .download_all(&report.pdfs, dir.path())
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, DownloadStatus::Success);
    let written = std::fs::read(dir.path().join("budget.pdf")).expect("Missing budget.pdf");
    assert_eq!(written, b"%PDF-1.4 budget");
}

#[tokio::test]
async fn test_links_resolve_against_requested_host_after_redirect() {
    let server = MockServer::start().await;
    let port = server.address().port();

    // The start URL names the site as localhost; the server redirects to its IP
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("http://127.0.0.1:{}/docs/", port).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/docs/",
        r#"<html><body><a href="/report.pdf">Report</a></body></html>"#,
    )
    .await;

    let start = Url::parse(&format!("http://localhost:{}/docs", port)).expect("Bad start URL");
    let config = CrawlConfig::new(start, CrawlMode::Simple);
    let report = crawl(&config).await.expect("Crawl failed");

    assert!(report.failures.is_empty(), "failures: {:?}", report.failures);
    let expected = Url::parse(&format!("http://localhost:{}/report.pdf", port)).expect("Bad URL");
    assert_eq!(report.pdfs.iter().cloned().collect::<Vec<_>>(), vec![expected]);
}

#[tokio::test]
async fn test_page_charset_is_honoured() {
    let server = MockServer::start().await;

    // "odluka-č.pdf" where č is 0xE8 in windows-1250
    let mut body = b"<html><body><a href=\"/dokumenti/odluka-".to_vec();
    body.push(0xE8);
    body.extend_from_slice(b".pdf\">Odluka</a></body></html>");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=windows-1250"))
        .mount(&server)
        .await;

    let config = CrawlConfig::new(base_url(&server), CrawlMode::Simple);
    let report = crawl(&config).await.expect("Crawl failed");

    assert_eq!(
        report.pdfs.iter().cloned().collect::<Vec<_>>(),
        vec![site_url(&server, "/dokumenti/odluka-%C4%8D.pdf")]
    );
}

#[tokio::test]
async fn test_crawl_then_download_end_to_end() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/2023/report.pdf">2023</a>
        <a href="/2024/report.pdf">2024</a>
        <a href="/missing.pdf">Gone</a>
        </body></html>"#,
    )
    .await;
    mount_pdf(&server, "/2023/report.pdf", "2023").await;
    mount_pdf(&server, "/2024/report.pdf", "2024").await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = CrawlConfig::new(base_url(&server), CrawlMode::Simple);
    let report = crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.pdfs.len(), 3);

    let dir = TempDir::new().expect("Failed to create temp dir");
    let destination = dir.path().join("city_pdfs");
    let outcomes = download_all(&report.pdfs, &destination)
        .await
        .expect("Failed to build downloader");

    assert_eq!(outcomes.len(), 3);
    let summary = DownloadSummary::from_outcomes(&outcomes);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.http_errors, 1);

    // Results are ordered, so the 2023 file claims the plain name
    let first = std::fs::read(destination.join("report.pdf")).expect("Missing report.pdf");
    let second = std::fs::read(destination.join("report-1.pdf")).expect("Missing report-1.pdf");
    assert_eq!(first, b"%PDF-1.4 2023");
    assert_eq!(second, b"%PDF-1.4 2024");
}

#[tokio::test]
async fn test_fetch_timeout_recorded_as_failure() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/slow">Slow</a><a href="/x.pdf">X</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<html></html>".to_vec(), "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config =
        CrawlConfig::new(base_url(&server), CrawlMode::Navigation).with_max_depth(2);
    config.fetch_timeout = Duration::from_millis(300);

    let fetcher = HttpFetcher::with_user_agent(DEFAULT_USER_AGENT, config.fetch_timeout)
        .expect("Failed to build fetcher");
    let report = Crawler::new(fetcher)
        .crawl(&config)
        .await
        .expect("Crawl failed");

    assert!(report.pdfs.contains(&site_url(&server, "/x.pdf")));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error, FetchError::Timeout);
}

#[test]
fn test_saved_profile_round_trips_into_same_crawl_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let profile = Profile {
        mode: CrawlMode::Navigation,
        max_depth: 3,
        follow_pattern: Some("minutes|agenda".to_string()),
        ..Profile::new("https://www.city.gov/council/")
    };

    let path = save_profile(&profile, dir.path()).expect("Failed to save profile");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config_city.toml"));

    let loaded = load_profile(&path).expect("Failed to load profile");
    assert_eq!(loaded, profile);

    let config = loaded.to_crawl_config().expect("Invalid profile");
    assert_eq!(config.effective_max_depth(), 3);
    assert!(config.follow_pattern.is_some());
}
