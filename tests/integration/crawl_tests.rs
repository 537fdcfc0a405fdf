//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use webgrep::config::{Config, CrawlerConfig, MatchMode, OutputFormat};
use webgrep::crawler::{BuiltinExtractor, Crawler, DocumentExtractor, ExtractError};
use webgrep::output::{render_report, ErrorKind};
use webgrep::WebgrepError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed` for `keyword`
fn create_test_config(seed: &str, keyword: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            url: seed.to_string(),
            keyword: keyword.to_string(),
            depth: 1,
            timeout_ms: 5_000,
            delay_ms: 0, // No politeness delay for testing
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn html_page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// Mounts a GET handler for `route` that must be hit exactly `times` times
async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// External links point at `localhost` so that they name a different host
/// than the `127.0.0.1` seed while still reaching a local mock server
fn external_uri(server: &MockServer) -> String {
    server.uri().replace("127.0.0.1", "localhost")
}

#[tokio::test]
async fn test_fixture_site_depth_one() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        html_page(format!(
            r#"<html><head><title>Rust home</title></head><body>
            <p>We love rust.</p>
            <a href="{base}/">Home</a>
            <a href="/about">About</a>
            <a href="{ext}/elsewhere">Elsewhere</a>
            </body></html>"#,
            base = base,
            ext = external_uri(&external)
        )),
        1,
    )
    .await;
    mount_page(
        &site,
        "/about",
        html_page(
            r#"<html><body><p>About RUST</p><a href="/deeper">Deeper</a></body></html>"#
                .to_string(),
        ),
        1,
    )
    .await;
    mount_page(&site, "/deeper", html_page(String::new()), 0).await;
    Mock::given(method("GET"))
        .respond_with(html_page("rust".to_string()))
        .expect(0)
        .mount(&external)
        .await;

    let config = create_test_config(&format!("{}/", base), "rust");
    let crawler = Crawler::new(config.clone()).unwrap();
    let result = crawler.run().await;

    assert_eq!(result.visited_count, 2);
    assert_eq!(result.parsed_count, 2);
    assert!(!result.interrupted);
    assert_eq!(result.matches.get(&format!("{}/", base)), Some(&2));
    assert_eq!(result.matches.get(&format!("{}/about", base)), Some(&1));
    assert_eq!(result.total_matches(), 3);
    for kind in ErrorKind::all() {
        assert_eq!(result.error_count(*kind), 0, "{} should be zero", kind);
    }

    let json = render_report(&result, &config.crawler, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["stats"]["pages_visited"], 2);
    assert_eq!(value["results"][0]["url"], format!("{}/", base));
    assert_eq!(value["results"][0]["count"], 2);
}

#[tokio::test]
async fn test_allow_external_follows_other_hosts() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        html_page(format!(
            r#"<body><a href="{}/elsewhere">Elsewhere</a></body>"#,
            external_uri(&external)
        )),
        1,
    )
    .await;
    mount_page(
        &external,
        "/elsewhere",
        html_page("<body>rust abroad</body>".to_string()),
        1,
    )
    .await;

    let mut config = create_test_config(&site.uri(), "rust");
    config.crawler.allow_external = true;
    let result = Crawler::new(config).unwrap().run().await;

    assert_eq!(result.visited_count, 2);
    assert_eq!(result.total_matches(), 1);
}

#[tokio::test]
async fn test_depth_zero_visits_only_seed() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        html_page(r#"<body>rust <a href="/next">next</a></body>"#.to_string()),
        1,
    )
    .await;
    mount_page(&site, "/next", html_page(String::new()), 0).await;

    let mut config = create_test_config(&site.uri(), "rust");
    config.crawler.depth = 0;
    let result = Crawler::new(config).unwrap().run().await;

    assert_eq!(result.visited_count, 1);
    assert_eq!(result.total_matches(), 1);
}

#[tokio::test]
async fn test_max_pages_bounds_the_crawl() {
    let site = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">page {}</a>"#, i, i))
        .collect();
    mount_page(&site, "/", html_page(format!("<body>{}</body>", links)), 1).await;
    Mock::given(method("GET"))
        .respond_with(html_page("<body>rust</body>".to_string()))
        .mount(&site)
        .await;

    let mut config = create_test_config(&site.uri(), "rust");
    config.crawler.max_pages = 3;
    let result = Crawler::new(config).unwrap().run().await;

    assert_eq!(result.visited_count, 3);
    assert_eq!(result.matches.len(), 2);
    assert_eq!(site.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_oversized_pages_are_skipped() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        html_page(r#"<body>rust <a href="/big">big</a></body>"#.to_string()),
        1,
    )
    .await;
    mount_page(
        &site,
        "/big",
        html_page(format!("<body>{}</body>", "rust ".repeat(400))),
        1,
    )
    .await;

    let mut config = create_test_config(&site.uri(), "rust");
    config.crawler.max_bytes = 512;
    let result = Crawler::new(config).unwrap().run().await;

    assert_eq!(result.visited_count, 2);
    assert_eq!(result.parsed_count, 1);
    assert_eq!(result.error_count(ErrorKind::SkippedSize), 1);
    assert_eq!(result.total_matches(), 1);
    assert!(!result.matches.keys().any(|url| url.ends_with("/big")));
}

#[tokio::test]
async fn test_oversized_body_without_declared_length_is_skipped() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        html_page(r#"<body>rust <a href="/packed">packed</a></body>"#.to_string()),
        1,
    )
    .await;

    // gzip decoding hides the length, so the budget is enforced while streaming
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(format!("<body>{}</body>", "rust ".repeat(400)).as_bytes())
        .unwrap();
    mount_page(
        &site,
        "/packed",
        ResponseTemplate::new(200)
            .insert_header("content-encoding", "gzip")
            .set_body_raw(encoder.finish().unwrap(), "text/html"),
        1,
    )
    .await;

    let mut config = create_test_config(&site.uri(), "rust");
    config.crawler.max_bytes = 512;
    let result = Crawler::new(config).unwrap().run().await;

    assert_eq!(result.visited_count, 2);
    assert_eq!(result.parsed_count, 1);
    assert_eq!(result.error_count(ErrorKind::SkippedSize), 1);
    assert_eq!(result.total_matches(), 1);
}

#[tokio::test]
async fn test_blocked_and_failed_pages() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        html_page(
            r#"<body>
            <a href="/forbidden">a</a>
            <a href="/limited">b</a>
            <a href="/broken">c</a>
            </body>"#
                .to_string(),
        ),
        1,
    )
    .await;
    mount_page(&site, "/forbidden", ResponseTemplate::new(403), 1).await;
    mount_page(&site, "/limited", ResponseTemplate::new(429), 1).await;
    mount_page(&site, "/broken", ResponseTemplate::new(500), 1).await;

    let result = Crawler::new(create_test_config(&base, "rust"))
        .unwrap()
        .run()
        .await;

    assert_eq!(result.visited_count, 4);
    assert_eq!(result.error_count(ErrorKind::Blocked), 2);
    assert_eq!(result.error_count(ErrorKind::NetworkError), 1);
    assert_eq!(
        result.blocked.get(&format!("{}/forbidden", base)).map(String::as_str),
        Some("HTTP 403 (Access Denied/Rate Limited)")
    );
    assert_eq!(
        result.blocked.get(&format!("{}/limited", base)).map(String::as_str),
        Some("HTTP 429 (Access Denied/Rate Limited)")
    );
}

#[tokio::test]
async fn test_challenge_page_is_blocked_but_followed() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        html_page(
            r#"<html><head><title>Just a moment...</title></head><body>
            <p>Enable JavaScript and cookies to continue</p>
            <a href="/inner">inner</a>
            </body></html>"#
                .to_string(),
        ),
        1,
    )
    .await;
    mount_page(
        &site,
        "/inner",
        html_page("<body>rust</body>".to_string()),
        1,
    )
    .await;

    let result = Crawler::new(create_test_config(&format!("{}/", base), "rust"))
        .unwrap()
        .run()
        .await;

    assert_eq!(result.visited_count, 2);
    assert_eq!(result.error_count(ErrorKind::Blocked), 1);
    assert_eq!(
        result.blocked.get(&format!("{}/", base)).map(String::as_str),
        Some("Cloudflare/Bot protection challenge")
    );
    assert_eq!(result.matches.get(&format!("{}/inner", base)), Some(&1));
}

/// Pretends every PDF contains the keyword twice
struct StubPdfExtractor;

impl DocumentExtractor for StubPdfExtractor {
    fn extract(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        resource_name: &str,
    ) -> Result<String, ExtractError> {
        if content_type.map_or(false, |ct| ct.starts_with("application/pdf")) {
            Ok("rust inside a pdf, and rust again".to_string())
        } else {
            BuiltinExtractor.extract(body, content_type, resource_name)
        }
    }
}

#[tokio::test]
async fn test_documents_are_dispatched_by_content_type() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        html_page(
            r#"<body>
            <a href="/report.pdf">report</a>
            <a href="/notes.txt">notes</a>
            <a href="/picture">picture</a>
            <a href="/style.css">style</a>
            </body>"#
                .to_string(),
        ),
        1,
    )
    .await;
    mount_page(
        &site,
        "/report.pdf",
        ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 fake".to_vec(), "application/pdf"),
        1,
    )
    .await;
    mount_page(
        &site,
        "/notes.txt",
        ResponseTemplate::new(200).set_body_raw("Rust notes", "text/plain"),
        1,
    )
    .await;
    mount_page(
        &site,
        "/picture",
        ResponseTemplate::new(200).set_body_raw(b"rust".to_vec(), "image/png"),
        1,
    )
    .await;
    mount_page(&site, "/style.css", ResponseTemplate::new(200), 0).await;

    let config = create_test_config(&base, "rust");
    let result = Crawler::with_extractor(config, Arc::new(StubPdfExtractor))
        .unwrap()
        .run()
        .await;

    assert_eq!(result.visited_count, 4);
    assert_eq!(result.parsed_count, 3);
    assert_eq!(result.error_count(ErrorKind::SkippedType), 1);
    assert_eq!(result.matches.get(&format!("{}/report.pdf", base)), Some(&2));
    assert_eq!(result.matches.get(&format!("{}/notes.txt", base)), Some(&1));
    assert!(!result.matches.contains_key(&format!("{}/picture", base)));
}

#[tokio::test]
async fn test_match_modes_on_live_page() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        html_page("<body>Café cafe CAFE</body>".to_string()),
        3,
    )
    .await;

    let mut counts = Vec::new();
    for mode in [MatchMode::Exact, MatchMode::Default, MatchMode::Fuzzy] {
        let mut config = create_test_config(&site.uri(), "cafe");
        config.crawler.mode = mode;
        counts.push(Crawler::new(config).unwrap().run().await.total_matches());
    }

    // exact: literal only; default: case-insensitive; fuzzy: folded
    assert_eq!(counts, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_concurrent_crawl_matches_sequential() {
    let site = MockServer::start().await;

    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/p{}">page {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(format!("<body>rust {}</body>", links)))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page("<body>rust and more rust</body>".to_string()))
        .mount(&site)
        .await;

    let mut sequential = create_test_config(&site.uri(), "rust");
    sequential.crawler.concurrency = 1;
    let mut concurrent = sequential.clone();
    concurrent.crawler.concurrency = 4;

    let a = Crawler::new(sequential).unwrap().run().await;
    let b = Crawler::new(concurrent).unwrap().run().await;

    assert_eq!(a.visited_count, 9);
    assert_eq!(a.visited_count, b.visited_count);
    assert_eq!(a.matches, b.matches);
    assert_eq!(a.total_matches(), 17);
}

#[tokio::test]
async fn test_politeness_delay_spaces_requests() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        html_page(r#"<body><a href="/a">a</a><a href="/b">b</a></body>"#.to_string()),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(html_page(String::new()))
        .mount(&site)
        .await;

    let mut config = create_test_config(&site.uri(), "rust");
    config.crawler.delay_ms = 150;
    config.crawler.concurrency = 3;

    let started = std::time::Instant::now();
    let result = Crawler::new(config).unwrap().run().await;

    assert_eq!(result.visited_count, 3);
    // three requests to one host need at least two full delays
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_cancellation_returns_partial_result() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        html_page("<body>rust</body>".to_string()).set_delay(Duration::from_secs(30)),
        1,
    )
    .await;

    let crawler = Crawler::new(create_test_config(&site.uri(), "rust")).unwrap();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        crawler.run_until(tokio::time::sleep(Duration::from_millis(200))),
    )
    .await
    .expect("cancelled crawl should return promptly");

    assert!(result.interrupted);
    assert_eq!(result.visited_count, 1);
    assert_eq!(result.parsed_count, 0);
    assert!(result.finished_at.is_some());
}

#[tokio::test]
async fn test_unreachable_seed_is_a_network_error() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = Crawler::new(create_test_config(&uri, "rust"))
        .unwrap()
        .run()
        .await;

    assert_eq!(result.visited_count, 1);
    assert_eq!(result.error_count(ErrorKind::NetworkError), 1);
}

#[test]
fn test_hostless_seed_is_rejected() {
    let result = Crawler::new(create_test_config("http://", "rust"));
    assert!(matches!(result, Err(WebgrepError::InvalidSeed { .. })));
}
