//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with browser-like headers and TLS settings
//! - Following redirects up to a configured limit
//! - Enforcing the per-page byte budget, both on the declared
//!   `Content-Length` and while streaming the body
//! - Error classification

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value, if the server sent one
        content_type: Option<String>,
        /// Raw body bytes, never longer than the byte budget
        body: Vec<u8>,
    },

    /// Declared or streamed body exceeded the byte budget
    TooLarge {
        /// Declared `Content-Length`, if the server sent one
        declared: Option<u64>,
        /// The byte budget that was exceeded
        limit: u64,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, redirect loop, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - Header, redirect and TLS settings
/// * `timeout_ms` - Whole-request timeout in milliseconds; `0` disables it
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use webgrep::config::HttpConfig;
/// use webgrep::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default(), 20_000).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout_ms: u64) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(accept) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, accept);
    }
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true);

    if timeout_ms > 0 {
        let timeout = Duration::from_millis(timeout_ms);
        builder = builder.timeout(timeout).connect_timeout(timeout);
    }

    if config.insecure_tls {
        tracing::warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build()
}

/// Fetches a URL, reading at most `max_bytes` of its body
///
/// # Request Flow
///
/// 1. Send GET request (redirects are followed by the client)
/// 2. Non-success status → `HttpError`
/// 3. Declared `Content-Length` above the budget → `TooLarge` without
///    reading the body
/// 4. Stream the body chunk by chunk, stopping with `TooLarge` as soon as
///    the budget is crossed
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_bytes` - Byte budget for the body
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str, max_bytes: u64) -> FetchResult {
    let mut response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let declared = response.content_length();
    if let Some(length) = declared {
        if length > max_bytes {
            return FetchResult::TooLarge {
                declared,
                limit: max_bytes,
            };
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if body.len() as u64 + chunk.len() as u64 > max_bytes {
                    return FetchResult::TooLarge {
                        declared,
                        limit: max_bytes,
                    };
                }
                body.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => return classify_error(&e),
        }
    }

    FetchResult::Success {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else if e.is_body() || e.is_decode() {
        format!("Failed to read body: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    async fn gzip_server(decoded: &[u8]) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-encoding", "gzip")
                    .set_body_raw(gzip(decoded), "text/html"),
            )
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default(), 20_000);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_without_timeout() {
        let config = HttpConfig {
            insecure_tls: true,
            ..HttpConfig::default()
        };
        assert!(build_http_client(&config, 0).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success_sends_configured_headers() {
        let server = MockServer::start().await;
        let config = HttpConfig::default();
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", config.user_agent.as_str()))
            .and(header("accept-language", config.accept_language.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&config, 5_000).unwrap();
        let url = format!("{}/page", server.uri());

        match fetch_url(&client, &url, 1024).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                assert_eq!(final_url, url);
                assert_eq!(status_code, 200);
                assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
                assert_eq!(body, b"<html><body>hi</body></html>");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let client = build_http_client(&HttpConfig::default(), 5_000).unwrap();
        match fetch_url(&client, &format!("{}/old", server.uri()), 1024).await {
            FetchResult::Success { final_url, .. } => {
                assert_eq!(final_url, format!("{}/new", server.uri()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_body_over_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; 2048]))
            .mount(&server)
            .await;

        let client = build_http_client(&HttpConfig::default(), 5_000).unwrap();
        match fetch_url(&client, &server.uri(), 1024).await {
            FetchResult::TooLarge { limit, .. } => assert_eq!(limit, 1024),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_streamed_body_over_budget() {
        // decompression drops Content-Length, so only the streamed count applies
        let server = gzip_server(&[b'a'; 4096]).await;

        let client = build_http_client(&HttpConfig::default(), 5_000).unwrap();
        match fetch_url(&client, &server.uri(), 1024).await {
            FetchResult::TooLarge { declared, limit } => {
                assert_eq!(declared, None);
                assert_eq!(limit, 1024);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_streamed_body_within_budget() {
        let server = gzip_server(&[b'a'; 4096]).await;

        let client = build_http_client(&HttpConfig::default(), 5_000).unwrap();
        match fetch_url(&client, &server.uri(), 8192).await {
            FetchResult::Success { body, .. } => assert_eq!(body.len(), 4096),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client(&HttpConfig::default(), 5_000).unwrap();
        match fetch_url(&client, &server.uri(), 1024).await {
            FetchResult::HttpError { status_code } => assert_eq!(status_code, 404),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let server = MockServer::start().await;
        let url = server.uri();
        drop(server);

        let client = build_http_client(&HttpConfig::default(), 2_000).unwrap();
        match fetch_url(&client, &url, 1024).await {
            FetchResult::NetworkError { error } => assert!(!error.is_empty()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
