//! Integration tests for the fetcher
//!
//! These tests use wiremock to check status classification, the retry
//! schedule and batch ordering against a real HTTP server.

mod common;

use common::fast_fetcher;
use kb_mirror::fetcher::{retry_delay, FetchError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_one_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<h1>Intro</h1>")
                .insert_header("x-doc-version", "7"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/docs/intro", server.uri());
    let result = fast_fetcher(3).fetch_one(&url).await.unwrap();

    assert_eq!(result.url, url);
    assert_eq!(result.status_code, 200);
    assert_eq!(result.html, "<h1>Intro</h1>");
    assert_eq!(result.headers.get("x-doc-version").map(String::as_str), Some("7"));
}

#[tokio::test]
async fn test_not_found_is_tried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/docs/missing", server.uri());
    let error = fast_fetcher(3).fetch_with_retry(&url, 3).await.unwrap_err();

    assert_eq!(error.status_code(), Some(404));
    assert!(error.is_permanent());
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let url = format!("{}/docs/flaky", server.uri());
    let error = fast_fetcher(3).fetch_with_retry(&url, 3).await.unwrap_err();

    assert_eq!(error.status_code(), Some(500));
}

#[tokio::test]
async fn test_recovers_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/docs/busy", server.uri());
    let result = fast_fetcher(3).fetch_with_retry(&url, 3).await.unwrap();

    assert_eq!(result.html, "ok");
}

#[tokio::test]
async fn test_retry_after_header_sets_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/slow-down"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .mount(&server)
        .await;

    let fetcher = fast_fetcher(3);
    let url = format!("{}/docs/slow-down", server.uri());
    let error = fetcher.fetch_one(&url).await.unwrap_err();

    match &error {
        FetchError::Http { retry_after, .. } => {
            assert_eq!(*retry_after, Some(Duration::from_secs(5)));
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
    assert!(error.is_rate_limited());
    assert_eq!(
        retry_delay(fetcher.policy(), &error, 0),
        Some(Duration::from_millis(5000))
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Port 1 is never served in the test environment
    let error = fast_fetcher(0)
        .fetch_one("http://127.0.0.1:1/docs")
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Network { .. }));
    assert_eq!(error.status_code(), None);
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let server = MockServer::start().await;
    for page in ["a", "b", "d", "e"] {
        Mock::given(method("GET"))
            .and(path(format!("/docs/{}", page)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("page {}", page)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/docs/c"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let urls: Vec<String> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|page| format!("{}/docs/{}", server.uri(), page))
        .collect();

    let results = fast_fetcher(2).fetch_batch(&urls, 2).await;

    assert_eq!(results.len(), urls.len());
    for (result, url) in results.iter().zip(&urls) {
        match result {
            Ok(page) => assert_eq!(&page.url, url),
            Err(failure) => assert_eq!(&failure.url, url),
        }
    }

    assert_eq!(results[0].as_ref().unwrap().html, "page a");
    assert_eq!(results[4].as_ref().unwrap().html, "page e");

    let failure = results[2].as_ref().unwrap_err();
    assert_eq!(failure.retry_count, 0);
    assert!(failure.error.contains("404"));
}

#[tokio::test]
async fn test_batch_counts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let urls = vec![format!("{}/docs/down", server.uri())];
    let results = fast_fetcher(2).fetch_batch(&urls, 8).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].as_ref().unwrap_err().retry_count, 2);
}

#[tokio::test]
async fn test_empty_batch() {
    let results = fast_fetcher(1).fetch_batch(&[], 4).await;
    assert!(results.is_empty());
}
