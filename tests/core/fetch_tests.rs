//! Content fetcher tests against a wiremock site

use crate::common::{test_config, ARTICLE_HTML};
use websift::core::fetch::ContentFetcher;
use websift::WebsiftError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> ContentFetcher {
    ContentFetcher::new(&test_config(None).fetch).unwrap()
}

#[tokio::test]
async fn test_fetch_html_article() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/async"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/blog/async", server.uri());
    let page = fetcher().fetch(&url).await.unwrap();

    assert_eq!(page.url, url);
    assert_eq!(page.title.as_deref(), Some("Async Rust Guide"));
    assert_eq!(page.content_type, "text/html; charset=utf-8");

    let md = &page.markdown;
    assert!(md.starts_with("# Async Rust"));
    assert!(md.contains("Futures are **lazy**."));
    assert!(md.contains(&format!("[the docs]({}/docs/futures)", server.uri())));
    assert!(md.contains("- Poll-based\n- Zero-cost"));
    assert!(md.contains("```rust\nasync fn run() {}\n```"));

    // Page chrome is stripped
    assert!(!md.contains("tracking"));
    assert!(!md.contains("color: red"));
    assert!(!md.contains("Home"));
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let server = MockServer::start().await;
    let mut config = test_config(None);
    config.fetch.user_agent = "websift-test/1.0".to_string();

    Mock::given(method("GET"))
        .and(header("user-agent", "websift-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ContentFetcher::new(&config.fetch).unwrap();
    let page = fetcher.fetch(&server.uri()).await.unwrap();
    assert_eq!(page.markdown, "ok");
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><p>Moved here</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.url, format!("{}/new", server.uri()));
    assert_eq!(page.markdown, "Moved here");
}

#[tokio::test]
async fn test_fetch_plain_text_and_json() {
    let server = MockServer::start().await;
    Mock::given(path("/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("  line one\nline two \n", "text/plain"))
        .mount(&server)
        .await;
    Mock::given(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":[1,2]}"#, "application/json"))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let text = fetcher
        .fetch(&format!("{}/notes.txt", server.uri()))
        .await
        .unwrap();
    assert_eq!(text.markdown, "line one\nline two");

    let data = fetcher
        .fetch(&format!("{}/data.json", server.uri()))
        .await
        .unwrap();
    assert!(data.markdown.starts_with("```json\n{"));
    assert!(data.markdown.ends_with("}\n```"));
}

#[tokio::test]
async fn test_fetch_binary_is_unsupported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2, 3], "image/png"))
        .mount(&server)
        .await;

    let err = fetcher().fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, WebsiftError::Unsupported(_)));
}

#[tokio::test]
async fn test_fetch_not_found_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher().fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, WebsiftError::Upstream { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(4096), "text/plain"))
        .mount(&server)
        .await;

    let mut config = test_config(None);
    config.fetch.max_bytes = 1024;
    let fetcher = ContentFetcher::new(&config.fetch).unwrap();

    let err = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(
        err,
        WebsiftError::TooLarge { limit: 1024, .. }
    ));
}

#[tokio::test]
async fn test_fetch_rejects_non_http_urls() {
    let fetcher = fetcher();
    for url in ["file:///etc/passwd", "ftp://example.com/a", "not a url", "  "] {
        let err = fetcher.fetch(url).await.unwrap_err();
        assert!(
            matches!(err, WebsiftError::InvalidArgument(_)),
            "{url} should be rejected"
        );
    }
}
