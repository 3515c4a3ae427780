//! CORS and routing tests

use crate::common::{echo_registry, gateway_app, send};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use std::sync::Arc;
use websift::core::config::GatewayConfig;
use websift::gateway::{McpEngineFactory, SESSION_HEADER};

fn app() -> axum::Router {
    let (app, _lifecycle) = gateway_app(
        GatewayConfig::default(),
        Arc::new(McpEngineFactory::new(echo_registry())),
    );
    app
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/gateway")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, SESSION_HEADER)
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(&app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_cors_exposes_session_headers() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = send(&app(), request).await;

    let exposed = headers
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .expect("Missing expose header")
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("mcp-session-id"));
    assert!(exposed.contains("session-id"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/nope")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_method_on_gateway() {
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/gateway")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
