// Test helper functions

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use websift::core::config::{Config, GatewayConfig};
use websift::core::services::Services;
use websift::gateway::{build_router, EngineFactory, LifecycleManager, SESSION_HEADER};
use websift::mcp::ToolRegistry;

use super::fixtures::EchoTool;

/// Default configuration with the search endpoint pointed at `search_base`
/// (a wiremock server) and a key set
#[allow(dead_code)] // Used in integration tests
pub fn test_config(search_base: Option<&str>) -> Config {
    let mut config = Config::default();
    if let Some(base) = search_base {
        config.search.endpoint = format!("{base}/res/v1/web/search");
        config.search.api_key = Some("test-key".to_string());
    }
    config.search.timeout_sec = 5;
    config.fetch.timeout_sec = 5;
    config
}

/// Services built from `config`, wrapped in Arc (matching tool and CLI signatures)
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services(config: Config) -> Arc<Services> {
    Arc::new(Services::new(config).expect("Failed to create services"))
}

/// Registry holding only the echo tool, so tests never touch the network
#[allow(dead_code)] // Used in integration tests
pub fn echo_registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(EchoTool));
    Arc::new(registry)
}

/// Gateway router plus its lifecycle manager. Must run inside a Tokio runtime.
#[allow(dead_code)] // Used in integration tests
pub fn gateway_app(
    config: GatewayConfig,
    factory: Arc<dyn EngineFactory>,
) -> (Router, Arc<LifecycleManager>) {
    let lifecycle = LifecycleManager::start(config, factory);
    (build_router(Arc::clone(&lifecycle)), lifecycle)
}

/// JSON-RPC `initialize` request body
#[allow(dead_code)] // Used in integration tests
pub fn initialize_body(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "websift-tests", "version": "1.0"}
        }
    })
}

/// `POST /gateway` with a JSON body and optional session header
#[allow(dead_code)] // Used in integration tests
pub fn post(body: &Value, session: Option<&str>) -> Request<Body> {
    raw_post(body.to_string(), session)
}

/// `POST /gateway` with a raw body
#[allow(dead_code)] // Used in integration tests
pub fn raw_post(body: String, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/gateway")
        .header("content-type", "application/json");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::from(body)).unwrap()
}

/// `GET /gateway`
#[allow(dead_code)] // Used in integration tests
pub fn open_push(session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri("/gateway")
        .header("accept", "text/event-stream");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::empty()).unwrap()
}

/// `DELETE /gateway`
#[allow(dead_code)] // Used in integration tests
pub fn delete(session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::DELETE).uri("/gateway");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::empty()).unwrap()
}

/// Run one request through the router and collect the whole body
#[allow(dead_code)] // Used in integration tests
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[allow(dead_code)] // Used in integration tests
pub fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("Body is not JSON")
}

#[allow(dead_code)] // Used in integration tests
pub fn body_text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
}

/// Session id returned on a handshake response
#[allow(dead_code)] // Used in integration tests
pub fn session_id_of(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .expect("Missing session header")
        .to_str()
        .unwrap()
        .to_string()
}
