//! MCP handler tests with the real tool registry

use crate::common::{create_test_services, search_payload, test_config};
use serde_json::{json, Value};
use std::sync::Arc;
use websift::mcp::handlers::ProtocolHandlers;
use websift::mcp::protocol::*;
use websift::mcp::{default_registry, Outbox, OutboxReceiver};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_handlers(search_base: Option<&str>) -> (ProtocolHandlers, OutboxReceiver) {
    let services = create_test_services(test_config(search_base));
    let (outbox, receiver) = Outbox::channel();
    let handlers = ProtocolHandlers::new(Arc::new(default_registry(services)), outbox);
    (handlers, receiver)
}

fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(id)),
        method: method.to_string(),
        params,
    }
}

fn drain(receiver: &mut OutboxReceiver) -> Vec<JsonRpcNotification> {
    let mut out = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        out.push(notification);
    }
    out
}

#[tokio::test]
async fn test_initialize_handler() {
    let (handlers, _rx) = create_test_handlers(None);

    let response = handlers
        .handle_request(request(
            1,
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "clientInfo": {"name": "test", "version": "1.0"}
            })),
        ))
        .await;

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "websift-mcp");
    assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["logging"].is_object());
}

#[tokio::test]
async fn test_initialize_missing_client_info() {
    let (handlers, _rx) = create_test_handlers(None);

    let response = handlers
        .handle_request(request(
            1,
            "initialize",
            Some(json!({"protocolVersion": "2025-03-26"})),
        ))
        .await;

    assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
}

#[tokio::test]
async fn test_initialized_notification_variants() {
    for method in ["notifications/initialized", "initialized"] {
        let (handlers, _rx) = create_test_handlers(None);
        assert!(!handlers.is_initialized());

        handlers
            .handle_notification(JsonRpcNotification::new(method, None))
            .await;
        assert!(handlers.is_initialized(), "{method} should initialize");
    }
}

#[tokio::test]
async fn test_tools_list_has_three_tools_sorted() {
    let (handlers, _rx) = create_test_handlers(None);

    let response = handlers.handle_request(request(2, "tools/list", None)).await;

    let result = response.result.unwrap();
    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["fetch_markdown", "get_server_info", "web_search"]);

    for tool in result["tools"].as_array().unwrap() {
        assert!(!tool["description"].as_str().unwrap().is_empty());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
}

#[tokio::test]
async fn test_ping() {
    let (handlers, _rx) = create_test_handlers(None);
    let response = handlers.handle_request(request(3, "ping", None)).await;
    assert_eq!(response.result.unwrap(), json!({}));
}

#[tokio::test]
async fn test_unknown_method_and_tool() {
    let (handlers, _rx) = create_test_handlers(None);

    let response = handlers
        .handle_request(request(4, "resources/list", None))
        .await;
    assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);

    let response = handlers
        .handle_request(request(
            5,
            "tools/call",
            Some(json!({"name": "search_code", "arguments": {}})),
        ))
        .await;
    let error = response.error.unwrap();
    assert_eq!(error.code, INVALID_PARAMS);
    assert!(error.message.contains("search_code"));
}

#[tokio::test]
async fn test_web_search_tool_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_payload(2)))
        .mount(&server)
        .await;
    let (handlers, mut rx) = create_test_handlers(Some(&server.uri()));

    let response = handlers
        .handle_request(request(
            6,
            "tools/call",
            Some(json!({"name": "web_search", "arguments": {"query": "rust", "count": 2}})),
        ))
        .await;

    let result = response.result.unwrap();
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Found 2 results for 'rust'"));
    assert!(text.contains("## 1. Result 1"));
    assert!(text.contains("**URL:** https://example.com/2"));
    assert!(result.get("isError").is_none());

    // No progress token: log messages only
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 2);
    assert!(notifications
        .iter()
        .all(|n| n.method == "notifications/message"));
}

#[tokio::test]
async fn test_web_search_without_key_reports_not_configured() {
    let (handlers, mut rx) = create_test_handlers(None);

    let response = handlers
        .handle_request(request(
            7,
            "tools/call",
            Some(json!({"name": "web_search", "arguments": {"query": "rust"}})),
        ))
        .await;

    let error = response.error.unwrap();
    assert_eq!(error.code, NOT_CONFIGURED);

    let notifications = drain(&mut rx);
    let failed = notifications.last().unwrap();
    assert_eq!(failed.params.as_ref().unwrap()["level"], "error");
    assert_eq!(failed.params.as_ref().unwrap()["data"]["event"], "failed");
}

#[tokio::test]
async fn test_upstream_failure_maps_to_upstream_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let (handlers, _rx) = create_test_handlers(Some(&server.uri()));

    let response = handlers
        .handle_request(request(
            8,
            "tools/call",
            Some(json!({"name": "web_search", "arguments": {"query": "rust"}})),
        ))
        .await;

    let error = response.error.unwrap();
    assert_eq!(error.code, UPSTREAM_ERROR);
    assert!(error.message.contains("503"));
}

#[tokio::test]
async fn test_set_level_error_silences_info_logs() {
    let (handlers, mut rx) = create_test_handlers(None);

    let response = handlers
        .handle_request(request(9, "logging/setLevel", Some(json!({"level": "error"}))))
        .await;
    assert!(response.error.is_none());
    assert_eq!(handlers.log_level(), LogLevel::Error);

    handlers
        .handle_request(request(
            10,
            "tools/call",
            Some(json!({"name": "get_server_info", "arguments": {}})),
        ))
        .await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_progress_token_echoed() {
    let (handlers, mut rx) = create_test_handlers(None);

    handlers
        .handle_request(request(
            11,
            "tools/call",
            Some(json!({
                "name": "get_server_info",
                "arguments": {},
                "_meta": {"progressToken": "abc"}
            })),
        ))
        .await;

    let progress: Vec<JsonRpcNotification> = drain(&mut rx)
        .into_iter()
        .filter(|n| n.method == "notifications/progress")
        .collect();
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].params.as_ref().unwrap()["progressToken"], "abc");
    assert_eq!(progress[0].params.as_ref().unwrap()["progress"], 0);
    assert_eq!(progress[1].params.as_ref().unwrap()["progress"], 1);
}
