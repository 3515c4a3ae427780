//! Handshake tests: POST /gateway without a session header

use crate::common::{
    body_json, echo_registry, gateway_app, initialize_body, post, raw_post, send, session_id_of,
    FailingFactory, RejectingFactory, SpyFactory,
};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use websift::core::config::GatewayConfig;
use websift::gateway::{McpEngineFactory, SessionId, SessionState, SESSION_HEADER_ALIAS};

#[tokio::test]
async fn test_initialize_creates_session() {
    let factory = Arc::new(McpEngineFactory::new(echo_registry()));
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), factory);

    let (status, headers, body) = send(&app, post(&initialize_body(1), None)).await;

    assert_eq!(status, StatusCode::OK);
    let id = session_id_of(&headers);
    assert!(!id.is_empty());
    assert_eq!(
        headers.get(SESSION_HEADER_ALIAS).unwrap().to_str().unwrap(),
        id
    );

    let response = body_json(&body);
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "websift-mcp");
    assert_eq!(response["result"]["protocolVersion"], "2025-03-26");

    let info = lifecycle
        .session_info(&SessionId::parse(&id).unwrap())
        .expect("session registered");
    assert_eq!(info.state, SessionState::Active);
    assert_eq!(lifecycle.session_count(), 1);
}

#[tokio::test]
async fn test_ordinary_request_without_session_rejected() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"});
    let (status, headers, body) = send(&app, post(&body, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers.get("mcp-session-id").is_none());
    let error = body_json(&body);
    assert_eq!(error["error"]["code"], -32000);
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("No valid session ID provided"));

    assert_eq!(lifecycle.session_count(), 0);
    assert_eq!(spy.created(), 0);
    assert_eq!(spy.requests(), 0);
}

#[tokio::test]
async fn test_notification_without_session_rejected() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let body = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let (status, _, _) = send(&app, post(&body, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(lifecycle.session_count(), 0);
    assert_eq!(spy.notifications(), 0);
}

#[tokio::test]
async fn test_bare_initialize_shape_opens_session() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let (status, headers, _) = send(&app, post(&json!({"type": "initialize"}), None)).await;

    assert_eq!(status, StatusCode::OK);
    let id = session_id_of(&headers);
    assert_eq!(headers.get("session-id").unwrap(), id.as_str());
    assert_eq!(lifecycle.session_count(), 1);
    assert_eq!(spy.created(), 1);

    // The new session serves ordinary requests
    let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
    let (status, _, body) = send(&app, post(&ping, Some(&id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["id"], 2);

    // A second bare handshake gets a different id
    let (status, headers, _) = send(&app, post(&json!({"type": "initialize"}), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(session_id_of(&headers), id);
}

#[tokio::test]
async fn test_bare_initialize_through_mcp_engine() {
    let (app, _lifecycle) = gateway_app(
        GatewayConfig::default(),
        Arc::new(McpEngineFactory::new(echo_registry())),
    );

    let (status, _, body) = send(&app, post(&json!({"type": "initialize"}), None)).await;

    assert_eq!(status, StatusCode::OK);
    let response = body_json(&body);
    assert_eq!(response["id"], 0);
    assert_eq!(response["result"]["serverInfo"]["name"], "websift-mcp");
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let (status, _, body) = send(&app, raw_post("{not json".to_string(), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body_json(&body);
    assert_eq!(error["error"]["code"], -32700);
    assert_eq!(error["jsonrpc"], "2.0");
    assert!(error["id"].is_null());
    assert_eq!(lifecycle.session_count(), 0);
}

#[tokio::test]
async fn test_batch_with_initialize_and_other_messages_rejected() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let batch = json!([
        initialize_body(1),
        {"jsonrpc": "2.0", "id": 2, "method": "tools/list"}
    ]);
    let (status, _, body) = send(&app, post(&batch, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body_json(&body);
    assert_eq!(error["error"]["code"], -32600);
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Only one initialization request is allowed"));
    assert_eq!(lifecycle.session_count(), 0);
    assert_eq!(spy.created(), 0);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let spy = Arc::new(SpyFactory::default());
    let (app, _lifecycle) = gateway_app(GatewayConfig::default(), spy);

    let (status, _, body) = send(&app, post(&json!([]), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&body)["error"]["code"], -32600);
}

#[tokio::test]
async fn test_initialize_with_known_session_is_already_initialized() {
    let factory = Arc::new(McpEngineFactory::new(echo_registry()));
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), factory);

    let (_, headers, _) = send(&app, post(&initialize_body(1), None)).await;
    let id = session_id_of(&headers);

    let (status, _, body) = send(&app, post(&initialize_body(2), Some(&id))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body_json(&body);
    assert_eq!(error["error"]["code"], -32000);
    assert_eq!(
        error["error"]["message"],
        "Bad Request: Server already initialized"
    );
    // The original session is untouched
    assert_eq!(lifecycle.session_count(), 1);
    assert!(lifecycle.lookup(&SessionId::parse(&id).unwrap()).is_some());
}

#[tokio::test]
async fn test_initialize_with_unknown_session_rejected() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let (status, _, body) = send(&app, post(&initialize_body(1), Some("does-not-exist"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(&body)["error"]["message"],
        "Invalid or missing session ID"
    );
    assert_eq!(lifecycle.session_count(), 0);
    assert_eq!(spy.created(), 0);
}

#[tokio::test]
async fn test_engine_creation_failure_rolls_back() {
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), Arc::new(FailingFactory));

    let (status, headers, body) = send(&app, post(&initialize_body(1), None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.get("mcp-session-id").is_none());
    let error = body_json(&body);
    assert_eq!(error["error"]["code"], -32603);
    assert_eq!(error["error"]["message"], "Internal server error");
    assert_eq!(lifecycle.session_count(), 0);
    assert_eq!(lifecycle.sessions_issued(), 1);
}

#[tokio::test]
async fn test_engine_rejecting_initialize_rolls_back() {
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), Arc::new(RejectingFactory));

    let (status, _, body) = send(&app, post(&initialize_body(1), None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(&body)["error"]["message"], "Internal server error");
    assert_eq!(lifecycle.session_count(), 0);
}

#[tokio::test]
async fn test_invalid_initialize_params_rejected_before_session_creation() {
    let spy = Arc::new(SpyFactory::default());
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), spy.clone());

    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"bogus": true}});
    let (status, _, _) = send(&app, post(&body, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(lifecycle.session_count(), 0);
    assert_eq!(spy.created(), 0);
}

#[tokio::test]
async fn test_capacity_exhausted() {
    let config = GatewayConfig {
        max_sessions: 2,
        ..GatewayConfig::default()
    };
    let (app, lifecycle) = gateway_app(config, Arc::new(SpyFactory::default()));

    for id in 1..=2 {
        let (status, _, _) = send(&app, post(&initialize_body(id), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _, body) = send(&app, post(&initialize_body(3), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(&body)["error"]["code"], -32000);
    assert_eq!(lifecycle.session_count(), 2);
}

#[tokio::test]
async fn test_handshake_refused_after_shutdown() {
    let (app, lifecycle) = gateway_app(GatewayConfig::default(), Arc::new(SpyFactory::default()));
    lifecycle.shutdown();
    assert!(lifecycle.is_shutting_down());

    let (status, _, body) = send(&app, post(&initialize_body(1), None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(&body)["error"]["code"], -32000);
    assert_eq!(lifecycle.session_count(), 0);
}
