//! HTTP handlers shared by every HTTP surface

use axum::{response::IntoResponse, Json};

use crate::core::types::HealthResponse;
use crate::mcp::protocol::SERVER_NAME;

/// Health check handler
///
/// Returns static status, server identity and version. Does not touch
/// any session state.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        server: SERVER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
