//! Gateway error types
//!
//! Every router-level failure is one of these. Each maps to an HTTP
//! status and a JSON-RPC error code so it can be rendered without
//! escaping the handler.

use crate::mcp::protocol::{
    INTERNAL_ERROR, INVALID_REQUEST, JSONRPC_VERSION, PARSE_ERROR, SERVER_ERROR,
};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Bad Request: No valid session ID provided")]
    NoSessionId,

    #[error("Invalid or missing session ID")]
    UnknownSession,

    #[error("Bad Request: Server already initialized")]
    AlreadyInitialized,

    #[error("Invalid Request: Only one initialization request is allowed")]
    BatchInitialize,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid Request: {0}")]
    InvalidMessage(String),

    #[error("Failed to bind session: {0}")]
    BindingFailed(String),

    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("Service Unavailable: session limit of {0} reached")]
    CapacityExhausted(usize),

    #[error("Service Unavailable: server is shutting down")]
    ShuttingDown,

    #[error("Conflict: a push channel is already open for this session")]
    PushChannelBusy,

    #[error("Session closed")]
    SessionClosed,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NoSessionId
            | GatewayError::UnknownSession
            | GatewayError::AlreadyInitialized
            | GatewayError::BatchInitialize
            | GatewayError::ParseError(_)
            | GatewayError::InvalidMessage(_)
            | GatewayError::SessionClosed => StatusCode::BAD_REQUEST,
            GatewayError::BindingFailed(_) | GatewayError::HandshakeFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::CapacityExhausted(_) | GatewayError::ShuttingDown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::PushChannelBusy => StatusCode::CONFLICT,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            GatewayError::ParseError(_) => PARSE_ERROR,
            GatewayError::BatchInitialize | GatewayError::InvalidMessage(_) => INVALID_REQUEST,
            GatewayError::BindingFailed(_) | GatewayError::HandshakeFailed(_) => INTERNAL_ERROR,
            _ => SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal failures are not detailed.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::BindingFailed(_) | GatewayError::HandshakeFailed(_) => {
                "Internal server error".to_string()
            }
            // A session closed under a request looks the same as one
            // that never existed.
            GatewayError::SessionClosed => GatewayError::UnknownSession.to_string(),
            other => other.to_string(),
        }
    }

    /// Plain-text rendering used by the push-channel and termination
    /// endpoints
    pub fn into_plain_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.client_message(),
        )
            .into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "jsonrpc": JSONRPC_VERSION,
            "error": {
                "code": self.code(),
                "message": self.client_message(),
            },
            "id": null,
        }));

        (self.status(), body).into_response()
    }
}
