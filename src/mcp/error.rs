//! MCP-specific error types

use crate::mcp::protocol::{
    JsonRpcError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, NOT_CONFIGURED,
    PARSE_ERROR, UPSTREAM_ERROR,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Tool error (code {0}): {1}")]
    ToolError(i32, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) | McpError::Io(_) | McpError::Json(_) => INTERNAL_ERROR,
            McpError::ToolError(code, _) => *code,
        }
    }

    /// Message shown to the client, without the variant prefix
    pub fn message(&self) -> String {
        match self {
            McpError::ParseError(msg)
            | McpError::InvalidRequest(msg)
            | McpError::MethodNotFound(msg)
            | McpError::InvalidParams(msg)
            | McpError::InternalError(msg)
            | McpError::ToolError(_, msg) => msg.clone(),
            McpError::Io(e) => format!("I/O error: {e}"),
            McpError::Json(e) => format!("JSON error: {e}"),
        }
    }

    pub fn to_rpc_error(&self) -> JsonRpcError {
        JsonRpcError::new(self.code(), self.message())
    }
}

impl From<crate::core::error::WebsiftError> for McpError {
    fn from(err: crate::core::error::WebsiftError) -> Self {
        use crate::core::error::WebsiftError;
        match err {
            WebsiftError::InvalidArgument(s) => McpError::InvalidParams(s),
            WebsiftError::NotConfigured(s) => {
                McpError::ToolError(NOT_CONFIGURED, format!("Not configured: {s}"))
            }
            WebsiftError::Upstream { status, message } => McpError::ToolError(
                UPSTREAM_ERROR,
                format!("Upstream service returned HTTP {status}: {message}"),
            ),
            WebsiftError::Unsupported(s) => McpError::ToolError(UPSTREAM_ERROR, s),
            WebsiftError::TooLarge { size, limit } => McpError::ToolError(
                UPSTREAM_ERROR,
                format!("Response too large: {size} bytes exceeds limit of {limit} bytes"),
            ),
            WebsiftError::Http(e) => {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                McpError::ToolError(UPSTREAM_ERROR, format!("HTTP request failed: {reason}"))
            }
            WebsiftError::ConfigError(s) => {
                McpError::InvalidParams(format!("Configuration error: {s}"))
            }
            WebsiftError::IoError(e) => McpError::InternalError(format!("I/O error: {e}")),
            WebsiftError::SerdeError(e) => {
                McpError::InternalError(format!("Serialization error: {e}"))
            }
            WebsiftError::TomlError(e) => {
                McpError::InternalError(format!("Configuration parse error: {e}"))
            }
        }
    }
}
