//! Error types and error handling for the Websift service.
//!
//! This module defines the error types used by the protocol-agnostic
//! core (configuration, search client, content fetcher). Protocol-specific
//! error handling (JSON-RPC codes, HTTP statuses) lives in the respective
//! adapter modules.

use thiserror::Error;

/// Result type alias for Websift operations
pub type Result<T> = std::result::Result<T, WebsiftError>;

/// Main error type for the Websift service
#[derive(Error, Debug)]
pub enum WebsiftError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Unsupported content: {0}")]
    Unsupported(String),

    #[error("Response too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl WebsiftError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}
