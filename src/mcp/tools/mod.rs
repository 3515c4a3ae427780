//! MCP tool implementations
//!
//! This module contains the MCP tool handlers that expose Websift's
//! search and fetch functionality.

pub mod fetch_markdown;
pub mod get_server_info;
pub mod handler;
pub mod helpers;
pub mod registry;
pub mod web_search;

pub use fetch_markdown::FetchMarkdownHandler;
pub use get_server_info::GetServerInfoHandler;
pub use handler::{text_content, McpToolHandler};
pub use helpers::{format_bytes, truncate_text};
pub use registry::ToolRegistry;
pub use web_search::WebSearchHandler;

use crate::core::services::Services;
use std::sync::Arc;

/// Build a registry holding every tool this server exposes
pub fn default_registry(services: Arc<Services>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(FetchMarkdownHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(GetServerInfoHandler::new(services)));
    registry
}
