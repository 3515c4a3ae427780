//! Websift - Web Search and Markdown Fetch over MCP
//!
//! Exposes web search and URL-to-markdown conversion as MCP tools,
//! either over stdio for a single client or through a
//! session-multiplexed HTTP gateway for many.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types, xdg
//!   - search (web search client)
//!   - fetch (page fetcher, HTML to markdown)
//!   - services (unified service container)
//!
//! - **mcp**: MCP protocol engine (depends on core)
//!   - protocol, handlers, outbox, tools, stdio server
//!
//! - **gateway**: HTTP session transport (depends on mcp through a trait seam)
//!   - handshake, registry, binding, lifecycle, router
//!
//! - **http**: Shared HTTP plumbing
//!   - request logging middleware, health handler
//!
//! - **cli**: Command-line adapter (depends on core)

// Core domain logic (protocol-agnostic)
pub mod core;

// MCP protocol engine
pub mod mcp;

// Session-multiplexed HTTP transport
pub mod gateway;

// Shared HTTP plumbing
pub mod http;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{Result, WebsiftError};
pub use core::services::Services;
pub use core::types::*;
