//! MCP (Model Context Protocol) server module
//!
//! This module implements a JSON-RPC 2.0 compliant MCP protocol engine
//! that exposes Websift's search and fetch capabilities as MCP tools.
//! It is transport-agnostic: the stdio server in [`server`] and the
//! HTTP gateway both drive the same [`ProtocolHandlers`].

pub mod error;
pub mod handlers;
pub mod outbox;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

// Re-export main types
pub use error::McpError;
pub use handlers::ProtocolHandlers;
pub use outbox::{Outbox, OutboxReceiver};
pub use server::McpServer;
pub use tools::{default_registry, McpToolHandler, ToolRegistry};
