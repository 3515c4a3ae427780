//! The tool seam
//!
//! Tools see only their own arguments. Progress and log notifications
//! around a call are emitted by [`ProtocolHandlers`](crate::mcp::ProtocolHandlers),
//! so a tool body stays a plain async function of its input.

use crate::mcp::error::McpError;
use crate::mcp::protocol::{ContentBlock, ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::Value;

/// One callable MCP tool
///
/// An `Err` from [`execute`](Self::execute) becomes a JSON-RPC error
/// response carrying [`McpError::code`].
#[async_trait]
pub trait McpToolHandler: Send + Sync {
    /// Registry key, also the `name` in `tools/call`
    fn name(&self) -> &str;

    fn schema(&self) -> ToolSchema;

    /// `args` is `{}` when the client sent no arguments
    async fn execute(&self, args: Value) -> Result<ToolResult, McpError>;
}

/// Wrap markdown in a single text block
pub fn text_content(text: impl Into<String>) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text { text: text.into() }],
        is_error: false,
    }
}
