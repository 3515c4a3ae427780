//! Get server info tool handler
//!
//! Returns version and capability information about the running
//! websift-mcp server.

use super::handler::{text_content, McpToolHandler};
use super::helpers::format_bytes;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema, SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// One-line summaries of the tools this server registers
pub const TOOL_SUMMARIES: &[(&str, &str)] = &[
    ("web_search", "Search the web"),
    ("fetch_markdown", "Fetch a URL and convert it to markdown"),
    ("get_server_info", "Show server version (this tool)"),
];

pub struct GetServerInfoHandler {
    services: Arc<Services>,
}

impl GetServerInfoHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    pub fn format_info(&self) -> String {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let config = &self.services.config;

        let mut output = String::from("# Websift MCP Server Information\n\n");

        output.push_str("## Version\n");
        output.push_str(&format!("- **Version:** {version}\n"));
        output.push_str(&format!("- **Rust Version:** {rust_version}\n\n"));

        output.push_str("## Server Details\n");
        output.push_str(&format!("- **Name:** {SERVER_NAME}\n"));
        output.push_str("- **Description:** Web search and URL-to-markdown MCP server\n");
        output.push_str(&format!(
            "- **Protocol:** MCP {}\n\n",
            SUPPORTED_PROTOCOL_VERSIONS.join(", ")
        ));

        output.push_str("## Limits\n");
        output.push_str(&format!(
            "- **Search:** {}\n",
            if self.services.search.is_configured() {
                "configured"
            } else {
                "not configured (no API key)"
            }
        ));
        output.push_str(&format!(
            "- **Results per query:** {} (max {})\n",
            config.search.default_count, config.search.max_count
        ));
        output.push_str(&format!(
            "- **Max page size:** {}\n",
            format_bytes(config.fetch.max_bytes)
        ));
        output.push_str(&format!(
            "- **Default window:** {} chars\n\n",
            config.fetch.default_max_length
        ));

        output.push_str("## Available Tools\n");
        for (name, summary) in TOOL_SUMMARIES {
            output.push_str(&format!("- {name}: {summary}\n"));
        }

        output
    }
}

#[async_trait]
impl McpToolHandler for GetServerInfoHandler {
    fn name(&self) -> &str {
        "get_server_info"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_info".to_string(),
            description: "Get version and capability information about the running websift-mcp \
                         server. Returns server version, supported protocol versions, limits \
                         and available tools. Fast operation (<1ms)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        Ok(text_content(self.format_info()))
    }
}
