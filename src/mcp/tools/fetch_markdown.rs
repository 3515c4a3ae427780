//! Fetch markdown tool handler
//!
//! Downloads a page, converts it to markdown and returns one character
//! window of the result. Long pages are read in several calls by
//! passing the `start_index` reported in the continuation hint.

use super::handler::{text_content, McpToolHandler};
use crate::core::services::Services;
use crate::core::types::{ContentWindow, FetchedPage};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Upper bound on one window, regardless of what the caller asks for
const MAX_WINDOW_CHARS: usize = 200_000;

pub struct FetchMarkdownHandler {
    services: Arc<Services>,
}

impl FetchMarkdownHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn format_page(&self, page: &FetchedPage, window: &ContentWindow) -> String {
        let mut output = String::new();

        if let Some(title) = &page.title {
            output.push_str(&format!("# {title}\n\n"));
        }
        output.push_str(&format!("**URL:** {}\n", page.url));
        output.push_str(&format!("**Content-Type:** {}\n", page.content_type));
        output.push_str(&format!(
            "**Fetched in:** {}ms\n\n---\n\n",
            page.duration_ms
        ));

        if window.total_chars == 0 {
            output.push_str("(The page has no readable content.)\n");
            return output;
        }

        output.push_str(&window.text);
        output.push('\n');

        if let Some(next) = window.next_index {
            output.push_str(&format!(
                "\n---\n[Showing characters {}-{} of {}. Call fetch_markdown again with start_index={} to continue.]\n",
                window.start_index, next, window.total_chars, next
            ));
        }

        output
    }
}

#[async_trait]
impl McpToolHandler for FetchMarkdownHandler {
    fn name(&self) -> &str {
        "fetch_markdown"
    }

    fn schema(&self) -> ToolSchema {
        let default_max_length = self.services.config.fetch.default_max_length;

        ToolSchema {
            name: "fetch_markdown".to_string(),
            description: "Fetch a web page over HTTP(S) and return its content as markdown. \
                         Scripts, styles and navigation are stripped; links are made absolute. \
                         Long pages are returned in windows: pass start_index to continue reading."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Absolute http:// or https:// URL",
                        "format": "uri"
                    },
                    "max_length": {
                        "type": "integer",
                        "description": "Maximum characters of markdown to return",
                        "default": default_max_length,
                        "minimum": 1,
                        "maximum": MAX_WINDOW_CHARS
                    },
                    "start_index": {
                        "type": "integer",
                        "description": "Character offset to start from (for continuing a truncated page)",
                        "default": 0,
                        "minimum": 0
                    }
                },
                "required": ["url"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        #[derive(Deserialize)]
        struct FetchArgs {
            url: String,
            #[serde(default)]
            max_length: Option<usize>,
            #[serde(default)]
            start_index: usize,
        }

        let args: FetchArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let max_length = args
            .max_length
            .unwrap_or(self.services.config.fetch.default_max_length);
        if max_length == 0 {
            return Err(McpError::InvalidParams(
                "max_length must be at least 1".to_string(),
            ));
        }
        let max_length = max_length.min(MAX_WINDOW_CHARS);

        let page = self.services.fetcher.fetch(&args.url).await?;
        let window = page.window(args.start_index, max_length);

        if window.total_chars > 0 && args.start_index >= window.total_chars {
            return Err(McpError::InvalidParams(format!(
                "start_index {} is past the end of the content ({} characters)",
                args.start_index, window.total_chars
            )));
        }

        Ok(text_content(self.format_page(&page, &window)))
    }
}
