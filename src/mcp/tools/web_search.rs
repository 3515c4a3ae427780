//! Web search tool handler

use super::handler::{text_content, McpToolHandler};
use super::helpers::truncate_text;
use crate::core::services::Services;
use crate::core::types::{SearchRequest, SearchResponse};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_DESCRIPTION_CHARS: usize = 500;

pub struct WebSearchHandler {
    services: Arc<Services>,
}

impl WebSearchHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn format_results(&self, response: &SearchResponse) -> String {
        let mut output = format!(
            "Found {} results for '{}' ({}ms):\n\n",
            response.results.len(),
            response.query,
            response.duration_ms
        );

        if response.results.is_empty() {
            output.push_str("No results found. Try broader or different keywords.");
            return output;
        }

        for (i, hit) in response.results.iter().enumerate() {
            let title = if hit.title.trim().is_empty() {
                hit.url.as_str()
            } else {
                hit.title.trim()
            };
            output.push_str(&format!("## {}. {}\n", i + 1, title));
            output.push_str(&format!("**URL:** {}\n", hit.url));
            if let Some(age) = &hit.age {
                output.push_str(&format!("**Age:** {age}\n"));
            }
            if !hit.description.trim().is_empty() {
                output.push('\n');
                output.push_str(&truncate_text(hit.description.trim(), MAX_DESCRIPTION_CHARS));
                output.push('\n');
            }
            output.push('\n');
        }

        output
    }
}

#[async_trait]
impl McpToolHandler for WebSearchHandler {
    fn name(&self) -> &str {
        "web_search"
    }

    fn schema(&self) -> ToolSchema {
        let max_count = self.services.config.search.max_count;
        let default_count = self.services.config.search.default_count;

        ToolSchema {
            name: "web_search".to_string(),
            description: "Search the web and return ranked results with title, URL and snippet. \
                         Use fetch_markdown on a result URL to read the full page. \
                         Requires a search API key on the server."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query",
                        "minLength": 1,
                        "maxLength": 400
                    },
                    "count": {
                        "type": "integer",
                        "description": "Number of results to return",
                        "default": default_count,
                        "minimum": 1,
                        "maximum": max_count
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Result page offset (0-9) for pagination",
                        "default": 0,
                        "minimum": 0,
                        "maximum": 9
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        #[derive(Deserialize)]
        struct WebSearchArgs {
            query: String,
            #[serde(default)]
            count: Option<usize>,
            #[serde(default)]
            offset: Option<usize>,
        }

        let args: WebSearchArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        if args.query.trim().is_empty() {
            return Err(McpError::InvalidParams("Query cannot be empty".to_string()));
        }

        let request = SearchRequest {
            query: args.query,
            count: args.count,
            offset: args.offset,
        };

        let response = self.services.search.search(&request).await?;

        Ok(text_content(self.format_results(&response)))
    }
}
