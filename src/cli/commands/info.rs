//! Info command - show version and server information

use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::mcp::protocol::{SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS};
use crate::mcp::tools::get_server_info::TOOL_SUMMARIES;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// List the tools the server exposes
    #[arg(long, short = 'd')]
    pub detailed: bool,
}

/// Server information response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub protocols: Vec<String>,
    pub search_configured: bool,
    pub tool_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

/// Execute the info command
pub async fn execute(
    args: InfoArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let info = InfoResponse {
        name: SERVER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        protocols: SUPPORTED_PROTOCOL_VERSIONS
            .iter()
            .map(|v| v.to_string())
            .collect(),
        search_configured: services.search.is_configured(),
        tool_count: TOOL_SUMMARIES.len(),
        tools: args.detailed.then(|| {
            TOOL_SUMMARIES
                .iter()
                .map(|(name, _)| name.to_string())
                .collect()
        }),
    };

    match format {
        OutputFormat::Human => {
            println!("{} {}", info.name, info.version);
            println!("Protocol: MCP {}", info.protocols.join(", "));
            println!(
                "Search: {}",
                if info.search_configured {
                    "configured"
                } else {
                    "not configured"
                }
            );
            println!("Tools: {}", info.tool_count);
            if args.detailed {
                for (name, summary) in TOOL_SUMMARIES {
                    println!("  {name}: {summary}");
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
