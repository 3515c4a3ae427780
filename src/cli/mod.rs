//! CLI adapter for Websift
//!
//! Runs the same search and fetch operations the MCP tools expose,
//! straight from the command line.
//! This module sits beside `mcp/`; it drives `core/` directly and borrows
//! only protocol constants from `mcp/`.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!          +------------+------------+
//!          |                         |
//!          v                         v
//! +------------------+      +------------------+
//! |      mcp/        |      |      cli/        |
//! | (stdio + gateway)|      | (clap adapter)   |
//! +------------------+      +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Websift - web search and URL-to-markdown
///
/// Search the web and convert pages to markdown from the command line,
/// using the same configuration as the websift MCP server.
#[derive(Parser, Debug)]
#[command(name = "websift")]
#[command(version)]
#[command(about = "Web search and URL-to-markdown", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
///
/// Command names match MCP tool names (underscores become hyphens).
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the web
    #[command(name = "web-search")]
    WebSearch(commands::WebSearchArgs),

    /// Fetch a URL and print it as markdown
    #[command(name = "fetch-markdown")]
    FetchMarkdown(commands::FetchArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Show version and server information
    #[command(name = "get-server-info")]
    GetServerInfo(commands::InfoArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  websift completions bash > ~/.local/share/bash-completion/completions/websift
    ///   zsh:   websift completions zsh > ~/.zfunc/_websift
    ///   fish:  websift completions fish > ~/.config/fish/completions/websift.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use std::sync::Arc;

    let command = match cli.command {
        // Completions don't need services
        Commands::Completions(args) => return commands::completions::execute(args),
        command => command,
    };

    // Load configuration
    let config = Config::load()?;

    // Create services
    let services = Arc::new(Services::new(config)?);

    // Execute command
    match command {
        Commands::WebSearch(args) => {
            commands::web_search::execute(args, &services, cli.format).await
        }
        Commands::FetchMarkdown(args) => {
            commands::fetch_markdown::execute(args, &services, cli.format).await
        }
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::GetServerInfo(args) => commands::info::execute(args, &services, cli.format).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
