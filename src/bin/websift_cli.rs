//! Websift CLI - Command-line interface for web search and markdown fetch
//!
//! Runs the websift tools directly, without an MCP client. Uses the same
//! configuration file and environment variables as `websift-mcp`.
//!
//! # Examples
//!
//! ```bash
//! # Search the web
//! BRAVE_API_KEY=... websift web-search "rust async traits" --count 5
//!
//! # Convert a page to markdown
//! websift fetch-markdown https://www.rust-lang.org --max-length 2000
//!
//! # Show configuration
//! websift show-config --all
//! ```

use clap::Parser;
use websift::cli::output::print_error;
use websift::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
