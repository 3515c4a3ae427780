//! Web search command - query the search provider

use crate::cli::output::{colors, format_duration_ms};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::SearchRequest;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the web-search command
#[derive(Args, Debug)]
pub struct WebSearchArgs {
    /// Search query
    pub query: String,

    /// Number of results (clamped to the configured maximum)
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Result page offset
    #[arg(long)]
    pub offset: Option<usize>,

    /// Only show URLs (no titles or snippets)
    #[arg(long)]
    pub urls_only: bool,
}

/// Search result item
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub title: String,
    pub url: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub total_results: usize,
    pub duration_ms: u64,
    pub results: Vec<SearchResultItem>,
}

/// Execute the web-search command
pub async fn execute(
    args: WebSearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = SearchRequest {
        query: args.query.clone(),
        count: args.count,
        offset: args.offset,
    };

    let response = services.search.search(&request).await?;

    let output = SearchOutput {
        query: response.query,
        total_results: response.results.len(),
        duration_ms: response.duration_ms,
        results: response
            .results
            .into_iter()
            .enumerate()
            .map(|(i, hit)| SearchResultItem {
                rank: i + 1,
                title: hit.title,
                url: hit.url,
                description: hit.description,
                age: hit.age,
            })
            .collect(),
    };

    match format {
        OutputFormat::Human => print_human(&output, args.urls_only),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn print_human(output: &SearchOutput, urls_only: bool) {
    if output.results.is_empty() {
        println!("No results found for '{}'", colors::label(&output.query));
        return;
    }

    if urls_only {
        for result in &output.results {
            println!("{}", colors::url(&result.url));
        }
        return;
    }

    println!(
        "Found {} result(s) for '{}' {}\n",
        colors::number(&output.total_results.to_string()),
        colors::label(&output.query),
        colors::dim(&format!("({})", format_duration_ms(output.duration_ms)))
    );

    for result in &output.results {
        println!(
            "[{}] {}",
            colors::rank(&result.rank.to_string()),
            colors::label(&result.title)
        );
        println!("    {}", colors::url(&result.url));
        if !result.description.is_empty() {
            let snippet: String = result.description.chars().take(160).collect();
            println!("    {}", colors::dim(&snippet));
        }
        if let Some(age) = &result.age {
            println!("    {}", colors::dim(age));
        }
        println!();
    }
}
