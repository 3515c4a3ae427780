//! Fetch command - download a page and print it as markdown

use crate::cli::output::{colors, format_duration_ms, print_warning};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the fetch-markdown command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URL to fetch (http or https)
    pub url: String,

    /// Maximum characters to print (defaults to the configured window)
    #[arg(long, short = 'm')]
    pub max_length: Option<usize>,

    /// Character index to start from
    #[arg(long, short = 's', default_value = "0")]
    pub start_index: usize,

    /// Print the whole document, ignoring --max-length
    #[arg(long, conflicts_with = "max_length")]
    pub full: bool,
}

/// Fetch response
#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content_type: String,
    pub start_index: usize,
    pub total_chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_index: Option<usize>,
    pub duration_ms: u64,
    pub markdown: String,
}

/// Execute the fetch-markdown command
pub async fn execute(
    args: FetchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = services.fetcher.fetch(&args.url).await?;

    let max_length = if args.full {
        usize::MAX
    } else {
        args.max_length
            .unwrap_or(services.config.fetch.default_max_length)
            .max(1)
    };
    let window = page.window(args.start_index, max_length);

    let output = FetchOutput {
        url: page.url,
        title: page.title,
        content_type: page.content_type,
        start_index: window.start_index,
        total_chars: window.total_chars,
        next_index: window.next_index,
        duration_ms: page.duration_ms,
        markdown: window.text,
    };

    match format {
        OutputFormat::Human => {
            if let Some(title) = &output.title {
                eprintln!("{}", colors::label(title));
            }
            eprintln!(
                "{} {}",
                colors::url(&output.url),
                colors::dim(&format!(
                    "({}, {})",
                    output.content_type,
                    format_duration_ms(output.duration_ms)
                ))
            );
            println!("{}", output.markdown);
            if let Some(next) = output.next_index {
                print_warning(&format!(
                    "Output truncated at {} of {} characters; rerun with --start-index {}",
                    next, output.total_chars, next
                ));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
