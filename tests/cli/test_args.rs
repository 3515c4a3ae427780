//! Argument parsing and completion script tests

use clap::Parser;
use clap_complete::Shell;
use websift::cli::commands::completions::render;
use websift::cli::{Cli, Commands, OutputFormat};

#[test]
fn test_parse_web_search() {
    let cli = Cli::try_parse_from(["websift", "web-search", "rust async", "-n", "5"]).unwrap();

    assert_eq!(cli.format, OutputFormat::Human);
    match cli.command {
        Commands::WebSearch(args) => {
            assert_eq!(args.query, "rust async");
            assert_eq!(args.count, Some(5));
            assert_eq!(args.offset, None);
            assert!(!args.urls_only);
        }
        other => panic!("Unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_global_format_after_subcommand() {
    let cli = Cli::try_parse_from(["websift", "get-server-info", "--format", "json"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn test_parse_fetch_defaults() {
    let cli = Cli::try_parse_from(["websift", "fetch-markdown", "https://example.com"]).unwrap();

    match cli.command {
        Commands::FetchMarkdown(args) => {
            assert_eq!(args.url, "https://example.com");
            assert_eq!(args.start_index, 0);
            assert_eq!(args.max_length, None);
            assert!(!args.full);
        }
        other => panic!("Unexpected command: {other:?}"),
    }
}

#[test]
fn test_full_conflicts_with_max_length() {
    let result = Cli::try_parse_from([
        "websift",
        "fetch-markdown",
        "https://example.com",
        "--full",
        "--max-length",
        "10",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_search_requires_query() {
    assert!(Cli::try_parse_from(["websift", "web-search"]).is_err());
}

#[test]
fn test_completions_mention_every_command() {
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        let script = String::from_utf8(render(shell)).unwrap();
        assert!(script.contains("websift"), "{shell} script names the binary");
        for command in ["web-search", "fetch-markdown", "show-config", "get-server-info"] {
            assert!(script.contains(command), "{shell} script lists {command}");
        }
    }
}
