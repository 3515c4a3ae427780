//! Core data types for the Websift service.
//!
//! This module defines the data structures shared by the search
//! client, the content fetcher and the adapters that render them.

use serde::{Deserialize, Serialize};

/// A single web search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title
    pub title: String,

    /// Result URL
    pub url: String,

    /// Snippet describing the page
    pub description: String,

    /// Provider-reported age of the page (e.g. "2 days ago")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

/// Search request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query string
    pub query: String,

    /// Number of results to return
    #[serde(default)]
    pub count: Option<usize>,

    /// Result page offset
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Original query
    pub query: String,

    /// Results in provider ranking order
    pub results: Vec<SearchHit>,

    /// Query duration in milliseconds
    pub duration_ms: u64,
}

/// A fetched page converted to markdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// Document title, when one was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Content type reported by the server
    pub content_type: String,

    /// Full markdown rendering of the page
    pub markdown: String,

    /// Fetch duration in milliseconds
    pub duration_ms: u64,
}

/// A character window over a fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentWindow {
    /// Text inside the window
    pub text: String,

    /// Character index the window starts at
    pub start_index: usize,

    /// Total characters in the document
    pub total_chars: usize,

    /// Start index for the next window, if the document continues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_index: Option<usize>,
}

impl FetchedPage {
    /// Slice the markdown into a window of at most `max_length` characters
    /// starting at `start_index`. Indices count characters, never bytes.
    pub fn window(&self, start_index: usize, max_length: usize) -> ContentWindow {
        let total_chars = self.markdown.chars().count();
        let start = start_index.min(total_chars);
        let text: String = self
            .markdown
            .chars()
            .skip(start)
            .take(max_length)
            .collect();
        let end = start + text.chars().count();
        let next_index = (end < total_chars).then_some(end);

        ContentWindow {
            text,
            start_index: start,
            total_chars,
            next_index,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Server identity
    pub server: String,

    /// Service version
    pub version: String,
}
