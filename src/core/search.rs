//! Web search client
//!
//! Thin wrapper over the Brave Web Search API. The client owns a pooled
//! `reqwest::Client`; it is cheap to share behind an `Arc`.

use crate::core::config::SearchConfig;
use crate::core::error::{Result, WebsiftError};
use crate::core::types::{SearchHit, SearchRequest, SearchResponse};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Header carrying the API key
const TOKEN_HEADER: &str = "X-Subscription-Token";

/// Longest query the provider accepts
const MAX_QUERY_CHARS: usize = 400;

/// Highest page offset the provider accepts
const MAX_OFFSET: usize = 9;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    age: Option<String>,
}

/// Client for the web search provider
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    default_count: usize,
    max_count: usize,
}

impl SearchClient {
    /// Create a client from configuration
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key().map(str::to_string),
            default_count: config.default_count,
            max_count: config.max_count,
        })
    }

    /// Whether an API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Clamp a requested result count into the accepted range
    pub fn effective_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_count)
            .clamp(1, self.max_count)
    }

    /// Run a web search
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(WebsiftError::InvalidArgument(
                "Query cannot be empty".to_string(),
            ));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(WebsiftError::InvalidArgument(format!(
                "Query exceeds {MAX_QUERY_CHARS} characters"
            )));
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            WebsiftError::NotConfigured(
                "web search requires an API key (set BRAVE_API_KEY)".to_string(),
            )
        })?;

        let count = self.effective_count(request.count);
        let offset = request.offset.unwrap_or(0).min(MAX_OFFSET);

        debug!(query = %query, count, offset, "Running web search");
        let start = Instant::now();

        let response = self
            .http
            .get(&self.endpoint)
            .header(TOKEN_HEADER, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("q", query.to_string()),
                ("count", count.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebsiftError::Upstream {
                status: status.as_u16(),
                message: summarize_body(&body),
            });
        }

        let api: ApiResponse = response.json().await?;
        let results = api
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                description: strip_highlight_tags(&r.description),
                age: r.age,
            })
            .collect();

        Ok(SearchResponse {
            query: query.to_string(),
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Trim an upstream error body to something safe to show a caller
fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}

/// The provider wraps matched terms in `<strong>` tags
fn strip_highlight_tags(text: &str) -> String {
    text.replace("<strong>", "").replace("</strong>", "")
}
