//! Page fetching and markdown conversion
//!
//! [`ContentFetcher`] downloads a single URL, enforces the configured
//! size limit and turns the body into markdown according to its
//! content type.

pub mod markdown;

use crate::core::config::FetchConfig;
use crate::core::error::{Result, WebsiftError};
use crate::core::types::FetchedPage;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub use markdown::{html_to_markdown, Converted};

/// Maximum redirects followed for one fetch
const MAX_REDIRECTS: usize = 10;

/// Content type assumed when the server does not send one
const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Downloads pages and renders them as markdown
pub struct ContentFetcher {
    http: reqwest::Client,
    max_bytes: u64,
}

impl ContentFetcher {
    /// Create a fetcher from configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            http,
            max_bytes: config.max_bytes,
        })
    }

    /// Fetch `raw_url` and convert the body to markdown
    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedPage> {
        let url = parse_url(raw_url)?;
        let start = Instant::now();
        debug!(url = %url, "Fetching page");

        let mut response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebsiftError::Upstream {
                status: status.as_u16(),
                message: format!("fetch failed with HTTP {status}"),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(WebsiftError::TooLarge {
                    size: length,
                    limit: self.max_bytes,
                });
            }
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_ascii_lowercase();

        // Content-Length may be absent or wrong, so the limit is
        // enforced on the bytes actually read.
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_bytes {
                return Err(WebsiftError::TooLarge {
                    size: body.len() as u64,
                    limit: self.max_bytes,
                });
            }
        }

        let text = String::from_utf8_lossy(&body);
        let converted = convert_body(&content_type, &text, &final_url)?;

        debug!(
            url = %final_url,
            bytes = body.len(),
            chars = converted.markdown.chars().count(),
            "Page converted"
        );

        Ok(FetchedPage {
            url: final_url.to_string(),
            title: converted.title,
            content_type,
            markdown: converted.markdown,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Parse a user-supplied URL, accepting only http and https
pub fn parse_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WebsiftError::InvalidArgument(
            "URL cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| WebsiftError::InvalidArgument(format!("Invalid URL '{trimmed}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(WebsiftError::InvalidArgument(format!(
            "Unsupported URL scheme '{scheme}' (expected http or https)"
        ))),
    }
}

/// Render a response body according to its media type
fn convert_body(content_type: &str, text: &str, base: &Url) -> Result<Converted> {
    let mime = content_type.split(';').next().unwrap_or("").trim();

    match mime {
        "text/html" | "application/xhtml+xml" => Ok(html_to_markdown(text, Some(base))),
        "text/plain" | "text/markdown" | "text/x-markdown" => Ok(Converted {
            title: None,
            markdown: text.trim().to_string(),
        }),
        m if m == "application/json" || m.ends_with("+json") => {
            let pretty = serde_json::from_str::<serde_json::Value>(text)
                .and_then(|v| serde_json::to_string_pretty(&v))
                .unwrap_or_else(|_| text.trim().to_string());
            Ok(Converted {
                title: None,
                markdown: format!("```json\n{pretty}\n```"),
            })
        }
        other => Err(WebsiftError::Unsupported(format!(
            "Content type '{other}' cannot be converted to markdown"
        ))),
    }
}
