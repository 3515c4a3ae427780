//! Configuration management for the Websift service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{Result, WebsiftError};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface the HTTP gateway binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port. When unset the server runs over stdio instead.
    #[serde(default)]
    pub port: Option<u16>,
}

/// Web search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// API key for the search provider
    #[serde(default)]
    pub api_key: Option<String>,

    /// Search endpoint URL
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Default number of results to return
    #[serde(default = "default_count")]
    pub default_count: usize,

    /// Maximum results per query
    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_sec: u64,
}

/// Content fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_sec: u64,

    /// Largest response body accepted, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Default markdown window returned per call, in characters
    #[serde(default = "default_max_length")]
    pub default_max_length: usize,
}

/// Session gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Close the session when its push channel disconnects
    #[serde(default = "default_close_on_disconnect")]
    pub close_on_disconnect: bool,

    /// Interval between SSE keep-alive comments, in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive_sec: u64,

    /// Evict sessions idle for longer than this. Unset disables eviction.
    #[serde(default)]
    pub session_idle_timeout_sec: Option<u64>,

    /// Maximum number of live sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter level (RUST_LOG takes precedence)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_search_endpoint() -> String {
    "https://api.search.brave.com/res/v1/web/search".to_string()
}

fn default_count() -> usize {
    10
}

fn default_max_count() -> usize {
    20
}

fn default_search_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!(
        "websift/{} (+https://crates.io/crates/websift)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_max_length() -> usize {
    20_000
}

fn default_close_on_disconnect() -> bool {
    true
}

fn default_keep_alive() -> u64 {
    15
}

fn default_max_sessions() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl ServerConfig {
    /// Addresses the gateway listens on. `host` may be a hostname, an
    /// IPv4 literal or a bare IPv6 literal such as `::1`.
    pub fn listen_addrs(&self, port: u16) -> Result<Vec<SocketAddr>> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| {
                WebsiftError::ConfigError(format!("Cannot resolve host '{}': {e}", self.host))
            })?
            .collect();

        if addrs.is_empty() {
            return Err(WebsiftError::ConfigError(format!(
                "Host '{}' resolved to no addresses",
                self.host
            )));
        }
        Ok(addrs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_search_endpoint(),
            default_count: default_count(),
            max_count: default_max_count(),
            timeout_sec: default_search_timeout(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_sec: default_fetch_timeout(),
            max_bytes: default_max_bytes(),
            default_max_length: default_max_length(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            close_on_disconnect: default_close_on_disconnect(),
            keep_alive_sec: default_keep_alive(),
            session_idle_timeout_sec: None,
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SearchConfig {
    /// API key, if one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WebsiftError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. WEBSIFT_CONFIG env var
    /// 2. XDG config file (~/.config/websift/config.toml)
    /// 3. ./websift.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        xdg.log_paths();

        let mut config = if let Ok(config_path) = env::var("WEBSIFT_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("websift.toml").exists() {
                Self::from_file("websift.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Server configuration. WEBSIFT_PORT wins over the generic PORT.
        if let Ok(host) = env::var("WEBSIFT_HOST") {
            self.server.host = host;
        }
        for var in ["PORT", "WEBSIFT_PORT"] {
            if let Ok(port) = env::var(var) {
                if let Ok(p) = port.trim().parse() {
                    self.server.port = Some(p);
                }
            }
        }

        // Search configuration
        for var in ["BRAVE_API_KEY", "WEBSIFT_SEARCH_API_KEY"] {
            if let Ok(key) = env::var(var) {
                self.search.api_key = Some(key);
            }
        }
        if let Ok(endpoint) = env::var("WEBSIFT_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }
        if let Ok(count) = env::var("WEBSIFT_SEARCH_COUNT") {
            if let Ok(c) = count.parse() {
                self.search.default_count = c;
            }
        }

        // Fetch configuration
        if let Ok(timeout) = env::var("WEBSIFT_FETCH_TIMEOUT_SEC") {
            if let Ok(t) = timeout.parse() {
                self.fetch.timeout_sec = t;
            }
        }
        if let Ok(max_bytes) = env::var("WEBSIFT_FETCH_MAX_BYTES") {
            if let Ok(b) = max_bytes.parse() {
                self.fetch.max_bytes = b;
            }
        }
        if let Ok(agent) = env::var("WEBSIFT_USER_AGENT") {
            self.fetch.user_agent = agent;
        }

        // Gateway configuration
        if let Ok(close) = env::var("WEBSIFT_CLOSE_ON_DISCONNECT") {
            if let Ok(c) = close.parse() {
                self.gateway.close_on_disconnect = c;
            }
        }
        if let Ok(idle) = env::var("WEBSIFT_SESSION_IDLE_TIMEOUT_SEC") {
            if let Ok(i) = idle.parse() {
                self.gateway.session_idle_timeout_sec = Some(i);
            }
        }
        if let Ok(max) = env::var("WEBSIFT_MAX_SESSIONS") {
            if let Ok(m) = max.parse() {
                self.gateway.max_sessions = m;
            }
        }

        // Logging configuration
        if let Ok(level) = env::var("WEBSIFT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("WEBSIFT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == Some(0) {
            return Err(WebsiftError::ConfigError(
                "Port must be non-zero".to_string(),
            ));
        }

        // Validate search config
        let endpoint = url::Url::parse(&self.search.endpoint).map_err(|e| {
            WebsiftError::ConfigError(format!("Invalid search endpoint: {e}"))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(WebsiftError::ConfigError(
                "Search endpoint must be an http(s) URL".to_string(),
            ));
        }

        if self.search.default_count == 0 {
            return Err(WebsiftError::ConfigError(
                "Default result count must be non-zero".to_string(),
            ));
        }

        if self.search.default_count > self.search.max_count {
            return Err(WebsiftError::ConfigError(
                "Default result count cannot exceed max count".to_string(),
            ));
        }

        if self.search.timeout_sec == 0 || self.fetch.timeout_sec == 0 {
            return Err(WebsiftError::ConfigError(
                "Request timeouts must be non-zero".to_string(),
            ));
        }

        // Validate fetch config
        if self.fetch.max_bytes == 0 {
            return Err(WebsiftError::ConfigError(
                "Fetch max bytes must be non-zero".to_string(),
            ));
        }

        if self.fetch.default_max_length == 0 {
            return Err(WebsiftError::ConfigError(
                "Default max length must be non-zero".to_string(),
            ));
        }

        // Validate gateway config
        if self.gateway.keep_alive_sec == 0 {
            return Err(WebsiftError::ConfigError(
                "Keep-alive interval must be non-zero".to_string(),
            ));
        }

        if self.gateway.session_idle_timeout_sec == Some(0) {
            return Err(WebsiftError::ConfigError(
                "Session idle timeout must be non-zero when set".to_string(),
            ));
        }

        if self.gateway.max_sessions == 0 {
            return Err(WebsiftError::ConfigError(
                "Max sessions must be non-zero".to_string(),
            ));
        }

        // Validate logging config
        if !matches!(self.logging.format.as_str(), "compact" | "json") {
            return Err(WebsiftError::ConfigError(format!(
                "Unknown log format '{}' (expected 'compact' or 'json')",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        match self.server.port {
            Some(port) => tracing::info!("  Transport: http://{}:{}", self.server.host, port),
            None => tracing::info!("  Transport: stdio"),
        }
        tracing::info!("  Search endpoint: {}", self.search.endpoint);
        tracing::info!(
            "  Search API key: {}",
            if self.search.api_key().is_some() {
                "[REDACTED]"
            } else {
                "not set"
            }
        );
        tracing::info!(
            "  Search count: {} (max {})",
            self.search.default_count,
            self.search.max_count
        );
        tracing::info!("  Fetch timeout: {}s", self.fetch.timeout_sec);
        tracing::info!("  Fetch max bytes: {}", self.fetch.max_bytes);
        tracing::info!(
            "  Close on disconnect: {}",
            self.gateway.close_on_disconnect
        );
        match self.gateway.session_idle_timeout_sec {
            Some(secs) => tracing::info!("  Session idle timeout: {}s", secs),
            None => tracing::info!("  Session idle timeout: disabled"),
        }
        tracing::info!("  Max sessions: {}", self.gateway.max_sessions);

        if self.search.api_key().is_none() {
            tracing::warn!("No search API key configured; web_search will be unavailable");
        }
    }
}
