//! Config command - show current configuration

use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Include gateway and logging settings
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config_file: String,
    pub search: SearchSection,
    pub fetch: FetchSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewaySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Serialize)]
pub struct SearchSection {
    pub endpoint: String,
    pub api_key: String,
    pub default_count: usize,
    pub max_count: usize,
    pub timeout_sec: u64,
}

#[derive(Debug, Serialize)]
pub struct FetchSection {
    pub user_agent: String,
    pub timeout_sec: u64,
    pub max_bytes: u64,
    pub default_max_length: usize,
}

#[derive(Debug, Serialize)]
pub struct GatewaySection {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub close_on_disconnect: bool,
    pub keep_alive_sec: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_idle_timeout_sec: Option<u64>,
    pub max_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct LoggingSection {
    pub level: String,
    pub format: String,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;
    let config_file = XdgDirs::new().config_file().to_string_lossy().into_owned();

    let response = ConfigResponse {
        config_file,
        search: SearchSection {
            endpoint: config.search.endpoint.clone(),
            api_key: if config.search.api_key().is_some() {
                "[REDACTED]".to_string()
            } else {
                "not set".to_string()
            },
            default_count: config.search.default_count,
            max_count: config.search.max_count,
            timeout_sec: config.search.timeout_sec,
        },
        fetch: FetchSection {
            user_agent: config.fetch.user_agent.clone(),
            timeout_sec: config.fetch.timeout_sec,
            max_bytes: config.fetch.max_bytes,
            default_max_length: config.fetch.default_max_length,
        },
        gateway: args.all.then(|| GatewaySection {
            host: config.server.host.clone(),
            port: config.server.port,
            close_on_disconnect: config.gateway.close_on_disconnect,
            keep_alive_sec: config.gateway.keep_alive_sec,
            session_idle_timeout_sec: config.gateway.session_idle_timeout_sec,
            max_sessions: config.gateway.max_sessions,
        }),
        logging: args.all.then(|| LoggingSection {
            level: config.logging.level.clone(),
            format: config.logging.format.clone(),
        }),
    };

    match format {
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  config_file: {}", response.config_file);
            println!("  search:");
            println!("    endpoint: {}", response.search.endpoint);
            println!("    api_key: {}", response.search.api_key);
            println!("    default_count: {}", response.search.default_count);
            println!("    max_count: {}", response.search.max_count);
            println!("    timeout_sec: {}", response.search.timeout_sec);
            println!("  fetch:");
            println!("    user_agent: {}", response.fetch.user_agent);
            println!("    timeout_sec: {}", response.fetch.timeout_sec);
            println!("    max_bytes: {}", response.fetch.max_bytes);
            println!(
                "    default_max_length: {}",
                response.fetch.default_max_length
            );
            if let Some(gateway) = &response.gateway {
                println!("  gateway:");
                println!("    host: {}", gateway.host);
                match gateway.port {
                    Some(port) => println!("    port: {port}"),
                    None => println!("    port: (stdio mode)"),
                }
                println!("    close_on_disconnect: {}", gateway.close_on_disconnect);
                println!("    keep_alive_sec: {}", gateway.keep_alive_sec);
                match gateway.session_idle_timeout_sec {
                    Some(secs) => println!("    session_idle_timeout_sec: {secs}"),
                    None => println!("    session_idle_timeout_sec: disabled"),
                }
                println!("    max_sessions: {}", gateway.max_sessions);
            }
            if let Some(logging) = &response.logging {
                println!("  logging:");
                println!("    level: {}", logging.level);
                println!("    format: {}", logging.format);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
