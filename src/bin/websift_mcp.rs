//! Websift MCP (Model Context Protocol) Server
//!
//! Serves the websift tools over stdio when no port is configured, or
//! through the session-multiplexed HTTP gateway when one is.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use websift::core::config::{Config, LoggingConfig};
use websift::core::services::Services;
use websift::gateway::{build_router, LifecycleManager, McpEngineFactory};
use websift::mcp::{default_registry, McpServer};

/// Websift MCP server
#[derive(Parser, Debug)]
#[command(name = "websift-mcp")]
#[command(version)]
#[command(about = "Web search and markdown fetch MCP server", long_about = None)]
struct Args {
    /// Serve the HTTP gateway on this port instead of stdio
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Address to bind the HTTP gateway to
    #[arg(long)]
    host: Option<String>,

    /// Configuration file (overrides WEBSIFT_CONFIG and the XDG location)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr) // Critical: stderr not stdout
        .with_env_filter(filter)
        .with_ansi(false);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn load_config(args: &Args) -> websift::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.merge_env();
            config
        }
        None => Config::load()?,
    };

    if let Some(port) = args.port {
        config.server.port = Some(port);
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load configuration
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::process::exit(1);
    });

    init_logging(&config.logging);
    config.log_config();

    if config.search.api_key().is_none() {
        tracing::warn!("No search API key configured; web_search will report not configured");
    }

    let server_config = config.server.clone();
    let host = server_config.host.clone();
    let port = server_config.port;
    let gateway_config = config.gateway.clone();

    // Create services and the shared tool registry
    let services = match Services::new(config) {
        Ok(services) => Arc::new(services),
        Err(e) => {
            eprintln!("Failed to initialize services: {e}");
            std::process::exit(1);
        }
    };
    let tools = Arc::new(default_registry(services));
    tracing::debug!(
        count = tools.len(),
        tools = %tools.names().collect::<Vec<_>>().join(", "),
        "Registered tools"
    );

    let Some(port) = port else {
        tracing::info!("Starting websift MCP server on stdio");
        let mut server = McpServer::new(tools);
        if let Err(e) = server.run().await {
            eprintln!("MCP server error: {e}");
            std::process::exit(1);
        }
        return;
    };

    let lifecycle = LifecycleManager::start(gateway_config, Arc::new(McpEngineFactory::new(tools)));
    let app = build_router(Arc::clone(&lifecycle));

    // Bind to address and start server
    let addrs = match server_config.listen_addrs(port) {
        Ok(addrs) => addrs,
        Err(e) => {
            eprintln!("Invalid listen address: {e}");
            std::process::exit(1);
        }
    };
    let listener = match TcpListener::bind(addrs.as_slice()).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {host} port {port}: {e}");
            std::process::exit(1);
        }
    };
    let local = listener.local_addr().map(|a| a.to_string()).unwrap_or_default();
    tracing::info!("Websift gateway listening on http://{}", local);

    let shutdown_lifecycle = Arc::clone(&lifecycle);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, closing sessions");
            shutdown_lifecycle.shutdown();
        })
        .await;

    if let Err(e) = served {
        eprintln!("HTTP server error: {e}");
        std::process::exit(1);
    }
    tracing::info!("Websift gateway stopped");
}
