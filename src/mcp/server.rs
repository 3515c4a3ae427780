//! MCP server implementation (stdio mode)
//!
//! Serves a single session over newline-delimited JSON-RPC on stdin and
//! stdout. Used when no HTTP port is configured.

use crate::mcp::error::McpError;
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::outbox::{Outbox, OutboxReceiver};
use crate::mcp::protocol::*;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::transport::StdioTransport;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader};
use tracing::{debug, info};

pub struct McpServer<W: AsyncWrite + Unpin = tokio::io::Stdout> {
    transport: StdioTransport<W>,
    handlers: ProtocolHandlers,
    notifications: OutboxReceiver,
}

impl McpServer {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self::with_transport(tools, StdioTransport::new())
    }

    /// Run the MCP server until stdin closes or Ctrl+C
    pub async fn run(&mut self) -> Result<(), McpError> {
        info!("Starting Websift MCP server (stdio)");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin).lines();

        let mut shutdown = tokio::spawn(async {
            tokio::signal::ctrl_c().await.ok();
        });

        loop {
            tokio::select! {
                line = reader.next_line() => {
                    match line? {
                        Some(line) if !line.trim().is_empty() => {
                            self.process_and_respond(&line).await?;
                        }
                        None => break, // EOF
                        _ => continue,
                    }
                }

                Some(notification) = self.notifications.recv() => {
                    self.transport.send(&notification).await?;
                }

                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin> McpServer<W> {
    pub fn with_transport(tools: Arc<ToolRegistry>, transport: StdioTransport<W>) -> Self {
        let (outbox, notifications) = Outbox::channel();
        Self {
            transport,
            handlers: ProtocolHandlers::new(tools, outbox),
            notifications,
        }
    }

    /// Handle one input line and write everything it produced:
    /// queued notifications first, then the response (if any)
    pub async fn process_and_respond(&mut self, line: &str) -> Result<(), McpError> {
        debug!("Received: {}", line);

        let reply = self.process_line(line).await;

        while let Ok(notification) = self.notifications.try_recv() {
            self.transport.send(&notification).await?;
        }

        if let Some(reply) = reply {
            self.transport.send(&reply).await?;
        }

        Ok(())
    }

    /// Returns the value to write back, if the input expects one
    async fn process_line(&self, line: &str) -> Option<Value> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                let response = JsonRpcResponse::failure(None, PARSE_ERROR, format!("Parse error: {e}"));
                return serde_json::to_value(response).ok();
            }
        };

        match value {
            Value::Array(items) => {
                if items.is_empty() {
                    let response =
                        JsonRpcResponse::failure(None, INVALID_REQUEST, "Empty batch");
                    return serde_json::to_value(response).ok();
                }
                let mut responses = Vec::new();
                for item in items {
                    if let Some(response) = self.process_message(item).await {
                        responses.push(response);
                    }
                }
                if responses.is_empty() {
                    None
                } else {
                    serde_json::to_value(responses).ok()
                }
            }
            single => {
                let response = self.process_message(single).await?;
                serde_json::to_value(response).ok()
            }
        }
    }

    async fn process_message(&self, value: Value) -> Option<JsonRpcResponse> {
        match JsonRpcMessage::from_value(value) {
            Ok(JsonRpcMessage::Request(request)) => Some(self.handlers.handle_request(request).await),
            Ok(JsonRpcMessage::Notification(notification)) => {
                self.handlers.handle_notification(notification).await;
                None
            }
            Ok(JsonRpcMessage::Response(_)) => {
                debug!("Ignoring client response");
                None
            }
            Err(error) => Some(JsonRpcResponse {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id: None,
                result: None,
                error: Some(error),
            }),
        }
    }

    pub fn into_transport(self) -> StdioTransport<W> {
        self.transport
    }
}
