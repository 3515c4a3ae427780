//! MCP protocol method handlers
//!
//! One [`ProtocolHandlers`] instance serves exactly one session. Besides
//! answering requests it pushes progress and log notifications for
//! tool calls through the session's [`Outbox`].

use crate::mcp::error::McpError;
use crate::mcp::outbox::Outbox;
use crate::mcp::protocol::*;
use crate::mcp::tools::ToolRegistry;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Logger name attached to `notifications/message`
const LOGGER_NAME: &str = "websift";

pub struct ProtocolHandlers {
    initialized: AtomicBool,
    tool_registry: Arc<ToolRegistry>,
    outbox: Outbox,
    log_level: Mutex<LogLevel>,
}

impl ProtocolHandlers {
    pub fn new(tool_registry: Arc<ToolRegistry>, outbox: Outbox) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            tool_registry,
            outbox,
            log_level: Mutex::new(LogLevel::Info),
        }
    }

    /// Whether the client has sent `notifications/initialized`
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Current client-requested log level
    pub fn log_level(&self) -> LogLevel {
        *self.log_level.lock()
    }

    /// Route a request to its method handler. Handler failures become
    /// JSON-RPC error responses, so this never fails.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let method = request.method.clone();

        let result = match method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "ping" => self.handle_ping(request).await,
            "tools/list" => self.handle_tools_list(request).await,
            "tools/call" => self.handle_tools_call(request).await,
            "logging/setLevel" => self.handle_set_level(request).await,
            _ => Err(McpError::MethodNotFound(format!("Unknown method: {method}"))),
        };

        result.unwrap_or_else(|e| {
            debug!(method = %method, error = %e, "Request failed");
            JsonRpcResponse::failure(id, e.code(), e.message())
        })
    }

    /// Handle a client notification. Unknown notifications are ignored.
    pub async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => self.handle_initialized(),
            "notifications/cancelled" => {
                debug!(params = ?notification.params, "Client cancelled a request");
            }
            other => debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: InitializeParams =
            serde_json::from_value(request.params.unwrap_or(Value::Null))
                .map_err(|e| McpError::InvalidParams(format!("Invalid initialize params: {e}")))?;

        let protocol_version = negotiate_version(&params.protocol_version);
        if protocol_version != params.protocol_version {
            warn!(
                requested = %params.protocol_version,
                answered = protocol_version,
                "Client requested unsupported protocol version"
            );
        }

        info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version,
            "Client initialized"
        );

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
                logging: LoggingCapability::default(),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Use web_search to find pages and fetch_markdown to read them.".to_string(),
            ),
        };

        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Handle initialized notification
    pub fn handle_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        info!("Server initialized");
    }

    /// Handle ping request
    pub async fn handle_ping(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        Ok(JsonRpcResponse::success(request.id, json!({})))
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let tools = self.tool_registry.list();
        Ok(JsonRpcResponse::success(
            request.id,
            json!({ "tools": tools }),
        ))
    }

    /// Handle logging/setLevel request
    pub async fn handle_set_level(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: SetLevelParams =
            serde_json::from_value(request.params.unwrap_or(Value::Null))
                .map_err(|e| McpError::InvalidParams(format!("Invalid log level: {e}")))?;

        *self.log_level.lock() = params.level;
        debug!(level = ?params.level, "Client log level changed");

        Ok(JsonRpcResponse::success(request.id, json!({})))
    }

    /// Handle tools/call request
    pub async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params_value = request
            .params
            .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

        let params: ToolCallParams = serde_json::from_value(params_value)
            .map_err(|e| McpError::InvalidParams(format!("Invalid params: {e}")))?;

        let handler = self
            .tool_registry
            .get(&params.name)
            .ok_or_else(|| McpError::InvalidParams(format!("Unknown tool: {}", params.name)))?;

        let progress_token = params.meta.and_then(|m| m.progress_token);
        let arguments = match params.arguments {
            Value::Null => json!({}),
            other => other,
        };

        self.progress(progress_token.as_ref(), 0);
        self.log(
            LogLevel::Info,
            json!({ "tool": params.name, "event": "started" }),
        );

        let start = Instant::now();
        let outcome = handler.execute(arguments).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                self.progress(progress_token.as_ref(), 1);
                self.log(
                    LogLevel::Info,
                    json!({
                        "tool": params.name,
                        "event": "completed",
                        "duration_ms": duration_ms
                    }),
                );
                Ok(JsonRpcResponse::success(
                    request.id,
                    serde_json::to_value(result)?,
                ))
            }
            Err(e) => {
                warn!(tool = %params.name, error = %e, duration_ms, "Tool call failed");
                self.log(
                    LogLevel::Error,
                    json!({
                        "tool": params.name,
                        "event": "failed",
                        "error": e.message()
                    }),
                );
                Err(e)
            }
        }
    }

    /// Emit `notifications/progress` when the client asked for it
    fn progress(&self, token: Option<&Value>, progress: u64) {
        if let Some(token) = token {
            self.outbox.notify(
                "notifications/progress",
                Some(json!({
                    "progressToken": token,
                    "progress": progress,
                    "total": 1
                })),
            );
        }
    }

    /// Emit `notifications/message` if `level` passes the client's filter
    fn log(&self, level: LogLevel, data: Value) {
        if level < self.log_level() {
            return;
        }
        self.outbox.notify(
            "notifications/message",
            Some(json!({
                "level": level,
                "logger": LOGGER_NAME,
                "data": data
            })),
        );
    }
}
