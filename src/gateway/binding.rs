//! Transport binding
//!
//! A [`TransportBinding`] owns one session's protocol engine and its
//! push queue. The gateway talks to the engine only through the
//! [`ProtocolEngine`] and [`EngineFactory`] traits.

use crate::gateway::error::GatewayError;
use crate::gateway::session::SessionId;
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::outbox::{Outbox, OutboxReceiver};
use crate::mcp::protocol::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::tools::ToolRegistry;
use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The per-session protocol state machine behind a binding
#[async_trait]
pub trait ProtocolEngine: Send + Sync {
    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse;

    async fn handle_notification(&self, notification: JsonRpcNotification);
}

/// Creates one engine per session
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        session_id: &SessionId,
        outbox: Outbox,
    ) -> Result<Arc<dyn ProtocolEngine>, GatewayError>;
}

#[async_trait]
impl ProtocolEngine for ProtocolHandlers {
    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        ProtocolHandlers::handle_request(self, request).await
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        ProtocolHandlers::handle_notification(self, notification).await
    }
}

/// Builds MCP protocol handlers sharing one tool registry
pub struct McpEngineFactory {
    tools: Arc<ToolRegistry>,
}

impl McpEngineFactory {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }
}

impl EngineFactory for McpEngineFactory {
    fn create(
        &self,
        session_id: &SessionId,
        outbox: Outbox,
    ) -> Result<Arc<dyn ProtocolEngine>, GatewayError> {
        debug!(session_id = %session_id, "Creating protocol engine");
        Ok(Arc::new(ProtocolHandlers::new(Arc::clone(&self.tools), outbox)))
    }
}

/// Sent from a binding to the lifecycle manager
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The push channel went away without the session being closed
    Disconnected(SessionId),
}

/// Result of dispatching a POST body
#[derive(Debug)]
pub enum DispatchOutcome {
    /// One response per request, in request order
    Responses(Vec<JsonRpcResponse>),
    /// Only notifications or responses were sent
    Accepted,
}

/// Stream of notifications for one push channel
pub type PushStream = Pin<Box<dyn Stream<Item = JsonRpcNotification> + Send>>;

pub struct TransportBinding {
    session_id: SessionId,
    engine: Arc<dyn ProtocolEngine>,
    push: Arc<Mutex<OutboxReceiver>>,
    closed: CancellationToken,
    events: mpsc::UnboundedSender<LifecycleEvent>,
}

impl std::fmt::Debug for TransportBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportBinding")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl TransportBinding {
    pub fn new(
        session_id: SessionId,
        engine: Arc<dyn ProtocolEngine>,
        receiver: OutboxReceiver,
        events: mpsc::UnboundedSender<LifecycleEvent>,
    ) -> Self {
        Self {
            session_id,
            engine,
            push: Arc::new(Mutex::new(receiver)),
            closed: CancellationToken::new(),
            events,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Feed messages to the engine in order. Requests still in flight
    /// when the binding closes are abandoned with `SessionClosed`.
    pub async fn dispatch(
        &self,
        messages: Vec<JsonRpcMessage>,
    ) -> Result<DispatchOutcome, GatewayError> {
        if self.is_closed() {
            return Err(GatewayError::SessionClosed);
        }

        let mut responses = Vec::new();
        for message in messages {
            match message {
                JsonRpcMessage::Request(request) => {
                    let response = tokio::select! {
                        response = self.engine.handle_request(request) => response,
                        _ = self.closed.cancelled() => return Err(GatewayError::SessionClosed),
                    };
                    responses.push(response);
                }
                JsonRpcMessage::Notification(notification) => {
                    self.engine.handle_notification(notification).await;
                }
                JsonRpcMessage::Response(_) => {
                    debug!(session_id = %self.session_id, "Ignoring client response");
                }
            }
        }

        if responses.is_empty() {
            Ok(DispatchOutcome::Accepted)
        } else {
            Ok(DispatchOutcome::Responses(responses))
        }
    }

    /// Take the session's push channel. Only one may be open at a time.
    ///
    /// The stream ends when the binding closes. If it is dropped first
    /// and `close_on_disconnect` is set, a [`LifecycleEvent::Disconnected`]
    /// is sent so the session gets closed.
    pub fn open_push_stream(
        self: &Arc<Self>,
        close_on_disconnect: bool,
    ) -> Result<PushStream, GatewayError> {
        if self.is_closed() {
            return Err(GatewayError::SessionClosed);
        }

        let mut receiver = Arc::clone(&self.push)
            .try_lock_owned()
            .map_err(|_| GatewayError::PushChannelBusy)?;

        let guard = DisconnectGuard {
            binding: Arc::clone(self),
            armed: close_on_disconnect,
        };
        let closed = self.closed.clone();

        debug!(session_id = %self.session_id, "Push channel opened");

        let stream = async_stream::stream! {
            let _guard = guard;
            loop {
                let next = tokio::select! {
                    biased;
                    _ = closed.cancelled() => None,
                    next = receiver.recv() => next,
                };
                match next {
                    Some(notification) => yield notification,
                    None => break,
                }
            }
        };

        Ok(Box::pin(stream))
    }

    pub fn is_push_open(&self) -> bool {
        self.push.try_lock().is_err()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Close the binding: ends the push stream and fails in-flight
    /// requests. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }
}

/// Reports a dropped push channel to the lifecycle manager
struct DisconnectGuard {
    binding: Arc<TransportBinding>,
    armed: bool,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        debug!(session_id = %self.binding.session_id, "Push channel closed");
        if self.armed && !self.binding.is_closed() {
            let _ = self
                .binding
                .events
                .send(LifecycleEvent::Disconnected(self.binding.session_id.clone()));
        }
    }
}
