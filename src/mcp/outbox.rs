//! Per-session notification queue
//!
//! The protocol engine enqueues server-to-client notifications here and
//! the transport drains them, over SSE for the HTTP gateway or stdout in
//! stdio mode. The queue is unbounded and FIFO, so enqueue never waits
//! on a slow client.

use crate::mcp::protocol::JsonRpcNotification;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

/// Receiving half, owned by the transport
pub type OutboxReceiver = mpsc::UnboundedReceiver<JsonRpcNotification>;

/// Sending half, owned by the protocol engine
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<JsonRpcNotification>,
}

impl Outbox {
    pub fn channel() -> (Self, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a notification. Returns false when the receiver is gone,
    /// in which case the notification is dropped.
    pub fn notify(&self, method: &str, params: Option<Value>) -> bool {
        let delivered = self
            .tx
            .send(JsonRpcNotification::new(method, params))
            .is_ok();
        if !delivered {
            trace!(method, "Outbox receiver closed, dropping notification");
        }
        delivered
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
