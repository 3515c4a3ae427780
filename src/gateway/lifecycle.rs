//! Session lifecycle management
//!
//! [`LifecycleManager`] creates, activates and closes sessions. Closing
//! is idempotent because it can be triggered by an explicit DELETE, a
//! push-channel disconnect, the idle sweeper and process shutdown, in
//! any order. Bindings report disconnects as [`LifecycleEvent`]s on a
//! channel drained by a background task.

use crate::core::config::GatewayConfig;
use crate::gateway::binding::{EngineFactory, LifecycleEvent, TransportBinding};
use crate::gateway::error::GatewayError;
use crate::gateway::registry::SessionRegistry;
use crate::gateway::session::{SessionId, SessionInfo};
use crate::mcp::outbox::Outbox;
use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a session was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client sent DELETE
    Terminated,
    /// Push channel dropped
    Disconnected,
    /// Handshake did not complete; the session never became active
    RolledBack,
    /// No activity within the configured timeout
    IdleTimeout,
    /// Process shutdown
    Shutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CloseReason::Terminated => "terminated",
            CloseReason::Disconnected => "disconnected",
            CloseReason::RolledBack => "rolled_back",
            CloseReason::IdleTimeout => "idle_timeout",
            CloseReason::Shutdown => "shutdown",
        };
        f.write_str(reason)
    }
}

pub struct LifecycleManager {
    registry: SessionRegistry,
    factory: Arc<dyn EngineFactory>,
    config: GatewayConfig,
    events: mpsc::UnboundedSender<LifecycleEvent>,
    shutdown: CancellationToken,
}

impl LifecycleManager {
    /// Create the manager and spawn its background tasks. Must be
    /// called from within a Tokio runtime.
    pub fn start(config: GatewayConfig, factory: Arc<dyn EngineFactory>) -> Arc<Self> {
        let (events, receiver) = mpsc::unbounded_channel();
        let manager = Arc::new(Self {
            registry: SessionRegistry::new(config.max_sessions),
            factory,
            config,
            events,
            shutdown: CancellationToken::new(),
        });

        tokio::spawn(Self::run_events(
            Arc::downgrade(&manager),
            receiver,
            manager.shutdown.clone(),
        ));

        if let Some(secs) = manager.config.session_idle_timeout_sec {
            tokio::spawn(Self::run_sweeper(
                Arc::downgrade(&manager),
                Duration::from_secs(secs),
                manager.shutdown.clone(),
            ));
        }

        manager
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Register a new `Initializing` session and bind a fresh engine to
    /// it. If the engine cannot be created the session is rolled back.
    pub fn create_session(&self) -> Result<(SessionId, Arc<TransportBinding>), GatewayError> {
        if self.shutdown.is_cancelled() {
            return Err(GatewayError::ShuttingDown);
        }

        let id = self.registry.reserve()?;
        let (outbox, receiver) = Outbox::channel();

        let engine = match self.factory.create(&id, outbox) {
            Ok(engine) => engine,
            Err(e) => {
                self.registry.remove(&id);
                warn!(session_id = %id, error = %e, "Engine creation failed, session rolled back");
                return Err(e);
            }
        };

        let binding = Arc::new(TransportBinding::new(
            id.clone(),
            engine,
            receiver,
            self.events.clone(),
        ));

        if !self.registry.bind(&id, Arc::clone(&binding)) {
            binding.close();
            debug!(session_id = %id, "Session closed before binding completed");
            return Err(GatewayError::SessionClosed);
        }

        debug!(session_id = %id, sessions = self.registry.len(), "Session created");
        Ok((id, binding))
    }

    /// `Initializing -> Active`. A session closed in the meantime is
    /// left alone and false is returned.
    pub fn activate_session(&self, id: &SessionId) -> bool {
        if self.registry.activate(id) {
            info!(session_id = %id, sessions = self.registry.len(), "Session activated");
            true
        } else {
            warn!(session_id = %id, "Session closed before activation");
            false
        }
    }

    /// Close and unregister a session. Returns true only for the call
    /// that actually removed it.
    pub fn close_session(&self, id: &SessionId, reason: CloseReason) -> bool {
        match self.registry.remove(id) {
            Some(session) => {
                if let Some(binding) = session.binding {
                    binding.close();
                }
                let lifetime_ms = (Utc::now() - session.created_at).num_milliseconds();
                info!(
                    session_id = %id,
                    reason = %reason,
                    lifetime_ms,
                    sessions = self.registry.len(),
                    "Session closed"
                );
                true
            }
            None => {
                debug!(session_id = %id, reason = %reason, "Session already closed");
                false
            }
        }
    }

    /// Binding for an active session
    pub fn lookup(&self, id: &SessionId) -> Option<Arc<TransportBinding>> {
        self.registry.lookup(id)
    }

    pub fn session_info(&self, id: &SessionId) -> Option<SessionInfo> {
        self.registry.info(id)
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn sessions_issued(&self) -> u64 {
        self.registry.issued()
    }

    /// Close sessions idle for longer than `timeout`. Sessions with an
    /// open push channel are kept. Returns how many were closed.
    pub fn sweep_idle(&self, timeout: Duration) -> usize {
        let Ok(timeout) = chrono::Duration::from_std(timeout) else {
            return 0;
        };
        let cutoff = Utc::now() - timeout;

        let mut closed = 0;
        for (id, binding) in self.registry.idle_since(cutoff) {
            if binding.as_ref().is_some_and(|b| b.is_push_open()) {
                continue;
            }
            if self.close_session(&id, CloseReason::IdleTimeout) {
                closed += 1;
            }
        }
        closed
    }

    /// Close every session and stop the background tasks. New
    /// handshakes are refused afterwards.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let ids = self.registry.ids();
        let count = ids.len();
        for id in ids {
            self.close_session(&id, CloseReason::Shutdown);
        }
        info!(sessions = count, "Gateway sessions closed for shutdown");
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    async fn run_events(
        manager: Weak<Self>,
        mut receiver: mpsc::UnboundedReceiver<LifecycleEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = receiver.recv() => event,
            };

            let Some(event) = event else { break };
            let Some(manager) = manager.upgrade() else { break };

            match event {
                LifecycleEvent::Disconnected(id) => {
                    manager.close_session(&id, CloseReason::Disconnected);
                }
            }
        }
        debug!("Lifecycle event loop stopped");
    }

    async fn run_sweeper(manager: Weak<Self>, timeout: Duration, shutdown: CancellationToken) {
        let period = (timeout / 2).clamp(Duration::from_secs(1), Duration::from_secs(60));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(manager) = manager.upgrade() else { break };
            let closed = manager.sweep_idle(timeout);
            if closed > 0 {
                info!(closed, "Evicted idle sessions");
            }
        }
        debug!("Idle sweeper stopped");
    }
}
