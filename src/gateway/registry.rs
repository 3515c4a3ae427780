//! Session registry
//!
//! The only shared mutable state in the gateway. Every mutation happens
//! under one lock, so concurrent handshakes, closes and lookups never
//! observe a torn entry.

use crate::gateway::binding::TransportBinding;
use crate::gateway::error::GatewayError;
use crate::gateway::session::{Session, SessionId, SessionInfo, SessionState};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Session>>,
    max_sessions: usize,
    issued: AtomicU64,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
            issued: AtomicU64::new(0),
        }
    }

    /// Generate a fresh id and register an `Initializing` session under
    /// it. Generation and insertion happen under the same lock.
    pub fn reserve(&self) -> Result<SessionId, GatewayError> {
        let mut sessions = self.sessions.lock();
        if sessions.len() >= self.max_sessions {
            return Err(GatewayError::CapacityExhausted(self.max_sessions));
        }

        let id = loop {
            let candidate = SessionId::generate();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(id.clone(), Session::new(id.clone()));
        self.issued.fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    /// Attach the transport binding to a reserved session. Returns
    /// false if the session is no longer registered.
    pub fn bind(&self, id: &SessionId, binding: Arc<TransportBinding>) -> bool {
        match self.sessions.lock().get_mut(id) {
            Some(session) if session.binding.is_none() => {
                session.binding = Some(binding);
                true
            }
            _ => false,
        }
    }

    /// `Initializing -> Active`. Returns false when the session is gone
    /// or was already activated.
    pub fn activate(&self, id: &SessionId) -> bool {
        match self.sessions.lock().get_mut(id) {
            Some(session) if session.state == SessionState::Initializing => {
                session.state = SessionState::Active;
                session.touch();
                true
            }
            _ => false,
        }
    }

    /// Remove a session, marking it `Closed`. Returns `None` when it
    /// was not registered.
    pub fn remove(&self, id: &SessionId) -> Option<Session> {
        let mut session = self.sessions.lock().remove(id)?;
        session.state = SessionState::Closed;
        Some(session)
    }

    /// Binding of an active session, refreshing its activity time.
    /// Sessions still initializing are not visible here.
    pub fn lookup(&self, id: &SessionId) -> Option<Arc<TransportBinding>> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(id)?;
        if session.state != SessionState::Active {
            return None;
        }
        session.touch();
        session.binding.clone()
    }

    pub fn info(&self, id: &SessionId) -> Option<SessionInfo> {
        self.sessions.lock().get(id).map(Session::info)
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.lock().keys().cloned().collect()
    }

    /// Active sessions with no activity since `cutoff`
    pub fn idle_since(&self, cutoff: DateTime<Utc>) -> Vec<(SessionId, Option<Arc<TransportBinding>>)> {
        self.sessions
            .lock()
            .values()
            .filter(|s| s.state == SessionState::Active && s.last_activity_at < cutoff)
            .map(|s| (s.id.clone(), s.binding.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total ids handed out over the registry's lifetime
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}
