//! Session identity and state

use crate::gateway::binding::TransportBinding;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Longest session id accepted from a client header
const MAX_ID_LEN: usize = 128;

/// Opaque session identifier
///
/// Generated ids are 128-bit random (UUID v4) rendered as 32 hex
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept a client-supplied id. Only visible ASCII is allowed, as
    /// required for an HTTP header value.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty()
            || raw.len() > MAX_ID_LEN
            || !raw.bytes().all(|b| (0x21..=0x7e).contains(&b))
        {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Initializing,
    Active,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Initializing => "initializing",
            SessionState::Active => "active",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Registry entry for one session
pub struct Session {
    pub id: SessionId,
    pub state: SessionState,
    /// Set once the protocol engine has been created
    pub binding: Option<Arc<TransportBinding>>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: SessionState::Initializing,
            binding: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            state: self.state,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            push_open: self.binding.as_ref().is_some_and(|b| b.is_push_open()),
        }
    }
}

/// Point-in-time snapshot of a session, safe to log or serialize
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub push_open: bool,
}
