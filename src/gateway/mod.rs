//! Session-multiplexed HTTP transport
//!
//! Carries the stateful MCP protocol over plain HTTP. A client opens a
//! session with an `initialize` POST, sends further messages with the
//! returned `mcp-session-id` header, may hold one SSE push channel open
//! per session and ends the session with DELETE.
//!
//! # Architecture
//!
//! - **handshake**: decides whether a body opens a session (pure)
//! - **registry**: the single-lock session table
//! - **binding**: one session's protocol engine and push queue
//! - **lifecycle**: create/activate/close, disconnect events, idle sweep
//! - **router**: the axum endpoints
//! - **error**: status and JSON-RPC code for every rejection
//!
//! Depends on mcp/ only through [`ProtocolEngine`] and [`EngineFactory`].

pub mod binding;
pub mod error;
pub mod handshake;
pub mod lifecycle;
pub mod registry;
pub mod router;
pub mod session;

pub use binding::{EngineFactory, McpEngineFactory, ProtocolEngine, TransportBinding};
pub use error::GatewayError;
pub use lifecycle::{CloseReason, LifecycleManager};
pub use router::{build_router, GatewayState, SESSION_HEADER, SESSION_HEADER_ALIAS};
pub use session::{SessionId, SessionInfo, SessionState};
