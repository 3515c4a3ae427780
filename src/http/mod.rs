//! Shared HTTP plumbing
//!
//! Request-logging middleware and the `/health` probe. The gateway
//! router mounts both.

pub mod handlers;
pub mod middleware;

pub use handlers::health_handler;
pub use middleware::log_request;
