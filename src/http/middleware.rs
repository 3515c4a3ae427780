//! Request logging for the HTTP surface

use crate::gateway::{SESSION_HEADER, SESSION_HEADER_ALIAS};
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Log each request with its session (if any), status and duration.
///
/// Client errors are logged at WARN and server errors at ERROR. For SSE
/// responses the duration is time to the response head, not the life
/// of the stream.
pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let session = request
        .headers()
        .get(SESSION_HEADER)
        .or_else(|| request.headers().get(SESSION_HEADER_ALIAS))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        error!(%method, %uri, session = %session, status, duration_ms, "Request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %uri, session = %session, status, duration_ms, "Request rejected");
    } else {
        info!(%method, %uri, session = %session, status, duration_ms, "Request completed");
    }

    response
}
