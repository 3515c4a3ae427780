//! HTTP request router for the gateway
//!
//! `POST /gateway` carries protocol messages, `GET /gateway` opens the
//! session's SSE push channel and `DELETE /gateway` terminates it.
//! Every decision is made from the session header and the registry
//! state at the time of the request.

use crate::gateway::binding::{DispatchOutcome, TransportBinding};
use crate::gateway::error::GatewayError;
use crate::gateway::handshake::{Handshake, HandshakeValidator, InboundBody};
use crate::gateway::lifecycle::{CloseReason, LifecycleManager};
use crate::gateway::session::SessionId;
use crate::http::handlers::health_handler;
use crate::http::middleware::log_request;
use crate::mcp::protocol::JsonRpcResponse;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

/// Canonical session header
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Accepted on requests and echoed on handshake responses
pub const SESSION_HEADER_ALIAS: &str = "session-id";

/// Path serving the gateway
pub const GATEWAY_PATH: &str = "/gateway";

/// Shared state for gateway handlers
#[derive(Clone)]
pub struct GatewayState {
    pub lifecycle: Arc<LifecycleManager>,
}

/// Build the HTTP router: gateway endpoints, health probe, request
/// logging and CORS
pub fn build_router(lifecycle: Arc<LifecycleManager>) -> Router {
    let cors = CorsLayer::permissive().expose_headers([
        HeaderName::from_static(SESSION_HEADER),
        HeaderName::from_static(SESSION_HEADER_ALIAS),
    ]);

    Router::new()
        .route(
            GATEWAY_PATH,
            get(open_push_channel)
                .post(handle_post)
                .delete(terminate_session),
        )
        .route("/health", get(health_handler))
        .with_state(GatewayState { lifecycle })
        .layer(middleware::from_fn(log_request))
        .layer(cors)
}

/// Session header as sent by the client. `Err` means a header was sent
/// but is not a usable id.
fn session_header(headers: &HeaderMap) -> Result<Option<SessionId>, GatewayError> {
    let raw = headers
        .get(SESSION_HEADER)
        .or_else(|| headers.get(SESSION_HEADER_ALIAS));

    match raw {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(SessionId::parse)
            .map(Some)
            .ok_or(GatewayError::UnknownSession),
    }
}

/// Resolve the header to an active session or fail
fn require_session(
    state: &GatewayState,
    headers: &HeaderMap,
) -> Result<(SessionId, Arc<TransportBinding>), GatewayError> {
    let id = session_header(headers)?.ok_or(GatewayError::UnknownSession)?;
    let binding = state
        .lifecycle
        .lookup(&id)
        .ok_or(GatewayError::UnknownSession)?;
    Ok((id, binding))
}

fn with_session_headers(mut response: Response, id: &SessionId) -> Response {
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        let headers = response.headers_mut();
        headers.insert(HeaderName::from_static(SESSION_HEADER), value.clone());
        headers.insert(HeaderName::from_static(SESSION_HEADER_ALIAS), value);
    }
    response
}

fn responses_body(mut responses: Vec<JsonRpcResponse>, is_batch: bool) -> Response {
    if !is_batch && responses.len() == 1 {
        if let Some(single) = responses.pop() {
            return (StatusCode::OK, Json(single)).into_response();
        }
    }
    (StatusCode::OK, Json(responses)).into_response()
}

/// `POST /gateway`
pub async fn handle_post(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match route_post(&state, &headers, &body).await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Gateway POST rejected");
            e.into_response()
        }
    }
}

async fn route_post(
    state: &GatewayState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, GatewayError> {
    // An id that does not resolve is rejected before the body is read
    let binding = match session_header(headers)? {
        Some(id) => Some(
            state
                .lifecycle
                .lookup(&id)
                .ok_or(GatewayError::UnknownSession)?,
        ),
        None => None,
    };

    let inbound = InboundBody::parse(body)?;
    let handshake = HandshakeValidator::classify(&inbound)?;

    match (binding, handshake) {
        (None, Handshake::Initiate) => handshake_session(state, inbound).await,
        (None, Handshake::NotHandshake) => Err(GatewayError::NoSessionId),
        (Some(_), Handshake::Initiate) => Err(GatewayError::AlreadyInitialized),
        (Some(binding), Handshake::NotHandshake) => {
            match binding.dispatch(inbound.messages).await? {
                DispatchOutcome::Responses(responses) => {
                    Ok(responses_body(responses, inbound.is_batch))
                }
                DispatchOutcome::Accepted => Ok(StatusCode::ACCEPTED.into_response()),
            }
        }
    }
}

/// Create a session, run `initialize` through its engine and activate
/// it. Any failure rolls the session back.
async fn handshake_session(
    state: &GatewayState,
    inbound: InboundBody,
) -> Result<Response, GatewayError> {
    let lifecycle = &state.lifecycle;
    let (id, binding) = lifecycle.create_session()?;

    let responses = match binding.dispatch(inbound.messages).await {
        Ok(DispatchOutcome::Responses(responses)) => responses,
        Ok(DispatchOutcome::Accepted) => {
            lifecycle.close_session(&id, CloseReason::RolledBack);
            return Err(GatewayError::HandshakeFailed(
                "initialize produced no response".to_string(),
            ));
        }
        Err(e) => {
            lifecycle.close_session(&id, CloseReason::RolledBack);
            return Err(GatewayError::HandshakeFailed(e.to_string()));
        }
    };

    if let Some(error) = responses.iter().find_map(|r| r.error.as_ref()) {
        warn!(session_id = %id, code = error.code, reason = %error.message, "Initialize rejected by engine");
        lifecycle.close_session(&id, CloseReason::RolledBack);
        return Err(GatewayError::HandshakeFailed(error.message.clone()));
    }

    lifecycle.activate_session(&id);

    Ok(with_session_headers(
        responses_body(responses, inbound.is_batch),
        &id,
    ))
}

/// `GET /gateway`
pub async fn open_push_channel(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    let (id, binding) = match require_session(&state, &headers) {
        Ok(found) => found,
        Err(e) => return e.into_plain_response(),
    };

    let config = state.lifecycle.config();
    let stream = match binding.open_push_stream(config.close_on_disconnect) {
        Ok(stream) => stream,
        Err(e) => return e.into_plain_response(),
    };

    let events = stream.map(|notification| Event::default().event("message").json_data(notification));
    let keep_alive = KeepAlive::new().interval(Duration::from_secs(config.keep_alive_sec));

    with_session_headers(Sse::new(events).keep_alive(keep_alive).into_response(), &id)
}

/// `DELETE /gateway`
pub async fn terminate_session(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    match require_session(&state, &headers) {
        Ok((id, _binding)) => {
            state.lifecycle.close_session(&id, CloseReason::Terminated);
            StatusCode::OK.into_response()
        }
        Err(e) => e.into_plain_response(),
    }
}
