//! Handshake validation
//!
//! Pure functions that decode a POST body and decide whether it opens a
//! new session. Nothing here touches the registry.
//!
//! Two shapes open a session: a JSON-RPC `initialize` request, and the
//! bare `{"type":"initialize"}` message. The bare form is rewritten into
//! an `initialize` request so the engine only ever sees JSON-RPC.

use crate::gateway::error::GatewayError;
use crate::mcp::protocol::{
    InitializeParams, JsonRpcMessage, JsonRpcRequest, JSONRPC_VERSION, LATEST_PROTOCOL_VERSION,
};
use serde_json::{json, Value};

/// Method name that opens a session
pub const HANDSHAKE_METHOD: &str = "initialize";

/// Client name reported for sessions opened with the bare handshake
pub const BARE_HANDSHAKE_CLIENT: &str = "gateway-client";

/// A decoded POST body
#[derive(Debug, Clone)]
pub struct InboundBody {
    pub messages: Vec<JsonRpcMessage>,
    /// The body was a JSON array; responses go back as an array too
    pub is_batch: bool,
}

impl InboundBody {
    /// Decode a body into JSON-RPC messages
    pub fn parse(body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| GatewayError::ParseError(e.to_string()))?;

        let (items, is_batch) = match value {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(GatewayError::InvalidMessage("Empty batch".to_string()));
                }
                (items, true)
            }
            single => (vec![single], false),
        };

        let messages = items
            .into_iter()
            .map(|item| {
                let item = expand_bare_handshake(item);
                JsonRpcMessage::from_value(item).map_err(|e| GatewayError::InvalidMessage(e.message))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { messages, is_batch })
    }
}

/// `{"type":"initialize"}` (no `jsonrpc` member) becomes an `initialize`
/// request with id 0 and the latest protocol version. `clientInfo`, if
/// present, is carried over. Anything else is returned untouched.
fn expand_bare_handshake(item: Value) -> Value {
    let is_bare = item.get("jsonrpc").is_none()
        && item.get("type").and_then(Value::as_str) == Some(HANDSHAKE_METHOD);
    if !is_bare {
        return item;
    }

    let client_info = item
        .get("clientInfo")
        .cloned()
        .unwrap_or_else(|| json!({ "name": BARE_HANDSHAKE_CLIENT, "version": "" }));

    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": 0,
        "method": HANDSHAKE_METHOD,
        "params": {
            "protocolVersion": LATEST_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": client_info,
        }
    })
}

/// Outcome of inspecting a body for a handshake
#[derive(Debug, Clone, PartialEq)]
pub enum Handshake {
    /// Exactly one well-formed `initialize` request
    Initiate,
    /// No `initialize` request at all
    NotHandshake,
}

pub struct HandshakeValidator;

impl HandshakeValidator {
    /// Decide whether `body` is a session-initiating message.
    ///
    /// An `initialize` request must be the only message in the body and
    /// must carry well-formed initialize params.
    pub fn classify(body: &InboundBody) -> Result<Handshake, GatewayError> {
        let mut initializers = body.messages.iter().filter_map(|m| match m {
            JsonRpcMessage::Request(r) if r.method == HANDSHAKE_METHOD => Some(r),
            _ => None,
        });

        let Some(request) = initializers.next() else {
            return Ok(Handshake::NotHandshake);
        };

        if body.messages.len() > 1 {
            return Err(GatewayError::BatchInitialize);
        }

        Self::validate_params(request)?;
        Ok(Handshake::Initiate)
    }

    fn validate_params(request: &JsonRpcRequest) -> Result<(), GatewayError> {
        let params = request.params.clone().unwrap_or(Value::Null);
        serde_json::from_value::<InitializeParams>(params)
            .map(|_| ())
            .map_err(|e| GatewayError::InvalidMessage(format!("Invalid initialize params: {e}")))
    }
}
