//! Wire envelopes exchanged over the reply socket.
//!
//! Requests arrive as `{type: "request", id, method, params}` and every reply
//! is `{type: "response", id, status, result}`. The reply always carries an
//! identifier: the client's when it was usable, otherwise a fresh UUID so the
//! reply remains addressable.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::errors::DispatchError;

/// Parameters passed to a method handler.
pub type Params = Map<String, Value>;

/// HTTP-like status code carried by a reply envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(u16);

impl Status {
    /// Request served.
    pub const OK: Self = Self(200);
    /// Upload stored and loaded.
    pub const CREATED: Self = Self(201);
    /// Malformed request or missing parameter.
    pub const BAD_REQUEST: Self = Self(400);
    /// Unknown method, network, element, or substation.
    pub const NOT_FOUND: Self = Self(404);
    /// Collaborator or server failure.
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Numeric code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a method handler: a status and the result payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Status reported to the client.
    pub status: Status,
    /// Result payload.
    pub result: Value,
}

impl Reply {
    /// Builds a reply from its parts.
    #[must_use]
    pub const fn new(status: Status, result: Value) -> Self {
        Self { status, result }
    }

    /// Successful reply with status 200.
    #[must_use]
    pub const fn ok(result: Value) -> Self {
        Self::new(Status::OK, result)
    }

    /// Failure reply whose result is `{"error": message}`.
    #[must_use]
    pub fn error(status: Status, message: impl fmt::Display) -> Self {
        Self::new(status, json!({ "error": message.to_string() }))
    }
}

/// Discriminates requests from responses in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Client to sidecar.
    Request,
    /// Sidecar to client.
    Response,
}

/// Validated request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// Client-chosen request identifier.
    pub id: String,
    /// Method name to resolve in the registry.
    pub method: String,
    /// Handler parameters; empty when the client omitted them.
    pub params: Params,
}

impl RequestEnvelope {
    /// Validates a decoded message.
    ///
    /// Checks run in a fixed order: object shape, `type`, `id`, `method`, and
    /// finally `params`. The first violation wins.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] describing the first violated rule.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        let Value::Object(mut object) = value else {
            return Err(DispatchError::InvalidFormat);
        };

        let id = object
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        if object.get("type").and_then(Value::as_str) != Some("request") {
            return Err(DispatchError::WrongType { id });
        }

        let id = id.ok_or(DispatchError::MissingId)?;

        let method = match object.get("method").and_then(Value::as_str) {
            Some(method) if !method.is_empty() => method.to_owned(),
            _ => return Err(DispatchError::MissingMethod { id }),
        };

        let params = match object.remove("params") {
            None | Some(Value::Null) => Params::new(),
            Some(Value::Object(params)) => params,
            Some(_) => return Err(DispatchError::InvalidParams { id }),
        };

        Ok(Self { id, method, params })
    }
}

/// Reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Always [`MessageKind::Response`].
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Echoed or freshly generated identifier.
    pub id: String,
    /// Status code.
    pub status: Status,
    /// Result payload.
    pub result: Value,
}

impl ResponseEnvelope {
    /// Wraps a handler reply for the request `id`.
    #[must_use]
    pub fn success(id: impl Into<String>, reply: Reply) -> Self {
        Self {
            kind: MessageKind::Response,
            id: id.into(),
            status: reply.status,
            result: reply.result,
        }
    }

    /// Builds an error reply, minting an identifier when `id` is absent or
    /// empty.
    #[must_use]
    pub fn error(id: Option<&str>, status: Status, message: impl fmt::Display) -> Self {
        let id = id
            .filter(|id| !id.is_empty())
            .map_or_else(generate_id, str::to_owned);
        Self::success(id, Reply::error(status, message))
    }

    /// Error reply describing a protocol violation.
    #[must_use]
    pub fn from_dispatch_error(error: &DispatchError) -> Self {
        Self::error(error.reply_id(), error.status(), error)
    }

    /// Serialises the envelope to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the result payload cannot be serialised.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Parses raw socket bytes as JSON.
///
/// Any JSON value is accepted here; shape validation belongs to
/// [`RequestEnvelope::from_value`].
///
/// # Errors
///
/// Returns [`DispatchError::MalformedJson`] carrying the parser message.
pub fn decode(raw: &[u8]) -> Result<Value, DispatchError> {
    serde_json::from_slice(raw).map_err(|error| DispatchError::from_json_error(&error))
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
