//! Protocol-level failures detected before any handler runs.
//!
//! Each variant carries the identifier the reply should echo, if any, and
//! renders the exact message clients receive in the `error` field.

use thiserror::Error;

use super::envelope::Status;

/// Errors surfaced while validating and routing a request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The raw message was not valid JSON.
    #[error("Invalid JSON: {message}")]
    MalformedJson {
        /// Parser diagnostic.
        message: String,
    },

    /// The decoded payload was not a JSON object.
    #[error("Invalid message format")]
    InvalidFormat,

    /// The `type` field was absent or not `"request"`.
    #[error("Message type must be 'request'")]
    WrongType {
        /// Identifier supplied by the client, if any.
        id: Option<String>,
    },

    /// The `id` field was absent or empty.
    #[error("Message ID is required")]
    MissingId,

    /// The `method` field was absent or empty.
    #[error("Method is required")]
    MissingMethod {
        /// Identifier supplied by the client.
        id: String,
    },

    /// The `params` field was present but not a JSON object.
    #[error("Params must be an object")]
    InvalidParams {
        /// Identifier supplied by the client.
        id: String,
    },

    /// No handler is registered under the requested method name.
    #[error("Unknown method: {method}")]
    UnknownMethod {
        /// Identifier supplied by the client.
        id: String,
        /// Requested method name.
        method: String,
    },
}

impl DispatchError {
    /// Status code reported to the client.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::UnknownMethod { .. } => Status::NOT_FOUND,
            Self::MalformedJson { .. }
            | Self::InvalidFormat
            | Self::WrongType { .. }
            | Self::MissingId
            | Self::MissingMethod { .. }
            | Self::InvalidParams { .. } => Status::BAD_REQUEST,
        }
    }

    /// Identifier the reply should echo. `None` means a fresh one is minted.
    #[must_use]
    pub fn reply_id(&self) -> Option<&str> {
        match self {
            Self::WrongType { id } => id.as_deref(),
            Self::MissingMethod { id }
            | Self::InvalidParams { id }
            | Self::UnknownMethod { id, .. } => Some(id),
            Self::MalformedJson { .. } | Self::InvalidFormat | Self::MissingId => None,
        }
    }

    /// Builds a malformed-JSON error from a parser failure.
    #[must_use]
    pub fn from_json_error(source: &serde_json::Error) -> Self {
        Self::MalformedJson {
            message: source.to_string(),
        }
    }
}
