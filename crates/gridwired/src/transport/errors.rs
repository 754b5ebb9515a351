//! Error types for reply socket operations.

use thiserror::Error;

/// Errors surfaced while binding or driving the reply socket.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket could not be created from its context.
    #[error("failed to create reply socket: {source}")]
    Context {
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// A socket option could not be applied.
    #[error("failed to set socket option {option}: {source}")]
    Option {
        /// Option name.
        option: &'static str,
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// Binding the endpoint failed, including after the rebind attempt.
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        /// Endpoint address.
        endpoint: String,
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// Polling for readiness failed.
    #[error("failed to poll reply socket: {source}")]
    Poll {
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// Receiving a request failed.
    #[error("failed to receive request: {source}")]
    Receive {
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// Sending a reply failed.
    #[error("failed to send reply: {source}")]
    Send {
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// The socket was used after it was closed.
    #[error("reply socket is closed")]
    Closed,
}

impl TransportError {
    /// Whether the failure is an "address in use" bind conflict.
    #[must_use]
    pub fn is_address_in_use(&self) -> bool {
        matches!(
            self,
            Self::Bind {
                source: zmq::Error::EADDRINUSE,
                ..
            }
        )
    }

    /// Whether the call was interrupted by a signal and may be retried.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            Self::Poll {
                source: zmq::Error::EINTR
            } | Self::Receive {
                source: zmq::Error::EINTR
            }
        )
    }
}
