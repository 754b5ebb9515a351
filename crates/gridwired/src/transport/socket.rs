//! ZeroMQ reply socket owned by the serving loop.

use std::time::Duration;

use tracing::{debug, info, warn};

use gridwire_config::Endpoint;

use super::{TRANSPORT_TARGET, TransportError};

/// Bound REP socket together with the context that owns it.
///
/// Linger is disabled so closing never blocks on undelivered replies, and
/// `IMMEDIATE` stops messages queueing towards peers that are not connected.
pub struct ReplySocket {
    address: String,
    socket: Option<zmq::Socket>,
    context: Option<zmq::Context>,
}

impl std::fmt::Debug for ReplySocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplySocket")
            .field("address", &self.address)
            .field("open", &self.socket.is_some())
            .finish()
    }
}

impl ReplySocket {
    /// Binds a reply socket on `endpoint`.
    ///
    /// When the address is reported in use, the socket unbinds and binds once
    /// more before giving up.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the socket cannot be created, configured,
    /// or bound.
    pub fn bind(endpoint: &Endpoint) -> Result<Self, TransportError> {
        let address = endpoint.to_string();
        let context = zmq::Context::new();
        let socket = context
            .socket(zmq::REP)
            .map_err(|source| TransportError::Context { source })?;
        socket
            .set_linger(0)
            .map_err(|source| TransportError::Option {
                option: "ZMQ_LINGER",
                source,
            })?;
        socket
            .set_immediate(true)
            .map_err(|source| TransportError::Option {
                option: "ZMQ_IMMEDIATE",
                source,
            })?;

        if let Err(source) = socket.bind(&address) {
            if source != zmq::Error::EADDRINUSE {
                return Err(TransportError::Bind { endpoint: address, source });
            }
            warn!(
                target: TRANSPORT_TARGET,
                endpoint = %address,
                "address already in use, attempting rebind"
            );
            // Unbinding an address this socket never bound fails with ENOENT.
            let _ = socket.unbind(&address);
            socket
                .bind(&address)
                .map_err(|source| TransportError::Bind {
                    endpoint: address.clone(),
                    source,
                })?;
            info!(target: TRANSPORT_TARGET, endpoint = %address, "rebind succeeded");
        }

        info!(target: TRANSPORT_TARGET, endpoint = %address, "reply socket bound");
        Ok(Self {
            address,
            socket: Some(socket),
            context: Some(context),
        })
    }

    /// Whether [`ReplySocket::close`] has not run yet.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn socket(&self) -> Result<&zmq::Socket, TransportError> {
        self.socket.as_ref().ok_or(TransportError::Closed)
    }

    /// Waits up to `timeout` for an inbound request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Poll`] when polling fails, including when a
    /// signal interrupts it.
    pub fn poll_readable(&self, timeout: Duration) -> Result<bool, TransportError> {
        let timeout_ms = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        let ready = self
            .socket()?
            .poll(zmq::POLLIN, timeout_ms)
            .map_err(|source| TransportError::Poll { source })?;
        Ok(ready > 0)
    }

    /// Receives one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Receive`] when the read fails.
    pub fn recv(&self) -> Result<Vec<u8>, TransportError> {
        self.socket()?
            .recv_bytes(0)
            .map_err(|source| TransportError::Receive { source })
    }

    /// Sends the reply to the request last received.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the write fails.
    pub fn send(&self, reply: &[u8]) -> Result<(), TransportError> {
        self.socket()?
            .send(reply, 0)
            .map_err(|source| TransportError::Send { source })
    }

    /// Unbinds, closes the socket, and terminates its context.
    ///
    /// Returns `true` when this call performed the teardown and `false` when
    /// the socket was already closed.
    pub fn close(&mut self) -> bool {
        let Some(socket) = self.socket.take() else {
            return false;
        };
        if let Err(error) = socket.unbind(&self.address) {
            debug!(
                target: TRANSPORT_TARGET,
                endpoint = %self.address,
                error = %error,
                "unbind during close failed"
            );
        }
        drop(socket);
        if let Some(mut context) = self.context.take()
            && let Err(error) = context.destroy()
        {
            warn!(
                target: TRANSPORT_TARGET,
                error = %error,
                "failed to terminate socket context"
            );
        }
        info!(target: TRANSPORT_TARGET, endpoint = %self.address, "reply socket closed");
        true
    }
}

impl Drop for ReplySocket {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::free_tcp_endpoint;

    #[test]
    fn close_runs_once() {
        let endpoint = free_tcp_endpoint();
        let mut socket = ReplySocket::bind(&endpoint).expect("bind reply socket");
        assert!(socket.is_open());
        assert!(socket.close());
        assert!(!socket.close());
        assert!(matches!(socket.recv(), Err(TransportError::Closed)));
    }

    #[test]
    fn closing_releases_the_endpoint() {
        let endpoint = free_tcp_endpoint();
        let mut first = ReplySocket::bind(&endpoint).expect("first bind");
        first.close();
        let mut second = ReplySocket::bind(&endpoint).expect("endpoint released");
        second.close();
    }

    #[test]
    fn second_bind_on_a_held_endpoint_fails_after_one_retry() {
        let endpoint = free_tcp_endpoint();
        let mut holder = ReplySocket::bind(&endpoint).expect("first bind");

        let error = ReplySocket::bind(&endpoint).expect_err("endpoint is held");

        assert!(matches!(error, TransportError::Bind { .. }));
        assert!(error.is_address_in_use());
        assert!(holder.close());
    }

    #[test]
    fn idle_poll_times_out() {
        let endpoint = free_tcp_endpoint();
        let socket = ReplySocket::bind(&endpoint).expect("bind reply socket");
        let ready = socket
            .poll_readable(Duration::from_millis(10))
            .expect("poll succeeds");
        assert!(!ready);
    }
}
