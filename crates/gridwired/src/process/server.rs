//! Serving loop: owns the reply socket and answers one request at a time.
//!
//! ```text
//! Binding ──► Serving ──► Draining ──► Closed
//! ```
//!
//! The loop leaves `Serving` when the [`ShutdownToken`] flips or polling fails
//! for a reason other than a signal interruption. Closing is idempotent.

use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use gridwire_config::{Config, Endpoint};

use crate::dispatch::{self, Dispatcher, ResponseEnvelope, Status};
use crate::network::NetworkService;
use crate::transport::{ReplySocket, TransportError};

use super::PROCESS_TARGET;
use super::shutdown::ShutdownToken;

const PREVIEW_BYTES: usize = 100;

/// Lifecycle state of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Socket bound, loop not yet started.
    ///
    /// A failed bind never produces a [`Server`]: [`Server::bind`] returns the
    /// error and the socket it created is already released, so the failed
    /// attempt goes straight to the closed outcome without a state value.
    Binding,
    /// Polling for and answering requests.
    Serving,
    /// No further receives will be issued.
    Draining,
    /// Socket and context released.
    Closed,
}

/// Why the serving loop stopped.
#[derive(Debug)]
pub enum ServeExit {
    /// The running flag was cleared.
    ShutdownRequested,
    /// Polling failed unrecoverably.
    TransportFailed(TransportError),
}

/// Poll timing of the serving loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Upper bound of a single readiness poll.
    pub poll_timeout: Duration,
    /// Pause after an idle poll.
    pub idle_sleep: Duration,
}

impl Pacing {
    /// Pacing taken from the resolved configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            poll_timeout: config.poll_timeout(),
            idle_sleep: config.idle_sleep(),
        }
    }
}

/// Request/reply server bound to a single endpoint.
#[derive(Debug)]
pub struct Server {
    socket: ReplySocket,
    dispatcher: Dispatcher,
    token: ShutdownToken,
    pacing: Pacing,
    state: ServerState,
}

impl Server {
    /// Binds the reply socket on `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns the bind failure that survived the single rebind attempt. No
    /// server exists in that case, so nothing needs closing.
    pub fn bind(
        endpoint: &Endpoint,
        dispatcher: Dispatcher,
        token: ShutdownToken,
        pacing: Pacing,
    ) -> Result<Self, TransportError> {
        let socket = ReplySocket::bind(endpoint)?;
        Ok(Self {
            socket,
            dispatcher,
            token,
            pacing,
            state: ServerState::Binding,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Serves requests until shutdown is requested or polling fails.
    pub fn serve(&mut self, service: &mut dyn NetworkService) -> ServeExit {
        if self.state != ServerState::Binding {
            return ServeExit::ShutdownRequested;
        }
        self.state = ServerState::Serving;

        let exit = loop {
            if !self.token.is_running() {
                break ServeExit::ShutdownRequested;
            }
            match self.socket.poll_readable(self.pacing.poll_timeout) {
                Ok(true) => self.answer(service),
                Ok(false) => thread::sleep(self.pacing.idle_sleep),
                Err(error) if error.is_interrupted() => {}
                Err(error) => {
                    error!(
                        target: PROCESS_TARGET,
                        error = %error,
                        "unexpected error in server loop"
                    );
                    break ServeExit::TransportFailed(error);
                }
            }
        };

        self.state = ServerState::Draining;
        exit
    }

    /// Reads one request and writes its reply. Transport failures are logged
    /// and the loop carries on.
    fn answer(&self, service: &mut dyn NetworkService) {
        let raw = match self.socket.recv() {
            Ok(raw) => raw,
            Err(error) => {
                warn!(target: PROCESS_TARGET, error = %error, "failed to receive request");
                return;
            }
        };
        debug!(
            target: PROCESS_TARGET,
            bytes = raw.len(),
            preview = %preview(&raw),
            "received message"
        );

        let response = match dispatch::decode(&raw) {
            Ok(message) => self.dispatcher.dispatch(service, message),
            Err(error) => {
                warn!(target: PROCESS_TARGET, error = %error, "rejecting undecodable message");
                ResponseEnvelope::from_dispatch_error(&error)
            }
        };

        if let Err(error) = self.socket.send(&encode(&response)) {
            warn!(
                target: PROCESS_TARGET,
                id = %response.id,
                error = %error,
                "failed to send reply"
            );
        }
    }

    /// Releases the socket and its context. Returns `true` only for the call
    /// that performed the teardown.
    pub fn close(&mut self) -> bool {
        if self.state == ServerState::Closed {
            return false;
        }
        self.state = ServerState::Closed;
        self.socket.close()
    }
}

fn encode(response: &ResponseEnvelope) -> Vec<u8> {
    match response.to_bytes() {
        Ok(bytes) => bytes,
        Err(error) => {
            error!(
                target: PROCESS_TARGET,
                id = %response.id,
                error = %error,
                "failed to serialise reply"
            );
            let fallback = ResponseEnvelope::error(
                Some(&response.id),
                Status::INTERNAL_SERVER_ERROR,
                format!("Server error: {error}"),
            );
            fallback.to_bytes().unwrap_or_default()
        }
    }
}

fn preview(raw: &[u8]) -> String {
    let head = raw.get(..PREVIEW_BYTES).unwrap_or(raw);
    let mut text = String::from_utf8_lossy(head).into_owned();
    if raw.len() > PREVIEW_BYTES {
        text.push_str("...");
    }
    text
}
