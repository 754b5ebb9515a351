//! Shutdown coordination shared by OS signals and the control channel.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::{info, warn};

use super::PROCESS_TARGET;

/// Running flag scoped to one server instance.
///
/// The flag starts out running and flips exactly once; it is never reset.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Builds a token in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the serving loop should keep polling.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.requested.load(Ordering::SeqCst)
    }

    /// Flips the flag. Returns `true` only for the call that performed the
    /// flip.
    pub fn request_shutdown(&self) -> bool {
        !self.requested.swap(true, Ordering::SeqCst)
    }
}

/// Errors reported while installing shutdown listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering the signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal watcher thread could not be started.
    #[error("failed to spawn signal watcher: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Abstraction over OS shutdown notifications.
pub trait ShutdownSignal: Send + Sync {
    /// Starts flipping `token` when a shutdown notification arrives.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be installed.
    fn watch(&self, token: ShutdownToken) -> Result<SignalWatch, ShutdownError>;
}

/// Watches `SIGTERM`, `SIGINT`, `SIGQUIT`, and `SIGHUP` on a dedicated thread.
///
/// The handlers only flip the token; the serving loop notices on its next
/// iteration and tears down in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl SystemShutdownSignal {
    /// Builds a signal listener.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn watch(&self, token: ShutdownToken) -> Result<SignalWatch, ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name("gridwire-signals".to_owned())
            .spawn(move || {
                for signal in signals.forever() {
                    let first = token.request_shutdown();
                    info!(
                        target: PROCESS_TARGET,
                        signal,
                        first,
                        "shutdown signal received"
                    );
                }
            })
            .map_err(|source| {
                handle.close();
                ShutdownError::Spawn { source }
            })?;
        Ok(SignalWatch {
            handle: Some(handle),
            thread: Some(thread),
        })
    }
}

/// Installed signal listener; closed during teardown.
#[derive(Debug, Default)]
pub struct SignalWatch {
    handle: Option<Handle>,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatch {
    /// Watch with nothing installed.
    #[must_use]
    pub fn inert() -> Self {
        Self::default()
    }

    /// Unregisters the handlers and joins the watcher thread.
    pub fn close(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!(target: PROCESS_TARGET, "signal watcher thread panicked");
        }
    }
}

/// Serialises tests that raise real signals; every installed watcher sees
/// every raised signal.
#[cfg(test)]
pub(crate) static SIGNAL_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::PoisonError;
    use std::time::{Duration, Instant};

    use signal_hook::low_level::raise;

    #[test]
    fn only_the_first_request_flips_the_token() {
        let token = ShutdownToken::new();
        let observer = token.clone();
        assert!(observer.is_running());

        assert!(token.request_shutdown());
        assert!(!token.request_shutdown());
        assert!(!observer.is_running());
    }

    #[test]
    fn inert_watch_closes_quietly() {
        SignalWatch::inert().close();
    }

    #[test]
    fn hangup_signal_flips_the_token() {
        let _guard = SIGNAL_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let token = ShutdownToken::new();
        let watch = SystemShutdownSignal::new()
            .watch(token.clone())
            .expect("install signal watcher");

        raise(SIGHUP).expect("raise SIGHUP");
        let deadline = Instant::now() + Duration::from_secs(2);
        while token.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(!token.is_running());
        watch.close();
    }
}
