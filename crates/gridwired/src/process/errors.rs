//! Defines the unified error surface for sidecar launch and supervision.

use std::io;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::TransportError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching the sidecar. Each one is fatal to startup.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping configuration, telemetry, or the filesystem failed.
    #[error("sidecar bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// The endpoint is held by another process that could not be evicted.
    #[error("endpoint {endpoint} is already in use and could not be released")]
    PortOccupied {
        /// Endpoint address.
        endpoint: String,
    },
    /// Installing the shutdown signal listener failed.
    #[error("failed to install shutdown listener: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The control channel thread could not be started.
    #[error("failed to start control channel: {source}")]
    ControlChannel {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Binding the reply socket failed.
    #[error("failed to bind reply socket: {source}")]
    Transport {
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<TransportError> for LaunchError {
    fn from(source: TransportError) -> Self {
        Self::Transport { source }
    }
}
