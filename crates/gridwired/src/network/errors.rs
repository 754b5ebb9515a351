//! Failures reported by the network collaborator.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while loading or querying a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// No network has been loaded yet.
    #[error("No network loaded")]
    NotLoaded,
    /// The upload folder holds no stored network file.
    #[error("No stored network")]
    NoStoredNetwork,
    /// Reading or writing a network file failed.
    #[error("failed to access '{path}': {source}")]
    Io {
        /// File or folder being accessed.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid network document.
    #[error("failed to parse network file '{path}': {source}")]
    Parse {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The identifier is not part of the current network.
    #[error("The identifier '{id}' doesn't exist in the network")]
    UnknownElement {
        /// Requested identifier.
        id: String,
    },
    /// The element exists but cannot be drawn.
    #[error("cannot draw '{id}': {reason}")]
    Diagram {
        /// Requested identifier.
        id: String,
        /// Why no diagram was produced.
        reason: &'static str,
    },
}
