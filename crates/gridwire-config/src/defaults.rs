use camino::Utf8PathBuf;

#[cfg(unix)]
use dirs::data_local_dir;

use crate::endpoint::Endpoint;

/// Host the reply socket binds to by default.
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Default TCP port of the reply socket.
pub const DEFAULT_TCP_PORT: u16 = 4267;

/// Default log filter expression used by the sidecar.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Number of stored network files retained after pruning.
pub const DEFAULT_MAX_STORED_NETWORKS: usize = 5;

/// Upper bound of a single readiness poll, in milliseconds.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;

/// Pause between poll iterations, in milliseconds.
pub const DEFAULT_IDLE_SLEEP_MS: u64 = 10;

/// Whether a process holding the configured port may be evicted.
pub const DEFAULT_FORCE_RELEASE: bool = true;

/// Whether the standard-input control channel is enabled.
pub const DEFAULT_CONTROL_CHANNEL: bool = true;

const UPLOAD_FOLDER: &str = "uploads";

/// Default log filter expression used by the sidecar.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the sidecar.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Computes the default reply endpoint.
#[must_use]
pub fn default_endpoint() -> Endpoint {
    Endpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}

/// Computes the default upload folder.
///
/// On Unix the folder lives under the user's local data directory; elsewhere,
/// or when that directory is unknown, it is relative to the working directory.
#[must_use]
pub fn default_upload_dir() -> Utf8PathBuf {
    default_upload_dir_inner()
}

#[cfg(unix)]
fn default_upload_dir_inner() -> Utf8PathBuf {
    data_local_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .map_or_else(
            || Utf8PathBuf::from(UPLOAD_FOLDER),
            |base| base.join("gridwire").join(UPLOAD_FOLDER),
        )
}

#[cfg(not(unix))]
fn default_upload_dir_inner() -> Utf8PathBuf {
    Utf8PathBuf::from(UPLOAD_FOLDER)
}

pub(crate) const fn default_max_stored_networks() -> usize {
    DEFAULT_MAX_STORED_NETWORKS
}

pub(crate) const fn default_poll_timeout_ms() -> u64 {
    DEFAULT_POLL_TIMEOUT_MS
}

pub(crate) const fn default_idle_sleep_ms() -> u64 {
    DEFAULT_IDLE_SLEEP_MS
}

pub(crate) const fn default_force_release() -> bool {
    DEFAULT_FORCE_RELEASE
}

pub(crate) const fn default_control_channel() -> bool {
    DEFAULT_CONTROL_CHANNEL
}
