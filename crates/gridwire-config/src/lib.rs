//! Shared configuration for the gridwire sidecar.
//!
//! Configuration is layered by [`ortho_config`]: compiled defaults first, then
//! an optional configuration file, then `GRIDWIRE_*` environment variables,
//! and finally command-line flags. The resolved [`Config`] describes the
//! request/reply endpoint the sidecar binds, where uploaded network files are
//! stored, how the serving loop paces its polling, and how telemetry is
//! emitted.

mod defaults;
mod endpoint;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use defaults::{
    DEFAULT_CONTROL_CHANNEL, DEFAULT_FORCE_RELEASE, DEFAULT_IDLE_SLEEP_MS, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_STORED_NETWORKS, DEFAULT_POLL_TIMEOUT_MS, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT,
    default_endpoint, default_log_filter, default_log_filter_string, default_log_format,
    default_upload_dir,
};
pub use endpoint::{Endpoint, EndpointParseError, EndpointPreparationError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved sidecar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "GRIDWIRE")]
pub struct Config {
    /// Endpoint the reply socket binds to.
    #[serde(default = "defaults::default_endpoint")]
    #[ortho_config(default = defaults::default_endpoint())]
    pub endpoint: Endpoint,
    /// Tracing filter expression, for example `info` or `gridwired=debug`.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured telemetry.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Folder holding uploaded network files.
    #[serde(default = "defaults::default_upload_dir")]
    #[ortho_config(default = defaults::default_upload_dir())]
    pub upload_dir: Utf8PathBuf,
    /// Number of stored network files kept after pruning.
    #[serde(default = "defaults::default_max_stored_networks")]
    #[ortho_config(default = DEFAULT_MAX_STORED_NETWORKS)]
    pub max_stored_networks: usize,
    /// Upper bound, in milliseconds, of a single readiness poll.
    #[serde(default = "defaults::default_poll_timeout_ms")]
    #[ortho_config(default = DEFAULT_POLL_TIMEOUT_MS)]
    pub poll_timeout_ms: u64,
    /// Pause, in milliseconds, between poll iterations.
    #[serde(default = "defaults::default_idle_sleep_ms")]
    #[ortho_config(default = DEFAULT_IDLE_SLEEP_MS)]
    pub idle_sleep_ms: u64,
    /// Whether a process holding the configured port may be evicted at startup.
    #[serde(default = "defaults::default_force_release")]
    #[ortho_config(default = DEFAULT_FORCE_RELEASE)]
    pub force_release: bool,
    /// Whether the line-oriented control channel listens on standard input.
    #[serde(default = "defaults::default_control_channel")]
    #[ortho_config(default = DEFAULT_CONTROL_CHANNEL)]
    pub control_channel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            upload_dir: default_upload_dir(),
            max_stored_networks: DEFAULT_MAX_STORED_NETWORKS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            idle_sleep_ms: DEFAULT_IDLE_SLEEP_MS,
            force_release: DEFAULT_FORCE_RELEASE,
            control_channel: DEFAULT_CONTROL_CHANNEL,
        }
    }
}

impl Config {
    /// Endpoint the reply socket binds to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Telemetry output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Folder holding uploaded network files.
    #[must_use]
    pub fn upload_dir(&self) -> &Utf8Path {
        self.upload_dir.as_path()
    }

    /// Number of stored network files kept after pruning.
    #[must_use]
    pub const fn max_stored_networks(&self) -> usize {
        self.max_stored_networks
    }

    /// Upper bound of a single readiness poll.
    #[must_use]
    pub const fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Pause between poll iterations.
    #[must_use]
    pub const fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }

    /// Whether port eviction is permitted at startup.
    #[must_use]
    pub const fn force_release(&self) -> bool {
        self.force_release
    }

    /// Whether the standard-input control channel is enabled.
    #[must_use]
    pub const fn control_channel(&self) -> bool {
        self.control_channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_loopback_port() {
        let config = Config::default();
        assert_eq!(config.endpoint().to_string(), "tcp://127.0.0.1:4267");
        assert_eq!(config.endpoint().tcp_port(), Some(DEFAULT_TCP_PORT));
        assert_eq!(config.max_stored_networks(), 5);
        assert_eq!(config.poll_timeout(), Duration::from_millis(100));
        assert_eq!(config.idle_sleep(), Duration::from_millis(10));
    }
}
