//! Structured health reporting for sidecar lifecycle events.

use std::sync::Arc;

use camino::Utf8Path;

use gridwire_config::{Config, Endpoint};

use crate::bootstrap::BootstrapError;
use crate::network::NetworkError;
use crate::transport::TransportError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the pre-flight check finds the endpoint bound.
    fn port_occupied(&self, endpoint: &Endpoint);

    /// Invoked after the holder of the endpoint was evicted.
    fn port_released(&self, endpoint: &Endpoint);

    /// Invoked once the reply socket is bound.
    fn server_bound(&self, endpoint: &Endpoint);

    /// Invoked when binding fails even after the rebind attempt.
    fn bind_failed(&self, endpoint: &Endpoint, error: &TransportError);

    /// Invoked when the last stored network was reloaded at startup.
    fn network_restored(&self, path: &Utf8Path);

    /// Invoked when no stored network could be reloaded at startup.
    fn network_restore_failed(&self, error: &NetworkError);

    /// Invoked when the serving loop observes the shutdown request.
    fn shutdown_requested(&self);

    /// Invoked after the socket and its context were released.
    fn server_closed(&self, endpoint: &Endpoint);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn port_occupied(&self, endpoint: &Endpoint) {
        (**self).port_occupied(endpoint);
    }

    fn port_released(&self, endpoint: &Endpoint) {
        (**self).port_released(endpoint);
    }

    fn server_bound(&self, endpoint: &Endpoint) {
        (**self).server_bound(endpoint);
    }

    fn bind_failed(&self, endpoint: &Endpoint, error: &TransportError) {
        (**self).bind_failed(endpoint, error);
    }

    fn network_restored(&self, path: &Utf8Path) {
        (**self).network_restored(path);
    }

    fn network_restore_failed(&self, error: &NetworkError) {
        (**self).network_restore_failed(error);
    }

    fn shutdown_requested(&self) {
        (**self).shutdown_requested();
    }

    fn server_closed(&self, endpoint: &Endpoint) {
        (**self).server_closed(endpoint);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting sidecar bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            endpoint = %config.endpoint(),
            upload_dir = %config.upload_dir(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "sidecar bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "sidecar bootstrap failed"
        );
    }

    fn port_occupied(&self, endpoint: &Endpoint) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "port_occupied",
            endpoint = %endpoint,
            "endpoint already in use"
        );
    }

    fn port_released(&self, endpoint: &Endpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "port_released",
            endpoint = %endpoint,
            "closed existing process on endpoint"
        );
    }

    fn server_bound(&self, endpoint: &Endpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_bound",
            endpoint = %endpoint,
            "server listening"
        );
    }

    fn bind_failed(&self, endpoint: &Endpoint, error: &TransportError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bind_failed",
            endpoint = %endpoint,
            address_in_use = error.is_address_in_use(),
            error = %error,
            "failed to bind server"
        );
    }

    fn network_restored(&self, path: &Utf8Path) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "network_restored",
            path = %path,
            "previous network loaded"
        );
    }

    fn network_restore_failed(&self, error: &NetworkError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "network_restore_failed",
            error = %error,
            "could not load previous network"
        );
    }

    fn shutdown_requested(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_requested",
            "closing server"
        );
    }

    fn server_closed(&self, endpoint: &Endpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_closed",
            endpoint = %endpoint,
            "server shut down"
        );
    }
}
