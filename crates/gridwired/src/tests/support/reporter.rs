//! Test double for [`HealthReporter`] that records structured events for assertions.
//!
//! The recorder captures the sidecar lifecycle telemetry emitted during
//! bootstrap, binding, and teardown so tests can validate observable events.

use std::sync::Mutex;

use camino::Utf8Path;

use gridwire_config::{Config, Endpoint};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::network::NetworkError;
use crate::transport::TransportError;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    PortOccupied(String),
    PortReleased(String),
    ServerBound(String),
    BindFailed(String),
    NetworkRestored(String),
    NetworkRestoreFailed(String),
    ShutdownRequested,
    ServerClosed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn port_occupied(&self, endpoint: &Endpoint) {
        self.record(HealthEvent::PortOccupied(endpoint.to_string()));
    }

    fn port_released(&self, endpoint: &Endpoint) {
        self.record(HealthEvent::PortReleased(endpoint.to_string()));
    }

    fn server_bound(&self, endpoint: &Endpoint) {
        self.record(HealthEvent::ServerBound(endpoint.to_string()));
    }

    fn bind_failed(&self, endpoint: &Endpoint, _error: &TransportError) {
        self.record(HealthEvent::BindFailed(endpoint.to_string()));
    }

    fn network_restored(&self, path: &Utf8Path) {
        self.record(HealthEvent::NetworkRestored(path.to_string()));
    }

    fn network_restore_failed(&self, error: &NetworkError) {
        self.record(HealthEvent::NetworkRestoreFailed(error.to_string()));
    }

    fn shutdown_requested(&self) {
        self.record(HealthEvent::ShutdownRequested);
    }

    fn server_closed(&self, endpoint: &Endpoint) {
        self.record(HealthEvent::ServerClosed(endpoint.to_string()));
    }
}
