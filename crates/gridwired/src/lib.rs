//! Request/reply sidecar serving power-network queries.
//!
//! The sidecar binds a single ZeroMQ REP endpoint configured via
//! [`gridwire_config`] and answers JSON envelopes one at a time:
//!
//! 1. The [`transport`] layer owns the bound socket and checks at startup
//!    whether another process already holds the endpoint.
//! 2. The [`dispatch`] layer validates envelopes, resolves the method in a
//!    fixed registry, runs the handler, and always produces a reply.
//! 3. Handlers reach the loaded network only through the [`NetworkService`]
//!    collaborator; [`IidmNetworkService`] is the built-in implementation.
//!
//! Shutdown is cooperative. OS signals and the `sidecar shutdown` directive on
//! standard input both flip one [`ShutdownToken`]; the serving loop notices on
//! its next poll, releases the socket, and returns. The process then exits
//! with status zero.

mod bootstrap;
pub mod dispatch;
mod health;
pub mod network;
mod process;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Sidecar, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use network::{IidmNetworkService, NetworkError, NetworkService};
pub use process::{
    ControlOutcome, LaunchError, Pacing, SHUTDOWN_COMMAND, ServeExit, Server, ServerState,
    ShutdownError, ShutdownSignal, ShutdownToken, SignalWatch, SystemShutdownSignal,
    run_control_loop, run_sidecar, spawn_control_channel,
};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
