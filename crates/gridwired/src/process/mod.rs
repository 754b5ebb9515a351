//! Process lifecycle: launch sequencing, the serving loop, and the two
//! shutdown paths (OS signals and the standard-input control channel).

pub(crate) mod control;
mod errors;
pub(crate) mod launch;
pub(crate) mod server;
pub(crate) mod shutdown;

use std::time::Duration;

pub use control::{ControlOutcome, SHUTDOWN_COMMAND, run_control_loop, spawn_control_channel};
pub use errors::LaunchError;
pub use launch::run_sidecar;
pub use server::{Pacing, ServeExit, Server, ServerState};
pub use shutdown::{
    ShutdownError, ShutdownSignal, ShutdownToken, SignalWatch, SystemShutdownSignal,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const RELEASE_TIMEOUT: Duration = Duration::from_secs(2);
