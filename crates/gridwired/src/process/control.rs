//! Line-oriented control channel read from standard input.
//!
//! The channel recognises a single directive, `sidecar shutdown`, which flips
//! the shared [`ShutdownToken`]. Any other line is echoed back as invalid. The
//! listener never touches the socket or the network collaborator.

use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use super::shutdown::ShutdownToken;

const CONTROL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::control");

/// Directive that requests a graceful shutdown.
pub const SHUTDOWN_COMMAND: &str = "sidecar shutdown";

/// Why the control loop stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The shutdown directive was received.
    ShutdownRequested,
    /// Input reached end-of-file; shutdown was not requested.
    InputClosed,
    /// Reading input failed.
    InputFailed,
}

/// Reads directives from `input` until shutdown is requested or input ends.
pub fn run_control_loop<R, W>(mut input: R, mut output: W, token: &ShutdownToken) -> ControlOutcome
where
    R: BufRead,
    W: Write,
{
    announce(&mut output, "[sidecar] Waiting for commands...");
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                info!(target: CONTROL_TARGET, "control input closed");
                return ControlOutcome::InputClosed;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(target: CONTROL_TARGET, error = %error, "failed to read control input");
                return ControlOutcome::InputFailed;
            }
        }

        let command = line.trim();
        if command == SHUTDOWN_COMMAND {
            announce(
                &mut output,
                &format!("[sidecar] Received '{SHUTDOWN_COMMAND}' command."),
            );
            token.request_shutdown();
            announce(
                &mut output,
                "[sidecar] Shutdown command executed. Server is shutting down...",
            );
            return ControlOutcome::ShutdownRequested;
        }
        announce(
            &mut output,
            &format!("[sidecar] Invalid command [{command}]. Try again."),
        );
    }
}

/// Runs [`run_control_loop`] on a background thread.
///
/// # Errors
///
/// Returns an error when the thread cannot be spawned.
pub fn spawn_control_channel<R, W>(
    input: R,
    output: W,
    token: ShutdownToken,
) -> io::Result<JoinHandle<ControlOutcome>>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    thread::Builder::new()
        .name("gridwire-control".to_owned())
        .spawn(move || run_control_loop(input, output, &token))
}

fn announce(output: &mut impl Write, message: &str) {
    if let Err(error) = writeln!(output, "{message}").and_then(|()| output.flush()) {
        warn!(target: CONTROL_TARGET, error = %error, "failed to write control output");
    }
}
