//! Startup check for an endpoint that is already bound, and best-effort
//! eviction of whichever process holds it.

use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use gridwire_config::Endpoint;

use super::TRANSPORT_TARGET;

const RELEASE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Whether `endpoint` is already bound by another socket.
///
/// A throwaway REP socket attempts the bind. Success means the endpoint is
/// free, and the throwaway bind is released before returning.
#[must_use]
pub fn is_bound(endpoint: &Endpoint) -> bool {
    let address = endpoint.to_string();
    let context = zmq::Context::new();
    let Ok(socket) = context.socket(zmq::REP) else {
        return false;
    };
    if socket.set_linger(0).is_err() {
        debug!(target: TRANSPORT_TARGET, "could not disable linger on check socket");
    }
    match socket.bind(&address) {
        Ok(()) => {
            let _ = socket.unbind(&address);
            false
        }
        Err(error) => {
            debug!(
                target: TRANSPORT_TARGET,
                endpoint = %address,
                error = %error,
                "endpoint availability bind failed"
            );
            true
        }
    }
}

/// Polls [`is_bound`] until the endpoint is free or `timeout` elapses.
#[must_use]
pub fn wait_until_free(endpoint: &Endpoint, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if !is_bound(endpoint) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(RELEASE_POLL_INTERVAL);
    }
}

/// Platform capability for forcibly freeing a TCP port.
pub trait PortReleaser: Send + Sync {
    /// Terminates processes holding `port`. Returns whether the attempt is
    /// believed to have succeeded; callers must still handle a later bind
    /// failure.
    fn release(&self, port: u16) -> bool;
}

/// Releaser that lists listeners with `lsof` and sends them `SIGKILL`.
///
/// Only sockets in the `LISTEN` state count as holders; clients connected to
/// the port are left alone. The current process is never signalled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LsofPortReleaser;

impl LsofPortReleaser {
    /// Builds a new releaser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PortReleaser for LsofPortReleaser {
    fn release(&self, port: u16) -> bool {
        let output = match Command::new("lsof")
            .args(lsof_args(port))
            .output()
        {
            Ok(output) => output,
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    port,
                    error = %error,
                    "failed to run lsof"
                );
                return false;
            }
        };

        let own_pid = std::process::id();
        let holders = holder_pids(&String::from_utf8_lossy(&output.stdout), own_pid);
        for pid in holders {
            match kill(Pid::from_raw(pid), Signal::SIGKILL) {
                Ok(()) => info!(
                    target: TRANSPORT_TARGET,
                    port,
                    pid,
                    "terminated process holding port"
                ),
                Err(errno) => warn!(
                    target: TRANSPORT_TARGET,
                    port,
                    pid,
                    error = %errno,
                    "failed to terminate process holding port"
                ),
            }
        }
        true
    }
}

/// Releaser for platforms without an eviction mechanism.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPortReleaser;

impl PortReleaser for NoopPortReleaser {
    fn release(&self, port: u16) -> bool {
        debug!(target: TRANSPORT_TARGET, port, "port release not supported");
        false
    }
}

/// Arguments listing the pids listening on `port`, one per line.
fn lsof_args(port: u16) -> [String; 3] {
    ["-ti".to_owned(), format!("tcp:{port}"), "-sTCP:LISTEN".to_owned()]
}

/// Parses `lsof -t` output, skipping blanks, garbage, and our own pid.
fn holder_pids(listing: &str, own_pid: u32) -> Vec<i32> {
    listing
        .lines()
        .filter_map(|line| line.trim().parse::<i32>().ok())
        .filter(|pid| *pid > 0 && u32::try_from(*pid).ok() != Some(own_pid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::free_tcp_endpoint;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{Child, Stdio};

    const LISTENER: &str = "import socket, time\n\
s = socket.socket()\n\
s.bind(('127.0.0.1', 0))\n\
s.listen()\n\
print(s.getsockname()[1], flush=True)\n\
time.sleep(60)\n";

    const CLIENT: &str = "import socket, sys, time\n\
c = socket.create_connection(('127.0.0.1', int(sys.argv[1])))\n\
print('connected', flush=True)\n\
time.sleep(60)\n";

    /// Helper process killed when dropped.
    struct Helper(Child);

    impl Helper {
        fn spawn(script: &str, args: &[String]) -> Option<(Self, String)> {
            let mut child = Command::new("python3")
                .arg("-c")
                .arg(script)
                .args(args)
                .stdout(Stdio::piped())
                .spawn()
                .ok()?;
            let stdout = child.stdout.take()?;
            let helper = Self(child);
            let mut line = String::new();
            BufReader::new(stdout).read_line(&mut line).ok()?;
            Some((helper, line.trim().to_owned()))
        }
    }

    impl Drop for Helper {
        fn drop(&mut self) {
            let _ = self.0.kill();
            let _ = self.0.wait();
        }
    }

    fn lsof_available() -> bool {
        Command::new("lsof")
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    #[test]
    fn listener_held_port_is_reported_bound() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        let endpoint = Endpoint::tcp("127.0.0.1", port);

        assert!(is_bound(&endpoint));
        drop(listener);
        assert!(wait_until_free(&endpoint, Duration::from_secs(2)));
    }

    #[test]
    fn free_port_is_reported_free() {
        assert!(!is_bound(&free_tcp_endpoint()));
    }

    #[test]
    fn lsof_listing_skips_own_pid_and_noise() {
        let pids = holder_pids("123\n\n456\nabc\n  789 \n", 456);
        assert_eq!(pids, vec![123, 789]);
    }

    #[test]
    fn lsof_query_is_restricted_to_listeners() {
        assert_eq!(lsof_args(4267), ["-ti", "tcp:4267", "-sTCP:LISTEN"]);
    }

    #[test]
    fn release_spares_connected_clients() {
        if !lsof_available() {
            eprintln!("skipping: lsof is not installed");
            return;
        }
        let Some((mut listener, port)) = Helper::spawn(LISTENER, &[]) else {
            eprintln!("skipping: python3 is not available");
            return;
        };
        let (mut client, greeting) =
            Helper::spawn(CLIENT, &[port.clone()]).expect("spawn connected client");
        assert_eq!(greeting, "connected");
        let port: u16 = port.parse().expect("listener reports its port");

        assert!(LsofPortReleaser::new().release(port));

        let status = listener.0.wait().expect("listener exits");
        assert_eq!(status.signal(), Some(9));
        assert!(
            client.0.try_wait().expect("query client").is_none(),
            "connected client must survive the release"
        );
    }

    #[test]
    fn noop_releaser_never_claims_success() {
        assert!(!NoopPortReleaser.release(4267));
    }
}
