//! Supervises sidecar launch sequencing and teardown.
//!
//! Teardown is synchronous: the serving loop returns, the socket and its
//! context are released, the signal watcher is closed, and only then does
//! control return to `main`. Neither shutdown path terminates the process
//! itself.

use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;

use tracing::{info, warn};

use gridwire_config::{Config, Endpoint};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::{Dispatcher, MethodRegistry};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::network::{IidmNetworkService, NetworkService};
use crate::transport::{PortReleaser, is_bound, wait_until_free};

use super::control::spawn_control_channel;
use super::errors::LaunchError;
use super::server::{Pacing, ServeExit, Server};
use super::shutdown::{ShutdownSignal, ShutdownToken, SystemShutdownSignal};
use super::{PROCESS_TARGET, RELEASE_TIMEOUT};

/// Streams backing the control channel.
pub(crate) struct ControlStreams {
    pub(crate) input: Box<dyn BufRead + Send>,
    pub(crate) output: Box<dyn Write + Send>,
}

impl ControlStreams {
    fn standard() -> Self {
        Self {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }
}

/// Process-level collaborators needed to control the sidecar lifecycle.
pub(crate) struct ProcessControl<S, R> {
    pub(crate) shutdown: S,
    pub(crate) releaser: R,
    pub(crate) control: Option<ControlStreams>,
    pub(crate) token: ShutdownToken,
}

/// Service dependencies required to construct the sidecar runtime.
pub(crate) struct ServiceDeps<L, F> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) network: F,
}

/// Collaborators required to launch the sidecar runtime.
pub(crate) struct LaunchPlan<L, S, R, F> {
    pub(crate) process: ProcessControl<S, R>,
    pub(crate) services: ServiceDeps<L, F>,
}

/// Runs the sidecar using the production collaborators.
///
/// # Errors
///
/// Returns a [`LaunchError`] when startup fails. A graceful shutdown returns
/// `Ok(())`.
pub fn run_sidecar() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            shutdown: SystemShutdownSignal::new(),
            releaser: platform_releaser(),
            control: Some(ControlStreams::standard()),
            token: ShutdownToken::new(),
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
            network: |config: &Config| {
                IidmNetworkService::new(config.upload_dir(), config.max_stored_networks())
            },
        },
    };
    run_sidecar_with(plan)
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn platform_releaser() -> Box<dyn PortReleaser> {
    Box::new(crate::transport::LsofPortReleaser::new())
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_releaser() -> Box<dyn PortReleaser> {
    Box::new(crate::transport::NoopPortReleaser)
}

impl PortReleaser for Box<dyn PortReleaser> {
    fn release(&self, port: u16) -> bool {
        (**self).release(port)
    }
}

/// Runs the sidecar with injected collaborators.
pub(crate) fn run_sidecar_with<L, S, R, F, N>(plan: LaunchPlan<L, S, R, F>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
    R: PortReleaser,
    F: FnOnce(&Config) -> N,
    N: NetworkService,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl {
        shutdown,
        releaser,
        control,
        token,
    } = process;
    let ServiceDeps {
        loader,
        reporter,
        network,
    } = services;

    let config = bootstrap_with(&loader, reporter.as_ref())?.into_config();
    let endpoint = config.endpoint();
    info!(target: PROCESS_TARGET, endpoint = %endpoint, "starting sidecar runtime");

    ensure_endpoint_available(&config, &releaser, reporter.as_ref())?;
    let mut service = network(&config);

    if let Some(ControlStreams { input, output }) = control.filter(|_| config.control_channel()) {
        // The listener blocks on input for the life of the process and is not
        // joined; it only ever flips the token.
        spawn_control_channel(input, output, token.clone())
            .map_err(|source| LaunchError::ControlChannel { source })?;
    }
    let signals = shutdown.watch(token.clone())?;

    let registry = MethodRegistry::new();
    info!(
        target: PROCESS_TARGET,
        methods = ?registry.methods(),
        "method registry ready"
    );
    let dispatcher = Dispatcher::new(registry);
    let mut server = match Server::bind(endpoint, dispatcher, token, Pacing::from_config(&config)) {
        Ok(server) => server,
        Err(error) => {
            reporter.bind_failed(endpoint, &error);
            signals.close();
            return Err(error.into());
        }
    };
    reporter.server_bound(endpoint);

    restore_network(&mut service, config.max_stored_networks(), reporter.as_ref());

    match server.serve(&mut service) {
        ServeExit::ShutdownRequested => reporter.shutdown_requested(),
        ServeExit::TransportFailed(error) => warn!(
            target: PROCESS_TARGET,
            error = %error,
            "serving loop aborted"
        ),
    }

    server.close();
    reporter.server_closed(endpoint);
    signals.close();
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

/// Frees the configured endpoint when another process holds it.
fn ensure_endpoint_available(
    config: &Config,
    releaser: &dyn PortReleaser,
    reporter: &dyn HealthReporter,
) -> Result<(), LaunchError> {
    let endpoint = config.endpoint();
    if !is_bound(endpoint) {
        return Ok(());
    }
    reporter.port_occupied(endpoint);

    let released = config.force_release()
        && endpoint
            .tcp_port()
            .is_some_and(|port| releaser.release(port));
    if !released {
        return Err(occupied(endpoint));
    }
    if !wait_until_free(endpoint, RELEASE_TIMEOUT) {
        warn!(
            target: PROCESS_TARGET,
            endpoint = %endpoint,
            "endpoint still bound after release, binding anyway"
        );
    }
    reporter.port_released(endpoint);
    Ok(())
}

fn occupied(endpoint: &Endpoint) -> LaunchError {
    LaunchError::PortOccupied {
        endpoint: endpoint.to_string(),
    }
}

/// Reloads the last stored network, then prunes the upload folder.
fn restore_network(service: &mut dyn NetworkService, retention: usize, reporter: &dyn HealthReporter) {
    match service.load_last_network() {
        Ok(()) => {
            if let Some(path) = service.current_file_path() {
                reporter.network_restored(path);
            }
        }
        Err(error) => reporter.network_restore_failed(&error),
    }
    service.cleanup_old_networks(retention);
}
