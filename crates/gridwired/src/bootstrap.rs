//! Sidecar bootstrap orchestration.

use std::fs;
use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use gridwire_config::{Config, EndpointPreparationError};

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the sidecar configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The IPC socket directory could not be prepared.
    #[error("failed to prepare endpoint: {source}")]
    Endpoint {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: EndpointPreparationError,
    },
    /// The upload folder could not be created.
    #[error("failed to create upload folder '{path}': {source}")]
    UploadFolder {
        /// Folder that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Sidecar {
    config: Config,
    telemetry: TelemetryHandle,
}

impl Sidecar {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Consumes the sidecar, yielding its configuration.
    #[must_use]
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Loads configuration, installs telemetry, and prepares the filesystem.
///
/// # Errors
///
/// Returns the first failing stage; the reporter is told about it before
/// returning.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Sidecar, BootstrapError> {
    reporter.bootstrap_starting();
    match bootstrap_stages(loader) {
        Ok(sidecar) => {
            reporter.bootstrap_succeeded(sidecar.config());
            Ok(sidecar)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn bootstrap_stages(loader: &dyn ConfigLoader) -> Result<Sidecar, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;

    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;

    config
        .endpoint()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Endpoint { source })?;

    fs::create_dir_all(config.upload_dir()).map_err(|source| BootstrapError::UploadFolder {
        path: config.upload_dir().to_owned(),
        source,
    })?;

    Ok(Sidecar { config, telemetry })
}
