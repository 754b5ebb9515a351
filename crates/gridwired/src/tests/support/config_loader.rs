//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use gridwire_config::{Config, Endpoint};

use crate::bootstrap::ConfigLoader;
use crate::transport::test_support::free_tcp_endpoint;

/// Loader that provisions an upload folder under a temporary directory and a
/// loopback endpoint on a free port.
pub struct TestConfigLoader {
    upload_dir: TempDir,
    endpoint: Endpoint,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(free_tcp_endpoint())
    }

    #[must_use]
    pub fn with_endpoint(endpoint: Endpoint) -> Self {
        let upload_dir = TempDir::new().expect("failed to create temporary upload folder");
        Self {
            upload_dir,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn upload_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.upload_dir.path().join("uploads"))
            .expect("temporary upload folder was not valid UTF-8")
    }

    /// Configuration handed out by [`ConfigLoader::load`].
    pub fn config(&self) -> Config {
        Config {
            endpoint: self.endpoint.clone(),
            upload_dir: self.upload_dir(),
            poll_timeout_ms: 20,
            idle_sleep_ms: 1,
            control_channel: false,
            ..Config::default()
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config())
    }
}

/// Loader that intentionally fails by passing an invalid endpoint flag.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("gridwired"),
            OsString::from("--endpoint"),
            OsString::from("udp://nowhere"),
        ];
        Config::load_from_iter(args)
    }
}
