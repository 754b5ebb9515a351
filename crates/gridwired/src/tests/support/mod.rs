//! Test harness utilities shared by the sidecar suites.

mod config_loader;
mod fixtures;
mod network;
mod reporter;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use fixtures::{UploadFolder, encoded_sample_network, sample_network, upload_folder};
pub use network::{Failure, ScriptedNetwork};
pub use reporter::{HealthEvent, RecordingHealthReporter};
