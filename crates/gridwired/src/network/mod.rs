//! Network collaborator consumed by the method handlers.
//!
//! Handlers never touch the loaded network directly; every query and mutation
//! goes through [`NetworkService`]. The crate ships [`IidmNetworkService`], which
//! reads the JSON serialisation of IIDM documents from a managed upload folder.

mod diagram;
mod errors;
mod model;
mod service;
pub(crate) mod store;

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde_json::{Map, Value};

pub use errors::NetworkError;
pub use model::{LineRow, SubstationRow, VoltageLevelRow};
pub use service::IidmNetworkService;

pub(crate) const NETWORK_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::network");

/// Diagram rendering outcome: the SVG when one could be produced, and the
/// metadata describing it. Failures are reported through an `error` entry in
/// the metadata.
pub type Diagram = (Option<String>, Map<String, Value>);

/// Capability contract of the domain component owning the current network.
pub trait NetworkService: Send {
    /// Folder into which uploaded network files are written.
    fn upload_folder(&self) -> &Utf8Path;

    /// Number of stored files kept when pruning after an upload.
    fn retention(&self) -> usize;

    /// Whether a network is currently loaded.
    fn is_loaded(&self) -> bool;

    /// Path of the file the current network was loaded from.
    fn current_file_path(&self) -> Option<&Utf8Path>;

    /// Parses the file and, on success, makes it the current network.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed. The previous
    /// network stays loaded in that case.
    fn process_iidm_file(&mut self, path: &Utf8Path) -> Result<(), NetworkError>;

    /// Removes stored files beyond the `max_files` most recent ones.
    fn cleanup_old_networks(&mut self, max_files: usize);

    /// Reloads the most recently stored network.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing is stored or the stored file is invalid.
    fn load_last_network(&mut self) -> Result<(), NetworkError>;

    /// Serialises the current network as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error when no network is loaded or serialisation fails.
    fn convert_network_to_json(&self) -> Result<Value, NetworkError>;

    /// Whether `id` names a substation, voltage level, or line.
    fn element_exists(&self, id: &str) -> bool;

    /// Renders the single-line diagram of a substation or voltage level.
    fn generate_single_line_diagram(&self, id: &str) -> Diagram;

    /// Substations of the current network as a JSON list.
    ///
    /// # Errors
    ///
    /// Returns an error when no network is loaded.
    fn substations(&self) -> Result<Value, NetworkError>;

    /// Voltage levels of the current network as a JSON list.
    ///
    /// # Errors
    ///
    /// Returns an error when no network is loaded.
    fn voltage_levels(&self) -> Result<Value, NetworkError>;

    /// Substations keyed by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when no network is loaded.
    fn substation_table(&self) -> Result<BTreeMap<String, SubstationRow>, NetworkError>;

    /// Voltage levels keyed by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when no network is loaded.
    fn voltage_level_table(&self) -> Result<BTreeMap<String, VoltageLevelRow>, NetworkError>;

    /// Lines keyed by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when no network is loaded.
    fn line_table(&self) -> Result<BTreeMap<String, LineRow>, NetworkError>;

    /// Prunes stored files down to [`NetworkService::retention`].
    fn prune_stored_networks(&mut self) {
        let keep = self.retention();
        self.cleanup_old_networks(keep);
    }
}
