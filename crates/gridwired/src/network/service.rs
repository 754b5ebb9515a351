//! File-backed network collaborator.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::info;

use super::model::NetworkDocument;
use super::{
    Diagram, LineRow, NETWORK_TARGET, NetworkError, NetworkService, SubstationRow,
    VoltageLevelRow, diagram, store,
};

/// Network loaded from a file, together with its raw document.
#[derive(Debug, Clone)]
struct LoadedNetwork {
    path: Utf8PathBuf,
    document: Value,
    network: NetworkDocument,
}

/// Collaborator that keeps uploaded JSON-IIDM files in a folder and serves
/// queries against the most recently processed one.
///
/// Only the JSON serialisation of IIDM is parsed. XML-IIDM files are stored
/// under their `.xiidm` name like any upload but fail processing, so the
/// upload is answered with a 400 and the stored file is deleted.
#[derive(Debug)]
pub struct IidmNetworkService {
    upload_folder: Utf8PathBuf,
    retention: usize,
    current: Option<LoadedNetwork>,
}

impl IidmNetworkService {
    /// Builds a service storing uploads in `upload_folder` and keeping at most
    /// `retention` files after each upload.
    #[must_use]
    pub fn new(upload_folder: impl Into<Utf8PathBuf>, retention: usize) -> Self {
        Self {
            upload_folder: upload_folder.into(),
            retention,
            current: None,
        }
    }

    fn loaded(&self) -> Result<&LoadedNetwork, NetworkError> {
        self.current.as_ref().ok_or(NetworkError::NotLoaded)
    }

    fn read(path: &Utf8Path) -> Result<LoadedNetwork, NetworkError> {
        let bytes = fs::read(path).map_err(|source| NetworkError::Io {
            path: path.to_owned(),
            source,
        })?;
        let parse_error = |source| NetworkError::Parse {
            path: path.to_owned(),
            source,
        };
        let document: Value = serde_json::from_slice(&bytes).map_err(parse_error)?;
        let network: NetworkDocument =
            serde_json::from_value(document.clone()).map_err(parse_error)?;
        Ok(LoadedNetwork {
            path: path.to_owned(),
            document,
            network,
        })
    }
}

impl NetworkService for IidmNetworkService {
    fn upload_folder(&self) -> &Utf8Path {
        &self.upload_folder
    }

    fn retention(&self) -> usize {
        self.retention
    }

    fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    fn current_file_path(&self) -> Option<&Utf8Path> {
        self.current.as_ref().map(|loaded| loaded.path.as_path())
    }

    fn process_iidm_file(&mut self, path: &Utf8Path) -> Result<(), NetworkError> {
        let loaded = Self::read(path)?;
        info!(
            target: NETWORK_TARGET,
            path = %path,
            network = %loaded.network.id,
            substations = loaded.network.substations.len(),
            lines = loaded.network.lines.len(),
            "network loaded"
        );
        self.current = Some(loaded);
        Ok(())
    }

    fn cleanup_old_networks(&mut self, max_files: usize) {
        let removed = store::prune(&self.upload_folder, max_files, self.current_file_path());
        if !removed.is_empty() {
            info!(
                target: NETWORK_TARGET,
                removed = removed.len(),
                kept = max_files,
                "pruned stored networks"
            );
        }
    }

    fn load_last_network(&mut self) -> Result<(), NetworkError> {
        let stored =
            store::stored_networks(&self.upload_folder).map_err(|source| NetworkError::Io {
                path: self.upload_folder.clone(),
                source,
            })?;
        let latest = stored.first().ok_or(NetworkError::NoStoredNetwork)?;
        self.process_iidm_file(latest)
    }

    fn convert_network_to_json(&self) -> Result<Value, NetworkError> {
        Ok(self.loaded()?.document.clone())
    }

    fn element_exists(&self, id: &str) -> bool {
        self.current.as_ref().is_some_and(|loaded| {
            let network = &loaded.network;
            network.substation(id).is_some()
                || network.voltage_level(id).is_some()
                || network.line(id).is_some()
        })
    }

    fn generate_single_line_diagram(&self, id: &str) -> Diagram {
        let rendered = self
            .loaded()
            .and_then(|loaded| diagram::render(&loaded.network, id));
        match rendered {
            Ok((svg, metadata)) => (Some(svg), metadata),
            Err(error) => {
                let mut metadata = Map::new();
                metadata.insert("id".to_owned(), Value::from(id));
                metadata.insert("error".to_owned(), Value::from(error.to_string()));
                (None, metadata)
            }
        }
    }

    fn substations(&self) -> Result<Value, NetworkError> {
        Ok(self.loaded()?.network.substations_json())
    }

    fn voltage_levels(&self) -> Result<Value, NetworkError> {
        Ok(self.loaded()?.network.voltage_levels_json())
    }

    fn substation_table(&self) -> Result<BTreeMap<String, SubstationRow>, NetworkError> {
        Ok(self.loaded()?.network.substation_table())
    }

    fn voltage_level_table(&self) -> Result<BTreeMap<String, VoltageLevelRow>, NetworkError> {
        Ok(self.loaded()?.network.voltage_level_table())
    }

    fn line_table(&self) -> Result<BTreeMap<String, LineRow>, NetworkError> {
        Ok(self.loaded()?.network.line_table())
    }
}
