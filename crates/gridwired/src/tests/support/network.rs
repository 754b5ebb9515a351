//! Scripted [`NetworkService`] double with switchable failures.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value, json};

use crate::network::{
    Diagram, LineRow, NetworkError, NetworkService, SubstationRow, VoltageLevelRow,
};

/// Failure injected into the scripted collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Failure {
    #[default]
    None,
    /// Loading uploaded files fails.
    Processing,
    /// Every table query fails.
    Queries,
    /// Diagram generation yields no image.
    Diagram,
    /// Table queries panic.
    Panic,
}

/// Collaborator answering from fixed tables.
#[derive(Debug)]
pub struct ScriptedNetwork {
    upload_folder: Utf8PathBuf,
    current: Option<Utf8PathBuf>,
    failure: Failure,
    pub processed: Vec<Utf8PathBuf>,
    pub cleanups: Vec<usize>,
}

impl ScriptedNetwork {
    pub fn empty(upload_folder: impl Into<Utf8PathBuf>) -> Self {
        Self {
            upload_folder: upload_folder.into(),
            current: None,
            failure: Failure::None,
            processed: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    pub fn loaded(upload_folder: impl Into<Utf8PathBuf>) -> Self {
        let upload_folder = upload_folder.into();
        let current = upload_folder.join("grid.xiidm");
        Self {
            current: Some(current),
            ..Self::empty(upload_folder)
        }
    }

    #[must_use]
    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }

    fn check(&self) -> Result<(), NetworkError> {
        match self.failure {
            Failure::Queries => Err(NetworkError::NotLoaded),
            Failure::Panic => panic!("table store corrupted"),
            _ if self.current.is_none() => Err(NetworkError::NotLoaded),
            _ => Ok(()),
        }
    }
}

impl NetworkService for ScriptedNetwork {
    fn upload_folder(&self) -> &Utf8Path {
        &self.upload_folder
    }

    fn retention(&self) -> usize {
        2
    }

    fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    fn current_file_path(&self) -> Option<&Utf8Path> {
        self.current.as_deref()
    }

    fn process_iidm_file(&mut self, path: &Utf8Path) -> Result<(), NetworkError> {
        self.processed.push(path.to_owned());
        if self.failure == Failure::Processing {
            return Err(NetworkError::NoStoredNetwork);
        }
        self.current = Some(path.to_owned());
        Ok(())
    }

    fn cleanup_old_networks(&mut self, max_files: usize) {
        self.cleanups.push(max_files);
    }

    fn load_last_network(&mut self) -> Result<(), NetworkError> {
        Err(NetworkError::NoStoredNetwork)
    }

    fn convert_network_to_json(&self) -> Result<Value, NetworkError> {
        self.check()?;
        Ok(json!({ "id": "scripted" }))
    }

    fn element_exists(&self, id: &str) -> bool {
        self.current.is_some() && ["S1", "VL1"].contains(&id)
    }

    fn generate_single_line_diagram(&self, id: &str) -> Diagram {
        let mut metadata = Map::new();
        metadata.insert("id".to_owned(), Value::from(id));
        if self.failure == Failure::Diagram {
            metadata.insert("error".to_owned(), Value::from("renderer offline"));
            return (None, metadata);
        }
        (Some("<svg/>".to_owned()), metadata)
    }

    fn substations(&self) -> Result<Value, NetworkError> {
        self.check()?;
        Ok(json!([{ "id": "S1" }]))
    }

    fn voltage_levels(&self) -> Result<Value, NetworkError> {
        self.check()?;
        Ok(json!([{ "id": "VL1" }]))
    }

    fn substation_table(&self) -> Result<BTreeMap<String, SubstationRow>, NetworkError> {
        self.check()?;
        Ok(BTreeMap::from([(
            "S1".to_owned(),
            SubstationRow {
                name: None,
                country: None,
                tso: None,
                voltage_level_ids: vec!["VL1".to_owned()],
            },
        )]))
    }

    fn voltage_level_table(&self) -> Result<BTreeMap<String, VoltageLevelRow>, NetworkError> {
        self.check()?;
        Ok(BTreeMap::from([(
            "VL1".to_owned(),
            VoltageLevelRow {
                name: None,
                substation_id: "S1".to_owned(),
                nominal_v: 400.0,
                low_voltage_limit: None,
                high_voltage_limit: None,
                topology_kind: None,
                fictitious: None,
            },
        )]))
    }

    fn line_table(&self) -> Result<BTreeMap<String, LineRow>, NetworkError> {
        self.check()?;
        Ok(BTreeMap::new())
    }
}
