//! Sample network documents and temporary upload folders.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::Utf8PathBuf;
use rstest::fixture;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Temporary folder standing in for the configured upload directory.
pub struct UploadFolder {
    _dir: TempDir,
    pub path: Utf8PathBuf,
}

#[fixture]
pub fn upload_folder() -> UploadFolder {
    let dir = TempDir::new().expect("failed to create temporary upload folder");
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("temporary upload folder was not valid UTF-8");
    UploadFolder { _dir: dir, path }
}

/// Two substations: `S1` hosts `VL1` and `VL2`, `S2` hosts `VL3`. Lines `L1`
/// and `L2` connect both substations.
pub fn sample_network() -> Value {
    json!({
        "id": "sample",
        "substations": [
            {
                "id": "S1",
                "name": "North",
                "country": "FR",
                "tso": "RTE",
                "voltageLevels": [
                    {
                        "id": "VL1",
                        "name": "North 400",
                        "nominalV": 400.0,
                        "lowVoltageLimit": 380.0,
                        "highVoltageLimit": 420.0,
                        "topologyKind": "BUS_BREAKER"
                    },
                    { "id": "VL2", "nominalV": 225.0, "fictitious": true }
                ]
            },
            {
                "id": "S2",
                "name": "South",
                "voltageLevels": [
                    { "id": "VL3", "name": "South 400", "nominalV": 400.0 }
                ]
            }
        ],
        "lines": [
            { "id": "L1", "voltageLevelId1": "VL1", "voltageLevelId2": "VL3" },
            { "id": "L2", "voltageLevelId1": "VL2", "voltageLevelId2": "VL3" }
        ]
    })
}

/// [`sample_network`] serialised and base64-encoded as an upload payload.
pub fn encoded_sample_network() -> String {
    let bytes = serde_json::to_vec(&sample_network()).expect("serialise sample network");
    STANDARD.encode(bytes)
}
