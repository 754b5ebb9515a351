//! Typed view over JSON-serialised IIDM documents.
//!
//! Only the structure the handlers query is modelled: substations with their
//! voltage levels, and lines joining two voltage levels. Unknown fields are
//! ignored so documents exported by newer tools still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NetworkDocument {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) substations: Vec<SubstationDocument>,
    #[serde(default)]
    pub(crate) lines: Vec<LineDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubstationDocument {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) country: Option<String>,
    #[serde(default)]
    pub(crate) tso: Option<String>,
    #[serde(default)]
    pub(crate) voltage_levels: Vec<VoltageLevelDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoltageLevelDocument {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    pub(crate) nominal_v: f64,
    #[serde(default)]
    pub(crate) low_voltage_limit: Option<f64>,
    #[serde(default)]
    pub(crate) high_voltage_limit: Option<f64>,
    #[serde(default)]
    pub(crate) topology_kind: Option<String>,
    #[serde(default)]
    pub(crate) fictitious: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LineDocument {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    pub(crate) voltage_level_id1: String,
    pub(crate) voltage_level_id2: String,
}

/// Substation entry of the keyed substation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstationRow {
    /// Human-readable name.
    pub name: Option<String>,
    /// ISO country code.
    pub country: Option<String>,
    /// Operating transmission system operator.
    pub tso: Option<String>,
    /// Voltage levels hosted by the substation.
    pub voltage_level_ids: Vec<String>,
}

/// Voltage level entry of the keyed voltage-level table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoltageLevelRow {
    /// Human-readable name.
    pub name: Option<String>,
    /// Owning substation.
    pub substation_id: String,
    /// Nominal voltage in kV.
    pub nominal_v: f64,
    /// Lower operational limit in kV.
    pub low_voltage_limit: Option<f64>,
    /// Upper operational limit in kV.
    pub high_voltage_limit: Option<f64>,
    /// `BUS_BREAKER` or `NODE_BREAKER`.
    pub topology_kind: Option<String>,
    /// Whether the element is fictitious.
    pub fictitious: Option<bool>,
}

/// Line entry of the keyed line table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRow {
    /// Human-readable name.
    pub name: Option<String>,
    /// Voltage level at the first end.
    pub voltage_level1_id: String,
    /// Voltage level at the second end.
    pub voltage_level2_id: String,
}

impl NetworkDocument {
    pub(crate) fn substation(&self, id: &str) -> Option<&SubstationDocument> {
        self.substations.iter().find(|substation| substation.id == id)
    }

    pub(crate) fn voltage_level(&self, id: &str) -> Option<&VoltageLevelDocument> {
        self.substations
            .iter()
            .flat_map(|substation| substation.voltage_levels.iter())
            .find(|level| level.id == id)
    }

    pub(crate) fn line(&self, id: &str) -> Option<&LineDocument> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Lines with at least one end in the voltage level.
    pub(crate) fn lines_at<'a>(&'a self, level_id: &'a str) -> impl Iterator<Item = &'a LineDocument> {
        self.lines.iter().filter(move |line| {
            line.voltage_level_id1 == level_id || line.voltage_level_id2 == level_id
        })
    }

    pub(crate) fn substation_table(&self) -> BTreeMap<String, SubstationRow> {
        self.substations
            .iter()
            .map(|substation| {
                let row = SubstationRow {
                    name: substation.name.clone(),
                    country: substation.country.clone(),
                    tso: substation.tso.clone(),
                    voltage_level_ids: substation
                        .voltage_levels
                        .iter()
                        .map(|level| level.id.clone())
                        .collect(),
                };
                (substation.id.clone(), row)
            })
            .collect()
    }

    pub(crate) fn voltage_level_table(&self) -> BTreeMap<String, VoltageLevelRow> {
        self.substations
            .iter()
            .flat_map(|substation| {
                substation.voltage_levels.iter().map(|level| {
                    let row = VoltageLevelRow {
                        name: level.name.clone(),
                        substation_id: substation.id.clone(),
                        nominal_v: level.nominal_v,
                        low_voltage_limit: level.low_voltage_limit,
                        high_voltage_limit: level.high_voltage_limit,
                        topology_kind: level.topology_kind.clone(),
                        fictitious: level.fictitious,
                    };
                    (level.id.clone(), row)
                })
            })
            .collect()
    }

    pub(crate) fn line_table(&self) -> BTreeMap<String, LineRow> {
        self.lines
            .iter()
            .map(|line| {
                let row = LineRow {
                    name: line.name.clone(),
                    voltage_level1_id: line.voltage_level_id1.clone(),
                    voltage_level2_id: line.voltage_level_id2.clone(),
                };
                (line.id.clone(), row)
            })
            .collect()
    }

    pub(crate) fn substations_json(&self) -> Value {
        self.substation_table()
            .into_iter()
            .map(|(id, row)| {
                json!({
                    "id": id,
                    "name": row.name,
                    "country": row.country,
                    "tso": row.tso,
                    "voltage_level_ids": row.voltage_level_ids,
                })
            })
            .collect()
    }

    pub(crate) fn voltage_levels_json(&self) -> Value {
        self.voltage_level_table()
            .into_iter()
            .map(|(id, row)| {
                json!({
                    "id": id,
                    "name": row.name,
                    "substation_id": row.substation_id,
                    "nominal_v": row.nominal_v,
                    "low_voltage_limit": row.low_voltage_limit,
                    "high_voltage_limit": row.high_voltage_limit,
                    "topology_kind": row.topology_kind,
                })
            })
            .collect()
    }
}
