use serde_json::{Value, json};

use super::{require_network, string_param};
use crate::dispatch::envelope::{Params, Reply, Status};
use crate::network::{NetworkService, VoltageLevelRow};

/// `get_network_substations`: every substation of the current network.
pub(crate) fn get_network_substations(
    service: &mut dyn NetworkService,
    _params: &Params,
) -> Reply {
    if let Some(reply) = require_network(service) {
        return reply;
    }
    match service.substations() {
        Ok(substations) => Reply::ok(substations),
        Err(error) => Reply::error(
            Status::INTERNAL_SERVER_ERROR,
            format!("Error retrieving substations: {error}"),
        ),
    }
}

/// `get_network_voltage_levels`: every voltage level of the current network.
pub(crate) fn get_network_voltage_levels(
    service: &mut dyn NetworkService,
    _params: &Params,
) -> Reply {
    if let Some(reply) = require_network(service) {
        return reply;
    }
    match service.voltage_levels() {
        Ok(levels) => Reply::ok(levels),
        Err(error) => Reply::error(
            Status::INTERNAL_SERVER_ERROR,
            format!("Error retrieving voltage levels: {error}"),
        ),
    }
}

/// `get_voltage_levels_for_substation`: voltage levels owned by one substation.
pub(crate) fn get_voltage_levels_for_substation(
    service: &mut dyn NetworkService,
    params: &Params,
) -> Reply {
    let Some(substation_id) = string_param(params, "substation_id") else {
        return Reply::error(Status::BAD_REQUEST, "Substation ID is required");
    };
    if let Some(reply) = require_network(service) {
        return reply;
    }

    let tables = service
        .substation_table()
        .and_then(|substations| Ok((substations, service.voltage_level_table()?)));
    let (substations, levels) = match tables {
        Ok(tables) => tables,
        Err(error) => {
            return Reply::error(
                Status::INTERNAL_SERVER_ERROR,
                format!("Unable to get voltage levels: {error}"),
            );
        }
    };

    if !substations.contains_key(substation_id) {
        return Reply::error(
            Status::NOT_FOUND,
            format!("Substation '{substation_id}' not found"),
        );
    }

    let voltage_levels: Vec<Value> = levels
        .iter()
        .filter(|(_, level)| level.substation_id == substation_id)
        .map(|(id, level)| project(id, level))
        .collect();

    Reply::ok(json!({
        "substation_id": substation_id,
        "voltage_levels": voltage_levels,
    }))
}

fn project(id: &str, level: &VoltageLevelRow) -> Value {
    let mut entry = json!({
        "id": id,
        "name": level.name.as_deref().unwrap_or_default(),
        "nominal_v": level.nominal_v,
        "high_voltage_limit": level.high_voltage_limit.unwrap_or_default(),
        "low_voltage_limit": level.low_voltage_limit.unwrap_or_default(),
        "topology_kind": level.topology_kind.as_deref().unwrap_or_default(),
    });
    if let (Some(fictitious), Value::Object(map)) = (level.fictitious, &mut entry) {
        map.insert("fictitious".to_owned(), Value::from(fictitious));
    }
    entry
}
