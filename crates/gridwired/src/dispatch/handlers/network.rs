use serde_json::{Map, Value, json};

use super::require_network;
use crate::dispatch::envelope::{Params, Reply, Status};
use crate::network::{NetworkError, NetworkService};

/// `get_network_json`: the current network as a JSON document.
pub(crate) fn get_network_json(service: &mut dyn NetworkService, _params: &Params) -> Reply {
    if let Some(reply) = require_network(service) {
        return reply;
    }
    match service.convert_network_to_json() {
        Ok(document) => Reply::ok(document),
        Err(error) => Reply::error(
            Status::INTERNAL_SERVER_ERROR,
            format!("Error converting network to JSON: {error}"),
        ),
    }
}

/// `get_current_network_info`: file details and element counts.
///
/// The absence of a network is a regular 404 answer. Counting failures are
/// attached as a `warning` rather than failing the request.
pub(crate) fn get_current_network_info(
    service: &mut dyn NetworkService,
    _params: &Params,
) -> Reply {
    let Some(path) = service.current_file_path().filter(|_| service.is_loaded()) else {
        return Reply::new(Status::NOT_FOUND, json!({ "status": "No network loaded" }));
    };

    let mut info = Map::new();
    info.insert("status".to_owned(), Value::from("Network loaded"));
    info.insert("file_path".to_owned(), Value::from(path.as_str()));
    info.insert(
        "filename".to_owned(),
        path.file_name().map_or(Value::Null, Value::from),
    );

    match element_counts(service) {
        Ok((substations, voltage_levels, lines)) => {
            info.insert("substations_count".to_owned(), Value::from(substations));
            info.insert("voltage_levels_count".to_owned(), Value::from(voltage_levels));
            info.insert("lines_count".to_owned(), Value::from(lines));
        }
        Err(error) => {
            info.insert(
                "warning".to_owned(),
                Value::from(format!("Error retrieving detailed network info: {error}")),
            );
        }
    }

    Reply::ok(Value::Object(info))
}

fn element_counts(service: &dyn NetworkService) -> Result<(usize, usize, usize), NetworkError> {
    Ok((
        service.substation_table()?.len(),
        service.voltage_level_table()?.len(),
        service.line_table()?.len(),
    ))
}
