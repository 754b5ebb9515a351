use serde_json::{Map, Value, json};

use super::{require_network, string_param};
use crate::dispatch::envelope::{Params, Reply, Status};
use crate::network::NetworkService;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// `get_single_line_diagram`: SVG and metadata for a substation or voltage
/// level. `format: "json"` returns both inline; any other format adds a
/// content-type marker next to the SVG.
pub(crate) fn get_single_line_diagram(service: &mut dyn NetworkService, params: &Params) -> Reply {
    let id = match locate_element(service, params) {
        Ok(id) => id,
        Err(reply) => return reply,
    };

    let (svg, metadata) = service.generate_single_line_diagram(id);
    let Some(svg) = svg else {
        return generation_failure("Failed to generate diagram", &metadata);
    };

    let format = params.get("format").and_then(Value::as_str).unwrap_or("svg");
    if format == "json" {
        Reply::ok(json!({ "svg": svg, "metadata": metadata }))
    } else {
        Reply::ok(json!({
            "content_type": SVG_CONTENT_TYPE,
            "svg": svg,
            "metadata": metadata,
        }))
    }
}

/// `get_single_line_diagram_metadata`: diagram metadata only.
pub(crate) fn get_single_line_diagram_metadata(
    service: &mut dyn NetworkService,
    params: &Params,
) -> Reply {
    let id = match locate_element(service, params) {
        Ok(id) => id,
        Err(reply) => return reply,
    };

    let (_, metadata) = service.generate_single_line_diagram(id);
    if metadata.is_empty() || metadata.contains_key("error") {
        return generation_failure("Failed to generate metadata", &metadata);
    }
    Reply::ok(Value::Object(metadata))
}

/// Shared precondition chain: id present, network loaded, element known.
fn locate_element<'a>(service: &dyn NetworkService, params: &'a Params) -> Result<&'a str, Reply> {
    let Some(id) = string_param(params, "id") else {
        return Err(Reply::error(Status::BAD_REQUEST, "Element ID is required"));
    };
    if let Some(reply) = require_network(service) {
        return Err(reply);
    }
    if !service.element_exists(id) {
        return Err(Reply::error(
            Status::NOT_FOUND,
            format!("The identifier '{id}' doesn't exist in the network"),
        ));
    }
    Ok(id)
}

fn generation_failure(message: &str, metadata: &Map<String, Value>) -> Reply {
    let details = metadata
        .get("error")
        .cloned()
        .unwrap_or_else(|| Value::from("Unknown error"));
    Reply::new(
        Status::INTERNAL_SERVER_ERROR,
        json!({ "error": message, "details": details }),
    )
}
