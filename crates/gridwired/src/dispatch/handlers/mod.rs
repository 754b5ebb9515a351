//! Method handlers.
//!
//! Each handler turns request parameters into collaborator calls and maps the
//! outcome to a [`Reply`]. Handlers never fail: missing parameters become 400,
//! missing resources 404, and collaborator failures 500.

mod diagram;
mod network;
mod topology;
mod upload;

use serde_json::Value;

use super::envelope::{Params, Reply, Status};
use crate::network::NetworkService;

pub(crate) use diagram::{get_single_line_diagram, get_single_line_diagram_metadata};
pub(crate) use network::{get_current_network_info, get_network_json};
pub(crate) use topology::{
    get_network_substations, get_network_voltage_levels, get_voltage_levels_for_substation,
};
pub(crate) use upload::upload_iidm;

/// Non-empty string parameter.
fn string_param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// 404 reply when no network is loaded, `None` otherwise.
fn require_network(service: &dyn NetworkService) -> Option<Reply> {
    (!service.is_loaded()).then(|| Reply::error(Status::NOT_FOUND, "No network available"))
}
