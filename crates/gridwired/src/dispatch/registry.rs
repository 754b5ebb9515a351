//! Fixed mapping from method names to handlers.

use std::collections::HashMap;

use super::envelope::{Params, Reply};
use super::handlers;
use crate::network::NetworkService;

/// Uniform handler signature shared by every method.
pub type MethodHandler = fn(&mut dyn NetworkService, &Params) -> Reply;

const METHODS: [(&str, MethodHandler); 8] = [
    ("upload_iidm", handlers::upload_iidm),
    ("get_network_json", handlers::get_network_json),
    ("get_current_network_info", handlers::get_current_network_info),
    ("get_single_line_diagram", handlers::get_single_line_diagram),
    (
        "get_single_line_diagram_metadata",
        handlers::get_single_line_diagram_metadata,
    ),
    ("get_network_substations", handlers::get_network_substations),
    ("get_network_voltage_levels", handlers::get_network_voltage_levels),
    (
        "get_voltage_levels_for_substation",
        handlers::get_voltage_levels_for_substation,
    ),
];

/// Immutable method table built once per server instance.
///
/// Lookups are exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    handlers: HashMap<&'static str, MethodHandler>,
}

impl MethodRegistry {
    /// Builds the registry of supported methods.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: METHODS.into_iter().collect(),
        }
    }

    /// Handler registered under `method`, if any.
    #[must_use]
    pub fn resolve(&self, method: &str) -> Option<MethodHandler> {
        self.handlers.get(method).copied()
    }

    /// Registered method names in sorted order.
    #[must_use]
    pub fn methods(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn registry_exposes_every_method() {
        let registry = MethodRegistry::new();
        assert_eq!(registry.methods().len(), 8);
        assert!(registry.resolve("upload_iidm").is_some());
    }

    #[rstest]
    #[case("frobnicate")]
    #[case("Upload_IIDM")]
    #[case("upload")]
    #[case("")]
    fn lookups_are_exact(#[case] method: &str) {
        assert!(MethodRegistry::new().resolve(method).is_none());
    }
}
