//! Single-line diagram rendering.
//!
//! A voltage level is drawn as one horizontal busbar with a vertical feeder
//! per connected line. A substation stacks the diagrams of its voltage levels.

use std::fmt::Write as _;

use serde_json::{Map, Value, json};

use super::NetworkError;
use super::model::{NetworkDocument, VoltageLevelDocument};

const MARGIN: usize = 40;
const FEEDER_SPACING: usize = 80;
const FEEDER_OFFSET: usize = 40;
const FEEDER_LENGTH: usize = 60;
const LABEL_GAP: usize = 16;
const LEVEL_HEIGHT: usize = 140;

/// Renders the diagram of a substation or voltage level.
pub(crate) fn render(
    network: &NetworkDocument,
    id: &str,
) -> Result<(String, Map<String, Value>), NetworkError> {
    if let Some(level) = network.voltage_level(id) {
        let mut canvas = Canvas::default();
        canvas.draw_level(network, level, 0);
        return Ok(canvas.finish(id, "voltageLevel"));
    }

    if let Some(substation) = network.substation(id) {
        let mut canvas = Canvas::default();
        for (index, level) in substation.voltage_levels.iter().enumerate() {
            canvas.draw_level(network, level, index * LEVEL_HEIGHT);
        }
        return Ok(canvas.finish(id, "substation"));
    }

    if network.line(id).is_some() {
        return Err(NetworkError::Diagram {
            id: id.to_owned(),
            reason: "lines have no single-line diagram",
        });
    }

    Err(NetworkError::UnknownElement { id: id.to_owned() })
}

#[derive(Debug, Default)]
struct Canvas {
    body: String,
    nodes: Vec<Value>,
    width: usize,
    height: usize,
}

impl Canvas {
    fn draw_level(&mut self, network: &NetworkDocument, level: &VoltageLevelDocument, top: usize) {
        let feeders: Vec<_> = network.lines_at(&level.id).collect();
        let slots = feeders.len().max(1);
        let right = MARGIN + slots * FEEDER_SPACING;
        let bus_y = top + MARGIN + LABEL_GAP;

        let _ = write!(
            self.body,
            r#"<g class="voltage-level" id="{id}"><text x="{MARGIN}" y="{label_y}">{label}</text><line class="busbar" x1="{MARGIN}" y1="{bus_y}" x2="{right}" y2="{bus_y}" stroke="black" stroke-width="4"/>"#,
            id = escape(&level.id),
            label_y = top + MARGIN,
            label = escape(&format!(
                "{} ({} kV)",
                level.name.as_deref().unwrap_or(&level.id),
                level.nominal_v
            )),
        );
        self.nodes.push(json!({
            "id": level.id,
            "kind": "busbar",
            "x": MARGIN,
            "y": bus_y,
        }));

        for (index, line) in feeders.iter().enumerate() {
            let x = MARGIN + FEEDER_OFFSET + index * FEEDER_SPACING;
            let end_y = bus_y + FEEDER_LENGTH;
            let _ = write!(
                self.body,
                r#"<g class="feeder" id="{id}"><line x1="{x}" y1="{bus_y}" x2="{x}" y2="{end_y}" stroke="black" stroke-width="2"/><text x="{x}" y="{label_y}" text-anchor="middle">{label}</text></g>"#,
                id = escape(&line.id),
                label_y = end_y + LABEL_GAP,
                label = escape(line.name.as_deref().unwrap_or(&line.id)),
            );
            self.nodes.push(json!({
                "id": line.id,
                "kind": "feeder",
                "x": x,
                "y": end_y,
            }));
        }
        self.body.push_str("</g>");

        self.width = self.width.max(right + MARGIN);
        self.height = self.height.max(top + LEVEL_HEIGHT);
    }

    fn finish(self, id: &str, kind: &str) -> (String, Map<String, Value>) {
        let width = self.width.max(2 * MARGIN);
        let height = self.height.max(LEVEL_HEIGHT);
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#,
            body = self.body,
        );

        let mut metadata = Map::new();
        metadata.insert("id".to_owned(), Value::from(id));
        metadata.insert("kind".to_owned(), Value::from(kind));
        metadata.insert("width".to_owned(), Value::from(width));
        metadata.insert("height".to_owned(), Value::from(height));
        metadata.insert("nodes".to_owned(), Value::Array(self.nodes));
        (svg, metadata)
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> NetworkDocument {
        serde_json::from_value(json!({
            "id": "grid",
            "substations": [{
                "id": "S1",
                "voltageLevels": [
                    { "id": "VL1", "name": "North & South", "nominalV": 400.0 },
                    { "id": "VL2", "nominalV": 63.0 }
                ]
            }],
            "lines": [
                { "id": "L1", "voltageLevelId1": "VL1", "voltageLevelId2": "VL2" },
                { "id": "L2", "voltageLevelId1": "VL1", "voltageLevelId2": "VL2" }
            ]
        }))
        .expect("network parses")
    }

    #[test]
    fn voltage_level_draws_busbar_and_feeders() {
        let (svg, metadata) = render(&network(), "VL1").expect("diagram renders");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("North &amp; South"));
        let nodes = metadata
            .get("nodes")
            .and_then(Value::as_array)
            .expect("nodes listed");
        assert_eq!(nodes.len(), 3);
        assert_eq!(metadata.get("kind"), Some(&json!("voltageLevel")));
    }

    #[test]
    fn substation_stacks_its_voltage_levels() {
        let (svg, metadata) = render(&network(), "S1").expect("diagram renders");
        assert_eq!(svg.matches(r#"class="busbar""#).count(), 2);
        assert_eq!(metadata.get("height"), Some(&json!(2 * LEVEL_HEIGHT)));
    }

    #[test]
    fn lines_cannot_be_drawn() {
        let error = render(&network(), "L1").expect_err("lines are not drawable");
        assert!(matches!(error, NetworkError::Diagram { .. }));
    }

    #[test]
    fn unknown_identifiers_are_reported() {
        let error = render(&network(), "nope").expect_err("unknown element");
        assert!(matches!(error, NetworkError::UnknownElement { id } if id == "nope"));
    }
}
