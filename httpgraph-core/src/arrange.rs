//! Deterministic one-shot arrangements. Callers must stop any running
//! layout session first, otherwise its next batch overwrites the result.

use crate::model::Graph;
use std::collections::BTreeMap;

pub const CIRCLE_RADIUS: f64 = 500.0;
pub const LEVEL_SPACING: f64 = 200.0;
pub const SIBLING_SPACING: f64 = 40.0;

/// Nodes on one circle, grouped by domain then type
pub fn circular(graph: &mut Graph) {
    let mut order: Vec<(String, String, &'static str)> = graph
        .nodes()
        .map(|n| (n.domain.clone(), n.key.clone(), n.node_type.as_str()))
        .collect();
    order.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.cmp(b.2)));

    let count = order.len() as f64;
    for (i, (_, key, _)) in order.iter().enumerate() {
        let angle = std::f64::consts::TAU * i as f64 / count;
        graph.set_position(key, CIRCLE_RADIUS * angle.cos(), CIRCLE_RADIUS * angle.sin());
    }
}

/// Rows by node-type depth (clients on top), each row sorted by domain and
/// centred on x = 0
pub fn hierarchical(graph: &mut Graph) {
    let mut levels: BTreeMap<u32, Vec<(String, String)>> = BTreeMap::new();
    for node in graph.nodes() {
        levels
            .entry(node.node_type.depth())
            .or_default()
            .push((node.domain.clone(), node.key.clone()));
    }

    for (depth, mut row) in levels {
        row.sort_by(|a, b| a.0.cmp(&b.0));
        let total_width = row.len() as f64 * SIBLING_SPACING;
        for (i, (_, key)) in row.iter().enumerate() {
            let x = -total_width / 2.0 + i as f64 * SIBLING_SPACING;
            graph.set_position(key, x, f64::from(depth) * LEVEL_SPACING);
        }
    }
}
