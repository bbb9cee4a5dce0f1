//! Per-frame render attributes derived from filter, focus, hover and
//! selection state. Nothing here mutates the graph.

use crate::color::Rgb;
use crate::model::{Graph, NodeType};
use petgraph::graph::EdgeIndex;
use std::collections::HashSet;

/// Manually hidden nodes while "show hidden" is on
pub const COLOR_MUTED: Rgb = Rgb::from_hex(0x30363d);
/// Nodes outside the hover neighborhood
pub const COLOR_DIMMED_NODE: Rgb = Rgb::from_hex(0x1c2129);
/// Edges not touching the hovered node
pub const COLOR_DIMMED_EDGE: Rgb = Rgb::from_hex(0x0d1117);

/// Transient UI state the reducers read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub manually_hidden: HashSet<String>,
    pub show_hidden: bool,
    pub hidden_types: HashSet<NodeType>,
    pub hidden_domains: HashSet<String>,
    pub focus: Option<HashSet<String>>,
    pub hovered: Option<String>,
    pub selected: Option<String>,
}

impl ViewState {
    fn is_manually_hidden(&self, key: &str) -> bool {
        !self.show_hidden && self.manually_hidden.contains(key)
    }

    fn is_filtered(&self, node_type: NodeType, domain: &str) -> bool {
        self.hidden_types.contains(&node_type) || self.hidden_domains.contains(domain)
    }

    fn outside_focus(&self, key: &str) -> bool {
        self.focus.as_ref().is_some_and(|f| !f.contains(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRender<'g> {
    pub key: &'g str,
    pub label: &'g str,
    pub color: Rgb,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub hidden: bool,
    pub highlighted: bool,
    pub z_index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRender<'g> {
    pub source: &'g str,
    pub target: &'g str,
    pub weight: u32,
    /// `None` leaves the renderer's default edge color
    pub color: Option<Rgb>,
    pub hidden: bool,
    pub z_index: Option<u8>,
}

/// Render attributes for `key`, or `None` when the node does not exist
pub fn node_view<'g>(graph: &'g Graph, state: &ViewState, key: &str) -> Option<NodeRender<'g>> {
    let node = graph.node(key)?;
    let mut render = NodeRender {
        key: &node.key,
        label: &node.label,
        color: node.color,
        size: node.size,
        x: node.x,
        y: node.y,
        hidden: false,
        highlighted: false,
        z_index: None,
    };

    if state.manually_hidden.contains(key) {
        if !state.show_hidden {
            render.hidden = true;
            return Some(render);
        }
        render.color = COLOR_MUTED;
    }

    if state.is_filtered(node.node_type, &node.domain) || state.outside_focus(key) {
        render.hidden = true;
        return Some(render);
    }

    if let Some(hovered) = state.hovered.as_deref() {
        if hovered == key || graph.are_neighbors(hovered, key) {
            render.highlighted = true;
            render.z_index = Some(1);
        } else {
            render.color = COLOR_DIMMED_NODE;
            render.label = "";
            render.z_index = Some(0);
        }
    }

    if state.selected.as_deref() == Some(key) {
        render.highlighted = true;
        render.z_index = Some(1);
    }

    Some(render)
}

/// Render attributes for an edge, or `None` when the id is unknown
pub fn edge_view<'g>(graph: &'g Graph, state: &ViewState, id: EdgeIndex) -> Option<EdgeRender<'g>> {
    let (source, target) = graph.edge_endpoints(id)?;
    let weight = graph.edge(id).map(|e| e.weight).unwrap_or(0);
    let mut render = EdgeRender {
        source: &source.key,
        target: &target.key,
        weight,
        color: None,
        hidden: false,
        z_index: None,
    };

    let hidden = state.is_manually_hidden(&source.key)
        || state.is_manually_hidden(&target.key)
        || state.is_filtered(source.node_type, &source.domain)
        || state.is_filtered(target.node_type, &target.domain)
        || state.outside_focus(&source.key)
        || state.outside_focus(&target.key);
    if hidden {
        render.hidden = true;
        return Some(render);
    }

    if let Some(hovered) = state.hovered.as_deref() {
        if source.key == hovered || target.key == hovered {
            render.z_index = Some(1);
        } else {
            render.color = Some(COLOR_DIMMED_EDGE);
            render.z_index = Some(0);
        }
    }

    Some(render)
}

/// Visible node and edge counts under the current state
pub fn visible_counts(graph: &Graph, state: &ViewState) -> (usize, usize) {
    let nodes = graph
        .node_keys()
        .filter_map(|key| node_view(graph, state, key))
        .filter(|r| !r.hidden)
        .count();
    let edges = graph
        .edge_ids()
        .filter_map(|id| edge_view(graph, state, id))
        .filter(|r| !r.hidden)
        .count();
    (nodes, edges)
}
