use crate::color::{Palette, Rgb};
use httpgraph_layout::LayoutGraph;
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Half-width of the square new nodes are scattered over
const INITIAL_SPREAD: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Client,
    Domain,
    Host,
    Resource,
    Ip,
    Params,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Client,
        NodeType::Domain,
        NodeType::Host,
        NodeType::Resource,
        NodeType::Ip,
        NodeType::Params,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Client => "client",
            NodeType::Domain => "domain",
            NodeType::Host => "host",
            NodeType::Resource => "resource",
            NodeType::Ip => "ip",
            NodeType::Params => "params",
        }
    }

    pub fn base_size(&self) -> f64 {
        match self {
            NodeType::Client => 8.0,
            NodeType::Domain => 6.0,
            NodeType::Host => 4.0,
            NodeType::Resource => 3.0,
            NodeType::Ip => 3.5,
            NodeType::Params => 2.0,
        }
    }

    /// Rank used by the hierarchical arrangement
    pub fn depth(&self) -> u32 {
        match self {
            NodeType::Client => 0,
            NodeType::Domain => 1,
            NodeType::Host => 2,
            NodeType::Resource => 3,
            NodeType::Ip | NodeType::Params => 4,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown node type '{}'", s))
    }
}

/// Request/response details carried only by resource nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceAttrs {
    pub method: Option<String>,
    pub protocol: String,
    pub request_type: Option<String>,
    pub content_type: Option<String>,
    pub status_code: Option<i64>,
    pub timestamp: Option<f64>,
    pub bytes: Option<u64>,
    pub duration_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub key: String,
    pub label: String,
    pub node_type: NodeType,
    pub domain: String,
    pub visited: u32,
    pub size: f64,
    /// Size at creation, restored by the default size mode
    pub base_size: f64,
    pub color: Rgb,
    pub x: f64,
    pub y: f64,
    pub resource: Option<ResourceAttrs>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Number of times this ordered pair was observed
    pub weight: u32,
}

/// Arguments for [`Graph::add_node`]
#[derive(Debug, Clone)]
pub struct NewNode<'a> {
    pub key: &'a str,
    pub node_type: NodeType,
    pub domain: &'a str,
    pub size: Option<f64>,
    pub label: Option<String>,
    pub resource: Option<ResourceAttrs>,
}

impl<'a> NewNode<'a> {
    pub fn new(key: &'a str, node_type: NodeType, domain: &'a str) -> Self {
        Self {
            key,
            node_type,
            domain,
            size: None,
            label: None,
            resource: None,
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_resource(mut self, resource: ResourceAttrs) -> Self {
        self.resource = Some(resource);
        self
    }
}

/// Directed, weighted graph of HTTP activity keyed by string ids.
///
/// Nodes are never removed, so petgraph indices stay stable and iterate in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: DiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
    palette: Palette,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or bump `visited` if the key already exists.
    ///
    /// Existing attributes are never overwritten; the one exception is a
    /// resource node first created without request details, which picks
    /// them up from the first record that carries them.
    pub fn add_node(&mut self, node: NewNode<'_>) -> NodeIndex {
        if let Some(&index) = self.index.get(node.key) {
            let existing = &mut self.inner[index];
            existing.visited = existing.visited.saturating_add(1);
            if existing.resource.is_none() && existing.node_type == NodeType::Resource {
                existing.resource = node.resource;
            }
            return index;
        }

        let size = node.size.unwrap_or_else(|| node.node_type.base_size());
        let color = self.palette.assign(node.domain);
        let (jx, jy) = stable_pair(node.key);
        let index = self.inner.add_node(Node {
            key: node.key.to_string(),
            label: node.label.unwrap_or_else(|| node.key.to_string()),
            node_type: node.node_type,
            domain: node.domain.to_string(),
            visited: 1,
            size,
            base_size: size,
            color,
            x: jx * INITIAL_SPREAD,
            y: jy * INITIAL_SPREAD,
            resource: node.resource,
        });
        self.index.insert(node.key.to_string(), index);
        index
    }

    /// Record one observation of `source -> target`.
    ///
    /// Self-loops and edges touching unknown nodes are ignored and return
    /// `None`. Repeat observations bump the weight of the single edge that
    /// exists for the ordered pair.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Option<EdgeIndex> {
        if source == target {
            return None;
        }
        let (&a, &b) = (self.index.get(source)?, self.index.get(target)?);

        if let Some(edge) = self.inner.find_edge(a, b) {
            let weight = &mut self.inner[edge].weight;
            *weight = weight.saturating_add(1);
            return Some(edge);
        }
        Some(self.inner.add_edge(a, b, Edge { weight: 1 }))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.index.get(key).map(|&i| &self.inner[i])
    }

    pub(crate) fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        let index = *self.index.get(key)?;
        Some(&mut self.inner[index])
    }

    /// Number of nodes
    pub fn order(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges
    pub fn size(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.order() == 0
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_weights()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.inner.node_weights_mut()
    }

    pub fn node_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|n| n.key.as_str())
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeIndex> {
        self.inner.edge_indices()
    }

    pub fn edge(&self, id: EdgeIndex) -> Option<&Edge> {
        self.inner.edge_weight(id)
    }

    pub fn edge_endpoints(&self, id: EdgeIndex) -> Option<(&Node, &Node)> {
        let (a, b) = self.inner.edge_endpoints(id)?;
        Some((&self.inner[a], &self.inner[b]))
    }

    pub fn edge_between(&self, source: &str, target: &str) -> Option<&Edge> {
        let (&a, &b) = (self.index.get(source)?, self.index.get(target)?);
        self.inner.find_edge(a, b).map(|e| &self.inner[e])
    }

    /// True when an edge exists in either direction
    pub fn are_neighbors(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.inner.find_edge_undirected(a, b).is_some(),
            _ => false,
        }
    }

    /// Distinct neighbors in either direction, in no particular order
    pub fn neighbors(&self, key: &str) -> Vec<&str> {
        let Some(&index) = self.index.get(key) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.inner
            .neighbors_undirected(index)
            .filter(|n| seen.insert(*n))
            .map(|n| self.inner[n].key.as_str())
            .collect()
    }

    pub fn in_degree(&self, key: &str) -> usize {
        self.degree(key, Direction::Incoming)
    }

    pub fn out_degree(&self, key: &str) -> usize {
        self.degree(key, Direction::Outgoing)
    }

    fn degree(&self, key: &str, direction: Direction) -> usize {
        self.index
            .get(key)
            .map(|&i| self.inner.edges_directed(i, direction).count())
            .unwrap_or(0)
    }

    /// Overwrite a node's position. Returns false for unknown keys.
    pub fn set_position(&mut self, key: &str, x: f64, y: f64) -> bool {
        match self.node_mut(key) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Node keys in index order alongside a flat copy suitable for a layout
    /// session. Index `i` of the layout graph is `keys[i]`.
    pub fn layout_snapshot(&self) -> (Vec<String>, LayoutGraph) {
        let mut layout = LayoutGraph::with_capacity(self.order(), self.size());
        let mut keys = Vec::with_capacity(self.order());
        for node in self.nodes() {
            keys.push(node.key.clone());
            layout.push_node(node.x, node.y);
        }
        for edge in self.inner.edge_indices() {
            if let Some((a, b)) = self.inner.edge_endpoints(edge) {
                layout.push_edge(a.index(), b.index(), f64::from(self.inner[edge].weight));
            }
        }
        (keys, layout)
    }
}

/// Deterministic point in `[-1, 1]²` derived from a key
fn stable_pair(key: &str) -> (f64, f64) {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = (hash & 0xffff_ffff) as f64 / u32::MAX as f64;
    let y = ((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
