use serde::{Deserialize, Serialize};

/// Flat, index-addressed copy of a graph handed to the layout simulation.
///
/// Node `i` owns `positions[2 * i]` and `positions[2 * i + 1]`. The index
/// order is fixed for the lifetime of a layout session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutGraph {
    positions: Vec<f64>,
    edges: Vec<LayoutEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl LayoutGraph {
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            positions: Vec::with_capacity(nodes * 2),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn push_node(&mut self, x: f64, y: f64) -> usize {
        self.positions.push(x);
        self.positions.push(y);
        self.node_count() - 1
    }

    /// Adds an edge between two existing node indices. Out-of-range indices
    /// and self-loops are ignored.
    pub fn push_edge(&mut self, source: usize, target: usize, weight: f64) {
        let count = self.node_count();
        if source >= count || target >= count || source == target {
            return;
        }
        self.edges.push(LayoutEdge {
            source,
            target,
            weight,
        });
    }

    pub fn node_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        let x = *self.positions.get(index * 2)?;
        let y = *self.positions.get(index * 2 + 1)?;
        Some((x, y))
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [f64] {
        &mut self.positions
    }

    /// Number of incident edges per node, regardless of direction
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count()];
        for edge in &self.edges {
            degrees[edge.source] += 1;
            degrees[edge.target] += 1;
        }
        degrees
    }
}
