use crate::model::Graph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeMode {
    /// Each node keeps the size it was created with
    #[default]
    Default,
    /// Linear in the visit count
    Visited,
    /// Logarithmic in the visit count
    VisitedLog,
}

impl SizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeMode::Default => "default",
            SizeMode::Visited => "visited",
            SizeMode::VisitedLog => "visited-log",
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(SizeMode::Default),
            "visited" => Ok(SizeMode::Visited),
            "visited-log" => Ok(SizeMode::VisitedLog),
            other => Err(format!("unknown size mode '{}'", other)),
        }
    }
}

/// Rewrite every node's `size` for `mode`, scaling visit counts into
/// `[min, max]`. `Default` ignores the range and restores creation sizes.
pub fn apply_size_mode(graph: &mut Graph, mode: SizeMode, min: f64, max: f64) {
    if mode == SizeMode::Default {
        for node in graph.nodes_mut() {
            node.size = node.base_size;
        }
        return;
    }

    let max_visited = graph.nodes().map(|n| n.visited).max().unwrap_or(1).max(1) as f64;
    let scale = |visited: f64| match mode {
        SizeMode::VisitedLog => visited.ln_1p(),
        _ => visited,
    };
    let normaliser = scale(max_visited);

    for node in graph.nodes_mut() {
        let norm = if normaliser > 1.0 {
            scale(f64::from(node.visited.max(1))) / normaliser
        } else {
            0.0
        };
        node.size = min + norm * (max - min);
    }
}
