use crate::model::Graph;
use std::collections::{HashSet, VecDeque};

/// Nodes within `max_hops` undirected steps of `root`, root included.
///
/// Returns `None` when `root` is not in the graph.
pub fn neighborhood(graph: &Graph, root: &str, max_hops: usize) -> Option<HashSet<String>> {
    if !graph.contains(root) {
        return None;
    }

    let mut included = HashSet::from([root.to_string()]);
    let mut queue = VecDeque::from([(root.to_string(), 0usize)]);

    while let Some((key, depth)) = queue.pop_front() {
        if depth >= max_hops {
            continue;
        }
        for neighbor in graph.neighbors(&key) {
            if included.insert(neighbor.to_string()) {
                queue.push_back((neighbor.to_string(), depth + 1));
            }
        }
    }

    Some(included)
}
