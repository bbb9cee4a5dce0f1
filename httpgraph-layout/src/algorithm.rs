use crate::graph::LayoutGraph;
use crate::settings::LayoutSettings;

/// Pluggable layout capability.
///
/// Implementations mutate positions in place and must leave every coordinate
/// finite.
pub trait LayoutAlgorithm: Send + Sync {
    fn assign(&self, graph: &mut LayoutGraph, iterations: usize, settings: &LayoutSettings);

    fn infer_settings(&self, graph: &LayoutGraph) -> LayoutSettings;
}

const MIN_DISTANCE: f64 = 0.01;
const MAX_DISPLACEMENT: f64 = 10.0;

/// Degree-weighted repulsion with edge springs and a pull toward the origin,
/// in the spirit of ForceAtlas2. Repulsion is computed exactly over all pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForceDirected;

impl LayoutAlgorithm for ForceDirected {
    fn assign(&self, graph: &mut LayoutGraph, iterations: usize, settings: &LayoutSettings) {
        let node_count = graph.node_count();
        if node_count == 0 {
            return;
        }

        let masses: Vec<f64> = graph.degrees().into_iter().map(|d| d as f64 + 1.0).collect();
        let mut forces = vec![0.0_f64; node_count * 2];

        for _ in 0..iterations {
            forces.fill(0.0);
            let positions = graph.positions();

            for i in 0..node_count {
                for j in (i + 1)..node_count {
                    let (dx, dy, distance) = separation(positions, i, j);
                    let magnitude = settings.scaling_ratio * masses[i] * masses[j] / distance;
                    forces[i * 2] += dx * magnitude;
                    forces[i * 2 + 1] += dy * magnitude;
                    forces[j * 2] -= dx * magnitude;
                    forces[j * 2 + 1] -= dy * magnitude;
                }
            }

            for edge in graph.edges() {
                let (dx, dy, distance) = separation(positions, edge.source, edge.target);
                let pull = if settings.lin_log_mode {
                    (1.0 + distance).ln()
                } else {
                    distance
                };
                let magnitude = pull * edge.weight.max(0.0);
                forces[edge.source * 2] -= dx * magnitude;
                forces[edge.source * 2 + 1] -= dy * magnitude;
                forces[edge.target * 2] += dx * magnitude;
                forces[edge.target * 2 + 1] += dy * magnitude;
            }

            for (i, mass) in masses.iter().enumerate() {
                let x = positions[i * 2];
                let y = positions[i * 2 + 1];
                let distance = (x * x + y * y).sqrt();
                if distance < MIN_DISTANCE {
                    continue;
                }
                let magnitude = if settings.strong_gravity_mode {
                    settings.gravity * mass
                } else {
                    settings.gravity * mass / distance
                };
                forces[i * 2] -= x * magnitude;
                forces[i * 2 + 1] -= y * magnitude;
            }

            let slow_down = settings.slow_down.max(MIN_DISTANCE);
            let positions = graph.positions_mut();
            for i in 0..node_count {
                let fx = forces[i * 2];
                let fy = forces[i * 2 + 1];
                let force = (fx * fx + fy * fy).sqrt();
                if !force.is_finite() || force == 0.0 {
                    continue;
                }
                let step = (force / (slow_down * (1.0 + force.sqrt()))).min(MAX_DISPLACEMENT);
                positions[i * 2] += fx / force * step;
                positions[i * 2 + 1] += fy / force * step;
            }
        }
    }

    fn infer_settings(&self, graph: &LayoutGraph) -> LayoutSettings {
        let order = graph.node_count().max(1) as f64;
        LayoutSettings {
            scaling_ratio: 10.0,
            gravity: 0.05,
            slow_down: 1.0 + order.ln(),
            strong_gravity_mode: true,
            lin_log_mode: false,
        }
    }
}

/// Unit direction from `j` to `i` and their distance. Coincident nodes are
/// separated along a fixed golden-angle direction so forces stay finite.
fn separation(positions: &[f64], i: usize, j: usize) -> (f64, f64, f64) {
    let dx = positions[i * 2] - positions[j * 2];
    let dy = positions[i * 2 + 1] - positions[j * 2 + 1];
    let distance = (dx * dx + dy * dy).sqrt();
    if distance < MIN_DISTANCE {
        let angle = ((i + j) as f64 * 0.618_034 + 0.37) * std::f64::consts::TAU;
        return (angle.cos(), angle.sin(), MIN_DISTANCE);
    }
    (dx / distance, dy / distance, distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_pair_stays_finite() {
        let mut graph = LayoutGraph::with_capacity(2, 1);
        graph.push_node(0.0, 0.0);
        graph.push_node(0.0, 0.0);
        graph.push_edge(0, 1, 3.0);

        ForceDirected.assign(&mut graph, 50, &LayoutSettings::default());

        assert!(graph.positions().iter().all(|v| v.is_finite()));
        assert_ne!(graph.position(0), graph.position(1));
    }

    #[test]
    fn test_infer_settings_slows_large_graphs() {
        let mut small = LayoutGraph::default();
        small.push_node(0.0, 0.0);
        let mut large = LayoutGraph::default();
        for i in 0..100 {
            large.push_node(i as f64, 0.0);
        }

        let small_settings = ForceDirected.infer_settings(&small);
        let large_settings = ForceDirected.infer_settings(&large);
        assert!(large_settings.slow_down > small_settings.slow_down);
        assert!(large_settings.strong_gravity_mode);
    }
}
