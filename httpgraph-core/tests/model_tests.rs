// Tests for the graph model, sizing and static arrangements

use httpgraph_core::arrange;
use httpgraph_core::model::{Graph, NewNode, NodeType, ResourceAttrs};
use httpgraph_core::sizing::{SizeMode, apply_size_mode};

fn host(graph: &mut Graph, key: &str) {
    graph.add_node(NewNode::new(key, NodeType::Host, "example.com."));
}

// ============================================================================
// Node Tests
// ============================================================================

#[test]
fn test_add_node_counts_visits() {
    let mut graph = Graph::new();
    for expected in 1..=3 {
        host(&mut graph, "a.example.com");
        assert_eq!(graph.node("a.example.com").unwrap().visited, expected);
    }
    assert_eq!(graph.order(), 1);
}

#[test]
fn test_add_node_keeps_first_size_and_color() {
    let mut graph = Graph::new();
    graph.add_node(NewNode::new("a.example.com", NodeType::Host, "example.com."));
    let first = graph.node("a.example.com").unwrap().clone();

    graph.add_node(
        NewNode::new("a.example.com", NodeType::Host, "other.org.").with_size(20.0),
    );
    let second = graph.node("a.example.com").unwrap();

    assert_eq!(second.size, first.size);
    assert_eq!(second.color, first.color);
    assert_eq!(second.domain, "example.com.");
    assert_eq!((second.x, second.y), (first.x, first.y));
}

#[test]
fn test_add_node_default_sizes_by_type() {
    let mut graph = Graph::new();
    graph.add_node(NewNode::new("c", NodeType::Client, "localdomain"));
    graph.add_node(NewNode::new("d.", NodeType::Domain, "d."));
    graph.add_node(NewNode::new("r", NodeType::Resource, "d."));
    assert_eq!(graph.node("c").unwrap().size, 8.0);
    assert_eq!(graph.node("d.").unwrap().size, 6.0);
    assert_eq!(graph.node("r").unwrap().size, 3.0);
}

#[test]
fn test_initial_positions_deterministic() {
    let mut a = Graph::new();
    let mut b = Graph::new();
    host(&mut a, "a.example.com");
    host(&mut b, "a.example.com");

    let (na, nb) = (a.node("a.example.com").unwrap(), b.node("a.example.com").unwrap());
    assert_eq!((na.x, na.y), (nb.x, nb.y));
    assert!(na.x.abs() <= 500.0 && na.y.abs() <= 500.0);
}

#[test]
fn test_resource_attrs_filled_once() {
    let mut graph = Graph::new();
    graph.add_node(NewNode::new("a.example.com/x", NodeType::Resource, "example.com."));
    assert!(graph.node("a.example.com/x").unwrap().resource.is_none());

    let get = ResourceAttrs {
        method: Some("GET".to_string()),
        protocol: "https".to_string(),
        ..Default::default()
    };
    graph.add_node(
        NewNode::new("a.example.com/x", NodeType::Resource, "example.com.").with_resource(get),
    );
    let post = ResourceAttrs {
        method: Some("POST".to_string()),
        protocol: "https".to_string(),
        ..Default::default()
    };
    graph.add_node(
        NewNode::new("a.example.com/x", NodeType::Resource, "example.com.").with_resource(post),
    );

    let resource = graph.node("a.example.com/x").unwrap().resource.as_ref().unwrap();
    assert_eq!(resource.method.as_deref(), Some("GET"));
}

// ============================================================================
// Edge Tests
// ============================================================================

#[test]
fn test_self_loop_ignored() {
    let mut graph = Graph::new();
    host(&mut graph, "x");
    assert!(graph.add_edge("x", "x").is_none());
    assert_eq!(graph.size(), 0);
}

#[test]
fn test_edge_to_missing_node_ignored() {
    let mut graph = Graph::new();
    host(&mut graph, "x");
    assert!(graph.add_edge("x", "missing").is_none());
    assert!(graph.add_edge("missing", "x").is_none());
    assert_eq!(graph.size(), 0);
}

#[test]
fn test_repeated_edge_bumps_weight() {
    let mut graph = Graph::new();
    host(&mut graph, "x");
    host(&mut graph, "y");
    for _ in 0..5 {
        graph.add_edge("x", "y");
    }
    assert_eq!(graph.size(), 1);
    assert_eq!(graph.edge_between("x", "y").unwrap().weight, 5);
    assert!(graph.edge_between("y", "x").is_none());
}

#[test]
fn test_reverse_edge_is_distinct() {
    let mut graph = Graph::new();
    host(&mut graph, "x");
    host(&mut graph, "y");
    graph.add_edge("x", "y");
    graph.add_edge("y", "x");

    assert_eq!(graph.size(), 2);
    assert_eq!(graph.neighbors("x"), vec!["y"]);
    assert!(graph.are_neighbors("y", "x"));
    assert_eq!(graph.in_degree("x"), 1);
    assert_eq!(graph.out_degree("x"), 1);
}

#[test]
fn test_layout_snapshot_preserves_order() {
    let mut graph = Graph::new();
    for key in ["c", "a", "b"] {
        host(&mut graph, key);
    }
    graph.add_edge("c", "b");

    let (keys, layout) = graph.layout_snapshot();
    assert_eq!(keys, vec!["c", "a", "b"]);
    assert_eq!(layout.node_count(), 3);
    assert_eq!(layout.edges().len(), 1);
    let c = graph.node("c").unwrap();
    assert_eq!(layout.position(0), Some((c.x, c.y)));
}

// ============================================================================
// Sizing Tests
// ============================================================================

#[test]
fn test_size_mode_visited_linear() {
    let mut graph = Graph::new();
    host(&mut graph, "once");
    for _ in 0..3 {
        host(&mut graph, "thrice");
    }

    apply_size_mode(&mut graph, SizeMode::Visited, 2.0, 12.0);
    assert!((graph.node("once").unwrap().size - (2.0 + 10.0 / 3.0)).abs() < 1e-9);
    assert!((graph.node("thrice").unwrap().size - 12.0).abs() < 1e-9);

    apply_size_mode(&mut graph, SizeMode::Default, 2.0, 12.0);
    assert_eq!(graph.node("once").unwrap().size, 4.0);
}

#[test]
fn test_size_mode_visited_log() {
    let mut graph = Graph::new();
    host(&mut graph, "once");
    for _ in 0..9 {
        host(&mut graph, "often");
    }

    apply_size_mode(&mut graph, SizeMode::VisitedLog, 1.0, 11.0);
    let expected = 1.0 + (2f64.ln() / 10f64.ln()) * 10.0;
    assert!((graph.node("once").unwrap().size - expected).abs() < 1e-9);
    assert!((graph.node("often").unwrap().size - 11.0).abs() < 1e-9);
}

#[test]
fn test_size_mode_flat_visits_use_min() {
    let mut graph = Graph::new();
    host(&mut graph, "a");
    host(&mut graph, "b");
    apply_size_mode(&mut graph, SizeMode::Visited, 3.0, 9.0);
    assert!(graph.nodes().all(|n| n.size == 3.0));
}

#[test]
fn test_size_mode_parse() {
    assert_eq!("visited-log".parse::<SizeMode>(), Ok(SizeMode::VisitedLog));
    assert!("huge".parse::<SizeMode>().is_err());
}

// ============================================================================
// Arrangement Tests
// ============================================================================

#[test]
fn test_circular_arrangement_on_radius() {
    let mut graph = Graph::new();
    for key in ["a", "b", "c", "d"] {
        host(&mut graph, key);
    }
    arrange::circular(&mut graph);
    for node in graph.nodes() {
        let r = (node.x * node.x + node.y * node.y).sqrt();
        assert!((r - arrange::CIRCLE_RADIUS).abs() < 1e-6);
    }
}

#[test]
fn test_hierarchical_arrangement_by_depth() {
    let mut graph = Graph::new();
    graph.add_node(NewNode::new("localhost", NodeType::Client, "localdomain"));
    graph.add_node(NewNode::new("example.com.", NodeType::Domain, "example.com."));
    graph.add_node(NewNode::new("a/1", NodeType::Resource, "example.com."));
    graph.add_node(NewNode::new("a/2", NodeType::Resource, "example.com."));
    arrange::hierarchical(&mut graph);

    assert_eq!(graph.node("localhost").unwrap().y, 0.0);
    assert_eq!(graph.node("example.com.").unwrap().y, 200.0);
    let (r1, r2) = (graph.node("a/1").unwrap(), graph.node("a/2").unwrap());
    assert_eq!(r1.y, 600.0);
    assert_eq!((r2.x - r1.x).abs(), 40.0);
    assert_eq!(r1.x + r2.x, -40.0);
}
