use crate::arrange;
use crate::builder::{BuilderOptions, GraphBuilder};
use crate::color::Rgb;
use crate::focus::neighborhood;
use crate::layout::{LayoutOptions, LayoutOrchestrator, LayoutState};
use crate::model::{Graph, NodeType, ResourceAttrs};
use crate::record::Record;
use crate::refresh::{DEFAULT_REFRESH_WINDOW, RefreshCoalescer};
use crate::sizing::{SizeMode, apply_size_mode};
use crate::view::{self, EdgeRender, NodeRender, ViewState};
use httpgraph_layout::{ForceDirected, LayoutAlgorithm, LayoutError, LayoutSettings};
use petgraph::graph::EdgeIndex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_SIZE_MIN: f64 = 2.0;
pub const DEFAULT_SIZE_MAX: f64 = 12.0;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub builder: BuilderOptions,
    pub layout: LayoutOptions,
    pub refresh_window: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            builder: BuilderOptions::default(),
            layout: LayoutOptions::default(),
            refresh_window: DEFAULT_REFRESH_WINDOW,
        }
    }
}

/// Counts reported after loading or on each live refresh
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSummary {
    /// Every node type, in depth order, including empty ones
    pub nodes_by_type: Vec<(NodeType, usize)>,
    pub nodes: usize,
    pub edges: usize,
    pub domains_colored: usize,
    pub skipped_json: usize,
    pub skipped_url: usize,
}

/// Node attributes minus position, plus connectivity
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub key: String,
    pub label: String,
    pub node_type: NodeType,
    pub domain: String,
    pub visited: u32,
    pub size: f64,
    pub color: Rgb,
    pub resource: Option<ResourceAttrs>,
    pub neighbors: usize,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// What changed during one [`Session::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    pub positions_changed: bool,
    pub refresh_due: bool,
}

/// One graph being built and explored.
///
/// Owns everything a data source needs: the graph, the builder, the view
/// state, the layout session and the pending refresh. Switching sources goes
/// through [`Session::reset`], which tears the old state down first.
pub struct Session {
    options: SessionOptions,
    graph: Graph,
    builder: GraphBuilder,
    view: ViewState,
    layout: LayoutOrchestrator,
    refresh: RefreshCoalescer,
    skipped_json: usize,
    size_mode: SizeMode,
    size_range: (f64, f64),
    live: bool,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self::with_algorithm(options, Arc::new(ForceDirected))
    }

    pub fn with_algorithm(options: SessionOptions, algorithm: Arc<dyn LayoutAlgorithm>) -> Self {
        Self {
            graph: Graph::new(),
            builder: GraphBuilder::new(options.builder.clone()),
            view: ViewState::default(),
            layout: LayoutOrchestrator::new(algorithm, options.layout.clone()),
            refresh: RefreshCoalescer::new(options.refresh_window),
            skipped_json: 0,
            size_mode: SizeMode::Default,
            size_range: (DEFAULT_SIZE_MIN, DEFAULT_SIZE_MAX),
            live: false,
            options,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn layout(&self) -> &LayoutOrchestrator {
        &self.layout
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    // ====================================================================
    // Lifecycle
    // ====================================================================

    /// Replace the current graph with one built from newline-delimited JSON
    /// records. Blank lines are ignored; bad lines are counted and skipped.
    pub fn load_records<I, S>(&mut self, lines: I) -> GraphSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reset();
        for line in lines {
            self.ingest_line(line.as_ref());
        }
        self.refresh.cancel();
        self.reapply_sizes();

        let summary = self.summary();
        info!(
            "Loaded {} nodes and {} edges ({} bad records, {} unusable URLs)",
            summary.nodes, summary.edges, summary.skipped_json, summary.skipped_url
        );
        summary
    }

    /// Start an empty graph fed record by record
    pub fn start_live(&mut self) {
        self.reset();
        self.live = true;
        info!("Live session started");
    }

    /// Parse and apply one JSON line. Returns false when nothing was applied.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        match Record::from_json(line) {
            Ok(record) => self.process_record(&record),
            Err(e) => {
                debug!("Skipping record: {}", e);
                self.skipped_json += 1;
                false
            }
        }
    }

    pub fn process_record(&mut self, record: &Record) -> bool {
        let applied = self.builder.process_record(&mut self.graph, record);
        if applied {
            self.refresh.request(Instant::now());
        }
        applied
    }

    /// Tear down and start over with an empty graph
    pub fn reset(&mut self) {
        self.teardown();
        self.graph = Graph::new();
        self.builder = GraphBuilder::new(self.options.builder.clone());
        self.skipped_json = 0;
        self.live = false;
    }

    /// Kill the layout, drop any pending refresh and clear view state. The
    /// graph itself is left alone.
    pub fn teardown(&mut self) {
        self.layout.kill();
        self.refresh.cancel();
        self.view = ViewState::default();
    }

    // ====================================================================
    // Focus and filters
    // ====================================================================

    /// Restrict the view to nodes within `max_hops` of `root`. Unknown roots
    /// are rejected and the previous focus stays.
    pub fn set_focus(&mut self, root: &str, max_hops: usize) -> bool {
        match neighborhood(&self.graph, root, max_hops) {
            Some(set) => {
                debug!("Focus on {} ({} hops, {} nodes)", root, max_hops, set.len());
                self.view.focus = Some(set);
                true
            }
            None => {
                debug!("Cannot focus on unknown node {}", root);
                false
            }
        }
    }

    pub fn clear_focus(&mut self) {
        self.view.focus = None;
    }

    /// Returns true when the type is now hidden
    pub fn toggle_type(&mut self, node_type: NodeType) -> bool {
        toggle(&mut self.view.hidden_types, node_type)
    }

    /// Returns true when the domain is now hidden
    pub fn toggle_domain(&mut self, domain: &str) -> bool {
        toggle(&mut self.view.hidden_domains, domain.to_string())
    }

    /// Distinct node domains, sorted
    pub fn domains(&self) -> Vec<&str> {
        self.graph
            .nodes()
            .map(|n| n.domain.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Node types that occur in the graph, in depth order
    pub fn node_types(&self) -> Vec<NodeType> {
        NodeType::ALL
            .into_iter()
            .filter(|t| self.graph.nodes().any(|n| n.node_type == *t))
            .collect()
    }

    /// Domains containing `text`, ignoring case
    pub fn filter_domains(&self, text: &str) -> Vec<&str> {
        let needle = text.to_lowercase();
        self.domains()
            .into_iter()
            .filter(|d| d.to_lowercase().contains(&needle))
            .collect()
    }

    /// Returns true when the node is now hidden
    pub fn toggle_hidden(&mut self, key: &str) -> bool {
        if !self.graph.contains(key) {
            return false;
        }
        toggle(&mut self.view.manually_hidden, key.to_string())
    }

    /// Hide every neighbor of `key`. Returns how many were newly hidden.
    pub fn hide_neighbors(&mut self, key: &str) -> usize {
        let neighbors: Vec<String> = self
            .graph
            .neighbors(key)
            .into_iter()
            .map(str::to_string)
            .collect();
        neighbors
            .into_iter()
            .filter(|n| self.view.manually_hidden.insert(n.clone()))
            .count()
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.view.show_hidden = show;
    }

    pub fn hidden_count(&self) -> usize {
        self.view.manually_hidden.len()
    }

    pub fn select(&mut self, key: Option<&str>) {
        self.view.selected = key.filter(|k| self.graph.contains(k)).map(str::to_string);
    }

    pub fn set_hovered(&mut self, key: Option<&str>) {
        self.view.hovered = key.filter(|k| self.graph.contains(k)).map(str::to_string);
    }

    /// Select the first node whose label, then key, equals `text`
    pub fn search(&mut self, text: &str) -> Option<String> {
        let found = self
            .graph
            .nodes()
            .find(|n| n.label == text)
            .or_else(|| self.graph.node(text))
            .map(|n| n.key.clone())?;
        self.view.selected = Some(found.clone());
        Some(found)
    }

    pub fn reset_filters(&mut self) {
        let hovered = self.view.hovered.take();
        self.view = ViewState {
            hovered,
            ..ViewState::default()
        };
    }

    // ====================================================================
    // Inspection
    // ====================================================================

    pub fn node_info(&self, key: &str) -> Option<NodeInfo> {
        let node = self.graph.node(key)?;
        Some(NodeInfo {
            key: node.key.clone(),
            label: node.label.clone(),
            node_type: node.node_type,
            domain: node.domain.clone(),
            visited: node.visited,
            size: node.size,
            color: node.color,
            resource: node.resource.clone(),
            neighbors: self.graph.neighbors(key).len(),
            in_degree: self.graph.in_degree(key),
            out_degree: self.graph.out_degree(key),
        })
    }

    pub fn summary(&self) -> GraphSummary {
        let nodes_by_type = NodeType::ALL
            .into_iter()
            .map(|t| (t, self.graph.nodes().filter(|n| n.node_type == t).count()))
            .collect();
        GraphSummary {
            nodes_by_type,
            nodes: self.graph.order(),
            edges: self.graph.size(),
            domains_colored: self.graph.palette().assigned_count(),
            skipped_json: self.skipped_json,
            skipped_url: self.builder.skipped_url(),
        }
    }

    pub fn node_view(&self, key: &str) -> Option<NodeRender<'_>> {
        view::node_view(&self.graph, &self.view, key)
    }

    pub fn edge_view(&self, id: EdgeIndex) -> Option<EdgeRender<'_>> {
        view::edge_view(&self.graph, &self.view, id)
    }

    /// Visible `(nodes, edges)` under the current view state
    pub fn visible_counts(&self) -> (usize, usize) {
        view::visible_counts(&self.graph, &self.view)
    }

    // ====================================================================
    // Layout and display
    // ====================================================================

    pub fn start_layout(&mut self) {
        self.layout.start(&self.graph);
    }

    pub fn stop_layout(&mut self) {
        self.layout.stop();
    }

    pub fn kill_layout(&mut self) {
        self.layout.kill();
    }

    pub fn layout_state(&self) -> LayoutState {
        self.layout.state()
    }

    pub fn update_layout_settings(
        &mut self,
        settings: LayoutSettings,
        iterations: usize,
    ) -> Result<(), LayoutError> {
        self.layout.update_settings(settings, iterations)
    }

    /// Drive one frame: merge layout positions and report whether the
    /// coalesced refresh has come due.
    pub fn tick(&mut self, now: Instant) -> FrameUpdate {
        let positions_changed = self.layout.tick(&mut self.graph);
        let refresh_due = self.refresh.due(now);
        if refresh_due {
            self.reapply_sizes();
        }
        FrameUpdate {
            positions_changed,
            refresh_due,
        }
    }

    pub fn arrange_circular(&mut self) {
        self.layout.kill();
        arrange::circular(&mut self.graph);
    }

    pub fn arrange_hierarchical(&mut self) {
        self.layout.kill();
        arrange::hierarchical(&mut self.graph);
    }

    pub fn size_mode(&self) -> SizeMode {
        self.size_mode
    }

    pub fn set_size_mode(&mut self, mode: SizeMode, min: f64, max: f64) {
        self.size_mode = mode;
        self.size_range = (min, max);
        apply_size_mode(&mut self.graph, mode, min, max);
    }

    fn reapply_sizes(&mut self) {
        if self.size_mode != SizeMode::Default {
            let (min, max) = self.size_range;
            apply_size_mode(&mut self.graph, self.size_mode, min, max);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

fn toggle<T: std::hash::Hash + Eq>(set: &mut std::collections::HashSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}
