use crate::algorithm::LayoutAlgorithm;
use crate::error::Result;
use crate::graph::LayoutGraph;
use crate::message::{LayoutCommand, LayoutEvent, LayoutTransport};
use crate::settings::{DEFAULT_BATCH_ITERATIONS, LayoutSettings};
use std::collections::VecDeque;
use std::sync::Arc;

/// Same protocol as [`crate::LayoutWorker`], executed on the caller's
/// thread. Each `poll` while running computes exactly one batch, so the
/// caller's frame loop is the scheduler.
pub struct InlineSimulation {
    algorithm: Arc<dyn LayoutAlgorithm>,
    graph: Option<LayoutGraph>,
    pending: VecDeque<LayoutEvent>,
    settings: LayoutSettings,
    iterations: usize,
    running: bool,
}

impl InlineSimulation {
    pub fn new(algorithm: Arc<dyn LayoutAlgorithm>) -> Self {
        Self {
            algorithm,
            graph: None,
            pending: VecDeque::new(),
            settings: LayoutSettings::default(),
            iterations: DEFAULT_BATCH_ITERATIONS,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl LayoutTransport for InlineSimulation {
    fn post(&mut self, command: LayoutCommand) -> Result<()> {
        match command {
            LayoutCommand::Init(graph) => {
                let node_count = graph.node_count();
                self.graph = Some(graph);
                self.running = false;
                self.pending.clear();
                self.pending.push_back(LayoutEvent::Ready { node_count });
            }
            LayoutCommand::Start {
                settings,
                iterations,
            } => {
                self.settings = settings;
                self.iterations = iterations.max(1);
                self.running = self.graph.is_some();
            }
            LayoutCommand::Stop => self.running = false,
            LayoutCommand::SettingsUpdate {
                settings,
                iterations,
            } => {
                self.settings = settings;
                self.iterations = iterations.max(1);
            }
        }
        Ok(())
    }

    fn poll(&mut self) -> Option<LayoutEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if !self.running {
            return None;
        }
        let graph = self.graph.as_mut()?;
        self.algorithm.assign(graph, self.iterations, &self.settings);
        Some(LayoutEvent::Positions(graph.positions().to_vec()))
    }

    fn terminate(&mut self) {
        self.graph = None;
        self.pending.clear();
        self.running = false;
    }
}
