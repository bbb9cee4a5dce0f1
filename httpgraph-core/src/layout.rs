use crate::model::Graph;
use httpgraph_layout::{
    InlineSimulation, LayoutAlgorithm, LayoutCommand, LayoutError, LayoutEvent, LayoutGraph,
    LayoutSettings, LayoutTransport, LayoutWorker, SettingsOverrides,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where layout batches are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Worker,
    MainThread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Idle,
    /// `Init` posted to the worker, waiting for `Ready`
    Starting,
    Running(LayoutMode),
    Stopped,
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Try the background worker before falling back to the main thread
    pub use_worker: bool,
    pub overrides: SettingsOverrides,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            use_worker: true,
            overrides: SettingsOverrides::default(),
        }
    }
}

/// Owns the layout session: the cached worker (at most one), the inline
/// fallback and the node ordering that position buffers refer to.
pub struct LayoutOrchestrator {
    algorithm: Arc<dyn LayoutAlgorithm>,
    worker: Option<LayoutWorker>,
    inline: InlineSimulation,
    state: LayoutState,
    mode: LayoutMode,
    use_worker: bool,
    overrides: SettingsOverrides,
    /// Settings pinned by `update_settings`; otherwise inferred per start
    pinned: Option<LayoutSettings>,
    settings: LayoutSettings,
    iterations: usize,
    snapshot: Vec<String>,
}

impl LayoutOrchestrator {
    pub fn new(algorithm: Arc<dyn LayoutAlgorithm>, options: LayoutOptions) -> Self {
        Self {
            inline: InlineSimulation::new(Arc::clone(&algorithm)),
            algorithm,
            worker: None,
            state: LayoutState::Idle,
            mode: LayoutMode::Worker,
            use_worker: options.use_worker,
            iterations: options.overrides.batch_iterations(),
            overrides: options.overrides,
            pinned: None,
            settings: LayoutSettings::default(),
            snapshot: Vec::new(),
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LayoutState::Starting | LayoutState::Running(_))
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Node keys in the order of the current position buffers
    pub fn snapshot(&self) -> &[String] {
        &self.snapshot
    }

    /// Only affects the next `start`
    pub fn set_use_worker(&mut self, use_worker: bool) {
        self.use_worker = use_worker;
    }

    /// Begin (or resume) iterating over the current graph. A no-op when a
    /// session is already underway.
    pub fn start(&mut self, graph: &Graph) {
        if self.is_running() {
            return;
        }

        let (keys, layout) = graph.layout_snapshot();
        self.settings = match self.pinned {
            Some(settings) => settings,
            None => {
                let inferred = self.algorithm.infer_settings(&layout);
                self.overrides.apply(inferred).unwrap_or_else(|e| {
                    warn!("Ignoring layout overrides: {}", e);
                    inferred
                })
            }
        };
        self.snapshot = keys;

        if self.use_worker && self.ensure_worker() {
            if let Some(worker) = self.worker.as_mut() {
                while worker.poll().is_some() {}
                match worker.post(LayoutCommand::Init(layout.clone())) {
                    Ok(()) => {
                        self.mode = LayoutMode::Worker;
                        self.state = LayoutState::Starting;
                        debug!("Layout init posted for {} nodes", self.snapshot.len());
                        return;
                    }
                    Err(e) => {
                        warn!("Layout worker rejected init ({}), running on main thread", e);
                        self.discard_worker();
                    }
                }
            }
        }

        self.start_inline(layout);
    }

    /// Advance the session by one frame and merge any new positions into
    /// `graph`. Returns true when node positions changed.
    pub fn tick(&mut self, graph: &mut Graph) -> bool {
        match self.state {
            LayoutState::Idle => false,
            LayoutState::Stopped => {
                if let Some(worker) = self.worker.as_mut() {
                    while worker.poll().is_some() {}
                }
                false
            }
            LayoutState::Starting => self.tick_starting(graph),
            LayoutState::Running(LayoutMode::Worker) => self.tick_worker(graph),
            LayoutState::Running(LayoutMode::MainThread) => self.tick_inline(graph),
        }
    }

    /// Halt iteration. The worker is kept for a later `start`.
    pub fn stop(&mut self) {
        match self.state {
            LayoutState::Starting | LayoutState::Running(LayoutMode::Worker) => {
                if let Some(worker) = self.worker.as_mut() {
                    if let Err(e) = worker.post(LayoutCommand::Stop) {
                        debug!("Layout stop not delivered: {}", e);
                    }
                }
            }
            LayoutState::Running(LayoutMode::MainThread) => {
                if let Err(e) = self.inline.post(LayoutCommand::Stop) {
                    debug!("Inline layout stop rejected: {}", e);
                }
            }
            LayoutState::Idle | LayoutState::Stopped => return,
        }
        self.state = LayoutState::Stopped;
        debug!("Layout stopped");
    }

    /// Terminate and drop the worker along with all simulation state.
    pub fn kill(&mut self) {
        self.discard_worker();
        self.inline.terminate();
        self.snapshot.clear();
        self.state = LayoutState::Idle;
        debug!("Layout killed");
    }

    /// Replace the settings for this and later sessions, pushed live to a
    /// running simulation.
    pub fn update_settings(
        &mut self,
        settings: LayoutSettings,
        iterations: usize,
    ) -> Result<(), LayoutError> {
        settings.validate()?;
        let iterations = iterations.max(1);

        // Nothing changes unless the running simulation accepted the update
        let update = LayoutCommand::SettingsUpdate {
            settings,
            iterations,
        };
        match self.state {
            LayoutState::Starting | LayoutState::Running(LayoutMode::Worker) => {
                if let Some(worker) = self.worker.as_mut() {
                    worker.post(update)?;
                }
            }
            LayoutState::Running(LayoutMode::MainThread) => self.inline.post(update)?,
            LayoutState::Idle | LayoutState::Stopped => {}
        }

        self.pinned = Some(settings);
        self.settings = settings;
        self.iterations = iterations;
        Ok(())
    }

    fn ensure_worker(&mut self) -> bool {
        if self.worker.as_ref().is_some_and(|w| !w.is_alive()) {
            debug!("Cached layout worker has exited, respawning");
            self.worker = None;
        }
        if self.worker.is_some() {
            return true;
        }
        match LayoutWorker::spawn(Arc::clone(&self.algorithm)) {
            Ok(worker) => {
                self.worker = Some(worker);
                true
            }
            Err(e) => {
                warn!("Layout worker unavailable ({}), running on main thread", e);
                false
            }
        }
    }

    fn discard_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
        }
    }

    fn start_inline(&mut self, layout: LayoutGraph) {
        let start = LayoutCommand::Start {
            settings: self.settings,
            iterations: self.iterations,
        };
        for command in [LayoutCommand::Init(layout), start] {
            if let Err(e) = self.inline.post(command) {
                warn!("Inline layout rejected command: {}", e);
            }
        }
        self.mode = LayoutMode::MainThread;
        self.state = LayoutState::Running(LayoutMode::MainThread);
        info!("Layout running on main thread for {} nodes", self.snapshot.len());
    }

    fn fall_back(&mut self, graph: &Graph) {
        warn!("Layout worker lost, continuing on main thread");
        self.discard_worker();
        let (keys, layout) = graph.layout_snapshot();
        self.snapshot = keys;
        self.start_inline(layout);
    }

    /// Re-post `Init` with a fresh snapshot after the graph grew
    fn resync(&mut self, graph: &Graph) {
        let (keys, layout) = graph.layout_snapshot();
        debug!("Graph grew from {} to {} nodes, resyncing layout", self.snapshot.len(), keys.len());
        self.snapshot = keys;

        match self.mode {
            LayoutMode::Worker => {
                let posted = match self.worker.as_mut() {
                    Some(worker) => worker.post(LayoutCommand::Init(layout)),
                    None => Err(LayoutError::WorkerGone),
                };
                match posted {
                    Ok(()) => self.state = LayoutState::Starting,
                    Err(e) => {
                        debug!("Resync failed: {}", e);
                        self.fall_back(graph);
                    }
                }
            }
            LayoutMode::MainThread => self.start_inline(layout),
        }
    }

    fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_alive())
    }

    fn tick_starting(&mut self, graph: &mut Graph) -> bool {
        if !self.worker_alive() {
            self.fall_back(graph);
            return false;
        }

        // Anything before `Ready` belongs to an older snapshot
        while let Some(event) = self.worker.as_mut().and_then(|w| w.poll()) {
            if let LayoutEvent::Ready { node_count } = event {
                if node_count != self.snapshot.len() {
                    warn!(
                        "Layout ready for {} nodes, expected {}",
                        node_count,
                        self.snapshot.len()
                    );
                }
                let start = LayoutCommand::Start {
                    settings: self.settings,
                    iterations: self.iterations,
                };
                let posted = match self.worker.as_mut() {
                    Some(worker) => worker.post(start),
                    None => Err(LayoutError::WorkerGone),
                };
                if let Err(e) = posted {
                    debug!("Layout start not delivered: {}", e);
                    self.fall_back(graph);
                    return false;
                }
                self.state = LayoutState::Running(LayoutMode::Worker);
                debug!("Layout worker running");
                break;
            }
        }
        false
    }

    fn tick_worker(&mut self, graph: &mut Graph) -> bool {
        if !self.worker_alive() {
            self.fall_back(graph);
            return false;
        }

        let mut latest = None;
        while let Some(event) = self.worker.as_mut().and_then(|w| w.poll()) {
            if let LayoutEvent::Positions(buffer) = event {
                latest = Some(buffer);
            }
        }

        let changed = latest.is_some_and(|buffer| self.apply_positions(graph, &buffer));
        if graph.order() != self.snapshot.len() {
            self.resync(graph);
        }
        changed
    }

    fn tick_inline(&mut self, graph: &mut Graph) -> bool {
        if graph.order() != self.snapshot.len() {
            self.resync(graph);
        }

        while let Some(event) = self.inline.poll() {
            if let LayoutEvent::Positions(buffer) = event {
                return self.apply_positions(graph, &buffer);
            }
        }
        false
    }

    fn apply_positions(&self, graph: &mut Graph, buffer: &[f64]) -> bool {
        if buffer.len() != self.snapshot.len() * 2 {
            warn!(
                "Discarding position buffer of length {} for {} nodes",
                buffer.len(),
                self.snapshot.len()
            );
            return false;
        }

        for (key, pair) in self.snapshot.iter().zip(buffer.chunks_exact(2)) {
            let (x, y) = (pair[0], pair[1]);
            if x.is_finite() && y.is_finite() {
                graph.set_position(key, x, y);
            }
        }
        true
    }
}

impl Default for LayoutOrchestrator {
    fn default() -> Self {
        Self::new(
            Arc::new(httpgraph_layout::ForceDirected),
            LayoutOptions::default(),
        )
    }
}
