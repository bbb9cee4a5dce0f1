use crate::algorithm::LayoutAlgorithm;
use crate::error::{LayoutError, Result};
use crate::graph::LayoutGraph;
use crate::message::{LayoutCommand, LayoutEvent, LayoutTransport};
use crate::settings::{DEFAULT_BATCH_ITERATIONS, LayoutSettings};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const COMMAND_CAPACITY: usize = 32;
// Kept small so a stalled consumer throttles the simulation instead of
// queueing stale frames.
const EVENT_CAPACITY: usize = 2;

/// Layout simulation running as a separate tokio task.
///
/// The worker owns its own copy of the graph; only command and position
/// messages cross the channel boundary.
pub struct LayoutWorker {
    commands: mpsc::Sender<LayoutCommand>,
    events: mpsc::Receiver<LayoutEvent>,
    handle: JoinHandle<()>,
}

impl LayoutWorker {
    /// Spawn the worker on the ambient tokio runtime.
    ///
    /// Fails with [`LayoutError::NoRuntime`] when called outside a runtime,
    /// in which case callers are expected to fall back to inline execution.
    pub fn spawn(algorithm: Arc<dyn LayoutAlgorithm>) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LayoutError::NoRuntime)?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        let handle = runtime.spawn(run_worker(algorithm, command_rx, event_tx));
        info!("Layout worker spawned");

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            handle,
        })
    }

    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl LayoutTransport for LayoutWorker {
    fn post(&mut self, command: LayoutCommand) -> Result<()> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => LayoutError::QueueFull,
            TrySendError::Closed(_) => LayoutError::WorkerGone,
        })
    }

    fn poll(&mut self) -> Option<LayoutEvent> {
        self.events.try_recv().ok()
    }

    fn terminate(&mut self) {
        self.handle.abort();
        self.events.close();
        debug!("Layout worker terminated");
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_worker(
    algorithm: Arc<dyn LayoutAlgorithm>,
    mut commands: mpsc::Receiver<LayoutCommand>,
    events: mpsc::Sender<LayoutEvent>,
) {
    let mut graph: Option<LayoutGraph> = None;
    let mut settings = LayoutSettings::default();
    let mut iterations = DEFAULT_BATCH_ITERATIONS;
    let mut running = false;

    loop {
        // Idle workers park on the queue; running ones only peek so batches
        // keep flowing between commands.
        let command = if running {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv().await {
                Some(command) => Some(command),
                None => break,
            }
        };

        if let Some(command) = command {
            match command {
                LayoutCommand::Init(next) => {
                    let node_count = next.node_count();
                    graph = Some(next);
                    running = false;
                    debug!("Layout worker initialised with {} nodes", node_count);
                    if events.send(LayoutEvent::Ready { node_count }).await.is_err() {
                        break;
                    }
                }
                LayoutCommand::Start {
                    settings: next_settings,
                    iterations: next_iterations,
                } => {
                    settings = next_settings;
                    iterations = next_iterations.max(1);
                    running = graph.is_some();
                }
                LayoutCommand::Stop => running = false,
                LayoutCommand::SettingsUpdate {
                    settings: next_settings,
                    iterations: next_iterations,
                } => {
                    settings = next_settings;
                    iterations = next_iterations.max(1);
                }
            }
            continue;
        }

        let Some(graph) = graph.as_mut() else {
            running = false;
            continue;
        };

        algorithm.assign(graph, iterations, &settings);
        let buffer = graph.positions().to_vec();
        if events.send(LayoutEvent::Positions(buffer)).await.is_err() {
            break;
        }
        tokio::task::yield_now().await;
    }

    debug!("Layout worker finished");
}
