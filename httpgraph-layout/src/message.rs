use crate::error::Result;
use crate::graph::LayoutGraph;
use crate::settings::LayoutSettings;

/// Control messages sent to a layout simulation
#[derive(Debug, Clone)]
pub enum LayoutCommand {
    /// Replace the simulated graph. Answered with [`LayoutEvent::Ready`].
    Init(LayoutGraph),
    /// Begin streaming batches of `iterations` steps
    Start {
        settings: LayoutSettings,
        iterations: usize,
    },
    /// Halt iteration, keeping the simulated graph for a later `Start`
    Stop,
    /// Swap settings without interrupting a running simulation
    SettingsUpdate {
        settings: LayoutSettings,
        iterations: usize,
    },
}

/// Messages reported back by a layout simulation
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    Ready { node_count: usize },
    /// Flat `(x, y)` pairs in the order of the last `Init` graph
    Positions(Vec<f64>),
}

/// Message-passing surface shared by the worker and the inline fallback, so
/// callers do not care where iterations actually run.
pub trait LayoutTransport {
    fn post(&mut self, command: LayoutCommand) -> Result<()>;

    /// Next pending event, if any. Never blocks.
    fn poll(&mut self) -> Option<LayoutEvent>;

    /// Drop all simulation state. The transport must not produce events
    /// afterwards.
    fn terminate(&mut self);
}
