pub mod algorithm;
pub mod error;
pub mod graph;
pub mod inline;
pub mod message;
pub mod settings;
pub mod worker;

pub use algorithm::{ForceDirected, LayoutAlgorithm};
pub use error::LayoutError;
pub use graph::{LayoutEdge, LayoutGraph};
pub use inline::InlineSimulation;
pub use message::{LayoutCommand, LayoutEvent, LayoutTransport};
pub use settings::{DEFAULT_BATCH_ITERATIONS, LayoutSettings, SettingsOverrides};
pub use worker::LayoutWorker;
