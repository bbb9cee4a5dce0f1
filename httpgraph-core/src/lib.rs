pub mod arrange;
pub mod builder;
pub mod color;
pub mod domain;
pub mod focus;
pub mod layout;
pub mod model;
pub mod record;
pub mod refresh;
pub mod session;
pub mod sizing;
pub mod view;

pub use builder::{BuilderOptions, GraphBuilder};
pub use color::{Palette, Rgb};
pub use domain::parse_domain;
pub use layout::{LayoutMode, LayoutOptions, LayoutOrchestrator, LayoutState};
pub use model::{Edge, Graph, NewNode, Node, NodeType, ResourceAttrs};
pub use record::{EventRecord, HttpUrl, Record, RecordError, UrlRejected};
pub use refresh::RefreshCoalescer;
pub use session::{FrameUpdate, GraphSummary, NodeInfo, Session, SessionOptions};
pub use sizing::{SizeMode, apply_size_mode};
pub use view::{EdgeRender, NodeRender, ViewState};
