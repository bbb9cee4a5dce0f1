use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("No async runtime available to host the layout worker")]
    NoRuntime,

    #[error("Layout worker command queue is full")]
    QueueFull,

    #[error("Layout worker has shut down")]
    WorkerGone,

    #[error("Invalid layout settings: {0}")]
    InvalidSettings(String),

    #[error("Settings parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
