pub mod handlers;

// Re-export the helpers the binary and tests reach for
pub use handlers::{expand_path, format_summary, load_settings, read_record_lines};
