//! Parsing for user-supplied layout files.
//!
//! Layout descriptors can be written as JSON, JSON5 or TOML; the format is
//! chosen by file extension.

pub mod layout_file;

// Re-export commonly used functions
pub use layout_file::{load_layout_dir, load_layout_file, LayoutFormat};
