//! Data models for keyboard layouts and their presentation hints.
//!
//! Models are plain data and independent of the controller and the UI.

pub mod layout;
pub mod rgb;

// Re-export all model types
pub use layout::{
    CharStyle, KeyTables, Layout, LayoutDescriptor, NumpadLabels, TextDirection,
    DEFAULT_ROW_LENGTHS,
};
pub use rgb::RgbColor;
