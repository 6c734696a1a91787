//! Tapboard Library
//!
//! An on-screen keyboard controller: a registry of character layouts, a key
//! grid that follows the active language and mode, text editing at the host's
//! cursor through the [`surface::TextSurface`] capability, and press-and-hold
//! repeat for deletion. The `tui` module hosts it in a terminal.

// Module declarations
pub mod config;
pub mod constants;
pub mod keyboard;
pub mod models;
pub mod parser;
pub mod registry;
pub mod surface;
pub mod tui;
