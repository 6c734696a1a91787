//! Loading layout descriptors from disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::Layout;

/// Supported layout file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    /// `.json`
    Json,
    /// `.json5`
    Json5,
    /// `.toml`
    Toml,
}

impl LayoutFormat {
    /// Determines the format from a path's extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "json5" => Some(Self::Json5),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parses layout descriptor text in this format.
    pub fn parse(self, content: &str) -> Result<Layout> {
        let layout = match self {
            Self::Json => serde_json::from_str(content).context("Invalid JSON layout")?,
            Self::Json5 => json5::from_str(content).context("Invalid JSON5 layout")?,
            Self::Toml => toml::from_str(content).context("Invalid TOML layout")?,
        };
        Ok(layout)
    }
}

/// Loads and validates a single layout file.
///
/// # Errors
///
/// Returns an error if the extension is unsupported, the file cannot be read,
/// the content does not parse, or the layout fails validation.
pub fn load_layout_file(path: &Path) -> Result<Layout> {
    let format = LayoutFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported layout file extension: {} (expected .json, .json5 or .toml)",
            path.display()
        )
    })?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;

    let layout = format
        .parse(&content)
        .with_context(|| format!("Failed to parse layout file: {}", path.display()))?;

    layout
        .validate()
        .with_context(|| format!("Invalid layout in {}", path.display()))?;

    debug!(path = %path.display(), lang = layout.lang(), "loaded layout file");
    Ok(layout)
}

/// Loads every supported layout file in a directory, in file name order.
///
/// Files with other extensions are ignored. Files that fail to load are
/// logged and skipped so one broken layout does not hide the others.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be read.
pub fn load_layout_dir(dir: &Path) -> Result<Vec<Layout>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read layouts directory: {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && LayoutFormat::from_path(path).is_some())
        .collect();
    paths.sort();

    let mut layouts = Vec::with_capacity(paths.len());
    for path in paths {
        match load_layout_file(&path) {
            Ok(layout) => layouts.push(layout),
            Err(err) => warn!("Skipping layout file {}: {err:#}", path.display()),
        }
    }

    Ok(layouts)
}
