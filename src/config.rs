//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::CONFIG_DIR_NAME;
use crate::keyboard::{InputCapability, InputPreference, KeyboardOptions, KeyboardVariant, RepeatSchedule};

/// Theme display mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    /// Automatically detect OS theme (dark/light)
    #[default]
    Auto,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

/// Keyboard behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Enabled language identifiers, in switch order
    pub languages: Vec<String>,
    /// Grid arrangement and shift behavior
    pub variant: KeyboardVariant,
    /// Render inserted newlines and non-breaking spaces verbatim
    pub preserve_whitespace: bool,
    /// Pointer or touch input
    pub input: InputPreference,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            languages: vec!["english".to_string()],
            variant: KeyboardVariant::default(),
            preserve_whitespace: true,
            input: InputPreference::default(),
        }
    }
}

/// Backspace repeat timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatConfig {
    /// Delay before the first repeat
    pub initial_delay_ms: u64,
    /// Amount each following delay shrinks by
    pub step_ms: u64,
    /// Shortest delay
    pub min_delay_ms: u64,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 400,
            step_ms: 40,
            min_delay_ms: 50,
        }
    }
}

impl RepeatConfig {
    /// The repeat curve these settings describe.
    #[must_use]
    pub fn schedule(&self) -> RepeatSchedule {
        RepeatSchedule {
            initial: Duration::from_millis(self.initial_delay_ms),
            step: Duration::from_millis(self.step_ms),
            min: Duration::from_millis(self.min_delay_ms),
        }
    }
}

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathConfig {
    /// Directory of user layout files, registered after the built-in ones
    pub layouts_dir: Option<PathBuf>,
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show the keyboard on startup
    pub start_visible: bool,
    /// Theme mode preference (Auto, Dark, Light)
    pub theme_mode: ThemeMode,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            start_visible: true,
            theme_mode: ThemeMode::default(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/Tapboard/config.toml`
/// - macOS: `~/Library/Application Support/Tapboard/config.toml`
/// - Windows: `%APPDATA%\Tapboard\config.toml`
///
/// # Validation
///
/// - at least one language must be enabled
/// - `min_delay_ms` must be positive and no larger than `initial_delay_ms`
/// - `layouts_dir`, if set, must be a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Keyboard behavior
    pub keyboard: KeyboardConfig,
    /// Backspace repeat timing
    pub repeat: RepeatConfig,
    /// File system paths
    pub paths: PathConfig,
    /// UI preferences
    pub ui: UiConfig,
    /// Logging
    pub log: LogConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/Tapboard/`
    /// - macOS: `~/Library/Application Support/Tapboard/`
    /// - Windows: `%APPDATA%\Tapboard\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Gets the path of the log file.
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("tapboard.log"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads and validates configuration from `path`.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to the platform config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.keyboard.languages.is_empty() {
            anyhow::bail!("At least one keyboard language must be enabled");
        }
        if let Some(lang) = self.keyboard.languages.iter().find(|l| l.trim().is_empty()) {
            anyhow::bail!("Invalid language identifier: {lang:?}");
        }

        let repeat = &self.repeat;
        if repeat.min_delay_ms == 0 {
            anyhow::bail!("repeat.min_delay_ms must be greater than zero");
        }
        if repeat.min_delay_ms > repeat.initial_delay_ms {
            anyhow::bail!(
                "repeat.min_delay_ms ({}) cannot exceed repeat.initial_delay_ms ({})",
                repeat.min_delay_ms,
                repeat.initial_delay_ms
            );
        }

        if let Some(dir) = &self.paths.layouts_dir {
            if !dir.is_dir() {
                anyhow::bail!("Layouts directory does not exist: {}", dir.display());
            }
        }

        Ok(())
    }

    /// Keyboard construction options, resolving the input preference.
    #[must_use]
    pub fn keyboard_options(&self) -> KeyboardOptions {
        KeyboardOptions {
            variant: self.keyboard.variant,
            preserve_whitespace: self.keyboard.preserve_whitespace,
            input: InputCapability::resolve(self.keyboard.input),
            repeat: self.repeat.schedule(),
            visible: self.ui.start_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.keyboard.languages, vec!["english"]);
        assert_eq!(config.keyboard.variant, KeyboardVariant::Classic);
        assert!(config.keyboard.preserve_whitespace);
        assert_eq!(config.repeat.initial_delay_ms, 400);
        assert_eq!(config.ui.theme_mode, ThemeMode::Auto);
        assert_eq!(config.log.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_repeat() {
        let mut config = Config::new();

        config.repeat.min_delay_ms = 0;
        assert!(config.validate().is_err());

        config.repeat.min_delay_ms = 500;
        assert!(config.validate().is_err());

        config.repeat.min_delay_ms = 400;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_languages() {
        let mut config = Config::new();
        config.keyboard.languages.clear();
        assert!(config.validate().is_err());

        config.keyboard.languages = vec!["english".to_string(), " ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_layouts_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new();

        config.paths.layouts_dir = Some(temp_dir.path().join("missing"));
        assert!(config.validate().is_err());

        config.paths.layouts_dir = Some(temp_dir.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(
            &config_file,
            "[keyboard]\nlanguages = [\"greek\", \"english\"]\nvariant = \"single_shift\"\n\n[ui]\ntheme_mode = \"Dark\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_file).unwrap();
        assert_eq!(config.keyboard.languages, vec!["greek", "english"]);
        assert_eq!(config.keyboard.variant, KeyboardVariant::SingleShift);
        assert!(config.keyboard.preserve_whitespace);
        assert_eq!(config.ui.theme_mode, ThemeMode::Dark);
        assert_eq!(config.repeat, RepeatConfig::default());
    }

    #[test]
    fn test_config_load_rejects_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[repeat]\nmin_delay_ms = 0\n").unwrap();

        assert!(Config::load_from(&config_file).is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.keyboard.input = InputPreference::Touch;
        config.repeat.step_ms = 25;
        config.save_to(&config_file).unwrap();

        assert!(!config_file.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_keyboard_options() {
        let mut config = Config::new();
        config.keyboard.input = InputPreference::Touch;
        config.ui.start_visible = false;

        let options = config.keyboard_options();
        assert_eq!(options.input, InputCapability::Touch);
        assert!(!options.visible);
        assert_eq!(options.repeat, RepeatSchedule::default());
    }
}
