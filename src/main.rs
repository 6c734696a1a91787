//! Tapboard - on-screen keyboard in the terminal
//!
//! Hosts a virtual keyboard under an editor field: click keys with the mouse
//! to type, hold Backspace to delete with accelerating repeat.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tapboard::config::Config;
use tapboard::constants::{APP_BINARY_NAME, APP_NAME};
use tapboard::keyboard::{InputCapability, KeyboardVariant};
use tapboard::parser;
use tapboard::registry::LayoutRegistry;
use tapboard::tui::{self, App, Theme};

/// Tapboard - on-screen keyboard in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable a language (repeat to enable several; the first is active)
    #[arg(short, long = "lang", value_name = "ID")]
    languages: Vec<String>,

    /// Directory of extra layout files (.json, .json5, .toml)
    #[arg(long, value_name = "DIR")]
    layouts_dir: Option<PathBuf>,

    /// Use the single-shift keyboard variant
    #[arg(long)]
    single_shift: bool,

    /// Listen to touch events instead of pointer events
    #[arg(long)]
    touch: bool,

    /// Start with the keyboard hidden (F2 shows it)
    #[arg(long)]
    hidden: bool,

    /// Use this config file instead of the platform default
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the registered layouts and exit
    #[arg(long)]
    list_layouts: bool,
}

/// Sends log output to a file, since the terminal belongs to the UI.
fn init_logging(level: &str) -> Result<()> {
    let log_path = Config::log_file_path()?;
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// Applies command-line overrides on top of the config file.
fn apply_cli(config: &mut Config, cli: &Cli) {
    if !cli.languages.is_empty() {
        config.keyboard.languages.clone_from(&cli.languages);
    }
    if let Some(dir) = &cli.layouts_dir {
        config.paths.layouts_dir = Some(dir.clone());
    }
    if cli.single_shift {
        config.keyboard.variant = KeyboardVariant::SingleShift;
    }
    if cli.hidden {
        config.ui.start_visible = false;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_cli(&mut config, &cli);
    config
        .validate()
        .with_context(|| format!("Invalid options; see {APP_BINARY_NAME} --help"))?;

    // Listing prints to the terminal, so it leaves the log file alone
    if !cli.list_layouts {
        init_logging(&config.log.level)?;
        info!(version = env!("CARGO_PKG_VERSION"), "{} starting", APP_NAME);
    }

    let mut registry = LayoutRegistry::with_builtin()?;
    if let Some(dir) = &config.paths.layouts_dir {
        for layout in parser::load_layout_dir(dir)? {
            if let Err(err) = registry.register(layout) {
                warn!("{err:#}");
            }
        }
    }

    if cli.list_layouts {
        println!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));
        println!();
        for layout in registry.iter() {
            println!(
                "  {:<12} {:<16} {:?}",
                layout.lang(),
                layout.display_name(),
                layout.direction()
            );
        }
        return Ok(());
    }

    for lang in &config.keyboard.languages {
        if registry.find_by_language(lang).is_none() {
            warn!(lang = lang.as_str(), "enabled language has no layout");
        }
    }

    let mut options = config.keyboard_options();
    if cli.touch {
        options.input = InputCapability::Touch;
    }

    let mut app = App::new(
        registry.into_shared(),
        config.keyboard.languages.clone(),
        options,
        Theme::from_mode(config.ui.theme_mode),
    )?;

    // Initialize TUI
    let mut terminal = tui::setup_terminal()?;

    // Run main TUI loop
    let result = tui::run_tui(&mut app, &mut terminal);

    // Restore terminal
    tui::restore_terminal(terminal)?;

    result
}
