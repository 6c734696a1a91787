//! Terminal host for the on-screen keyboard.
//!
//! The host plays the part of the document the keyboard is attached to: an
//! owned editor field, a scratch field the keyboard must not write into, a
//! visibility toggle and the event loop that drives the repeat timer.

// Allow intentional type casts for terminal coordinates
#![allow(clippy::cast_possible_truncation)]

pub mod editor;
pub mod keyboard;
pub mod status_bar;
pub mod theme;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constants::APP_NAME;
use crate::keyboard::{InputCapability, KeyId, Keyboard, KeyboardOptions, RawPress};
use crate::models::TextDirection;
use crate::registry::SharedRegistry;
use crate::surface::{Document, EditableField, FieldId, SharedDocument};

pub use editor::EditorPane;
pub use keyboard::KeyboardWidget;
pub use status_bar::StatusBar;
pub use theme::Theme;

/// Longest the event loop sleeps without checking the repeat timer.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Host application state.
pub struct App {
    /// The host document
    pub document: SharedDocument,
    /// Field the keyboard owns
    pub editor: FieldId,
    /// Field outside the keyboard's reach
    pub scratch: FieldId,
    /// The keyboard attached to the editor field
    pub keyboard: Keyboard<EditableField>,
    /// Active color theme
    pub theme: Theme,
    /// Last status message
    pub status_message: String,
    /// Whether the status message reports a problem
    pub status_is_error: bool,
    /// Set when the user asked to quit
    pub should_quit: bool,
    /// Key rectangles from the last frame, for hit testing
    pub key_rects: Vec<(KeyId, Rect)>,
}

impl App {
    /// Builds the host document and attaches a keyboard to its editor field.
    pub fn new(
        registry: SharedRegistry,
        languages: Vec<String>,
        options: KeyboardOptions,
        theme: Theme,
    ) -> Result<Self> {
        let document = Document::new().into_shared();
        let (editor, scratch) = {
            let mut doc = document.borrow_mut();
            (doc.add_field("Editor", ""), doc.add_field("Scratch", ""))
        };

        let keyboard = Keyboard::new(
            EditableField::new(document.clone(), editor),
            registry,
            languages,
            options,
        )
        .context("Failed to create keyboard")?;

        Ok(Self {
            document,
            editor,
            scratch,
            keyboard,
            theme,
            status_message: "Ready".to_string(),
            status_is_error: false,
            should_quit: false,
            key_rects: Vec::new(),
        })
    }

    fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        self.status_message = message.into();
        self.status_is_error = is_error;
    }

    /// How long the event loop may wait for input before the next repeat tick.
    #[must_use]
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.keyboard
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| {
                deadline.saturating_duration_since(now).min(IDLE_POLL)
            })
    }

    /// Handles a terminal key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::F(2) => {
                if self.keyboard.is_visible() {
                    self.keyboard.hide();
                    self.set_status("Keyboard hidden", false);
                } else {
                    self.keyboard.show();
                    self.set_status("Keyboard shown", false);
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let target = if self.document.borrow().focused() == Some(self.editor) {
                    self.scratch
                } else {
                    self.editor
                };
                self.document.borrow_mut().focus(target);
                if target == self.scratch {
                    self.set_status("Scratch field: the keyboard will not type here", true);
                } else {
                    self.set_status("Editor field", false);
                }
            }
            KeyCode::Left => self.document.borrow_mut().move_caret(false),
            KeyCode::Right => self.document.borrow_mut().move_caret(true),
            _ => {}
        }
    }

    /// Turns a mouse button edge into the raw event family the keyboard listens to.
    fn raw_press(&self, down: bool, target: Option<KeyId>) -> RawPress {
        match (self.keyboard.input(), down) {
            (InputCapability::Pointer, true) => RawPress::PointerDown(target),
            (InputCapability::Pointer, false) => RawPress::PointerUp(target),
            (InputCapability::Touch, true) => RawPress::TouchStart(target),
            (InputCapability::Touch, false) => RawPress::TouchEnd(target),
        }
    }

    /// Handles a terminal mouse event.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.keyboard.is_visible() {
            return;
        }

        let down = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => true,
            MouseEventKind::Up(MouseButton::Left) => false,
            _ => return,
        };
        let target = KeyboardWidget::hit_test(&self.key_rects, mouse.column, mouse.row);
        let raw = self.raw_press(down, target);
        if self.keyboard.handle_raw(raw) {
            debug!(?raw, "press delivered");
        }
    }
}

/// Setup terminal for TUI
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main event loop
pub fn run_tui(app: &mut App, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    info!("event loop started");
    loop {
        let mut rects = Vec::new();
        terminal.draw(|f| rects = render(f, app))?;
        app.key_rects = rects;

        // Wake up in time for the next repeat tick
        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                // Terminal resized, will re-render on next loop
                _ => {}
            }
        }

        app.keyboard.tick();

        if app.should_quit {
            break;
        }
    }
    info!("event loop finished");
    Ok(())
}

/// Render the whole screen; returns the key rectangles drawn.
fn render(f: &mut Frame, app: &App) -> Vec<(KeyId, Rect)> {
    let theme = &app.theme;
    let full_bg = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(full_bg, f.area());

    let keyboard_height = if app.keyboard.is_visible() {
        app.keyboard.grid().rows().len() as u16 * 3 + 2
    } else {
        0
    };

    let chunks = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // Title bar
            Constraint::Min(5),                  // Editor panes
            Constraint::Length(keyboard_height), // Keyboard
            Constraint::Length(3),               // Status bar
        ])
        .split(f.area());

    let title = Line::from(vec![
        Span::styled(
            format!(" {APP_NAME} "),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled("on-screen keyboard", Style::default().fg(theme.text_muted)),
    ]);
    f.render_widget(Paragraph::new(title), chunks[0]);

    render_panes(f, chunks[1], app);

    let rects = if app.keyboard.is_visible() {
        let layout = app.keyboard.layout();
        KeyboardWidget::render(
            f,
            chunks[2],
            app.keyboard.grid(),
            &format!("Keyboard · {}", layout.display_name()),
            layout.direction(),
            theme,
        )
    } else {
        Vec::new()
    };

    StatusBar::render(f, chunks[3], app, theme);
    rects
}

fn render_panes(f: &mut Frame, area: Rect, app: &App) {
    let panes = RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let doc = app.document.borrow();
    let alignment = match app.keyboard.layout().direction() {
        TextDirection::Ltr => Alignment::Left,
        TextDirection::Rtl => Alignment::Right,
    };

    for (pane, field, title, align) in [
        (panes[0], app.editor, "Editor", alignment),
        (panes[1], app.scratch, "Scratch (not attached)", Alignment::Left),
    ] {
        EditorPane::render(
            f,
            pane,
            title,
            &doc.text(field),
            doc.selection(),
            field,
            doc.focused() == Some(field),
            align,
            &app.theme,
        );
    }
}
