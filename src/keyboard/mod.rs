//! The keyboard controller.
//!
//! A [`Keyboard`] owns the layout state (active layout, case, numeric mode,
//! enabled languages), the rendered [`KeyGrid`] and the repeat timer. It
//! turns press events into mode transitions or text edits on its
//! [`TextSurface`]. Every transition goes through one place that re-renders
//! the grid, so the grid and the logical state cannot drift apart.
//!
//! None of the public operations fail. Edits without a usable cursor,
//! unknown languages and presses off the grid are skipped and logged at
//! debug level.

pub mod command;
pub mod grid;
pub mod input;
pub mod repeat;

pub use command::{Command, ENTER_TEXT, SPACE_TEXT};
pub use grid::{Key, KeyAction, KeyGrid, KeyId, KeyKind, KeyStyle, KeyboardVariant};
pub use input::{InputCapability, InputPreference, Press, PressHandler, RawPress};
pub use repeat::{CancelToken, Clock, ManualClock, RepeatSchedule, RepeatTimer, SystemClock};

use anyhow::{Context, Result};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, trace};

use crate::models::Layout;
use crate::registry::SharedRegistry;
use crate::surface::TextSurface;

/// Construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardOptions {
    /// Grid arrangement and shift behavior
    pub variant: KeyboardVariant,
    /// Ask the surface to render newlines and non-breaking spaces verbatim
    pub preserve_whitespace: bool,
    /// Event family to listen to
    pub input: InputCapability,
    /// Backspace repeat curve
    pub repeat: RepeatSchedule,
    /// Whether the keyboard starts shown
    pub visible: bool,
}

/// Classic variant, shown, default repeat curve, and the input family
/// reported by [`InputCapability::detect`].
impl Default for KeyboardOptions {
    fn default() -> Self {
        Self {
            variant: KeyboardVariant::Classic,
            preserve_whitespace: true,
            input: InputCapability::detect(),
            repeat: RepeatSchedule::default(),
            visible: true,
        }
    }
}

/// The key currently held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    key: KeyId,
    /// Repeat cycle started by this press, for repeating keys
    token: Option<CancelToken>,
}

/// An on-screen keyboard attached to one text surface.
pub struct Keyboard<S: TextSurface> {
    registry: SharedRegistry,
    surface: S,
    layout: Rc<Layout>,
    uppercase: bool,
    numeric: bool,
    languages: Vec<String>,
    language_index: usize,
    grid: KeyGrid,
    visible: bool,
    input: InputCapability,
    held: Option<HeldKey>,
    repeat: RepeatTimer,
    clock: Box<dyn Clock>,
}

impl<S: TextSurface> Keyboard<S> {
    /// Creates a keyboard on the wall clock.
    ///
    /// See [`with_clock`](Self::with_clock).
    pub fn new(
        surface: S,
        registry: SharedRegistry,
        languages: Vec<String>,
        options: KeyboardOptions,
    ) -> Result<Self> {
        Self::with_clock(surface, registry, languages, options, Box::new(SystemClock))
    }

    /// Creates a keyboard driven by `clock`.
    ///
    /// Activates the first enabled language, or the registry's first layout
    /// when that language is unknown, then focuses the surface. Fails only
    /// when the registry holds no layout at all.
    pub fn with_clock(
        mut surface: S,
        registry: SharedRegistry,
        languages: Vec<String>,
        options: KeyboardOptions,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let layout = {
            let reg = registry.borrow();
            languages
                .first()
                .and_then(|lang| reg.find_by_language(lang))
                .or_else(|| reg.default_layout())
                .context("No layouts registered")?
        };

        let grid = KeyGrid::new(&layout, false, false, options.variant, languages.len() > 1);

        if options.preserve_whitespace {
            surface.preserve_whitespace();
        }
        surface.focus();

        debug!(
            lang = layout.lang(),
            variant = ?options.variant,
            input = ?options.input,
            "keyboard created"
        );

        Ok(Self {
            registry,
            surface,
            layout,
            uppercase: false,
            numeric: false,
            languages,
            language_index: 0,
            grid,
            visible: options.visible,
            input: options.input,
            held: None,
            repeat: RepeatTimer::new(options.repeat),
            clock,
        })
    }

    // === Visibility ===

    /// Shows the keyboard.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hides the keyboard. Layout state is kept; a press in progress is dropped.
    pub fn hide(&mut self) {
        self.visible = false;
        self.release();
    }

    /// Returns true if the keyboard is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // === Mode transitions ===

    /// Toggles uppercase. From numeric mode this returns to the alphabetic
    /// table in uppercase.
    pub fn switch_case(&mut self) {
        let layout = Rc::clone(&self.layout);
        self.set_layout(layout, false, !self.uppercase);
    }

    /// Toggles numeric mode. Either way uppercase is cleared.
    pub fn toggle_numpad(&mut self) {
        let layout = Rc::clone(&self.layout);
        self.set_layout(layout, !self.numeric, false);
    }

    /// Activates the layout registered for `lang`, in lowercase alphabetic
    /// mode. Unknown languages leave the keyboard unchanged.
    pub fn set_language(&mut self, lang: &str) {
        let Some(layout) = self.registry.borrow().find_by_language(lang) else {
            debug!(lang, "no layout for language, ignoring");
            return;
        };

        if let Some(index) = self.languages.iter().position(|l| l == lang) {
            self.language_index = index;
        }
        self.set_layout(layout, false, false);
    }

    /// Advances to the next enabled language, wrapping around.
    pub fn switch_language(&mut self) {
        if self.languages.is_empty() {
            return;
        }
        self.language_index = (self.language_index + 1) % self.languages.len();
        let lang = self.languages[self.language_index].clone();
        self.set_language(&lang);
    }

    fn set_layout(&mut self, layout: Rc<Layout>, numeric: bool, uppercase: bool) {
        debug!(
            lang = layout.lang(),
            numeric,
            uppercase,
            "layout state changed"
        );
        self.layout = layout;
        self.numeric = numeric;
        self.uppercase = uppercase;
        self.grid.populate(&self.layout, numeric, uppercase);
        if let Some(held) = self.held {
            self.grid.set_pressed(held.key, true);
        }
    }

    // === Text edits ===

    /// Inserts `text` at the start of the current selection and leaves a
    /// collapsed caret right after it.
    ///
    /// Returns false, without touching the surface, when there is no
    /// selection or it lies outside the surface.
    pub fn insert_at_cursor(&mut self, text: &str) -> bool {
        // Re-read every time: the host may have moved the selection since.
        let Some(selection) = self.surface.selection() else {
            debug!("no selection, insert skipped");
            return false;
        };
        let at = selection.start();
        if !self.surface.is_within(at) {
            debug!(position = ?at, "selection outside surface, insert skipped");
            return false;
        }

        let after = self.surface.insert(text, at);
        self.surface.collapse_to(after);
        self.surface.normalize();
        true
    }

    /// Deletes the selected range, or the character before a collapsed caret.
    ///
    /// At the start of the surface nothing is deleted. Returns false when
    /// there is no selection or it lies outside the surface. A range the
    /// surface refuses also returns false and keeps the selection.
    pub fn delete_at_cursor(&mut self) -> bool {
        let Some(selection) = self.surface.selection() else {
            debug!("no selection, delete skipped");
            return false;
        };
        let (start, end) = (selection.start(), selection.end());
        if !self.surface.is_within(start) || !self.surface.is_within(end) {
            debug!(position = ?start, "selection outside surface, delete skipped");
            return false;
        }

        let at = if selection.is_collapsed() {
            self.surface.delete_backward(start)
        } else {
            let Some(at) = self.surface.delete_range(start, end) else {
                debug!(?start, ?end, "range not deletable, delete skipped");
                return false;
            };
            at
        };
        self.surface.collapse_to(at);
        self.surface.normalize();
        true
    }

    // === Key dispatch ===

    /// Runs a key action.
    pub fn handle_action(&mut self, action: &KeyAction) {
        match action {
            KeyAction::Insert(text) => {
                self.insert_at_cursor(text);
            }
            KeyAction::Command(command) => self.run_command(*command),
        }
    }

    fn run_command(&mut self, command: Command) {
        debug!(command = command.id(), "command key");
        match command {
            Command::Shift => self.switch_case(),
            Command::Numpad => self.toggle_numpad(),
            Command::Switch => self.switch_language(),
            Command::Enter => {
                self.insert_at_cursor(ENTER_TEXT);
            }
            Command::Space => {
                self.insert_at_cursor(SPACE_TEXT);
            }
            Command::Backspace => {
                self.delete_at_cursor();
            }
        }
    }

    /// Runs the action of the key at `id`. Unknown ids are ignored.
    pub fn dispatch(&mut self, id: KeyId) {
        let Some(key) = self.grid.key(id) else {
            debug!(row = id.row, col = id.col, "no key at position");
            return;
        };
        let kind = key.kind;
        let action = key.action();

        self.handle_action(&action);

        let typed = matches!(kind, KeyKind::Char | KeyKind::Literal);
        if typed
            && self.uppercase
            && self.grid.variant() == KeyboardVariant::SingleShift
        {
            let layout = Rc::clone(&self.layout);
            self.set_layout(layout, false, false);
        }
    }

    // === Press handling ===

    /// Feeds a raw host event through the input capability.
    ///
    /// Returns false for events of the other input family and for presses
    /// that start off the grid.
    pub fn handle_raw(&mut self, raw: RawPress) -> bool {
        let input = self.input;
        input.dispatch(raw, self)
    }

    /// Runs every repeat tick that is due, deleting once per tick.
    ///
    /// Returns the number of ticks fired.
    pub fn tick(&mut self) -> usize {
        let Some(token) = self.held.and_then(|h| h.token) else {
            return 0;
        };
        if !self.repeat.is_current(token) {
            return 0;
        }

        let due = self.repeat.poll(self.clock.now());
        for _ in 0..due {
            self.delete_at_cursor();
        }
        if due > 0 {
            trace!(due, delay = ?self.repeat.current_delay(), "repeat ticks");
        }
        due
    }

    /// When [`tick`](Self::tick) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.repeat.next_deadline()
    }

    /// Clears pressed marks and stops any repeat.
    fn release(&mut self) {
        self.grid.release_all();
        if self.repeat.cancel() {
            trace!("repeat cancelled");
        }
        self.held = None;
    }

    // === Registry ===

    /// Registers a layout in the keyboard's registry.
    pub fn register_layout(&self, layout: impl Into<Rc<Layout>>) -> Result<Rc<Layout>> {
        self.registry.borrow_mut().register(layout)
    }

    /// Removes a layout from the keyboard's registry. The active layout stays
    /// active until the next language change.
    pub fn unregister_layout(&self, layout: &Rc<Layout>) -> bool {
        self.registry.borrow_mut().unregister(layout)
    }

    // === Accessors ===

    /// The shared registry.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// The active layout.
    pub fn layout(&self) -> &Rc<Layout> {
        &self.layout
    }

    /// Language identifier of the active layout.
    pub fn language(&self) -> &str {
        self.layout.lang()
    }

    /// Enabled languages, in switch order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Position in the enabled languages.
    pub fn language_index(&self) -> usize {
        self.language_index
    }

    /// Whether the uppercase table is shown.
    pub fn is_uppercase(&self) -> bool {
        self.uppercase
    }

    /// Whether the numeric table is shown.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// The rendered grid.
    pub fn grid(&self) -> &KeyGrid {
        &self.grid
    }

    /// Grid arrangement.
    pub fn variant(&self) -> KeyboardVariant {
        self.grid.variant()
    }

    /// Event family the keyboard listens to.
    pub fn input(&self) -> InputCapability {
        self.input
    }

    /// The key held down, if any.
    pub fn held_key(&self) -> Option<KeyId> {
        self.held.map(|h| h.key)
    }

    /// Returns true while a repeat cycle runs.
    pub fn is_repeating(&self) -> bool {
        self.repeat.is_active()
    }

    /// The text surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the text surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: TextSurface> PressHandler for Keyboard<S> {
    fn press_start(&mut self, key: KeyId) {
        let Some(repeats) = self
            .grid
            .key(key)
            .map(|k| k.command_tag().is_some_and(|c| c.repeats()))
        else {
            return;
        };

        self.release();
        self.grid.set_pressed(key, true);
        let token = repeats.then(|| self.repeat.start(self.clock.now()));
        if token.is_some() {
            trace!(row = key.row, col = key.col, "repeat started");
        }
        self.held = Some(HeldKey { key, token });
    }

    fn press_end(&mut self, key: KeyId) {
        self.release();
        self.dispatch(key);
    }

    fn press_cancel(&mut self) {
        self.release();
    }
}

impl<S: TextSurface + fmt::Debug> fmt::Debug for Keyboard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyboard")
            .field("surface", &self.surface)
            .field("lang", &self.layout.lang())
            .field("uppercase", &self.uppercase)
            .field("numeric", &self.numeric)
            .field("languages", &self.languages)
            .field("visible", &self.visible)
            .field("held", &self.held)
            .finish_non_exhaustive()
    }
}
