//! The key grid: rows of rendered keys for the active layout and mode.
//!
//! Character keys show one glyph each from the selected table, in table
//! order, left to right and top to bottom. Command keys sit at fixed
//! positions around them and are relabeled, never re-tagged, when the
//! layout or mode changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::command::Command;
use crate::models::Layout;

/// Grid arrangement and shift behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardVariant {
    /// Backspace ends the first row, Enter the second, Shift starts the
    /// third; shift locks the case until pressed again.
    #[default]
    Classic,
    /// Shift and Backspace frame the last letter row, Enter ends the
    /// trailing row; typing a character while uppercase reverts to lowercase.
    SingleShift,
}

/// Address of a key in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId {
    /// Row index, top to bottom
    pub row: usize,
    /// Column index, left to right
    pub col: usize,
}

impl KeyId {
    /// Creates a key address.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// What a key is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Shows a glyph from the active character table
    Char,
    /// Fixed punctuation key that inserts its label
    Literal,
    /// Command key with a fixed tag
    Command(Command),
}

/// What pressing a key does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Insert text at the cursor
    Insert(String),
    /// Run a command
    Command(Command),
}

/// Presentation of one key: layout style overrides plus the font hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStyle {
    /// CSS-like properties from the layout's style override
    pub properties: BTreeMap<String, String>,
    /// Font family hint
    pub font: Option<String>,
}

impl KeyStyle {
    /// Gets a property value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    /// Returns true if nothing overrides the default look.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.font.is_none()
    }
}

/// One rendered key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Key kind
    pub kind: KeyKind,
    /// Text displayed on the key
    pub label: String,
    /// Presentation overrides
    pub style: KeyStyle,
    /// Visual pressed mark
    pub pressed: bool,
}

impl Key {
    fn glyph(glyph: &str, layout: &Layout) -> Self {
        let properties = layout
            .style_for(glyph)
            .map(|s| s.properties.clone())
            .unwrap_or_default();
        Self {
            kind: KeyKind::Char,
            label: glyph.to_string(),
            style: KeyStyle {
                properties,
                font: layout.font().map(String::from),
            },
            pressed: false,
        }
    }

    fn literal(text: &str) -> Self {
        Self {
            kind: KeyKind::Literal,
            label: text.to_string(),
            style: KeyStyle::default(),
            pressed: false,
        }
    }

    fn command(command: Command, label: &str) -> Self {
        Self {
            kind: KeyKind::Command(command),
            label: label.to_string(),
            style: KeyStyle::default(),
            pressed: false,
        }
    }

    fn fixed(command: Command) -> Self {
        Self::command(command, command.default_label())
    }

    /// The command tag, if this is a command key.
    #[must_use]
    pub fn command_tag(&self) -> Option<Command> {
        match self.kind {
            KeyKind::Command(command) => Some(command),
            _ => None,
        }
    }

    /// The action performed when this key is released.
    #[must_use]
    pub fn action(&self) -> KeyAction {
        match self.kind {
            KeyKind::Command(command) => KeyAction::Command(command),
            KeyKind::Char | KeyKind::Literal => KeyAction::Insert(self.label.clone()),
        }
    }
}

/// Splits a table into rows by the partition; overflow continues in rows of
/// the last partition length so every glyph is placed exactly once.
fn partition<'a>(table: &'a [String], lengths: &[usize]) -> Vec<&'a [String]> {
    let mut rows = Vec::new();
    let mut rest = table;

    for &len in lengths {
        let take = len.min(rest.len());
        rows.push(&rest[..take]);
        rest = &rest[take..];
    }

    let overflow_len = lengths.last().copied().unwrap_or(rest.len()).max(1);
    while !rest.is_empty() {
        let take = overflow_len.min(rest.len());
        rows.push(&rest[..take]);
        rest = &rest[take..];
    }

    rows
}

/// The rendered grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGrid {
    variant: KeyboardVariant,
    with_switch: bool,
    rows: Vec<Vec<Key>>,
    /// Character keys per row, in row order
    char_counts: Vec<usize>,
}

impl KeyGrid {
    /// Builds a grid for a layout and mode.
    ///
    /// `with_switch` adds the language switch key to the trailing row.
    #[must_use]
    pub fn new(
        layout: &Layout,
        numeric: bool,
        uppercase: bool,
        variant: KeyboardVariant,
        with_switch: bool,
    ) -> Self {
        let mut grid = Self {
            variant,
            with_switch,
            rows: Vec::new(),
            char_counts: Vec::new(),
        };
        grid.populate(layout, numeric, uppercase);
        grid
    }

    /// Rebuilds every row for a layout and mode.
    ///
    /// The character table is numeric if `numeric`, otherwise upper- or
    /// lowercase per `uppercase`. Pressed marks are cleared.
    pub fn populate(&mut self, layout: &Layout, numeric: bool, uppercase: bool) {
        let table = layout.table(numeric, uppercase);
        let mut char_rows: Vec<Vec<Key>> = partition(table, layout.row_lengths())
            .into_iter()
            .map(|slice| slice.iter().map(|g| Key::glyph(g, layout)).collect())
            .collect();

        let min_rows = match self.variant {
            KeyboardVariant::Classic => 3,
            KeyboardVariant::SingleShift => 1,
        };
        while char_rows.len() < min_rows {
            char_rows.push(Vec::new());
        }
        self.char_counts = char_rows.iter().map(Vec::len).collect();

        let last = char_rows.len() - 1;
        let mut rows = Vec::with_capacity(char_rows.len() + 1);
        for (idx, mut row) in char_rows.into_iter().enumerate() {
            match self.variant {
                KeyboardVariant::Classic => match idx {
                    0 => row.push(Key::fixed(Command::Backspace)),
                    1 => row.push(Key::fixed(Command::Enter)),
                    2 => row.insert(0, Key::fixed(Command::Shift)),
                    _ => {}
                },
                KeyboardVariant::SingleShift if idx == last => {
                    row.insert(0, Key::fixed(Command::Shift));
                    row.push(Key::fixed(Command::Backspace));
                }
                KeyboardVariant::SingleShift => {}
            }
            rows.push(row);
        }

        let mut trailing = vec![
            Key::command(Command::Numpad, layout.numpad_label(numeric)),
            Key::literal(","),
            Key::command(Command::Space, layout.display_name()),
            Key::literal("."),
        ];
        if self.with_switch {
            trailing.push(Key::fixed(Command::Switch));
        }
        if self.variant == KeyboardVariant::SingleShift {
            trailing.push(Key::fixed(Command::Enter));
        }
        rows.push(trailing);

        self.rows = rows;
    }

    /// Grid arrangement.
    #[must_use]
    pub fn variant(&self) -> KeyboardVariant {
        self.variant
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Key>] {
        &self.rows
    }

    /// Gets a key.
    #[must_use]
    pub fn key(&self, id: KeyId) -> Option<&Key> {
        self.rows.get(id.row)?.get(id.col)
    }

    /// Sets or clears a key's pressed mark. Unknown ids are ignored.
    pub fn set_pressed(&mut self, id: KeyId, pressed: bool) {
        if let Some(key) = self.rows.get_mut(id.row).and_then(|r| r.get_mut(id.col)) {
            key.pressed = pressed;
        }
    }

    /// Clears every pressed mark.
    pub fn release_all(&mut self) {
        for key in self.rows.iter_mut().flatten() {
            key.pressed = false;
        }
    }

    /// Number of character rows (the trailing command row excluded).
    #[must_use]
    pub fn char_row_count(&self) -> usize {
        self.char_counts.len()
    }

    /// Character keys in a row.
    #[must_use]
    pub fn char_count(&self, row: usize) -> usize {
        self.char_counts.get(row).copied().unwrap_or(0)
    }

    /// Glyphs of every character key, in grid order.
    #[must_use]
    pub fn glyphs(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, key)| key.kind == KeyKind::Char)
            .map(|(_, key)| key.label.as_str())
            .collect()
    }

    /// Location of the first key with a command tag.
    #[must_use]
    pub fn find_command(&self, command: Command) -> Option<KeyId> {
        self.iter()
            .find(|(_, key)| key.command_tag() == Some(command))
            .map(|(id, _)| id)
    }

    /// Location of the first key labeled `label`.
    #[must_use]
    pub fn find_label(&self, label: &str) -> Option<KeyId> {
        self.iter()
            .find(|(_, key)| key.label == label)
            .map(|(id, _)| id)
    }

    /// Iterates keys with their ids, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &Key)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, key)| (KeyId::new(r, c), key))
        })
    }
}
