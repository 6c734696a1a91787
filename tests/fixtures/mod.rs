//! Shared test fixtures for keyboard integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use tapboard::keyboard::{InputCapability, Keyboard, KeyboardOptions, KeyboardVariant, ManualClock};
use tapboard::models::{KeyTables, Layout};
use tapboard::registry::{LayoutRegistry, SharedRegistry};
use tapboard::surface::{Document, EditableField, FieldId, SharedDocument};

/// A small two-row test layout for `lang`.
pub fn test_layout(lang: &str) -> Layout {
    Layout::new(
        format!("{lang}-test"),
        lang,
        format!("{lang} (test)"),
        KeyTables::from_words("a b c d e f", "A B C D E F", "1 2 3 4 5 6"),
    )
    .with_rows(vec![3, 3])
}

/// A registry with the built-in layouts.
pub fn builtin_registry() -> SharedRegistry {
    LayoutRegistry::with_builtin()
        .expect("built-in layouts load")
        .into_shared()
}

/// A keyboard attached to an editor field, on a virtual clock.
pub struct Harness {
    /// The host document
    pub doc: SharedDocument,
    /// Field owned by the keyboard
    pub editor: FieldId,
    /// Field the keyboard does not own
    pub other: FieldId,
    /// Virtual clock shared with the keyboard
    pub clock: ManualClock,
    /// The keyboard under test
    pub keyboard: Keyboard<EditableField>,
}

impl Harness {
    /// Builds a harness with explicit languages and options.
    pub fn with(
        text: &str,
        registry: SharedRegistry,
        languages: &[&str],
        options: KeyboardOptions,
    ) -> Self {
        let doc = Document::new().into_shared();
        let (editor, other) = {
            let mut d = doc.borrow_mut();
            (d.add_field("editor", text), d.add_field("other", "untouched"))
        };
        let clock = ManualClock::new();
        let keyboard = Keyboard::with_clock(
            EditableField::new(doc.clone(), editor),
            registry,
            languages.iter().map(|l| (*l).to_string()).collect(),
            options,
            Box::new(clock.clone()),
        )
        .expect("keyboard builds");

        Self {
            doc,
            editor,
            other,
            clock,
            keyboard,
        }
    }

    /// Classic pointer keyboard over the built-in layouts, English and Greek
    /// enabled.
    pub fn new(text: &str) -> Self {
        Self::with(
            text,
            builtin_registry(),
            &["english", "greek"],
            pointer_options(),
        )
    }

    /// Single-shift keyboard over the built-in layouts, English only.
    pub fn single_shift(text: &str) -> Self {
        let options = KeyboardOptions {
            variant: KeyboardVariant::SingleShift,
            ..pointer_options()
        };
        Self::with(text, builtin_registry(), &["english"], options)
    }

    /// Text of the editor field.
    pub fn text(&self) -> String {
        self.doc.borrow().text(self.editor)
    }

    /// Caret offset in the editor field, if the selection is a caret there.
    pub fn caret(&self) -> Option<usize> {
        let selection = self.doc.borrow().selection()?;
        (selection.is_collapsed() && selection.focus.field == self.editor)
            .then_some(selection.focus.offset)
    }
}

/// Default options pinned to pointer input, whatever the environment says.
pub fn pointer_options() -> KeyboardOptions {
    KeyboardOptions {
        input: InputCapability::Pointer,
        ..KeyboardOptions::default()
    }
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("fixture file written");
    path
}

/// A French layout in TOML.
pub const FRENCH_TOML: &str = r##"
name = "azerty"
lang = "french"
display_name = "Français"
direction = "ltr"
rows = [10, 10, 6]

[keys]
lowercase = ["a", "z", "e", "r", "t", "y", "u", "i", "o", "p", "q", "s", "d", "f", "g", "h", "j", "k", "l", "m", "w", "x", "c", "v", "b", "n"]
uppercase = ["A", "Z", "E", "R", "T", "Y", "U", "I", "O", "P", "Q", "S", "D", "F", "G", "H", "J", "K", "L", "M", "W", "X", "C", "V", "B", "N"]
numbers = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "@", "#", "€", "%", "&", "-", "+", "(", ")", "*", "\"", "'", ":", ";", "!", "?"]

[[custom_styles]]
char = "é"
color = "#AA0000"
"##;
