//! Command keys: keys whose action is fixed by a tag, independent of the layout.

/// Character inserted by the space key.
///
/// A non-breaking space keeps hosts that collapse runs of whitespace from
/// swallowing consecutive spaces.
pub const SPACE_TEXT: &str = "\u{a0}";

/// Character inserted by the enter key.
pub const ENTER_TEXT: &str = "\n";

/// All command key tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Toggle uppercase
    Shift,
    /// Toggle numeric mode
    Numpad,
    /// Cycle to the next enabled language
    Switch,
    /// Insert a newline
    Enter,
    /// Insert a non-breaking space
    Space,
    /// Delete backwards; repeats while held
    Backspace,
}

impl Command {
    /// Every command, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Shift,
        Self::Numpad,
        Self::Switch,
        Self::Enter,
        Self::Space,
        Self::Backspace,
    ];

    /// Stable tag string.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Numpad => "numpad",
            Self::Switch => "switch",
            Self::Enter => "enter",
            Self::Space => "space",
            Self::Backspace => "backspace",
        }
    }

    /// Parses a tag string.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Label shown when the layout does not relabel the key.
    #[must_use]
    pub const fn default_label(&self) -> &'static str {
        match self {
            Self::Shift => "Shift",
            Self::Numpad => "?123",
            Self::Switch => "Switch",
            Self::Enter => "Enter",
            Self::Space => "Space",
            Self::Backspace => "Back",
        }
    }

    /// Returns true if holding this key repeats its action.
    #[must_use]
    pub const fn repeats(&self) -> bool {
        matches!(self, Self::Backspace)
    }
}
