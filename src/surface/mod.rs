//! Text-editing surfaces the keyboard types into.
//!
//! The keyboard never owns the text it edits. It talks to the host through
//! [`TextSurface`], a minimal capability over the host's single active
//! selection and one owned editable region. Any toolkit's text primitive can
//! implement it; [`document`] provides an in-memory host used by the terminal
//! front end and by tests.

pub mod document;

pub use document::{Caret, Document, EditableField, Field, FieldId, SharedDocument};

use std::fmt::Debug;

/// A selection in the host document: anchor is where it started, focus is
/// where it ends. Collapsed when both are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<P> {
    /// Fixed end of the selection
    pub anchor: P,
    /// Moving end of the selection
    pub focus: P,
}

impl<P: Copy + Ord> Selection<P> {
    /// A collapsed selection (a plain caret).
    pub const fn collapsed(at: P) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    /// A selection spanning two positions.
    pub const fn new(anchor: P, focus: P) -> Self {
        Self { anchor, focus }
    }

    /// Returns true if anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The earlier of the two ends.
    pub fn start(&self) -> P {
        self.anchor.min(self.focus)
    }

    /// The later of the two ends.
    pub fn end(&self) -> P {
        self.anchor.max(self.focus)
    }
}

/// Editing capability over a host text surface.
///
/// Implementations read the host's live selection on every call; callers must
/// not cache a selection across host events.
pub trait TextSurface {
    /// A location in the host document.
    type Position: Copy + Ord + Debug;

    /// The host's current selection, or `None` if there is no active one.
    fn selection(&self) -> Option<Selection<Self::Position>>;

    /// Returns true if `position` lies inside the owned editable surface.
    fn is_within(&self, position: Self::Position) -> bool;

    /// Inserts `text` at `at` and returns the position right after it.
    fn insert(&mut self, text: &str, at: Self::Position) -> Self::Position;

    /// Deletes one character before `at` and returns the new position.
    ///
    /// At the very start of the surface nothing is deleted and `at` is returned.
    fn delete_backward(&mut self, at: Self::Position) -> Self::Position;

    /// Deletes everything between `start` and `end` and returns `start`.
    ///
    /// Returns `None`, leaving the surface untouched, when the host cannot
    /// delete that range.
    fn delete_range(
        &mut self,
        start: Self::Position,
        end: Self::Position,
    ) -> Option<Self::Position>;

    /// Replaces the host selection with a caret at `at`.
    fn collapse_to(&mut self, at: Self::Position);

    /// Merges adjacent text fragments after an insertion.
    fn normalize(&mut self) {}

    /// Asks the host to render whitespace (newlines, non-breaking spaces) verbatim.
    fn preserve_whitespace(&mut self) {}

    /// Moves host focus to the surface.
    fn focus(&mut self) {}
}
