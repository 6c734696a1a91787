//! In-memory host document.
//!
//! A [`Document`] is a set of editable fields plus one document-wide
//! selection, the same shape a web page or a widget toolkit gives an on-screen
//! keyboard. Field text is kept as a list of fragments so insertions behave
//! like text-node splicing until the field is normalized.
//!
//! Offsets are byte offsets into a field's text and always sit on a character
//! boundary. Backward deletion removes one extended grapheme cluster.

use std::cell::RefCell;
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

use super::{Selection, TextSurface};

/// Index of a field inside its document.
pub type FieldId = usize;

/// A document shared between the host UI and the keyboard.
pub type SharedDocument = Rc<RefCell<Document>>;

/// A position in a document: a field and a byte offset into its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Caret {
    /// Field the caret is in
    pub field: FieldId,
    /// Byte offset into the field's text
    pub offset: usize,
}

impl Caret {
    /// Creates a caret.
    #[must_use]
    pub const fn new(field: FieldId, offset: usize) -> Self {
        Self { field, offset }
    }
}

/// One editable region of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    name: String,
    /// Enclosing field, if this one is nested
    parent: Option<FieldId>,
    fragments: Vec<String>,
    preserve_whitespace: bool,
}

impl Field {
    fn new(name: impl Into<String>, text: &str, parent: Option<FieldId>) -> Self {
        let fragments = if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
        Self {
            name: name.into(),
            parent,
            fragments,
            preserve_whitespace: false,
        }
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enclosing field.
    #[must_use]
    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    /// Full text of the field.
    #[must_use]
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    /// Text length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.iter().map(String::len).sum()
    }

    /// Returns true if the field holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of text fragments (1 or 0 once normalized).
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the host renders whitespace in this field verbatim.
    #[must_use]
    pub fn preserves_whitespace(&self) -> bool {
        self.preserve_whitespace
    }

    /// Clamps an offset into the text and down to a character boundary.
    fn clamp(&self, offset: usize) -> usize {
        let text = self.text();
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    fn previous_boundary(&self, offset: usize) -> usize {
        let text = self.text();
        let offset = self.clamp(offset);
        text[..offset]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(idx, _)| idx)
    }

    fn next_boundary(&self, offset: usize) -> usize {
        let text = self.text();
        let offset = self.clamp(offset);
        text[offset..]
            .graphemes(true)
            .next()
            .map_or(offset, |g| offset + g.len())
    }

    /// Splices `text` in as its own fragment; returns the offset after it.
    fn insert(&mut self, offset: usize, text: &str) -> usize {
        let offset = self.clamp(offset);
        if text.is_empty() {
            return offset;
        }

        let mut start = 0;
        for idx in 0..self.fragments.len() {
            let len = self.fragments[idx].len();
            if offset <= start + len {
                let right = self.fragments[idx].split_off(offset - start);
                self.fragments.insert(idx + 1, text.to_string());
                if !right.is_empty() {
                    self.fragments.insert(idx + 2, right);
                }
                if self.fragments[idx].is_empty() {
                    self.fragments.remove(idx);
                }
                return offset + text.len();
            }
            start += len;
        }

        self.fragments.push(text.to_string());
        offset + text.len()
    }

    /// Removes `[start, end)` across fragments.
    fn delete(&mut self, start: usize, end: usize) {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if start >= end {
            return;
        }

        let mut pos = 0;
        for fragment in &mut self.fragments {
            let frag_start = pos;
            let frag_end = pos + fragment.len();
            pos = frag_end;

            let from = start.max(frag_start);
            let to = end.min(frag_end);
            if from < to {
                fragment.replace_range(from - frag_start..to - frag_start, "");
            }
        }
        self.fragments.retain(|f| !f.is_empty());
    }

    fn normalize(&mut self) {
        if self.fragments.len() > 1 {
            self.fragments = vec![self.fragments.concat()];
        }
    }
}

/// A host document: fields plus the single active selection.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: Vec<Field>,
    selection: Option<Selection<Caret>>,
    focused: Option<FieldId>,
}

impl Document {
    /// Creates an empty document with no selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the document for sharing with keyboards.
    #[must_use]
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// Adds a top-level field.
    pub fn add_field(&mut self, name: impl Into<String>, text: &str) -> FieldId {
        self.fields.push(Field::new(name, text, None));
        self.fields.len() - 1
    }

    /// Adds a field nested inside `parent`.
    pub fn add_child_field(
        &mut self,
        parent: FieldId,
        name: impl Into<String>,
        text: &str,
    ) -> FieldId {
        self.fields.push(Field::new(name, text, Some(parent)));
        self.fields.len() - 1
    }

    /// Gets a field.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id)
    }

    /// Text of a field, empty if the field does not exist.
    #[must_use]
    pub fn text(&self, id: FieldId) -> String {
        self.field(id).map(Field::text).unwrap_or_default()
    }

    /// Returns true if `field` is `ancestor` or nested somewhere inside it.
    #[must_use]
    pub fn contains(&self, ancestor: FieldId, field: FieldId) -> bool {
        let mut current = Some(field);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.field(id).and_then(Field::parent);
        }
        false
    }

    /// The active selection.
    #[must_use]
    pub fn selection(&self) -> Option<Selection<Caret>> {
        self.selection
    }

    /// Replaces the active selection as-is.
    pub fn set_selection(&mut self, selection: Option<Selection<Caret>>) {
        self.selection = selection;
    }

    /// Drops the active selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Field that has focus.
    #[must_use]
    pub fn focused(&self) -> Option<FieldId> {
        self.focused
    }

    /// Places a collapsed caret, clamped into the field, and focuses the field.
    pub fn place_caret(&mut self, field: FieldId, offset: usize) {
        let Some(f) = self.field(field) else {
            return;
        };
        let offset = f.clamp(offset);
        self.selection = Some(Selection::collapsed(Caret::new(field, offset)));
        self.focused = Some(field);
    }

    /// Selects `[start, end)` inside one field.
    pub fn select(&mut self, field: FieldId, start: usize, end: usize) {
        let Some(f) = self.field(field) else {
            return;
        };
        let anchor = Caret::new(field, f.clamp(start));
        let focus = Caret::new(field, f.clamp(end));
        self.selection = Some(Selection::new(anchor, focus));
        self.focused = Some(field);
    }

    /// Focuses a field, moving the caret to its end unless it is already inside.
    pub fn focus(&mut self, field: FieldId) {
        let Some(f) = self.field(field) else {
            return;
        };
        let inside = self
            .selection
            .is_some_and(|s| s.focus.field == field && s.anchor.field == field);
        if !inside {
            let end = f.len();
            self.selection = Some(Selection::collapsed(Caret::new(field, end)));
        }
        self.focused = Some(field);
    }

    /// Moves the caret one grapheme left or right, collapsing any selection.
    pub fn move_caret(&mut self, forward: bool) {
        let Some(selection) = self.selection else {
            return;
        };
        let caret = if forward {
            selection.end()
        } else {
            selection.start()
        };
        let Some(field) = self.field(caret.field) else {
            return;
        };

        let offset = if !selection.is_collapsed() {
            caret.offset
        } else if forward {
            field.next_boundary(caret.offset)
        } else {
            field.previous_boundary(caret.offset)
        };
        self.selection = Some(Selection::collapsed(Caret::new(caret.field, offset)));
    }

    /// Inserts text at a caret; returns the caret after the inserted text.
    pub fn insert_text(&mut self, at: Caret, text: &str) -> Caret {
        match self.fields.get_mut(at.field) {
            Some(field) => Caret::new(at.field, field.insert(at.offset, text)),
            None => at,
        }
    }

    /// Deletes the grapheme before a caret; returns the new caret.
    pub fn delete_backward(&mut self, at: Caret) -> Caret {
        let Some(field) = self.fields.get_mut(at.field) else {
            return at;
        };
        let end = field.clamp(at.offset);
        let start = field.previous_boundary(end);
        field.delete(start, end);
        Caret::new(at.field, start)
    }

    /// Deletes everything between two carets, in document order, and returns
    /// the earlier one.
    ///
    /// A range over several fields removes the tail of the first field, the
    /// head of the last, and all text of the fields in between that sit under
    /// the same enclosing field. Returns `None` without deleting anything when
    /// the two fields share no enclosing field.
    pub fn delete_between(&mut self, start: Caret, end: Caret) -> Option<Caret> {
        let (start, end) = (start.min(end), start.max(end));
        let from = self.field(start.field)?.clamp(start.offset);

        if start.field != end.field {
            self.field(end.field)?;
            let root = self.common_ancestor(start.field, end.field)?;
            for id in start.field + 1..end.field {
                if self.contains(root, id) {
                    if let Some(field) = self.fields.get_mut(id) {
                        field.fragments.clear();
                    }
                }
            }
            if let Some(last) = self.fields.get_mut(end.field) {
                last.delete(0, end.offset);
            }
        }

        let first = self.fields.get_mut(start.field)?;
        let to = if start.field == end.field {
            end.offset
        } else {
            first.len()
        };
        first.delete(from, to);
        Some(Caret::new(start.field, from))
    }

    /// Innermost field enclosing both `a` and `b` (either may be it).
    fn common_ancestor(&self, a: FieldId, b: FieldId) -> Option<FieldId> {
        let mut current = Some(a);
        while let Some(id) = current {
            if self.contains(id, b) {
                return Some(id);
            }
            current = self.field(id).and_then(Field::parent);
        }
        None
    }

    /// Merges a field's fragments into one.
    pub fn normalize(&mut self, field: FieldId) {
        if let Some(f) = self.fields.get_mut(field) {
            f.normalize();
        }
    }

    /// Sets whether a field renders whitespace verbatim.
    pub fn set_preserve_whitespace(&mut self, field: FieldId, preserve: bool) {
        if let Some(f) = self.fields.get_mut(field) {
            f.preserve_whitespace = preserve;
        }
    }
}

/// The keyboard's handle on one field of a shared document.
///
/// Carets inside the field or any field nested in it count as within the
/// surface; everything else in the document is off limits.
#[derive(Debug, Clone)]
pub struct EditableField {
    document: SharedDocument,
    id: FieldId,
}

impl EditableField {
    /// Creates a handle on `id`.
    #[must_use]
    pub fn new(document: SharedDocument, id: FieldId) -> Self {
        Self { document, id }
    }

    /// The owned field.
    #[must_use]
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// The shared document.
    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Current text of the owned field.
    #[must_use]
    pub fn text(&self) -> String {
        self.document.borrow().text(self.id)
    }
}

impl TextSurface for EditableField {
    type Position = Caret;

    fn selection(&self) -> Option<Selection<Caret>> {
        self.document.borrow().selection()
    }

    fn is_within(&self, position: Caret) -> bool {
        self.document.borrow().contains(self.id, position.field)
    }

    fn insert(&mut self, text: &str, at: Caret) -> Caret {
        self.document.borrow_mut().insert_text(at, text)
    }

    fn delete_backward(&mut self, at: Caret) -> Caret {
        self.document.borrow_mut().delete_backward(at)
    }

    fn delete_range(&mut self, start: Caret, end: Caret) -> Option<Caret> {
        self.document.borrow_mut().delete_between(start, end)
    }

    fn collapse_to(&mut self, at: Caret) {
        self.document
            .borrow_mut()
            .set_selection(Some(Selection::collapsed(at)));
    }

    fn normalize(&mut self) {
        self.document.borrow_mut().normalize(self.id);
    }

    fn preserve_whitespace(&mut self) {
        self.document
            .borrow_mut()
            .set_preserve_whitespace(self.id, true);
    }

    fn focus(&mut self) {
        self.document.borrow_mut().focus(self.id);
    }
}
