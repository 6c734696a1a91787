//! Keyboard layout descriptors.
//!
//! A [`Layout`] is an immutable character-table set for one language or
//! script, plus the presentation hints the key grid needs: font, per-character
//! style overrides, numpad toggle labels and the row-length partition.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Row partition used when a layout does not provide one (QWERTY shape).
pub const DEFAULT_ROW_LENGTHS: [usize; 3] = [10, 9, 7];

/// Label shown on the numpad key while the alphabetic tables are active.
pub const DEFAULT_TO_NUMERIC_LABEL: &str = "?123";

/// Label shown on the numpad key while the numeric table is active.
pub const DEFAULT_TO_ALPHABETIC_LABEL: &str = "ABC";

/// Writing direction of a layout's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
}

/// The three character tables of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTables {
    /// Glyphs shown in lowercase mode
    pub lowercase: Vec<String>,
    /// Glyphs shown in uppercase mode
    pub uppercase: Vec<String>,
    /// Glyphs shown in numeric mode
    pub numbers: Vec<String>,
}

impl KeyTables {
    /// Builds tables from three space-separated glyph lists.
    ///
    /// ```
    /// use tapboard::models::KeyTables;
    ///
    /// let tables = KeyTables::from_words("a b", "A B", "1 2");
    /// assert_eq!(tables.uppercase, vec!["A", "B"]);
    /// ```
    #[must_use]
    pub fn from_words(lowercase: &str, uppercase: &str, numbers: &str) -> Self {
        let split = |s: &str| s.split_whitespace().map(String::from).collect();
        Self {
            lowercase: split(lowercase),
            uppercase: split(uppercase),
            numbers: split(numbers),
        }
    }
}

/// Labels for the numpad toggle key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumpadLabels {
    /// Shown while alphabetic; pressing switches to numbers
    pub to_numeric: String,
    /// Shown while numeric; pressing switches back to letters
    pub to_alphabetic: String,
}

/// Style override for every key displaying one glyph.
///
/// Properties are CSS-like (`color`, `background-color`, `font-weight`);
/// renderers apply the ones they understand and ignore the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharStyle {
    /// The glyph this override applies to (exact match)
    #[serde(rename = "char")]
    pub glyph: String,
    /// Style properties
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

impl CharStyle {
    /// Creates an override with no properties.
    pub fn new(glyph: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Adds a property.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }
}

/// Serialized form of a layout, as stored in the built-in catalog and in
/// user layout files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    /// Layout name (e.g., "default")
    pub name: String,
    /// Language identifier used for lookup (e.g., "english")
    pub lang: String,
    /// Human-readable language name, shown on the space bar
    pub display_name: String,
    /// Script direction
    #[serde(default)]
    pub direction: TextDirection,
    /// Character tables
    pub keys: KeyTables,
    /// Per-character style overrides, first match wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_styles: Vec<CharStyle>,
    /// Font family hint applied to every character key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Numpad toggle labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numpad_labels: Option<NumpadLabels>,
    /// Character keys per row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<usize>>,
}

/// An immutable keyboard layout with an indexed style lookup.
///
/// # Validation
///
/// - name, lang and display name must be non-empty
/// - every character table must be non-empty and contain no empty glyphs
/// - a row partition, when given, must be non-empty with no zero lengths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LayoutDescriptor", into = "LayoutDescriptor")]
pub struct Layout {
    descriptor: LayoutDescriptor,
    /// glyph -> index into `custom_styles` of its first override
    style_index: HashMap<String, usize>,
}

impl From<LayoutDescriptor> for Layout {
    fn from(descriptor: LayoutDescriptor) -> Self {
        let mut style_index = HashMap::new();
        for (idx, style) in descriptor.custom_styles.iter().enumerate() {
            style_index.entry(style.glyph.clone()).or_insert(idx);
        }
        Self {
            descriptor,
            style_index,
        }
    }
}

impl From<Layout> for LayoutDescriptor {
    fn from(layout: Layout) -> Self {
        layout.descriptor
    }
}

impl Layout {
    /// Creates a left-to-right layout with no presentation hints.
    pub fn new(
        name: impl Into<String>,
        lang: impl Into<String>,
        display_name: impl Into<String>,
        keys: KeyTables,
    ) -> Self {
        LayoutDescriptor {
            name: name.into(),
            lang: lang.into(),
            display_name: display_name.into(),
            direction: TextDirection::Ltr,
            keys,
            custom_styles: Vec::new(),
            font: None,
            numpad_labels: None,
            rows: None,
        }
        .into()
    }

    /// Sets the script direction.
    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.descriptor.direction = direction;
        self
    }

    /// Sets the font hint.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.descriptor.font = Some(font.into());
        self
    }

    /// Appends a style override. An earlier override for the same glyph keeps priority.
    pub fn with_style(mut self, style: CharStyle) -> Self {
        let idx = self.descriptor.custom_styles.len();
        self.style_index.entry(style.glyph.clone()).or_insert(idx);
        self.descriptor.custom_styles.push(style);
        self
    }

    /// Sets the numpad toggle labels.
    pub fn with_numpad_labels(
        mut self,
        to_numeric: impl Into<String>,
        to_alphabetic: impl Into<String>,
    ) -> Self {
        self.descriptor.numpad_labels = Some(NumpadLabels {
            to_numeric: to_numeric.into(),
            to_alphabetic: to_alphabetic.into(),
        });
        self
    }

    /// Sets the row partition.
    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.descriptor.rows = Some(rows);
        self
    }

    /// Layout name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Language identifier.
    #[must_use]
    pub fn lang(&self) -> &str {
        &self.descriptor.lang
    }

    /// Human-readable language name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.descriptor.display_name
    }

    /// Script direction.
    #[must_use]
    pub fn direction(&self) -> TextDirection {
        self.descriptor.direction
    }

    /// Font hint, if any.
    #[must_use]
    pub fn font(&self) -> Option<&str> {
        self.descriptor.font.as_deref()
    }

    /// All character tables.
    #[must_use]
    pub fn tables(&self) -> &KeyTables {
        &self.descriptor.keys
    }

    /// All style overrides in declaration order.
    #[must_use]
    pub fn custom_styles(&self) -> &[CharStyle] {
        &self.descriptor.custom_styles
    }

    /// The serialized form of this layout.
    #[must_use]
    pub fn descriptor(&self) -> &LayoutDescriptor {
        &self.descriptor
    }

    /// Selects the character table for a display mode.
    ///
    /// Numeric mode wins over the case flag.
    #[must_use]
    pub fn table(&self, numeric: bool, uppercase: bool) -> &[String] {
        let keys = &self.descriptor.keys;
        if numeric {
            &keys.numbers
        } else if uppercase {
            &keys.uppercase
        } else {
            &keys.lowercase
        }
    }

    /// Character keys per row, falling back to [`DEFAULT_ROW_LENGTHS`].
    #[must_use]
    pub fn row_lengths(&self) -> &[usize] {
        self.descriptor
            .rows
            .as_deref()
            .unwrap_or(&DEFAULT_ROW_LENGTHS)
    }

    /// Label for the numpad key given the current mode.
    #[must_use]
    pub fn numpad_label(&self, numeric: bool) -> &str {
        match (&self.descriptor.numpad_labels, numeric) {
            (Some(labels), false) => &labels.to_numeric,
            (Some(labels), true) => &labels.to_alphabetic,
            (None, false) => DEFAULT_TO_NUMERIC_LABEL,
            (None, true) => DEFAULT_TO_ALPHABETIC_LABEL,
        }
    }

    /// Looks up the style override for a glyph in O(1).
    #[must_use]
    pub fn style_for(&self, glyph: &str) -> Option<&CharStyle> {
        let idx = *self.style_index.get(glyph)?;
        self.descriptor.custom_styles.get(idx)
    }

    /// Validates the layout descriptor.
    pub fn validate(&self) -> Result<()> {
        let d = &self.descriptor;

        if d.name.trim().is_empty() {
            anyhow::bail!("Layout name cannot be empty");
        }
        if d.lang.trim().is_empty() {
            anyhow::bail!("Layout '{}' has an empty language identifier", d.name);
        }
        if d.display_name.trim().is_empty() {
            anyhow::bail!("Layout '{}' has an empty display name", d.name);
        }

        for (table_name, table) in [
            ("lowercase", &d.keys.lowercase),
            ("uppercase", &d.keys.uppercase),
            ("numbers", &d.keys.numbers),
        ] {
            if table.is_empty() {
                anyhow::bail!("Layout '{}' has an empty {} table", d.lang, table_name);
            }
            if let Some(pos) = table.iter().position(String::is_empty) {
                anyhow::bail!(
                    "Layout '{}' has an empty glyph in the {} table at index {}",
                    d.lang,
                    table_name,
                    pos
                );
            }
        }

        if let Some(rows) = &d.rows {
            if rows.is_empty() {
                anyhow::bail!("Layout '{}' declares an empty row partition", d.lang);
            }
            if rows.contains(&0) {
                anyhow::bail!(
                    "Layout '{}' declares a zero-length row in {:?}",
                    d.lang,
                    rows
                );
            }
        }

        Ok(())
    }
}
