//! Layout registry.
//!
//! The registry is the catalog of layouts a keyboard can switch between.
//! It is an explicit value rather than process-wide state, so independent
//! keyboards (or tests) never observe each other's registrations. Keyboards
//! that should share one catalog hold the same [`SharedRegistry`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

use crate::models::Layout;

/// A registry shared by every keyboard on the UI thread.
pub type SharedRegistry = Rc<RefCell<LayoutRegistry>>;

/// Schema of the embedded `layouts.json` catalog.
#[derive(Debug, Deserialize)]
struct LayoutCatalog {
    #[allow(dead_code)]
    version: String,
    layouts: Vec<Layout>,
}

/// Ordered collection of registered layouts.
///
/// Lookup by language returns the first registered match, so registering a
/// second layout with an existing language identifier does not shadow the
/// first one.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: Vec<Rc<Layout>>,
}

impl LayoutRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in layouts, English first.
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        for layout in Self::builtin_layouts()? {
            registry.register(layout)?;
        }
        Ok(registry)
    }

    /// Parses the layouts embedded in the binary.
    pub fn builtin_layouts() -> Result<Vec<Layout>> {
        let json_data = include_str!("layouts.json");
        let catalog: LayoutCatalog =
            serde_json::from_str(json_data).context("Failed to parse embedded layouts.json")?;
        Ok(catalog.layouts)
    }

    /// Wraps the registry for sharing between keyboards.
    #[must_use]
    pub fn into_shared(self) -> SharedRegistry {
        Rc::new(RefCell::new(self))
    }

    /// Validates and appends a layout.
    ///
    /// Returns the registered handle, which is also the key for [`unregister`](Self::unregister).
    pub fn register(&mut self, layout: impl Into<Rc<Layout>>) -> Result<Rc<Layout>> {
        let layout = layout.into();
        layout
            .validate()
            .with_context(|| format!("Refusing to register layout '{}'", layout.name()))?;

        debug!(lang = layout.lang(), name = layout.name(), "registered layout");
        self.layouts.push(Rc::clone(&layout));
        Ok(layout)
    }

    /// Removes the first entry that is the same layout handle.
    ///
    /// Returns `false` when the layout was not registered.
    pub fn unregister(&mut self, layout: &Rc<Layout>) -> bool {
        match self.layouts.iter().position(|l| Rc::ptr_eq(l, layout)) {
            Some(index) => {
                self.layouts.remove(index);
                debug!(lang = layout.lang(), "unregistered layout");
                true
            }
            None => false,
        }
    }

    /// Returns the first layout registered for a language identifier.
    #[must_use]
    pub fn find_by_language(&self, lang: &str) -> Option<Rc<Layout>> {
        self.layouts.iter().find(|l| l.lang() == lang).cloned()
    }

    /// The first registered layout, used when no enabled language resolves.
    #[must_use]
    pub fn default_layout(&self) -> Option<Rc<Layout>> {
        self.layouts.first().cloned()
    }

    /// Language identifiers in registration order.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.lang()).collect()
    }

    /// Iterates layouts in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Layout>> {
        self.layouts.iter()
    }

    /// Number of registered layouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeyTables, TextDirection};

    fn layout(lang: &str) -> Layout {
        Layout::new(lang, lang, lang, KeyTables::from_words("a b", "A B", "1 2"))
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = LayoutRegistry::with_builtin().expect("built-in layouts should load");
        assert_eq!(registry.languages(), vec!["english", "greek", "arabic"]);

        let english = registry.default_layout().unwrap();
        assert_eq!(english.lang(), "english");
        assert_eq!(english.table(false, false).len(), 26);
        assert_eq!(english.font(), Some("Roboto"));

        let arabic = registry.find_by_language("arabic").unwrap();
        assert_eq!(arabic.direction(), TextDirection::Rtl);
        assert_eq!(arabic.row_lengths(), [12, 11, 9]);
        assert!(arabic.style_for("ء").is_some());
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = LayoutRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find_by_language("english").is_none());

        registry.register(layout("english")).unwrap();
        registry.register(layout("french")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_language("french").unwrap().lang(), "french");
        assert!(registry.find_by_language("klingon").is_none());
    }

    #[test]
    fn test_duplicate_language_first_match_wins() {
        let mut registry = LayoutRegistry::new();
        let first = registry
            .register(Layout::new("first", "english", "English", KeyTables::from_words("a", "A", "1")))
            .unwrap();
        registry
            .register(Layout::new("second", "english", "English", KeyTables::from_words("b", "B", "2")))
            .unwrap();

        let found = registry.find_by_language("english").unwrap();
        assert!(Rc::ptr_eq(&found, &first));
    }

    #[test]
    fn test_unregister_by_identity() {
        let mut registry = LayoutRegistry::new();
        let english = registry.register(layout("english")).unwrap();

        // Equal contents but a different handle is not the registered entry.
        let lookalike = Rc::new(layout("english"));
        assert!(!registry.unregister(&lookalike));
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(&english));
        assert!(registry.is_empty());

        // Absent layout: no-op
        assert!(!registry.unregister(&english));
    }

    #[test]
    fn test_register_rejects_invalid_layout() {
        let mut registry = LayoutRegistry::new();
        let invalid = Layout::new("bad", "", "Bad", KeyTables::from_words("a", "A", "1"));
        assert!(registry.register(invalid).is_err());
        assert!(registry.is_empty());
    }
}
