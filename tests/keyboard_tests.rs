//! Integration tests for the keyboard controller: population, mode
//! transitions, cursor edits and press-and-hold repeat.

mod fixtures;
use fixtures::*;

use std::time::Duration;
use tapboard::keyboard::{
    Command, InputCapability, KeyGrid, KeyId, KeyboardOptions, KeyboardVariant, PressHandler,
    RawPress,
};
use tapboard::registry::LayoutRegistry;
use tapboard::surface::{Caret, Selection};

// ============================================================================
// Population
// ============================================================================

#[test]
fn test_population_one_key_per_glyph_for_every_layout() {
    let registry = LayoutRegistry::with_builtin().unwrap();
    for layout in registry.iter() {
        for variant in [KeyboardVariant::Classic, KeyboardVariant::SingleShift] {
            for (numeric, uppercase) in [(false, false), (false, true), (true, false)] {
                let grid = KeyGrid::new(layout, numeric, uppercase, variant, true);
                let expected: Vec<&str> = layout
                    .table(numeric, uppercase)
                    .iter()
                    .map(String::as_str)
                    .collect();
                assert_eq!(grid.glyphs(), expected, "layout {}", layout.lang());
            }
        }
    }
}

#[test]
fn test_arabic_rows_follow_partition() {
    let mut h = Harness::with("", builtin_registry(), &["arabic", "english"], KeyboardOptions::default());
    let grid = h.keyboard.grid();
    assert_eq!(grid.char_count(0), 12);
    assert_eq!(grid.char_count(1), 11);
    assert_eq!(grid.char_count(2), 9);

    let numpad = grid.find_command(Command::Numpad).unwrap();
    assert_eq!(grid.key(numpad).unwrap().label, "١٢٣");
    h.keyboard.toggle_numpad();
    assert_eq!(h.keyboard.grid().key(numpad).unwrap().label, "أبج");
}

#[test]
fn test_registries_are_independent() {
    let mut first = Harness::new("");
    let second = Harness::new("");

    first.keyboard.register_layout(test_layout("test")).unwrap();
    first.keyboard.set_language("test");
    assert_eq!(first.keyboard.language(), "test");

    assert!(second.keyboard.registry().borrow().find_by_language("test").is_none());
}

// ============================================================================
// Mode transitions
// ============================================================================

#[test]
fn test_toggle_numpad_twice_restores_case() {
    let mut h = Harness::new("");
    let before = h.keyboard.is_uppercase();

    h.keyboard.toggle_numpad();
    assert!(h.keyboard.is_numeric());
    h.keyboard.toggle_numpad();

    assert!(!h.keyboard.is_numeric());
    assert_eq!(h.keyboard.is_uppercase(), before);
}

#[test]
fn test_switch_case_twice_restores_case() {
    let mut h = Harness::new("");
    let glyphs: Vec<String> = h.keyboard.grid().glyphs().iter().map(|g| g.to_string()).collect();

    h.keyboard.switch_case();
    assert!(h.keyboard.is_uppercase());
    h.keyboard.switch_case();

    assert!(!h.keyboard.is_uppercase());
    assert_eq!(h.keyboard.grid().glyphs(), glyphs);
}

#[test]
fn test_switch_language_is_cyclic() {
    for languages in [vec!["english"], vec!["english", "greek"], vec!["english", "greek", "arabic"]] {
        let mut h = Harness::with("", builtin_registry(), &languages, KeyboardOptions::default());
        let start = h.keyboard.language().to_string();

        for _ in 0..languages.len() {
            h.keyboard.switch_language();
        }
        assert_eq!(h.keyboard.language(), start);
        assert_eq!(h.keyboard.language_index(), 0);
    }
}

#[test]
fn test_switch_key_cycles_language() {
    let mut h = Harness::new("");
    let switch = h.keyboard.grid().find_command(Command::Switch).unwrap();

    h.keyboard.press_start(switch);
    h.keyboard.press_end(switch);

    assert_eq!(h.keyboard.language(), "greek");
    let space = h.keyboard.grid().find_command(Command::Space).unwrap();
    assert_eq!(h.keyboard.grid().key(space).unwrap().label, "Ελληνικά");
}

#[test]
fn test_unknown_language_keeps_layout() {
    let mut h = Harness::new("");
    h.keyboard.set_language("greek");
    h.keyboard.switch_case();

    h.keyboard.set_language("klingon");

    assert_eq!(h.keyboard.language(), "greek");
    assert!(h.keyboard.is_uppercase());
}

#[test]
fn test_single_shift_reverts_to_lowercase() {
    let mut h = Harness::single_shift("");
    h.keyboard.switch_case();
    assert!(h.keyboard.is_uppercase());

    let a = h.keyboard.grid().find_label("A").unwrap();
    h.keyboard.press_start(a);
    h.keyboard.press_end(a);
    assert_eq!(h.text(), "A");
    assert!(!h.keyboard.is_uppercase());

    let b = h.keyboard.grid().find_label("b").unwrap();
    h.keyboard.press_start(b);
    h.keyboard.press_end(b);
    assert_eq!(h.text(), "Ab");
}

// ============================================================================
// Cursor edits
// ============================================================================

#[test]
fn test_delete_after_text_removes_last_char() {
    let mut h = Harness::new("abc");
    assert_eq!(h.caret(), Some(3));

    assert!(h.keyboard.delete_at_cursor());
    assert_eq!(h.text(), "ab");
    assert_eq!(h.caret(), Some(2));
}

#[test]
fn test_delete_at_start_is_noop() {
    let mut h = Harness::new("abc");
    h.doc.borrow_mut().place_caret(h.editor, 0);

    h.keyboard.delete_at_cursor();
    assert_eq!(h.text(), "abc");
    assert_eq!(h.caret(), Some(0));
}

#[test]
fn test_insert_outside_surface_is_rejected() {
    let mut h = Harness::new("mine");
    h.doc.borrow_mut().place_caret(h.other, 0);

    assert!(!h.keyboard.insert_at_cursor("x"));
    let q = KeyId::new(0, 0);
    h.keyboard.press_start(q);
    h.keyboard.press_end(q);

    let doc = h.doc.borrow();
    assert_eq!(doc.text(h.editor), "mine");
    assert_eq!(doc.text(h.other), "untouched");
}

#[test]
fn test_insert_in_nested_field_is_allowed() {
    let mut h = Harness::new("outer");
    let nested = h.doc.borrow_mut().add_child_field(h.editor, "quote", "");
    h.doc.borrow_mut().place_caret(nested, 0);

    assert!(h.keyboard.insert_at_cursor("in"));
    assert_eq!(h.doc.borrow().text(nested), "in");
}

#[test]
fn test_delete_range_into_nested_field() {
    let mut h = Harness::new("outer");
    let nested = h.doc.borrow_mut().add_child_field(h.editor, "quote", "inner");
    h.doc.borrow_mut().set_selection(Some(Selection::new(
        Caret::new(h.editor, 2),
        Caret::new(nested, 3),
    )));

    assert!(h.keyboard.delete_at_cursor());

    let doc = h.doc.borrow();
    assert_eq!(doc.text(h.editor), "ou");
    assert_eq!(doc.text(nested), "er");
    assert_eq!(doc.text(h.other), "untouched");
    assert_eq!(doc.selection(), Some(Selection::collapsed(Caret::new(h.editor, 2))));
}

#[test]
fn test_typing_sequence_with_enter_and_space() {
    let mut h = Harness::new("");
    let grid = h.keyboard.grid().clone();
    let keys = [
        grid.find_label("h").unwrap(),
        grid.find_label("i").unwrap(),
        grid.find_command(Command::Space).unwrap(),
        grid.find_label(".").unwrap(),
        grid.find_command(Command::Enter).unwrap(),
    ];
    for key in keys {
        h.keyboard.press_start(key);
        h.keyboard.press_end(key);
    }

    assert_eq!(h.text(), "hi\u{a0}.\n");
    assert_eq!(h.caret(), Some(h.text().len()));
    assert_eq!(h.doc.borrow().field(h.editor).unwrap().fragment_count(), 1);
}

// ============================================================================
// Press and hold
// ============================================================================

#[test]
fn test_holding_delete_accelerates_until_release() {
    let mut h = Harness::new("abcdef");
    let back = h.keyboard.grid().find_command(Command::Backspace).unwrap();

    h.keyboard.press_start(back);
    assert!(h.keyboard.is_repeating());

    let step = Duration::from_millis(10);
    let mut elapsed = 0u64;
    let mut fired_at = Vec::new();
    while !h.text().is_empty() && elapsed < 10_000 {
        h.clock.advance(step);
        elapsed += 10;
        if h.keyboard.tick() > 0 {
            fired_at.push(elapsed);
        }
    }

    assert_eq!(h.text(), "");
    assert_eq!(fired_at, vec![400, 760, 1080, 1360, 1600, 1800]);
    let gaps: Vec<u64> = fired_at.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(gaps.windows(2).all(|w| w[1] < w[0]));

    h.keyboard.press_end(back);
    assert!(!h.keyboard.is_repeating());
    assert_eq!(h.keyboard.next_deadline(), None);

    h.clock.advance(Duration::from_secs(5));
    assert_eq!(h.keyboard.tick(), 0);
    assert_eq!(h.text(), "");
}

#[test]
fn test_stalled_host_deletes_one_char_per_tick() {
    let mut h = Harness::new("abcdef");
    let back = h.keyboard.grid().find_command(Command::Backspace).unwrap();

    h.keyboard.press_start(back);
    h.clock.advance(Duration::from_secs(5));

    assert_eq!(h.keyboard.tick(), 1);
    assert_eq!(h.keyboard.tick(), 0);
    assert_eq!(h.text(), "abcde");
}

#[test]
fn test_tap_on_delete_deletes_once() {
    let mut h = Harness::new("abc");
    let back = h.keyboard.grid().find_command(Command::Backspace).unwrap();

    h.keyboard.press_start(back);
    h.clock.advance(Duration::from_millis(100));
    assert_eq!(h.keyboard.tick(), 0);
    h.keyboard.press_end(back);

    assert_eq!(h.text(), "ab");
}

#[test]
fn test_release_after_repeats_still_dispatches_once() {
    let mut h = Harness::new("abcdef");
    let back = h.keyboard.grid().find_command(Command::Backspace).unwrap();

    h.keyboard.press_start(back);
    h.clock.advance(Duration::from_millis(400));
    assert_eq!(h.keyboard.tick(), 1);
    h.keyboard.press_end(back);

    // One repeat plus the release action
    assert_eq!(h.text(), "abcd");
}

#[test]
fn test_new_press_replaces_repeat_cycle() {
    let mut h = Harness::new("abcdef");
    let back = h.keyboard.grid().find_command(Command::Backspace).unwrap();

    h.keyboard.press_start(back);
    h.clock.advance(Duration::from_millis(300));
    h.keyboard.press_start(back);
    h.clock.advance(Duration::from_millis(300));

    // The second cycle has its own full initial delay
    assert_eq!(h.keyboard.tick(), 0);
    h.clock.advance(Duration::from_millis(100));
    assert_eq!(h.keyboard.tick(), 1);
}

#[test]
fn test_release_off_grid_cancels_without_action() {
    let mut h = Harness::new("abc");
    let back = h.keyboard.grid().find_command(Command::Backspace).unwrap();

    assert!(h.keyboard.handle_raw(RawPress::PointerDown(Some(back))));
    assert!(h.keyboard.handle_raw(RawPress::PointerUp(None)));

    assert!(!h.keyboard.is_repeating());
    assert_eq!(h.keyboard.held_key(), None);
    assert_eq!(h.text(), "abc");
}

#[test]
fn test_touch_keyboard_ignores_pointer_events() {
    let options = KeyboardOptions {
        input: InputCapability::Touch,
        ..KeyboardOptions::default()
    };
    let mut h = Harness::with("", builtin_registry(), &["english"], options);
    let q = Some(KeyId::new(0, 0));

    h.keyboard.handle_raw(RawPress::PointerDown(q));
    h.keyboard.handle_raw(RawPress::PointerUp(q));
    assert_eq!(h.text(), "");

    h.keyboard.handle_raw(RawPress::TouchStart(q));
    h.keyboard.handle_raw(RawPress::TouchEnd(q));
    assert_eq!(h.text(), "q");
}
