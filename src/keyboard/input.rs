//! Press/release input.
//!
//! Hosts deliver either pointer events or touch events, never both. The
//! capability is chosen once when the keyboard is built; raw events from the
//! other family are dropped, so a host that emulates pointer events from
//! touches cannot trigger a key twice.

use serde::{Deserialize, Serialize};
use std::env;

use super::grid::KeyId;
use crate::constants::TOUCH_ENV_VAR;

/// Configured input preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPreference {
    /// Detect from the environment
    #[default]
    Auto,
    /// Mouse or pen
    Pointer,
    /// Touch screen
    Touch,
}

/// The event family a keyboard listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCapability {
    /// Pointer down/up
    Pointer,
    /// Touch start/end
    Touch,
}

/// A raw host event. `None` targets the keyboard background rather than a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPress {
    /// Pointer button went down
    PointerDown(Option<KeyId>),
    /// Pointer button went up
    PointerUp(Option<KeyId>),
    /// Finger touched
    TouchStart(Option<KeyId>),
    /// Finger lifted
    TouchEnd(Option<KeyId>),
}

/// A unified press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// A key went down
    Start(KeyId),
    /// A key was released over a key
    End(KeyId),
    /// The press ended over the background: release without an action
    Cancel,
}

/// Receiver of unified press events.
pub trait PressHandler {
    /// A key went down.
    fn press_start(&mut self, key: KeyId);
    /// A key was released; runs the key's action.
    fn press_end(&mut self, key: KeyId);
    /// The press ended off any key.
    fn press_cancel(&mut self);
}

impl InputCapability {
    /// Reports touch when the `TAPBOARD_TOUCH` environment variable is truthy.
    #[must_use]
    pub fn detect() -> Self {
        let touch = env::var(TOUCH_ENV_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        if touch {
            Self::Touch
        } else {
            Self::Pointer
        }
    }

    /// Resolves a configured preference.
    #[must_use]
    pub fn resolve(preference: InputPreference) -> Self {
        match preference {
            InputPreference::Auto => Self::detect(),
            InputPreference::Pointer => Self::Pointer,
            InputPreference::Touch => Self::Touch,
        }
    }

    /// Translates a raw event of this capability's family.
    ///
    /// Returns `None` for the other family and for presses that start on the
    /// background.
    #[must_use]
    pub fn translate(self, raw: RawPress) -> Option<Press> {
        let (start, target) = match (self, raw) {
            (Self::Pointer, RawPress::PointerDown(t)) | (Self::Touch, RawPress::TouchStart(t)) => {
                (true, t)
            }
            (Self::Pointer, RawPress::PointerUp(t)) | (Self::Touch, RawPress::TouchEnd(t)) => {
                (false, t)
            }
            _ => return None,
        };

        match (start, target) {
            (true, Some(key)) => Some(Press::Start(key)),
            (true, None) => None,
            (false, Some(key)) => Some(Press::End(key)),
            (false, None) => Some(Press::Cancel),
        }
    }

    /// Translates `raw` and forwards it to `handler`.
    ///
    /// Returns true if the event was delivered.
    pub fn dispatch(self, raw: RawPress, handler: &mut impl PressHandler) -> bool {
        match self.translate(raw) {
            Some(Press::Start(key)) => handler.press_start(key),
            Some(Press::End(key)) => handler.press_end(key),
            Some(Press::Cancel) => handler.press_cancel(),
            None => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl PressHandler for Recorder {
        fn press_start(&mut self, key: KeyId) {
            self.events.push(format!("start {},{}", key.row, key.col));
        }
        fn press_end(&mut self, key: KeyId) {
            self.events.push(format!("end {},{}", key.row, key.col));
        }
        fn press_cancel(&mut self) {
            self.events.push("cancel".to_string());
        }
    }

    #[test]
    fn test_pointer_ignores_touch() {
        let key = Some(KeyId::new(0, 1));
        let pointer = InputCapability::Pointer;

        assert_eq!(pointer.translate(RawPress::PointerDown(key)), Some(Press::Start(KeyId::new(0, 1))));
        assert_eq!(pointer.translate(RawPress::PointerUp(key)), Some(Press::End(KeyId::new(0, 1))));
        assert_eq!(pointer.translate(RawPress::TouchStart(key)), None);
        assert_eq!(pointer.translate(RawPress::TouchEnd(key)), None);
    }

    #[test]
    fn test_touch_ignores_pointer() {
        let key = Some(KeyId::new(2, 0));
        let touch = InputCapability::Touch;

        assert_eq!(touch.translate(RawPress::TouchStart(key)), Some(Press::Start(KeyId::new(2, 0))));
        assert_eq!(touch.translate(RawPress::PointerDown(key)), None);
    }

    #[test]
    fn test_background_targets() {
        let pointer = InputCapability::Pointer;
        assert_eq!(pointer.translate(RawPress::PointerDown(None)), None);
        assert_eq!(pointer.translate(RawPress::PointerUp(None)), Some(Press::Cancel));
    }

    #[test]
    fn test_dispatch() {
        let mut recorder = Recorder::default();
        let touch = InputCapability::Touch;

        assert!(touch.dispatch(RawPress::TouchStart(Some(KeyId::new(1, 1))), &mut recorder));
        assert!(!touch.dispatch(RawPress::PointerUp(Some(KeyId::new(1, 1))), &mut recorder));
        assert!(touch.dispatch(RawPress::TouchEnd(Some(KeyId::new(1, 1))), &mut recorder));
        assert!(touch.dispatch(RawPress::TouchEnd(None), &mut recorder));

        assert_eq!(recorder.events, vec!["start 1,1", "end 1,1", "cancel"]);
    }

    #[test]
    fn test_resolve_explicit_preferences() {
        assert_eq!(InputCapability::resolve(InputPreference::Pointer), InputCapability::Pointer);
        assert_eq!(InputCapability::resolve(InputPreference::Touch), InputCapability::Touch);
    }
}
