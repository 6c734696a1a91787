//! Theme system for consistent UI colors across dark and light modes.
//!
//! Auto mode asks the OS for its dark/light preference through the
//! `dark-light` crate; explicit modes from the config bypass detection.

use ratatui::style::Color;

use crate::config::ThemeMode;

/// Semantic color theme for the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Borders, titles and emphasis
    pub primary: Color,
    /// Focus and the caret
    pub accent: Color,
    /// Rejected edits and errors
    pub error: Color,

    /// Primary text content color
    pub text: Color,
    /// Help text and dim content
    pub text_muted: Color,

    /// Main background color
    pub background: Color,
    /// Face of a character key
    pub key_face: Color,
    /// Face of a command key
    pub command_face: Color,
    /// Face of a key while held down
    pub key_pressed: Color,
}

impl Theme {
    /// Detects the OS theme and returns the appropriate Theme.
    #[must_use]
    pub fn detect() -> Self {
        match dark_light::detect() {
            Ok(dark_light::Mode::Light) => Self::light(),
            // Fall back to dark theme for dark mode, unspecified, or errors
            Ok(dark_light::Mode::Dark | dark_light::Mode::Unspecified) | Err(_) => Self::dark(),
        }
    }

    /// Resolves a configured theme mode.
    #[must_use]
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Auto => Self::detect(),
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Creates a dark theme optimized for dark terminal backgrounds.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            accent: Color::Yellow,
            error: Color::Red,

            text: Color::White,
            text_muted: Color::DarkGray,

            background: Color::Black,
            key_face: Color::Rgb(45, 45, 45),
            command_face: Color::Rgb(30, 30, 60),
            key_pressed: Color::Rgb(90, 90, 20),
        }
    }

    /// Creates a light theme optimized for light terminal backgrounds.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::Blue,
            accent: Color::Rgb(180, 100, 0), // Dark orange for visibility
            error: Color::Red,

            text: Color::Black,
            text_muted: Color::Gray,

            background: Color::White,
            key_face: Color::Rgb(230, 230, 230),
            command_face: Color::Rgb(210, 215, 235),
            key_pressed: Color::Rgb(250, 220, 150),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_contrast() {
        let dark = Theme::dark();
        assert_eq!(dark.text, Color::White);
        assert_eq!(dark.background, Color::Black);

        let light = Theme::light();
        assert_eq!(light.text, Color::Black);
        assert_eq!(light.background, Color::White);
    }

    #[test]
    fn test_pressed_keys_stand_out() {
        for theme in [Theme::dark(), Theme::light()] {
            assert_ne!(theme.key_pressed, theme.key_face);
            assert_ne!(theme.key_pressed, theme.command_face);
        }
    }

    #[test]
    fn test_theme_from_mode() {
        assert_eq!(Theme::from_mode(ThemeMode::Dark), Theme::dark());
        assert_eq!(Theme::from_mode(ThemeMode::Light), Theme::light());
    }
}
