//! Status bar widget for displaying keyboard state and help

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{App, Theme};

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Short description of the keyboard mode.
    #[must_use]
    pub fn mode_label(numeric: bool, uppercase: bool) -> &'static str {
        match (numeric, uppercase) {
            (true, _) => "123",
            (false, true) => "ABC",
            (false, false) => "abc",
        }
    }

    /// Render the status bar with contextual help
    pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
        let keyboard = &app.keyboard;
        let visibility = if keyboard.is_visible() { "shown" } else { "hidden" };

        let state_line = Line::from(vec![
            Span::styled("Language: ", Style::default().fg(theme.primary)),
            Span::styled(
                keyboard.layout().display_name().to_string(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Mode: ", Style::default().fg(theme.primary)),
            Span::styled(
                Self::mode_label(keyboard.is_numeric(), keyboard.is_uppercase()),
                Style::default().fg(theme.text),
            ),
            Span::styled("  Keyboard: ", Style::default().fg(theme.primary)),
            Span::styled(visibility, Style::default().fg(theme.text)),
            Span::styled(
                format!("  [{}]", app.status_message),
                Style::default().fg(if app.status_is_error {
                    theme.error
                } else {
                    theme.accent
                }),
            ),
        ]);

        let help_line = Line::from(Span::styled(
            "Tab: switch field | ←/→: move caret | F2: show/hide keyboard | Esc/Ctrl+Q: quit",
            Style::default().fg(theme.text_muted),
        ));

        let paragraph = Paragraph::new(vec![state_line, help_line]).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.text_muted)),
        );
        f.render_widget(paragraph, area);
    }
}
