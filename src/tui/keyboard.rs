//! Keyboard widget for rendering the key grid and hit-testing mouse presses.
//!
//! Rows are centered and keys are sized in width units: character and literal
//! keys take one unit, command keys two, and the space bar four. The same
//! geometry is used for drawing and for hit testing, so a click always lands
//! on the key that was drawn under it.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::Theme;
use crate::keyboard::{Command, Key, KeyGrid, KeyId, KeyKind};
use crate::models::{RgbColor, TextDirection};

/// Tallest a key row is drawn, in terminal lines.
const MAX_ROW_HEIGHT: u16 = 3;

/// Widest a width unit is drawn, in terminal columns.
const MAX_UNIT_WIDTH: u16 = 6;

/// Keyboard widget renders the key grid
pub struct KeyboardWidget;

fn key_units(key: &Key) -> u16 {
    match key.kind {
        KeyKind::Command(Command::Space) => 4,
        KeyKind::Command(_) => 2,
        KeyKind::Char | KeyKind::Literal => 1,
    }
}

impl KeyboardWidget {
    /// Screen rectangle of every key inside `area` (the widget's inner area).
    ///
    /// Right-to-left layouts mirror each row.
    #[must_use]
    pub fn key_rects(grid: &KeyGrid, area: Rect, direction: TextDirection) -> Vec<(KeyId, Rect)> {
        let rows = grid.rows();
        if rows.is_empty() || area.width == 0 || area.height == 0 {
            return Vec::new();
        }

        let max_units = rows
            .iter()
            .map(|row| row.iter().map(key_units).sum::<u16>())
            .max()
            .unwrap_or(1)
            .max(1);
        let unit = (area.width / max_units).clamp(1, MAX_UNIT_WIDTH);
        let row_count = u16::try_from(rows.len()).unwrap_or(u16::MAX);
        let row_height = (area.height / row_count).clamp(1, MAX_ROW_HEIGHT);

        let mut rects = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let y = area.y + row_height * u16::try_from(r).unwrap_or(u16::MAX);
            if y + row_height > area.bottom() {
                break;
            }

            let row_width: u16 = row.iter().map(|k| key_units(k) * unit).sum();
            let mut x = area.x + area.width.saturating_sub(row_width) / 2;
            for (c, key) in row.iter().enumerate() {
                let width = key_units(key) * unit;
                if x + width > area.right() {
                    break;
                }
                let left = match direction {
                    TextDirection::Ltr => x,
                    TextDirection::Rtl => area.x + area.right() - (x + width),
                };
                rects.push((KeyId::new(r, c), Rect::new(left, y, width, row_height)));
                x += width;
            }
        }
        rects
    }

    /// The key drawn at a terminal cell, if any.
    #[must_use]
    pub fn hit_test(rects: &[(KeyId, Rect)], column: u16, row: u16) -> Option<KeyId> {
        rects
            .iter()
            .find(|(_, rect)| {
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .map(|(id, _)| *id)
    }

    /// Style of one key: theme face, then layout overrides, then the pressed mark.
    #[must_use]
    pub fn key_style(key: &Key, theme: &Theme) -> Style {
        let face = match key.kind {
            KeyKind::Command(_) => theme.command_face,
            KeyKind::Char | KeyKind::Literal => theme.key_face,
        };
        let mut style = Style::default().fg(theme.text).bg(face);

        if let Some(color) = key.style.get("color").and_then(|c| RgbColor::from_hex(c).ok()) {
            style = style.fg(color.to_ratatui_color());
        }
        if let Some(color) = key
            .style
            .get("background-color")
            .and_then(|c| RgbColor::from_hex(c).ok())
        {
            style = style.bg(color.to_ratatui_color());
        }
        if matches!(key.style.get("font-weight"), Some("bold" | "bolder" | "700" | "800" | "900")) {
            style = style.add_modifier(Modifier::BOLD);
        }

        if key.pressed {
            style = style.bg(theme.key_pressed).add_modifier(Modifier::BOLD);
        }
        style
    }

    /// Render the keyboard.
    ///
    /// Returns the key rectangles used, for hit testing later mouse events.
    pub fn render(
        f: &mut Frame,
        area: Rect,
        grid: &KeyGrid,
        title: &str,
        direction: TextDirection,
        theme: &Theme,
    ) -> Vec<(KeyId, Rect)> {
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rects = Self::key_rects(grid, inner, direction);
        for (id, rect) in &rects {
            let Some(key) = grid.key(*id) else {
                continue;
            };
            let style = Self::key_style(key, theme);

            // One blank column between neighbors
            let face = Rect {
                width: rect.width.saturating_sub(1).max(1),
                ..*rect
            };
            f.render_widget(Block::default().style(style), face);

            let label_row = Rect {
                y: face.y + face.height / 2,
                height: 1,
                ..face
            };
            f.render_widget(
                Paragraph::new(key.label.as_str())
                    .style(style)
                    .alignment(Alignment::Center),
                label_row,
            );
        }
        rects
    }
}
