//! Text pane for one document field, with the document selection drawn in.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::Theme;
use crate::surface::{Caret, FieldId, Selection};

/// Editor pane widget
pub struct EditorPane;

/// Selection bounds inside one field: `[start, end)` plus the caret offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSelection {
    start: usize,
    end: usize,
    caret: usize,
}

impl FieldSelection {
    fn for_field(selection: Option<Selection<Caret>>, field: FieldId) -> Option<Self> {
        let selection = selection?;
        if selection.anchor.field != field || selection.focus.field != field {
            return None;
        }
        Some(Self {
            start: selection.start().offset,
            end: selection.end().offset,
            caret: selection.focus.offset,
        })
    }
}

impl EditorPane {
    /// Lays out field text as lines, marking the selection and the caret.
    ///
    /// Non-breaking spaces are drawn as plain spaces.
    fn lines<'a>(text: &str, selection: Option<Selection<Caret>>, field: FieldId, theme: &Theme) -> Vec<Line<'a>> {
        let bounds = FieldSelection::for_field(selection, field);
        let base = Style::default().fg(theme.text);
        let selected = base.bg(theme.accent).fg(theme.background);
        let caret = base.add_modifier(Modifier::REVERSED);

        let mut lines = Vec::new();
        let mut spans: Vec<Span<'a>> = Vec::new();

        for (offset, ch) in text.char_indices() {
            let at_caret = bounds.is_some_and(|b| b.start == b.end && b.caret == offset);
            let in_range = bounds.is_some_and(|b| offset >= b.start && offset < b.end);

            if ch == '\n' {
                if at_caret {
                    spans.push(Span::styled(" ", caret));
                }
                lines.push(Line::from(std::mem::take(&mut spans)));
                continue;
            }

            let shown = if ch == '\u{a0}' { ' ' } else { ch };
            let style = if at_caret {
                caret
            } else if in_range {
                selected
            } else {
                base
            };
            spans.push(Span::styled(shown.to_string(), style));
        }

        if bounds.is_some_and(|b| b.start == b.end && b.caret >= text.len()) {
            spans.push(Span::styled(" ", caret));
        }
        lines.push(Line::from(spans));
        lines
    }

    /// Render a field pane.
    pub fn render(
        f: &mut Frame,
        area: Rect,
        title: &str,
        text: &str,
        selection: Option<Selection<Caret>>,
        field: FieldId,
        focused: bool,
        alignment: Alignment,
        theme: &Theme,
    ) {
        let border = if focused { theme.accent } else { theme.text_muted };
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let paragraph = Paragraph::new(Self::lines(text, selection, field, theme))
            .block(block)
            .alignment(alignment)
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_lines_split_on_newline_and_show_nbsp() {
        let theme = Theme::dark();
        let lines = EditorPane::lines("a\u{a0}b\nc", None, 0, &theme);
        assert_eq!(plain(&lines), vec!["a b", "c"]);
    }

    #[test]
    fn test_caret_at_end_adds_cell() {
        let theme = Theme::dark();
        let selection = Some(Selection::collapsed(Caret::new(0, 2)));
        let lines = EditorPane::lines("ab", selection, 0, &theme);
        assert_eq!(plain(&lines), vec!["ab "]);

        // A caret in another field is not drawn here
        let elsewhere = Some(Selection::collapsed(Caret::new(1, 2)));
        let lines = EditorPane::lines("ab", elsewhere, 0, &theme);
        assert_eq!(plain(&lines), vec!["ab"]);
    }

    #[test]
    fn test_selection_is_highlighted() {
        let theme = Theme::dark();
        let selection = Some(Selection::new(Caret::new(0, 1), Caret::new(0, 3)));
        let lines = EditorPane::lines("abcd", selection, 0, &theme);

        let styles: Vec<Style> = lines[0].spans.iter().map(|s| s.style).collect();
        assert_eq!(styles[0].bg, None);
        assert_eq!(styles[1].bg, Some(theme.accent));
        assert_eq!(styles[2].bg, Some(theme.accent));
        assert_eq!(styles[3].bg, None);
    }
}
