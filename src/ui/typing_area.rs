use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Display class for one rendered word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WordState {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

fn word_state(result: Option<bool>, is_cursor: bool) -> WordState {
    if is_cursor {
        return WordState::Cursor;
    }
    match result {
        Some(true) => WordState::Correct,
        Some(false) => WordState::Incorrect,
        None => WordState::Pending,
    }
}

/// The three practice lines with per-word scoring colors, the cursor
/// highlight, and the live input buffer underneath.
pub struct TypingArea<'a> {
    lines: &'a [Vec<String>; 3],
    results: &'a [Vec<Option<bool>>; 3],
    cursor: (usize, usize),
    input: &'a str,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(
        lines: &'a [Vec<String>; 3],
        results: &'a [Vec<Option<bool>>; 3],
        cursor: (usize, usize),
        input: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            lines,
            results,
            cursor,
            input,
            theme,
        }
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let mut rendered: Vec<Line> = Vec::with_capacity(8);
        for (line_idx, words) in self.lines.iter().enumerate() {
            let mut spans: Vec<Span> = Vec::with_capacity(words.len() * 2);
            for (word_idx, word) in words.iter().enumerate() {
                let result = self.results[line_idx].get(word_idx).copied().flatten();
                let is_cursor = (line_idx, word_idx) == self.cursor;
                let style = match word_state(result, is_cursor) {
                    WordState::Cursor => Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg()),
                    WordState::Correct => Style::default().fg(colors.text_correct()),
                    WordState::Incorrect => Style::default()
                        .fg(colors.text_incorrect())
                        .add_modifier(Modifier::UNDERLINED),
                    WordState::Pending => Style::default().fg(colors.text_pending()),
                };
                spans.push(Span::styled(word.clone(), style));
                spans.push(Span::raw(" "));
            }
            rendered.push(Line::from(spans));
            if line_idx < 2 {
                rendered.push(Line::default());
            }
        }

        rendered.push(Line::default());
        rendered.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.accent())),
            Span::styled(
                self.input.to_string(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            ),
        ]));

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(rendered).block(block).render(area, buf);
    }
}
