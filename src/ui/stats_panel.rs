use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Row, Table, Widget};

use crate::session::WordStatsRow;
use crate::ui::theme::Theme;

/// Word statistics table: focus words first, weakest first, with the
/// selected row highlighted for removal.
pub struct StatsPanel<'a> {
    rows: &'a [WordStatsRow],
    selected: usize,
    pair_count: usize,
    theme: &'a Theme,
}

impl<'a> StatsPanel<'a> {
    pub fn new(
        rows: &'a [WordStatsRow],
        selected: usize,
        pair_count: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            rows,
            selected,
            pair_count,
            theme,
        }
    }
}

impl Widget for StatsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = format!(
            " Words: {}  Pairs tracked: {} ",
            self.rows.len(),
            self.pair_count
        );
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                title,
                Style::default().fg(colors.header_fg()),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the selected row on screen: skip whole pages above it.
        let visible = inner.height.saturating_sub(1) as usize;
        let offset = if visible == 0 {
            0
        } else {
            (self.selected / visible) * visible
        };

        let header = Row::new(vec!["Word", "AWPM", "Attempts", "Recent", "Focus"]).style(
            Style::default()
                .fg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, row)| {
                let base = if row.in_focus {
                    Style::default().fg(colors.focus())
                } else if row.attempts == 0 {
                    Style::default().fg(colors.text_pending())
                } else {
                    Style::default().fg(colors.fg())
                };
                let style = if i == self.selected {
                    base.bg(colors.header_bg()).add_modifier(Modifier::BOLD)
                } else {
                    base
                };
                let awpm = if row.attempts == 0 {
                    "-".to_string()
                } else {
                    format!("{:.1}", row.awpm)
                };
                Row::new(vec![
                    row.word.clone(),
                    awpm,
                    row.attempts.to_string(),
                    row.recent.to_string(),
                    if row.in_focus { "*".to_string() } else { String::new() },
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Length(7),
                Constraint::Length(6),
            ],
        )
        .header(header);
        table.render(inner, buf);
    }
}
