//! Voice note catalog - per-category fill and the note now playing

use crate::theme::Theme;
use lumivox_library::{Category, CATEGORY_CAPACITY};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Widget listing how full each category is
pub struct CatalogWidget<'a> {
    theme: &'a Theme,
    counts: [usize; 3],
    now_playing: Option<&'a str>,
}

impl<'a> CatalogWidget<'a> {
    pub fn new(counts: [usize; 3], theme: &'a Theme) -> Self {
        Self {
            theme,
            counts,
            now_playing: None,
        }
    }

    pub fn now_playing(mut self, name: Option<&'a str>) -> Self {
        self.now_playing = name;
        self
    }
}

/// Fill bar like `███░░░░░░░`, one cell per slot
pub fn capacity_bar(count: usize, capacity: usize) -> String {
    let filled = count.min(capacity);
    format!("{}{}", "█".repeat(filled), "░".repeat(capacity - filled))
}

impl Widget for CatalogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let total: usize = self.counts.iter().sum();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(
                format!(" VOICE NOTES {} ", total),
                self.theme.title(),
            ));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Category::ALL
            .iter()
            .map(|&category| {
                let count = self.counts[category.index()];
                let style = if count == 0 {
                    self.theme.dim()
                } else {
                    self.theme.normal()
                };
                Line::from(vec![
                    Span::styled(format!("{} ", category.label()), style),
                    Span::styled(capacity_bar(count, CATEGORY_CAPACITY), style),
                    Span::styled(format!(" {:>2}/{}", count, CATEGORY_CAPACITY), self.theme.dim()),
                ])
            })
            .collect();

        lines.push(Line::default());
        lines.push(match self.now_playing {
            Some(name) => Line::from(vec![
                Span::styled("▶ ", self.theme.lamp(true)),
                Span::styled(name, self.theme.normal()),
            ]),
            None => Line::from(Span::styled("  silent", self.theme.dim())),
        });

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bar() {
        assert_eq!(capacity_bar(0, 4), "░░░░");
        assert_eq!(capacity_bar(3, 4), "███░");
        assert_eq!(capacity_bar(9, 4), "████");
    }
}
