//! RGB strip and status LED readout

use crate::theme::Theme;
use lumivox_control::ToggleLights;
use lumivox_lights::Rgb;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Widget for the strip color, its pin levels, and the status LED
pub struct LedStripWidget<'a> {
    theme: &'a Theme,
    color: Rgb,
    pin_color: Option<Rgb>,
    status_led: bool,
    lights: ToggleLights,
}

impl<'a> LedStripWidget<'a> {
    pub fn new(color: Rgb, theme: &'a Theme) -> Self {
        Self {
            theme,
            color,
            pin_color: None,
            status_led: false,
            lights: ToggleLights::default(),
        }
    }

    /// Show the raw pin levels next to the logical color
    pub fn pins(mut self, pin_color: Rgb) -> Self {
        self.pin_color = Some(pin_color);
        self
    }

    pub fn status(mut self, on: bool) -> Self {
        self.status_led = on;
        self
    }

    pub fn lights(mut self, lights: ToggleLights) -> Self {
        self.lights = lights;
        self
    }

    fn switch_span(&self, label: &'static str, on: bool) -> Span<'static> {
        if on {
            Span::styled(label, self.theme.highlight())
        } else {
            Span::styled(label, self.theme.dim())
        }
    }
}

/// `#RRGGBB`
pub fn hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

impl Widget for LedStripWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" STRIP ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 10 {
            return;
        }

        let rows = Layout::vertical([
            Constraint::Min(1),    // Lamp
            Constraint::Length(1), // Readout
            Constraint::Length(1), // Switches + status
        ])
        .split(inner);

        // Lamp: off renders as an empty shade so the panel never looks blank
        let (glyph, style) = if self.color.is_off() {
            ("░", self.theme.dim())
        } else {
            ("█", self.theme.strip(self.color))
        };
        let row = glyph.repeat(rows[0].width as usize);
        for y in rows[0].top()..rows[0].bottom() {
            buf.set_string(rows[0].x, y, &row, style);
        }

        let mut readout = vec![Span::styled(hex(self.color), self.theme.normal())];
        if let Some(pins) = self.pin_color {
            readout.push(Span::styled("  pins ", self.theme.dim()));
            readout.push(Span::styled(hex(pins), self.theme.dim()));
        }
        Paragraph::new(Line::from(readout)).render(rows[1], buf);

        let controls = Line::from(vec![
            self.switch_span("R", self.lights.red),
            Span::raw(" "),
            self.switch_span("G", self.lights.green),
            Span::raw(" "),
            self.switch_span("B", self.lights.blue),
            Span::raw("   "),
            Span::styled("● ", self.theme.lamp(self.status_led)),
            Span::styled(
                if self.status_led { "PLAYING" } else { "idle" },
                self.theme.lamp(self.status_led),
            ),
        ]);
        Paragraph::new(controls).render(rows[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(Rgb::OFF), "#000000");
        assert_eq!(hex(Rgb::new(255, 16, 1)), "#FF1001");
    }

    #[test]
    fn test_render_shows_readout() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);

        LedStripWidget::new(Rgb::RED, &theme)
            .pins(Rgb::RED.inverted())
            .status(true)
            .render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("#FF0000"));
        assert!(text.contains("#00FFFF"));
        assert!(text.contains("PLAYING"));
    }
}
