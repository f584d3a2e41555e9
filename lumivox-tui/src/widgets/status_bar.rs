//! Status bar widget - mode indicator, messages, and key hints

use crate::app::MessageType;
use crate::theme::Theme;
use lumivox_control::Mode;
use lumivox_lights::Phase;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for the bottom status line
pub struct StatusBarWidget<'a> {
    mode: Mode,
    countdown: Option<u64>,
    phase: Option<Phase>,
    connected: bool,
    message: Option<&'a str>,
    message_type: MessageType,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, theme: &'a Theme) -> Self {
        Self {
            mode,
            countdown: None,
            phase: None,
            connected: true,
            message: None,
            message_type: MessageType::Info,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    pub fn progress(mut self, countdown: Option<u64>, phase: Option<Phase>) -> Self {
        self.countdown = countdown;
        self.phase = phase;
        self
    }

    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    fn mode_string(&self) -> (&'static str, Style) {
        let style = match self.mode {
            Mode::Normal => self.theme.highlight(),
            Mode::Waiting => Style::default().fg(self.theme.warning),
            Mode::LightShow => Style::from(self.theme.accent),
            Mode::Lottery => Style::default().fg(self.theme.danger),
        };
        (self.mode.display_name(), style)
    }
}

/// Mode progress text, if the mode has any
pub fn mode_detail(countdown: Option<u64>, phase: Option<Phase>) -> Option<String> {
    match (countdown, phase) {
        (Some(secs), _) => Some(format!("light show in {}s", secs)),
        (None, Some(phase)) => Some(phase.name().to_string()),
        (None, None) => None,
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(14), // Mode indicator
            Constraint::Min(20),    // Message area
            Constraint::Length(12), // Link state
            Constraint::Length(34), // Key hints
        ])
        .split(area);

        let (mode_text, mode_style) = self.mode_string();
        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(mode_text, mode_style),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        // Mode progress takes priority over the last message
        let content = if let Some(detail) = mode_detail(self.countdown, self.phase) {
            Line::from(Span::styled(detail, Style::default().fg(self.theme.warning)))
        } else if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::default()
        };
        Paragraph::new(content).render(chunks[1], buf);

        let link = if self.connected {
            Span::styled("AUDIO OK", self.theme.dim())
        } else {
            Span::styled("NO AUDIO", Style::default().fg(self.theme.danger))
        };
        Paragraph::new(Line::from(link)).render(chunks[2], buf);

        let hints = Line::from(Span::styled(
            "r/g/b spc:draw y:scan q:quit",
            self.theme.dim(),
        ));
        Paragraph::new(hints).render(chunks[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detail() {
        assert_eq!(
            mode_detail(Some(2), None).as_deref(),
            Some("light show in 2s")
        );
        assert_eq!(
            mode_detail(None, Some(Phase::Strobe)).as_deref(),
            Some("STROBE")
        );
        assert_eq!(mode_detail(None, None), None);
    }
}
