//! Keyboard stand-in for the button panel

use crate::panel::Button;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key does on the desktop host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Hold the button high for one poll
    Press(Button),
    Quit,
}

/// Map a key event to a panel action
pub fn key_action(key: KeyEvent) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(KeyAction::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyAction::Press(Button::Red)),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(KeyAction::Press(Button::Green)),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(KeyAction::Press(Button::Blue)),
        KeyCode::Char(' ') => Some(KeyAction::Press(Button::Black)),
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(KeyAction::Press(Button::Yellow)),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_button_keys() {
        assert_eq!(
            key_action(key(KeyCode::Char('r'))),
            Some(KeyAction::Press(Button::Red))
        );
        assert_eq!(
            key_action(key(KeyCode::Char(' '))),
            Some(KeyAction::Press(Button::Black))
        );
        assert_eq!(
            key_action(key(KeyCode::Char('y'))),
            Some(KeyAction::Press(Button::Yellow))
        );
        assert_eq!(key_action(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(key_action(key(KeyCode::Esc)), Some(KeyAction::Quit));
        assert_eq!(key_action(key(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }
}
