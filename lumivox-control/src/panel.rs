//! Five-button front panel
//!
//! Red, green and blue toggle their lights, black draws a voice note, and
//! yellow rescans the storage. After any press the panel stops sampling for
//! a settle window so switch bounce is not read as a second press.

use crate::edge::EdgeDetector;

/// Settle window after an accepted press
pub const DEFAULT_SETTLE_MS: u64 = 50;

/// Panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Red,
    Green,
    Blue,
    Black,
    Yellow,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::Red,
        Button::Green,
        Button::Blue,
        Button::Black,
        Button::Yellow,
    ];

    fn index(self) -> usize {
        match self {
            Button::Red => 0,
            Button::Green => 1,
            Button::Blue => 2,
            Button::Black => 3,
            Button::Yellow => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Button::Red => "red",
            Button::Green => "green",
            Button::Blue => "blue",
            Button::Black => "black",
            Button::Yellow => "yellow",
        }
    }
}

/// Pressed/released level of every button at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLevels([bool; 5]);

impl ButtonLevels {
    pub fn get(&self, button: Button) -> bool {
        self.0[button.index()]
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        self.0[button.index()] = pressed;
    }

    /// Builder form of `set(button, true)`
    pub fn pressed(mut self, button: Button) -> Self {
        self.set(button, true);
        self
    }
}

/// Buttons that went down during one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEvents([bool; 5]);

impl ButtonEvents {
    pub const EMPTY: ButtonEvents = ButtonEvents([false; 5]);

    pub fn contains(&self, button: Button) -> bool {
        self.0[button.index()]
    }

    pub fn insert(&mut self, button: Button) {
        self.0[button.index()] = true;
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&pressed| pressed)
    }

    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.contains(*b))
    }

    /// Single-button event set
    pub fn only(button: Button) -> Self {
        let mut events = Self::default();
        events.insert(button);
        events
    }
}

/// Edge detectors for the five buttons plus the shared settle window
#[derive(Debug, Clone)]
pub struct ButtonPanel {
    detectors: [EdgeDetector; 5],
    settle_ms: u64,
    settle_until: Option<u64>,
}

impl ButtonPanel {
    pub fn new(settle_ms: u64) -> Self {
        Self {
            detectors: [EdgeDetector::new(); 5],
            settle_ms,
            settle_until: None,
        }
    }

    /// Sample all buttons. During the settle window nothing is sampled and
    /// no events are reported.
    pub fn poll(&mut self, now_ms: u64, levels: &ButtonLevels) -> ButtonEvents {
        if let Some(until) = self.settle_until {
            if now_ms < until {
                return ButtonEvents::default();
            }
            self.settle_until = None;
        }

        let mut events = ButtonEvents::default();
        for button in Button::ALL {
            if self.detectors[button.index()].poll(levels.get(button)) {
                events.insert(button);
            }
        }

        if !events.is_empty() {
            self.settle_until = Some(now_ms + self.settle_ms);
        }
        events
    }

    /// Whether sampling is currently suspended
    pub fn settling(&self, now_ms: u64) -> bool {
        self.settle_until.is_some_and(|until| now_ms < until)
    }
}

impl Default for ButtonPanel {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_MS)
    }
}
