//! Indicator drivers
//!
//! An indicator is the RGB strip plus a single status LED. Drivers receive
//! logical colors; polarity is a driver concern.

use crate::color::Rgb;

/// Output surface for the RGB strip and the status LED
pub trait Indicator {
    fn set_color(&mut self, color: Rgb);

    fn set_status(&mut self, on: bool);

    /// Turn everything off
    fn clear(&mut self) {
        self.set_color(Rgb::OFF);
        self.set_status(false);
    }
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn set_color(&mut self, color: Rgb) {
        (**self).set_color(color);
    }

    fn set_status(&mut self, on: bool) {
        (**self).set_status(on);
    }
}

/// Latched indicator levels, as written to the pins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorState {
    pub color: Rgb,
    pub status: bool,
    /// Number of color writes that changed the latched value
    pub changes: u64,
}

impl Indicator for IndicatorState {
    fn set_color(&mut self, color: Rgb) {
        if color != self.color {
            self.color = color;
            self.changes += 1;
        }
    }

    fn set_status(&mut self, on: bool) {
        self.status = on;
    }
}

/// Common-anode wiring: a channel is lit when its pin is low, so every
/// channel is written as `255 - value`
#[derive(Debug, Clone, Default)]
pub struct Inverted<I> {
    inner: I,
}

impl<I: Indicator> Inverted<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: Indicator> Indicator for Inverted<I> {
    fn set_color(&mut self, color: Rgb) {
        self.inner.set_color(color.inverted());
    }

    fn set_status(&mut self, on: bool) {
        self.inner.set_status(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_latches_changes() {
        let mut state = IndicatorState::default();
        state.set_color(Rgb::RED);
        state.set_color(Rgb::RED);
        state.set_color(Rgb::BLUE);
        assert_eq!(state.color, Rgb::BLUE);
        assert_eq!(state.changes, 2);
    }

    #[test]
    fn test_inverted_writes_complement() {
        let mut led = Inverted::new(IndicatorState::default());
        led.set_color(Rgb::new(255, 0, 100));
        assert_eq!(led.inner().color, Rgb::new(0, 255, 155));

        led.clear();
        assert_eq!(led.inner().color, Rgb::WHITE);
        assert!(!led.inner().status);
    }

    #[test]
    fn test_status_is_not_inverted() {
        let mut led = Inverted::new(IndicatorState::default());
        led.set_status(true);
        assert!(led.inner().status);
        assert_eq!(led.inner().color, Rgb::OFF);
    }
}
