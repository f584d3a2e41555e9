//! RGB color and rainbow palette

/// Logical brightness of the three channels, 0-255 each
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Full-on/off channels from three switches
    pub const fn from_switches(r: bool, g: bool, b: bool) -> Self {
        Self::new(
            if r { 255 } else { 0 },
            if g { 255 } else { 0 },
            if b { 255 } else { 0 },
        )
    }

    /// Scale every channel by `brightness / 255`
    pub fn scaled(self, brightness: u8) -> Self {
        let scale = |c: u8| (c as u16 * brightness as u16 / 255) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Polarity inversion for common-anode LEDs
    pub fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

/// Color wheel lookup.
///
/// The position wraps at 256. The wheel is three 85-wide segments fading
/// red to green, green to blue, then blue back to red.
pub fn rainbow_color(pos: u32) -> Rgb {
    let pos = (pos % 256) as u16;
    let ramp = |p: u16| (p * 3).min(255) as u8;

    match pos {
        0..=84 => Rgb::new(255 - ramp(pos), ramp(pos), 0),
        85..=169 => {
            let p = pos - 85;
            Rgb::new(0, 255 - ramp(p), ramp(p))
        }
        _ => {
            let p = pos - 170;
            Rgb::new(ramp(p), 0, 255 - ramp(p))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rainbow_segment_starts() {
        assert_eq!(rainbow_color(0), Rgb::RED);
        assert_eq!(rainbow_color(85), Rgb::GREEN);
        assert_eq!(rainbow_color(170), Rgb::BLUE);
    }

    #[test]
    fn test_rainbow_wraps() {
        assert_eq!(rainbow_color(256), rainbow_color(0));
        assert_eq!(rainbow_color(256 + 100), rainbow_color(100));
    }

    #[test]
    fn test_rainbow_end_saturates_to_red() {
        assert_eq!(rainbow_color(255), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_rainbow_midpoints() {
        assert_eq!(rainbow_color(42), Rgb::new(129, 126, 0));
        assert_eq!(rainbow_color(127), Rgb::new(0, 129, 126));
    }

    #[test]
    fn test_scaled_and_inverted() {
        assert_eq!(Rgb::WHITE.scaled(0), Rgb::OFF);
        assert_eq!(Rgb::WHITE.scaled(255), Rgb::WHITE);
        assert_eq!(Rgb::new(200, 100, 0).scaled(128), Rgb::new(100, 50, 0));
        assert_eq!(Rgb::new(255, 10, 0).inverted(), Rgb::new(0, 245, 255));
    }

    #[test]
    fn test_from_switches() {
        assert_eq!(Rgb::from_switches(true, false, true), Rgb::new(255, 0, 255));
        assert!(Rgb::from_switches(false, false, false).is_off());
    }
}
