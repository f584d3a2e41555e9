//! Timed light show
//!
//! A pure function of the time since the show started: a slow rainbow
//! sweep, a fast sweep, a strobe, then a fade to black.

use crate::color::{rainbow_color, Rgb};

/// Total length of the show
pub const LIGHT_SHOW_DURATION_MS: u64 = 10_000;

const SLOW_END_MS: u64 = 3_000;
const FAST_END_MS: u64 = 6_000;
const STROBE_END_MS: u64 = 8_000;
const FADE_LEN_MS: u64 = LIGHT_SHOW_DURATION_MS - STROBE_END_MS;

/// Section of the show a given instant falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// One rainbow revolution over 3 s
    SlowSweep,
    /// Two revolutions over 3 s
    FastSweep,
    /// Rainbow flashing on and off every 100 ms
    Strobe,
    /// Rainbow ramping down to black over 2 s
    Fade,
    Done,
}

impl Phase {
    pub fn at(elapsed_ms: u64) -> Self {
        if elapsed_ms < SLOW_END_MS {
            Phase::SlowSweep
        } else if elapsed_ms < FAST_END_MS {
            Phase::FastSweep
        } else if elapsed_ms < STROBE_END_MS {
            Phase::Strobe
        } else if elapsed_ms < LIGHT_SHOW_DURATION_MS {
            Phase::Fade
        } else {
            Phase::Done
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::SlowSweep => "SWEEP",
            Phase::FastSweep => "FAST SWEEP",
            Phase::Strobe => "STROBE",
            Phase::Fade => "FADE",
            Phase::Done => "DONE",
        }
    }
}

/// Light show color `elapsed_ms` after the show started
pub fn color_at(elapsed_ms: u64) -> Rgb {
    let e = elapsed_ms;
    match Phase::at(e) {
        Phase::SlowSweep => rainbow_color(position(e * 256 / SLOW_END_MS)),
        Phase::FastSweep => {
            rainbow_color(position((e - SLOW_END_MS) * 512 / (FAST_END_MS - SLOW_END_MS)))
        }
        Phase::Strobe => {
            if (e / 100) % 2 == 0 {
                rainbow_color(position(e / 50))
            } else {
                Rgb::OFF
            }
        }
        Phase::Fade => {
            let fade = e - STROBE_END_MS;
            let brightness = 255u64.saturating_sub(fade * 255 / FADE_LEN_MS) as u8;
            rainbow_color(position(e / 10)).scaled(brightness)
        }
        Phase::Done => Rgb::OFF,
    }
}

fn position(raw: u64) -> u32 {
    (raw % 256) as u32
}
