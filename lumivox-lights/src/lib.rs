//! Lighting for Lumivox
//!
//! Provides the RGB color type, the rainbow palette, the timed light show,
//! and the indicator drivers that put colors on the hardware.

mod color;
mod indicator;
mod show;

pub use color::{rainbow_color, Rgb};
pub use indicator::{Indicator, IndicatorState, Inverted};
pub use show::{color_at, Phase, LIGHT_SHOW_DURATION_MS};
