//! Front panel state, updated once per control tick

use crate::theme::{Theme, CRT_GREEN};
use lumivox_control::{Device, Effects, LotteryOutcome, Mode, ToggleLights};
use lumivox_library::{Category, RandomSource, ScanReport, Storage};
use lumivox_lights::{Phase, Rgb};

/// Message type for colored status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Everything the panel draws
pub struct PanelState {
    pub theme: Theme,

    // Indicator outputs
    /// Logical strip color
    pub color: Rgb,
    /// Level actually written to the common-anode pins
    pub pin_color: Rgb,
    pub status_led: bool,

    // Control state
    pub mode: Mode,
    pub lights: ToggleLights,
    pub countdown: Option<u64>,
    pub phase: Option<Phase>,
    pub connected: bool,

    // Catalog
    pub category_counts: [usize; 3],
    pub now_playing: Option<String>,

    // Status message
    pub message: Option<String>,
    pub message_type: MessageType,
}

impl PanelState {
    pub fn new() -> Self {
        Self {
            theme: CRT_GREEN,
            color: Rgb::OFF,
            pin_color: Rgb::OFF.inverted(),
            status_led: false,
            mode: Mode::Normal,
            lights: ToggleLights::default(),
            countdown: None,
            phase: None,
            connected: true,
            category_counts: [0; 3],
            now_playing: None,
            message: None,
            message_type: MessageType::Info,
        }
    }

    /// Set theme by name
    pub fn set_theme(&mut self, name: &str) {
        match Theme::by_name(&name.to_lowercase()) {
            Some(theme) => self.theme = theme,
            None => self.set_error(format!("Unknown theme: {}. Use green/amber", name)),
        }
    }

    /// Take the outputs of one tick
    pub fn record(&mut self, effects: &Effects) {
        self.color = effects.color;
        self.status_led = effects.status_led;
        self.mode = effects.mode;

        if let Some(ref outcome) = effects.lottery {
            match outcome {
                LotteryOutcome::Started(name) => {
                    self.now_playing = Some(name.clone());
                    self.set_success(lottery_message(outcome));
                }
                LotteryOutcome::Refused { .. } => self.set_warning(lottery_message(outcome)),
            }
        }

        match effects.rescan {
            Some(Ok(ref report)) => {
                let msg = rescan_message(report);
                if report.catalogued == 0 {
                    self.set_warning(msg);
                } else {
                    self.set_success(msg);
                }
            }
            Some(Err(ref e)) => self.set_error(format!("Rescan failed: {}", e)),
            None => {}
        }

        if !self.status_led {
            self.now_playing = None;
        }
    }

    /// Level latched on the pins after this tick
    pub fn set_pin_color(&mut self, color: Rgb) {
        self.pin_color = color;
    }

    /// Copy device state that `Effects` does not carry
    pub fn sync<S: Storage, R: RandomSource>(&mut self, device: &Device<S, R>, now_ms: u64) {
        self.lights = device.lights();
        self.connected = device.is_connected();
        self.countdown = device.countdown(now_ms);
        self.phase = match device.mode() {
            Mode::LightShow => Some(Phase::at(device.mode_elapsed(now_ms))),
            _ => None,
        };
        for category in Category::ALL {
            self.category_counts[category.index()] = device.catalog().category(category).len();
        }
    }

    pub fn catalog_total(&self) -> usize {
        self.category_counts.iter().sum()
    }

    /// Set an info message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    /// Set a success message (green)
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    /// Set a warning message (yellow)
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    /// Set an error message (red)
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line summary of a lottery outcome
pub fn lottery_message(outcome: &LotteryOutcome) -> String {
    match outcome {
        LotteryOutcome::Started(name) => format!("Playing {}", name),
        LotteryOutcome::Refused {
            name: Some(name),
            error,
        } => format!("Not played {}: {}", name, error),
        LotteryOutcome::Refused { name: None, error } => format!("No draw: {}", error),
    }
}

/// One-line summary of a rescan
pub fn rescan_message(report: &ScanReport) -> String {
    let mut msg = format!("Rescan: {} voice notes", report.catalogued);
    if report.dropped > 0 {
        msg.push_str(&format!(", {} over capacity", report.dropped));
    }
    msg
}

/// Main application wrapper
pub struct App {
    pub state: PanelState,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: PanelState::new(),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
