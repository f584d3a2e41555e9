//! Mode state machine for the light show and lottery

use crate::panel::{Button, ButtonEvents};
use lumivox_lights::{color_at, Rgb, LIGHT_SHOW_DURATION_MS};

/// Countdown length before the light show starts
pub const WAITING_DURATION_MS: u64 = 3_000;

/// Flash period during the countdown
const WAITING_BLINK_MS: u64 = 500;

/// Device modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Waiting,
    LightShow,
    Lottery,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Waiting => "WAITING",
            Mode::LightShow => "LIGHT SHOW",
            Mode::Lottery => "LOTTERY",
        }
    }
}

/// Red, green and blue light switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleLights {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl ToggleLights {
    pub fn all_on(&self) -> bool {
        self.red && self.green && self.blue
    }

    /// Flip the light owned by `button`. Returns the new state, or `None`
    /// when the button owns no light.
    pub fn toggle(&mut self, button: Button) -> Option<bool> {
        let light = match button {
            Button::Red => &mut self.red,
            Button::Green => &mut self.green,
            Button::Blue => &mut self.blue,
            Button::Black | Button::Yellow => return None,
        };
        *light = !*light;
        Some(*light)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Each switch as a full-on or off channel
    pub fn color(&self) -> Rgb {
        Rgb::from_switches(self.red, self.green, self.blue)
    }
}

/// Why a lottery draw was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotteryReason {
    /// Black button in NORMAL
    Button,
    /// End of the light show
    LightShow,
}

/// Output of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    /// Strip color to show
    pub color: Rgb,
    /// Draw a voice note and start it
    pub lottery: Option<LotteryReason>,
    /// Rebuild the catalog from storage
    pub rescan: bool,
}

/// NORMAL/WAITING/LIGHT_SHOW/LOTTERY orchestration.
///
/// Pure: the caller supplies time and button events and executes the
/// lottery and rescan requests in the returned `Step`.
#[derive(Debug, Clone, Default)]
pub struct ModeStateMachine {
    mode: Mode,
    entered_at: u64,
    lights: ToggleLights,
    all_lights_were_on: bool,
    last_countdown: Option<u64>,
}

impl ModeStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn lights(&self) -> ToggleLights {
        self.lights
    }

    /// Time spent in the current mode
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.entered_at)
    }

    /// Seconds left on the countdown, while waiting
    pub fn countdown(&self, now_ms: u64) -> Option<u64> {
        (self.mode == Mode::Waiting)
            .then(|| (WAITING_DURATION_MS / 1000).saturating_sub(self.elapsed(now_ms) / 1000))
    }

    fn enter(&mut self, mode: Mode, now_ms: u64) {
        tracing::debug!(from = self.mode.display_name(), to = mode.display_name(), "mode change");
        self.mode = mode;
        self.entered_at = now_ms;
        self.last_countdown = None;
    }

    /// Advance the machine. Button events are only acted on in NORMAL.
    pub fn tick(&mut self, now_ms: u64, events: &ButtonEvents) -> Step {
        match self.mode {
            Mode::Normal => self.tick_normal(now_ms, events),
            Mode::Waiting => self.tick_waiting(now_ms),
            Mode::LightShow => self.tick_light_show(now_ms),
            Mode::Lottery => self.run_lottery(now_ms),
        }
    }

    fn tick_normal(&mut self, now_ms: u64, events: &ButtonEvents) -> Step {
        let mut step = Step::default();

        for button in events.iter() {
            match button {
                Button::Red | Button::Green | Button::Blue => {
                    if let Some(on) = self.lights.toggle(button) {
                        tracing::info!(
                            "[{} button] light {}",
                            button.label(),
                            if on { "on" } else { "off" }
                        );
                    }
                }
                Button::Black => {
                    tracing::info!("[black button] lottery draw");
                    step.lottery = Some(LotteryReason::Button);
                }
                Button::Yellow => {
                    tracing::info!("[yellow button] rescan");
                    step.rescan = true;
                }
            }
        }

        step.color = self.lights.color();

        let all_on = self.lights.all_on();
        if all_on && !self.all_lights_were_on {
            self.all_lights_were_on = true;
            tracing::info!("All lights on, light show in 3 seconds");
            self.enter(Mode::Waiting, now_ms);
        }
        if !all_on {
            self.all_lights_were_on = false;
        }

        step
    }

    fn tick_waiting(&mut self, now_ms: u64) -> Step {
        let elapsed = self.elapsed(now_ms);

        let color = if (elapsed / WAITING_BLINK_MS) % 2 == 0 {
            Rgb::WHITE
        } else {
            Rgb::OFF
        };

        if let Some(remaining) = self.countdown(now_ms) {
            if self.last_countdown != Some(remaining) {
                tracing::info!("Countdown: {}", remaining);
                self.last_countdown = Some(remaining);
            }
        }

        if elapsed >= WAITING_DURATION_MS {
            tracing::info!("Light show started");
            self.enter(Mode::LightShow, now_ms);
        }

        Step {
            color,
            ..Step::default()
        }
    }

    fn tick_light_show(&mut self, now_ms: u64) -> Step {
        let elapsed = self.elapsed(now_ms);
        if elapsed < LIGHT_SHOW_DURATION_MS {
            return Step {
                color: color_at(elapsed),
                ..Step::default()
            };
        }

        self.enter(Mode::Lottery, now_ms);
        self.run_lottery(now_ms)
    }

    /// LOTTERY never outlives the tick that entered it
    fn run_lottery(&mut self, now_ms: u64) -> Step {
        self.lights.clear();
        self.all_lights_were_on = false;
        tracing::info!("Light show finished, lights reset");
        self.enter(Mode::Normal, now_ms);

        Step {
            color: Rgb::OFF,
            lottery: Some(LotteryReason::LightShow),
            rescan: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: ButtonEvents = ButtonEvents::EMPTY;

    fn press(machine: &mut ModeStateMachine, now: u64, button: Button) -> Step {
        machine.tick(now, &ButtonEvents::only(button))
    }

    /// Turn all three lights on, entering WAITING at `now`
    fn arm(machine: &mut ModeStateMachine, now: u64) {
        press(machine, now, Button::Red);
        press(machine, now, Button::Green);
        press(machine, now, Button::Blue);
    }

    #[test]
    fn test_toggles_drive_color() {
        let mut machine = ModeStateMachine::new();
        let step = press(&mut machine, 0, Button::Red);
        assert_eq!(step.color, Rgb::RED);

        let step = press(&mut machine, 10, Button::Blue);
        assert_eq!(step.color, Rgb::new(255, 0, 255));

        let step = press(&mut machine, 20, Button::Red);
        assert_eq!(step.color, Rgb::BLUE);
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[test]
    fn test_black_requests_lottery_and_yellow_rescan() {
        let mut machine = ModeStateMachine::new();
        let step = press(&mut machine, 0, Button::Black);
        assert_eq!(step.lottery, Some(LotteryReason::Button));
        assert!(!step.rescan);

        let step = press(&mut machine, 10, Button::Yellow);
        assert_eq!(step.lottery, None);
        assert!(step.rescan);
        assert_eq!(machine.mode(), Mode::Normal);
    }

    #[test]
    fn test_simultaneous_rgb_enters_waiting_once() {
        let mut machine = ModeStateMachine::new();
        let mut events = ButtonEvents::only(Button::Red);
        events.insert(Button::Green);
        events.insert(Button::Blue);

        let step = machine.tick(100, &events);
        assert_eq!(step.color, Rgb::WHITE);
        assert_eq!(machine.mode(), Mode::Waiting);

        // Later ticks keep the original entry time
        machine.tick(110, &NONE);
        machine.tick(600, &NONE);
        assert_eq!(machine.mode(), Mode::Waiting);
        assert_eq!(machine.elapsed(600), 500);
    }

    #[test]
    fn test_all_lights_enter_waiting_once() {
        let mut machine = ModeStateMachine::new();
        arm(&mut machine, 100);
        assert_eq!(machine.mode(), Mode::Waiting);
        assert_eq!(machine.countdown(100), Some(3));
        assert_eq!(machine.countdown(1100), Some(2));
    }

    #[test]
    fn test_guard_blocks_retransition_until_conjunction_drops() {
        let mut machine = ModeStateMachine::new();
        machine.all_lights_were_on = true;
        machine.lights = ToggleLights {
            red: true,
            green: true,
            blue: true,
        };

        // Conjunction still true but guard set: stay in NORMAL
        machine.tick(0, &NONE);
        assert_eq!(machine.mode(), Mode::Normal);

        press(&mut machine, 10, Button::Red);
        assert!(!machine.all_lights_were_on);
        press(&mut machine, 20, Button::Red);
        assert_eq!(machine.mode(), Mode::Waiting);
    }

    #[test]
    fn test_waiting_blinks_and_lasts_three_seconds() {
        let mut machine = ModeStateMachine::new();
        arm(&mut machine, 0);

        assert_eq!(machine.tick(10, &NONE).color, Rgb::WHITE);
        assert_eq!(machine.tick(600, &NONE).color, Rgb::OFF);
        assert_eq!(machine.tick(1000, &NONE).color, Rgb::WHITE);

        // Button presses are ignored while waiting
        let step = press(&mut machine, 1500, Button::Black);
        assert_eq!(step.lottery, None);
        assert!(machine.lights().all_on());

        machine.tick(2990, &NONE);
        assert_eq!(machine.mode(), Mode::Waiting);
        machine.tick(3000, &NONE);
        assert_eq!(machine.mode(), Mode::LightShow);
    }

    #[test]
    fn test_light_show_then_lottery_within_one_tick() {
        let mut machine = ModeStateMachine::new();
        arm(&mut machine, 0);
        machine.tick(3000, &NONE);
        assert_eq!(machine.mode(), Mode::LightShow);

        assert_eq!(machine.tick(3000, &NONE).color, color_at(0));
        assert_eq!(machine.tick(4500, &NONE).color, color_at(1500));

        let step = machine.tick(12_990, &NONE);
        assert_eq!(step.lottery, None);
        assert_eq!(machine.mode(), Mode::LightShow);

        let step = machine.tick(13_000, &NONE);
        assert_eq!(step.lottery, Some(LotteryReason::LightShow));
        assert_eq!(step.color, Rgb::OFF);
        assert_eq!(machine.mode(), Mode::Normal);
        assert_eq!(machine.lights(), ToggleLights::default());
    }

    #[test]
    fn test_cycle_can_repeat() {
        let mut machine = ModeStateMachine::new();
        arm(&mut machine, 0);
        machine.tick(3000, &NONE);
        machine.tick(13_000, &NONE);
        assert_eq!(machine.mode(), Mode::Normal);

        arm(&mut machine, 14_000);
        assert_eq!(machine.mode(), Mode::Waiting);
    }
}
