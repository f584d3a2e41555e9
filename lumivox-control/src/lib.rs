//! Device control for Lumivox
//!
//! Button edge detection, the NORMAL/WAITING/LIGHT_SHOW/LOTTERY mode
//! machine, and the `Device` session context that ties buttons, lights,
//! catalog and playback together on the polling side.

mod clock;
mod device;
mod edge;
mod keymap;
mod modal;
mod panel;

pub use clock::{Clock, ManualClock, SystemClock};
pub use device::{Device, DeviceError, Effects, LotteryOutcome};
pub use edge::EdgeDetector;
pub use keymap::{key_action, KeyAction};
pub use modal::{
    LotteryReason, Mode, ModeStateMachine, Step, ToggleLights, WAITING_DURATION_MS,
};
pub use panel::{Button, ButtonEvents, ButtonLevels, ButtonPanel, DEFAULT_SETTLE_MS};
