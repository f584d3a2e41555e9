//! Device session context
//!
//! Everything the polling loop owns lives here: storage, catalog, the
//! playback controller, the random source, the button panel and the mode
//! machine. `tick` is the whole loop body; the caller supplies time and
//! button levels and pushes the returned `Effects` to the indicator.

use crate::modal::{LotteryReason, Mode, ModeStateMachine, ToggleLights};
use crate::panel::{ButtonEvents, ButtonLevels, ButtonPanel};
use lumivox_audio::{AudioEvent, PlaybackController, PlaybackError, PlaybackState, Preconditions};
use lumivox_library::{AudioCatalog, RandomSource, ScanReport, Storage, StorageError};
use lumivox_lights::{Indicator, Rgb};
use thiserror::Error;

/// Conditions that stop the device from starting
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("No voice notes found on storage")]
    EmptyCatalog,
}

/// Result of a lottery request
#[derive(Debug)]
pub enum LotteryOutcome {
    /// The drawn voice note is now playing
    Started(String),
    /// Nothing started; `name` is set when a note had been drawn
    Refused {
        name: Option<String>,
        error: PlaybackError,
    },
}

/// Everything one tick produced
#[derive(Debug)]
pub struct Effects {
    pub color: Rgb,
    /// On while a voice note plays
    pub status_led: bool,
    pub mode: Mode,
    pub lottery: Option<LotteryOutcome>,
    pub rescan: Option<Result<ScanReport, StorageError>>,
}

impl Effects {
    /// Push the lighting outputs to an indicator
    pub fn apply<I: Indicator + ?Sized>(&self, indicator: &mut I) {
        indicator.set_color(self.color);
        indicator.set_status(self.status_led);
    }
}

pub struct Device<S, R> {
    storage: S,
    catalog: AudioCatalog,
    playback: PlaybackController,
    rng: R,
    panel: ButtonPanel,
    modes: ModeStateMachine,
    connected: bool,
}

impl<S: Storage, R: RandomSource> Device<S, R> {
    /// Scan storage and build the device. An empty catalog is fatal.
    pub fn boot(
        storage: S,
        playback: PlaybackController,
        rng: R,
        settle_ms: u64,
    ) -> Result<Self, DeviceError> {
        let (catalog, report) = AudioCatalog::scan(&storage)?;
        if catalog.is_empty() {
            return Err(DeviceError::EmptyCatalog);
        }
        tracing::info!(files = report.catalogued, "device ready");
        Ok(Self::new(storage, catalog, playback, rng, settle_ms))
    }

    pub fn new(
        storage: S,
        catalog: AudioCatalog,
        playback: PlaybackController,
        rng: R,
        settle_ms: u64,
    ) -> Self {
        Self {
            storage,
            catalog,
            playback,
            rng,
            panel: ButtonPanel::new(settle_ms),
            modes: ModeStateMachine::new(),
            connected: true,
        }
    }

    /// One pass of the polling loop
    pub fn tick(&mut self, now_ms: u64, levels: &ButtonLevels) -> Effects {
        self.drain_audio_events();

        // Buttons are only sampled in NORMAL
        let events = if self.modes.mode() == Mode::Normal {
            self.panel.poll(now_ms, levels)
        } else {
            ButtonEvents::EMPTY
        };

        let step = self.modes.tick(now_ms, &events);
        let rescan = step.rescan.then(|| self.rescan());
        let lottery = step.lottery.map(|reason| self.run_lottery(reason));

        Effects {
            color: step.color,
            status_led: self.playback.is_playing(),
            mode: self.modes.mode(),
            lottery,
            rescan,
        }
    }

    fn drain_audio_events(&self) {
        for event in self.playback.poll_events() {
            match event {
                AudioEvent::Started => tracing::debug!("audio session started"),
                AudioEvent::Finished {
                    name,
                    frames,
                    read_error,
                } => {
                    if read_error {
                        tracing::warn!(%name, frames, "playback ended on read error");
                    } else {
                        tracing::info!(%name, frames, "playback finished");
                    }
                }
                AudioEvent::Rejected { name } => {
                    tracing::warn!(%name, "audio engine rejected start while busy");
                }
            }
        }
    }

    /// Draw a voice note and start it
    fn run_lottery(&mut self, reason: LotteryReason) -> LotteryOutcome {
        let preconditions = Preconditions {
            connected: self.connected,
            catalog_ready: !self.catalog.is_empty(),
        };

        if !preconditions.connected {
            tracing::warn!(?reason, "lottery skipped: audio output not connected");
            return LotteryOutcome::Refused {
                name: None,
                error: PlaybackError::NotConnected,
            };
        }

        let Some(name) = self.catalog.select(&mut self.rng) else {
            tracing::warn!(?reason, "lottery skipped: catalog empty");
            return LotteryOutcome::Refused {
                name: None,
                error: PlaybackError::CatalogNotReady,
            };
        };

        match self
            .playback
            .start_playback(name, &self.storage, preconditions)
        {
            Ok(()) => LotteryOutcome::Started(name.to_string()),
            Err(error) => {
                tracing::warn!(%name, "lottery draw not played: {}", error);
                LotteryOutcome::Refused {
                    name: Some(name.to_string()),
                    error,
                }
            }
        }
    }

    /// Rebuild the catalog. The old catalog stays when the scan fails.
    pub fn rescan(&mut self) -> Result<ScanReport, StorageError> {
        match AudioCatalog::scan(&self.storage) {
            Ok((catalog, report)) => {
                if catalog.is_empty() {
                    tracing::warn!("rescan found no voice notes");
                }
                self.catalog = catalog;
                Ok(report)
            }
            Err(e) => {
                tracing::error!("rescan failed: {}", e);
                Err(e)
            }
        }
    }

    /// Report the transport link; lottery draws are skipped while down.
    /// Losing the link ends any session in progress, since nothing will
    /// pull it to its end.
    pub fn set_connected(&mut self, connected: bool) {
        if connected != self.connected {
            tracing::info!(connected, "audio output link changed");
            if !connected {
                self.playback.release();
            }
        }
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn catalog(&self) -> &AudioCatalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn lights(&self) -> ToggleLights {
        self.modes.lights()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Time spent in the current mode
    pub fn mode_elapsed(&self, now_ms: u64) -> u64 {
        self.modes.elapsed(now_ms)
    }

    /// Seconds left before the light show, while waiting
    pub fn countdown(&self, now_ms: u64) -> Option<u64> {
        self.modes.countdown(now_ms)
    }
}
