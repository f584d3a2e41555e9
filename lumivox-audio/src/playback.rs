//! Poll-side playback controller
//!
//! Owns the Idle/Playing state seen by the rest of the device. Opening the
//! file and skipping its header happen here; the open handle is then handed
//! to the real-time context through the command queue.

use crate::engine::{AudioCommand, AudioEvent};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use lumivox_library::{Storage, StorageError};
use std::io::{Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Fixed header length skipped at the start of every voice note
pub const HEADER_LEN: u64 = 44;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

/// Conditions the caller vouches for when requesting playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preconditions {
    pub connected: bool,
    pub catalog_ready: bool,
}

/// Reasons a playback request is refused
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Playback already in progress")]
    AlreadyPlaying,
    #[error("Audio output not connected")]
    NotConnected,
    #[error("Catalog has no voice notes")]
    CatalogNotReady,
    #[error("Failed to open {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: StorageError,
    },
    #[error("{name} is shorter than its 44-byte header")]
    HeaderTooShort { name: String },
    #[error("Audio command queue full")]
    QueueFull,
    #[error("Audio engine stopped")]
    EngineStopped,
}

/// Handle used by the polling context to start playback and observe it end
pub struct PlaybackController {
    command_tx: Sender<AudioCommand>,
    event_rx: Receiver<AudioEvent>,
    playing: Arc<AtomicBool>,
}

impl PlaybackController {
    pub(crate) fn new(
        command_tx: Sender<AudioCommand>,
        event_rx: Receiver<AudioEvent>,
        playing: Arc<AtomicBool>,
    ) -> Self {
        Self {
            command_tx,
            event_rx,
            playing,
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.playing.load(Ordering::Acquire) {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Open `name`, skip its header and hand it to the audio context.
    ///
    /// On any error the controller stays Idle (or stays Playing when the
    /// refusal was `AlreadyPlaying`).
    pub fn start_playback(
        &self,
        name: &str,
        storage: &dyn Storage,
        preconditions: Preconditions,
    ) -> Result<(), PlaybackError> {
        if self.is_playing() {
            return Err(PlaybackError::AlreadyPlaying);
        }
        if !preconditions.connected {
            return Err(PlaybackError::NotConnected);
        }
        if !preconditions.catalog_ready {
            return Err(PlaybackError::CatalogNotReady);
        }

        // Claim the Playing state before touching the file
        if self
            .playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PlaybackError::AlreadyPlaying);
        }

        match self.open_and_send(name, storage) {
            Ok(()) => {
                tracing::info!(name, "now playing");
                Ok(())
            }
            Err(e) => {
                self.playing.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    fn open_and_send(&self, name: &str, storage: &dyn Storage) -> Result<(), PlaybackError> {
        let open_err = |source: StorageError| PlaybackError::Open {
            name: name.to_string(),
            source,
        };

        let mut file = storage.open(name).map_err(open_err)?;
        let len = file
            .seek(SeekFrom::End(0))
            .map_err(|e| open_err(e.into()))?;
        if len < HEADER_LEN {
            return Err(PlaybackError::HeaderTooShort {
                name: name.to_string(),
            });
        }
        file.seek(SeekFrom::Start(HEADER_LEN))
            .map_err(|e| open_err(e.into()))?;

        let command = AudioCommand::Start {
            name: name.to_string(),
            file,
        };
        self.command_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => PlaybackError::QueueFull,
            TrySendError::Disconnected(_) => PlaybackError::EngineStopped,
        })
    }

    /// Drop the Playing state without waiting for end of stream. Used when
    /// the output stream is gone and the audio context will never finish
    /// the session. Returns whether a session was abandoned.
    pub fn release(&self) -> bool {
        let was_playing = self.playing.swap(false, Ordering::AcqRel);
        if was_playing {
            tracing::warn!("playback abandoned: audio output lost");
        }
        was_playing
    }

    /// Drain events the audio context has published since the last call
    pub fn poll_events(&self) -> impl Iterator<Item = AudioEvent> + '_ {
        self.event_rx.try_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::create_engine;
    use lumivox_library::MemoryStorage;

    const READY: Preconditions = Preconditions {
        connected: true,
        catalog_ready: true,
    };

    fn storage() -> MemoryStorage {
        let mut note = vec![0u8; HEADER_LEN as usize];
        note.extend_from_slice(&[1, 0, 2, 0]);
        MemoryStorage::new()
            .with_file("voice_a_1.wav", note)
            .with_file("voice_a_short.wav", vec![0u8; 10])
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
        let (controller, _engine) = create_engine(8000, 44100);
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_start_claims_playing() {
        let (controller, _engine) = create_engine(8000, 44100);
        controller
            .start_playback("voice_a_1.wav", &storage(), READY)
            .unwrap();
        assert_eq!(controller.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let storage = storage();
        let (controller, _engine) = create_engine(8000, 44100);
        controller
            .start_playback("voice_a_1.wav", &storage, READY)
            .unwrap();

        let err = controller
            .start_playback("voice_a_1.wav", &storage, READY)
            .unwrap_err();
        assert!(matches!(err, PlaybackError::AlreadyPlaying));
        assert!(controller.is_playing());
    }

    #[test]
    fn test_open_failure_stays_idle() {
        let (controller, _engine) = create_engine(8000, 44100);
        let err = controller
            .start_playback("voice_b_missing.wav", &storage(), READY)
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Open { .. }));
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_short_header_stays_idle() {
        let (controller, _engine) = create_engine(8000, 44100);
        let err = controller
            .start_playback("voice_a_short.wav", &storage(), READY)
            .unwrap_err();
        assert!(matches!(err, PlaybackError::HeaderTooShort { .. }));
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_preconditions_refuse() {
        let (controller, _engine) = create_engine(8000, 44100);
        let storage = storage();

        let offline = Preconditions {
            connected: false,
            catalog_ready: true,
        };
        assert!(matches!(
            controller.start_playback("voice_a_1.wav", &storage, offline),
            Err(PlaybackError::NotConnected)
        ));

        let empty = Preconditions {
            connected: true,
            catalog_ready: false,
        };
        assert!(matches!(
            controller.start_playback("voice_a_1.wav", &storage, empty),
            Err(PlaybackError::CatalogNotReady)
        ));
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_release_returns_to_idle() {
        let storage = storage();
        let (controller, _engine) = create_engine(8000, 44100);
        assert!(!controller.release());

        controller
            .start_playback("voice_a_1.wav", &storage, READY)
            .unwrap();
        assert!(controller.release());
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_engine_gone_releases_state() {
        let (controller, engine) = create_engine(8000, 44100);
        drop(engine);

        let err = controller
            .start_playback("voice_a_1.wav", &storage(), READY)
            .unwrap_err();
        assert!(matches!(err, PlaybackError::EngineStopped));
        assert!(!controller.is_playing());
    }
}
