//! Audio engine - state owned by the real-time output callback

use crate::frame::StereoFrame;
use crate::playback::PlaybackController;
use crate::reader::SampleReader;
use crate::resampler::{Fill, Resampler};
use crossbeam_channel::{bounded, Receiver, Sender};
use lumivox_library::StorageFile;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pending start requests the audio context will accept
pub const COMMAND_QUEUE_DEPTH: usize = 4;

const EVENT_QUEUE_DEPTH: usize = 16;

/// Commands sent to the audio engine
pub enum AudioCommand {
    /// Play a file already positioned past its header
    Start {
        name: String,
        file: Box<dyn StorageFile>,
    },
}

impl fmt::Debug for AudioCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCommand::Start { name, .. } => {
                f.debug_struct("Start").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

/// Events sent from the audio engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// A start command was accepted
    Started,
    /// The active file reached end of stream
    Finished {
        name: String,
        frames: u64,
        read_error: bool,
    },
    /// A start command arrived while a session was active
    Rejected { name: String },
}

/// Audio engine state (held in audio thread)
pub struct EngineState {
    reader: SampleReader,
    resampler: Resampler,
    playing: Arc<AtomicBool>,
    command_rx: Receiver<AudioCommand>,
    event_tx: Sender<AudioEvent>,
    current: Option<String>,
    frames: u64,
}

/// Create the poll-side controller and the audio-side engine state,
/// connected by bounded command and event queues
pub fn create_engine(source_rate: u32, output_rate: u32) -> (PlaybackController, EngineState) {
    let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_DEPTH);
    let (evt_tx, evt_rx) = bounded(EVENT_QUEUE_DEPTH);
    let playing = Arc::new(AtomicBool::new(false));

    let controller = PlaybackController::new(cmd_tx, evt_rx, Arc::clone(&playing));
    let engine = EngineState {
        reader: SampleReader::new(),
        resampler: Resampler::new(source_rate, output_rate),
        playing,
        command_rx: cmd_rx,
        event_tx: evt_tx,
        current: None,
        frames: 0,
    };
    (controller, engine)
}

impl EngineState {
    pub fn handle_command(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Start { name, file } => {
                if self.reader.is_open() {
                    let _ = self.event_tx.try_send(AudioEvent::Rejected { name });
                    return;
                }
                self.reader.open(file);
                self.resampler.reset();
                self.current = Some(name);
                self.frames = 0;
                let _ = self.event_tx.try_send(AudioEvent::Started);
            }
        }
    }

    /// Whether a file is open on the audio side
    pub fn is_active(&self) -> bool {
        self.reader.is_open()
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }

    /// Produce exactly `out.len()` frames. Never blocks.
    pub fn render(&mut self, out: &mut [StereoFrame]) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            self.handle_command(cmd);
        }

        if !self.reader.is_open() {
            out.fill(StereoFrame::SILENCE);
            return;
        }

        match self.resampler.fill(&mut self.reader, out) {
            Fill::Continuing => self.frames += out.len() as u64,
            Fill::EndOfStream { frames_written } => {
                self.frames += frames_written as u64;
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        let read_error = self.reader.read_failed();
        self.reader.close();
        self.playing.store(false, Ordering::Release);

        let name = self.current.take().unwrap_or_default();
        let _ = self.event_tx.try_send(AudioEvent::Finished {
            name,
            frames: self.frames,
            read_error,
        });
    }
}
