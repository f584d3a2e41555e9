//! Audio pipeline for Lumivox
//!
//! This module provides the voice-note playback path:
//! - Reader: chunked PCM file reader with one-sample pull access
//! - Resampler: zero-order-hold rate converter producing stereo frames
//! - Playback: poll-side controller owning the Idle/Playing state
//! - Engine: state owned by the real-time output callback
//! - Sink: cpal output stream that drives the engine

mod engine;
mod frame;
mod playback;
mod reader;
mod resampler;
mod sink;

pub use engine::{create_engine, AudioCommand, AudioEvent, EngineState, COMMAND_QUEUE_DEPTH};
pub use frame::StereoFrame;
pub use playback::{PlaybackController, PlaybackError, PlaybackState, Preconditions, HEADER_LEN};
pub use reader::{SampleReader, SampleSource, STAGING_BUFFER_SIZE};
pub use resampler::{Fill, Resampler};
pub use sink::{AudioSink, ConnectionState, CpalSink, SinkError};
