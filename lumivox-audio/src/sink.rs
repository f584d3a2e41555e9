//! Output sink - the transport that pulls frames from the engine

use crate::engine::EngineState;
use crate::frame::StereoFrame;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Frames pre-allocated for the callback's scratch block
const INITIAL_SCRATCH_FRAMES: usize = 4096;

/// Transport link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Errors opening or starting an output sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("No audio output device found")]
    NoDevice,
    #[error("Failed to get audio config: {0}")]
    Config(String),
    #[error("Unsupported sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),
    #[error("Failed to create audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("Failed to start audio: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("Sink already started")]
    AlreadyStarted,
}

/// Pull-based audio transport
pub trait AudioSink {
    /// Rate the sink will pull frames at
    fn sample_rate(&self) -> u32;

    /// Register the engine with the pull callback and start pulling
    fn start(&mut self, engine: EngineState) -> Result<(), SinkError>;

    fn connection(&self) -> ConnectionState;
}

/// Sink over the default cpal output device
pub struct CpalSink {
    device: cpal::Device,
    config: cpal::StreamConfig,
    format: SampleFormat,
    connected: Arc<AtomicBool>,
    stream: Option<cpal::Stream>,
}

impl CpalSink {
    /// Open the default output device, preferring a stereo configuration at
    /// `requested_rate`. Falls back to the device default when no supported
    /// configuration covers that rate.
    pub fn open(requested_rate: u32) -> Result<Self, SinkError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SinkError::NoDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".into());

        let supported = match preferred_config(&device, requested_rate)? {
            Some(config) => config,
            None => {
                let config = device
                    .default_output_config()
                    .map_err(|e| SinkError::Config(e.to_string()))?;
                tracing::warn!(
                    requested = requested_rate,
                    actual = config.sample_rate().0,
                    "requested output rate unavailable, using device default"
                );
                config
            }
        };

        let format = supported.sample_format();
        if !is_supported_format(format) {
            return Err(SinkError::UnsupportedFormat(format));
        }

        let config: cpal::StreamConfig = supported.into();
        tracing::info!(
            device = %device_name,
            rate = config.sample_rate.0,
            channels = config.channels,
            format = ?format,
            "audio output opened"
        );

        Ok(Self {
            device,
            config,
            format,
            connected: Arc::new(AtomicBool::new(true)),
            stream: None,
        })
    }

    fn build<T>(&self, mut engine: EngineState) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<i16>,
    {
        let channels = self.config.channels.max(1) as usize;
        let connected = Arc::clone(&self.connected);
        let mut scratch = vec![StereoFrame::SILENCE; INITIAL_SCRATCH_FRAMES];

        self.device.build_output_stream(
            &self.config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                // Rare: only when the host asks for a larger block than before
                if scratch.len() < frames {
                    scratch.resize(frames, StereoFrame::SILENCE);
                }
                let block = &mut scratch[..frames];
                engine.render(block);

                for (out, frame) in data.chunks_mut(channels).zip(block.iter()) {
                    write_frame(out, *frame);
                }
            },
            move |err| {
                if connection_lost(&err) {
                    tracing::error!("Audio output lost: {}", err);
                    connected.store(false, Ordering::Release);
                } else {
                    // The host keeps the stream running after these
                    tracing::warn!("Audio stream error: {}", err);
                }
            },
            None,
        )
    }
}

impl AudioSink for CpalSink {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self, engine: EngineState) -> Result<(), SinkError> {
        if self.stream.is_some() {
            return Err(SinkError::AlreadyStarted);
        }

        let stream = match self.format {
            SampleFormat::I16 => self.build::<i16>(engine)?,
            SampleFormat::F32 => self.build::<f32>(engine)?,
            SampleFormat::U16 => self.build::<u16>(engine)?,
            other => return Err(SinkError::UnsupportedFormat(other)),
        };
        stream.play()?;

        self.stream = Some(stream);
        Ok(())
    }

    fn connection(&self) -> ConnectionState {
        if self.stream.is_some() && self.connected.load(Ordering::Acquire) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

/// Only a vanished device ends the stream; other errors are transient
fn connection_lost(err: &cpal::StreamError) -> bool {
    matches!(err, cpal::StreamError::DeviceNotAvailable)
}

fn is_supported_format(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::I16 | SampleFormat::F32 | SampleFormat::U16
    )
}

/// Best supported configuration at `rate`: stereo first, then native i16
fn preferred_config(
    device: &cpal::Device,
    rate: u32,
) -> Result<Option<cpal::SupportedStreamConfig>, SinkError> {
    let ranges = device
        .supported_output_configs()
        .map_err(|e| SinkError::Config(e.to_string()))?;

    let best = ranges
        .filter(|r| is_supported_format(r.sample_format()))
        .filter(|r| r.min_sample_rate().0 <= rate && rate <= r.max_sample_rate().0)
        .min_by_key(|r| (r.channels() != 2, r.sample_format() != SampleFormat::I16));

    Ok(best.map(|r| r.with_sample_rate(cpal::SampleRate(rate))))
}

/// Write one frame into an interleaved output slot. Mono outputs get the
/// downmix; channels past the second are silent.
fn write_frame<T>(out: &mut [T], frame: StereoFrame)
where
    T: Sample + FromSample<i16>,
{
    match out {
        [] => {}
        [mono] => *mono = T::from_sample(frame.mixed()),
        [left, right, rest @ ..] => {
            *left = T::from_sample(frame.left);
            *right = T::from_sample(frame.right);
            for s in rest {
                *s = T::EQUILIBRIUM;
            }
        }
    }
}
