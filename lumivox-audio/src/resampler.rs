//! Zero-order-hold rate converter
//!
//! Each output frame repeats the most recently pulled source sample. The
//! accumulator counts progress through the source in units of `1/dest_rate`:
//! every frame adds `source_rate`, and a new sample is pulled whenever it
//! reaches a whole sample (`dest_rate`). Integer arithmetic keeps long
//! sessions free of drift.

use crate::frame::StereoFrame;
use crate::reader::SampleSource;

/// Outcome of one `fill` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Every requested frame carries source data
    Continuing,
    /// The source ran out; frames from `frames_written` on are silence
    EndOfStream { frames_written: usize },
}

#[derive(Debug, Clone)]
pub struct Resampler {
    source_rate: u64,
    dest_rate: u64,
    acc: u64,
    last: i16,
}

impl Resampler {
    /// Rates of zero are clamped to 1 Hz
    pub fn new(source_rate: u32, dest_rate: u32) -> Self {
        let dest_rate = dest_rate.max(1) as u64;
        Self {
            source_rate: source_rate.max(1) as u64,
            dest_rate,
            acc: dest_rate,
            last: 0,
        }
    }

    /// Start a new session. The first frame always pulls a fresh sample.
    pub fn reset(&mut self) {
        self.acc = self.dest_rate;
        self.last = 0;
    }

    /// Source samples per output frame
    pub fn ratio(&self) -> f64 {
        self.source_rate as f64 / self.dest_rate as f64
    }

    /// Accumulator in source samples
    pub fn accumulator(&self) -> f64 {
        self.acc as f64 / self.dest_rate as f64
    }

    pub fn source_rate(&self) -> u32 {
        self.source_rate as u32
    }

    pub fn dest_rate(&self) -> u32 {
        self.dest_rate as u32
    }

    /// Fill `out` with converted frames pulled from `source`.
    ///
    /// On end of stream the rest of `out` is padded with silence.
    pub fn fill<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
        out: &mut [StereoFrame],
    ) -> Fill {
        for i in 0..out.len() {
            while self.acc >= self.dest_rate {
                match source.read_sample() {
                    Some(sample) => {
                        self.last = sample;
                        self.acc -= self.dest_rate;
                    }
                    None => {
                        out[i..].fill(StereoFrame::SILENCE);
                        return Fill::EndOfStream { frames_written: i };
                    }
                }
            }
            out[i] = StereoFrame::mono(self.last);
            self.acc += self.source_rate;
        }
        Fill::Continuing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts pulls; yields `remaining` samples numbered from 1
    struct Counter {
        pulled: u64,
        remaining: u64,
    }

    impl Counter {
        fn endless() -> Self {
            Self {
                pulled: 0,
                remaining: u64::MAX,
            }
        }

        fn with_len(len: u64) -> Self {
            Self {
                pulled: 0,
                remaining: len,
            }
        }
    }

    impl SampleSource for Counter {
        fn read_sample(&mut self) -> Option<i16> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            self.pulled += 1;
            Some((self.pulled % 30_000) as i16)
        }
    }

    /// Floating-point replay of the accumulator algorithm
    fn simulate_pulls(ratio: f64, frames: usize) -> u64 {
        let mut acc = 1.0f64;
        let mut pulls = 0;
        for _ in 0..frames {
            while acc >= 1.0 - 1e-9 {
                acc -= 1.0;
                pulls += 1;
            }
            acc += ratio;
        }
        pulls
    }

    #[test]
    fn test_first_frame_pulls() {
        let mut resampler = Resampler::new(8000, 44100);
        let mut source = Counter::endless();
        let mut out = [StereoFrame::SILENCE; 1];

        assert_eq!(resampler.fill(&mut source, &mut out), Fill::Continuing);
        assert_eq!(source.pulled, 1);
        assert_eq!(out[0], StereoFrame::mono(1));
    }

    #[test]
    fn test_consumption_matches_closed_form_and_simulation() {
        for (rs, rd) in [(8000u64, 44100u64), (16000, 44100)] {
            let mut resampler = Resampler::new(rs as u32, rd as u32);
            let mut source = Counter::endless();
            let mut out = vec![StereoFrame::SILENCE; 37];
            let mut frames = 0u64;
            let mut previous = 0u64;

            for _ in 0..400 {
                resampler.fill(&mut source, &mut out);
                frames += out.len() as u64;

                let expected = 1 + (frames - 1) * rs / rd;
                assert_eq!(source.pulled, expected, "rate {rs}/{rd} after {frames} frames");
                assert_eq!(
                    source.pulled,
                    simulate_pulls(rs as f64 / rd as f64, frames as usize)
                );
                assert!(source.pulled >= previous);
                previous = source.pulled;
            }
        }
    }

    #[test]
    fn test_holds_each_sample() {
        let mut resampler = Resampler::new(16000, 44100);
        let mut source = Counter::endless();
        let mut out = vec![StereoFrame::SILENCE; 441];
        resampler.fill(&mut source, &mut out);

        // Output never skips a source value at upsampling ratios
        for pair in out.windows(2) {
            let step = pair[1].left - pair[0].left;
            assert!(step == 0 || step == 1);
            assert_eq!(pair[0].left, pair[0].right);
        }
    }

    #[test]
    fn test_end_of_stream_pads_with_silence() {
        let mut resampler = Resampler::new(8000, 44100);
        let mut source = Counter::with_len(2);
        let mut out = vec![StereoFrame::mono(99); 64];

        let fill = resampler.fill(&mut source, &mut out);

        // Two samples cover ceil(2 * 44100 / 8000) = 12 frames
        assert_eq!(fill, Fill::EndOfStream { frames_written: 12 });
        assert!(out[..12].iter().all(|f| !f.is_silent()));
        assert!(out[12..].iter().all(|f| f.is_silent()));
    }

    #[test]
    fn test_empty_source_is_immediate_end() {
        let mut resampler = Resampler::new(8000, 44100);
        let mut source = Counter::with_len(0);
        let mut out = vec![StereoFrame::mono(5); 8];

        assert_eq!(
            resampler.fill(&mut source, &mut out),
            Fill::EndOfStream { frames_written: 0 }
        );
        assert!(out.iter().all(|f| f.is_silent()));
    }

    #[test]
    fn test_reset_restores_session_start() {
        let mut resampler = Resampler::new(8000, 44100);
        let mut source = Counter::endless();
        let mut out = vec![StereoFrame::SILENCE; 10];
        resampler.fill(&mut source, &mut out);
        assert!(resampler.accumulator() < 1.0);

        resampler.reset();
        assert_eq!(resampler.accumulator(), 1.0);
        assert!((resampler.ratio() - 8000.0 / 44100.0).abs() < 1e-12);
    }
}
