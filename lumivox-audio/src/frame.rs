/// Interleaved stereo output frame
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StereoFrame {
    pub left: i16,
    pub right: i16,
}

impl StereoFrame {
    pub const SILENCE: StereoFrame = StereoFrame { left: 0, right: 0 };

    /// Both channels carrying the same value
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Downmix for single-channel outputs
    pub fn mixed(self) -> i16 {
        ((self.left as i32 + self.right as i32) / 2) as i16
    }

    pub fn is_silent(self) -> bool {
        self == Self::SILENCE
    }
}
