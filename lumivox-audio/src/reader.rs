//! Chunked PCM reader
//!
//! Pulls 16-bit little-endian mono samples one at a time from an open file,
//! refilling a fixed staging buffer from the file when it runs dry.

use lumivox_library::StorageFile;
use std::io::{self, Read};

/// Bytes read from the file per refill
pub const STAGING_BUFFER_SIZE: usize = 512;

/// One-sample-at-a-time pull access; `None` is end of stream
pub trait SampleSource {
    fn read_sample(&mut self) -> Option<i16>;
}

/// Buffered sample reader owned by the real-time context
pub struct SampleReader {
    file: Option<Box<dyn StorageFile>>,
    buffer: [u8; STAGING_BUFFER_SIZE],
    len: usize,
    pos: usize,
    read_failed: bool,
}

impl SampleReader {
    pub fn new() -> Self {
        Self {
            file: None,
            buffer: [0; STAGING_BUFFER_SIZE],
            len: 0,
            pos: 0,
            read_failed: false,
        }
    }

    /// Arm a session on a file positioned at the first sample
    pub fn open(&mut self, file: Box<dyn StorageFile>) {
        self.file = Some(file);
        self.len = 0;
        self.pos = 0;
        self.read_failed = false;
    }

    /// Drop the file handle
    pub fn close(&mut self) {
        self.file = None;
        self.len = 0;
        self.pos = 0;
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Whether the session ended on a read error rather than end of file
    pub fn read_failed(&self) -> bool {
        self.read_failed
    }

    /// Refill the staging buffer. Reads until the buffer is full or the file
    /// is exhausted, so an odd remainder only ever happens at end of file.
    fn refill(&mut self) {
        self.len = 0;
        self.pos = 0;

        let Some(file) = self.file.as_mut() else {
            return;
        };

        while self.len < STAGING_BUFFER_SIZE {
            match file.read(&mut self.buffer[self.len..]) {
                Ok(0) => break,
                Ok(n) => self.len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.read_failed = true;
                    break;
                }
            }
        }
    }
}

impl Default for SampleReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SampleReader {
    fn read_sample(&mut self) -> Option<i16> {
        if self.pos >= self.len {
            // Bytes read before a failure still drain first
            if self.read_failed {
                return None;
            }
            self.refill();
        }
        // A lone trailing byte is not a sample
        if self.len - self.pos < 2 {
            return None;
        }

        let sample = i16::from_le_bytes([self.buffer[self.pos], self.buffer[self.pos + 1]]);
        self.pos += 2;
        Some(sample)
    }
}
