//! Line accumulation
//!
//! [`LineBuffer`] is fed one byte at a time and yields complete lines on
//! `\n`. Timing (the quiet window that flushes a partial line) is the
//! caller's job; see `swarm-core`'s line reader.

use heapless::Vec;

use crate::frame::{FrameError, LINE_TERMINATOR, MAX_LINE_LEN};

/// One received line, terminator stripped
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line {
    bytes: Vec<u8, MAX_LINE_LEN>,
    terminated: bool,
}

impl Line {
    /// Build a terminated line from raw bytes
    pub fn new(bytes: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(bytes)
            .map_err(|_| FrameError::LineTooLong)?;
        Ok(Self {
            bytes: vec,
            terminated: true,
        })
    }

    /// Raw line bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Line text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// False when the line was flushed by the quiet window rather than `\n`
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Line content starting at the first `$`, or everything if there is none
    pub fn from_start(&self) -> &[u8] {
        match self.bytes.iter().position(|&b| b == b'$') {
            Some(start) => &self.bytes[start..],
            None => &self.bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Byte-at-a-time line assembler
///
/// Oversized lines are dropped whole: after an overflow every byte up to the
/// next terminator is discarded so the tail never surfaces as a line.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    discarding: bool,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Drop any partial content
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// True while a partial line (or an overflowed one being skipped) is pending
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || self.discarding
    }

    /// Bytes of the partial line so far; empty while skipping an overflow
    pub fn pending(&self) -> &[u8] {
        if self.discarding {
            &[]
        } else {
            &self.buffer
        }
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` on a terminator that closes a non-empty line,
    /// `Ok(None)` when more bytes are needed, or `Err(LineTooLong)` the moment
    /// the line overflows.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, FrameError> {
        match byte {
            LINE_TERMINATOR => {
                if self.discarding {
                    self.discarding = false;
                    return Ok(None);
                }
                Ok(self.take(true))
            }
            b'\r' | 0 => Ok(None),
            _ if self.discarding => Ok(None),
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(FrameError::LineTooLong);
                }
                Ok(None)
            }
        }
    }

    /// Flush whatever has accumulated as an unterminated line
    ///
    /// The remains of an overflowed line are dropped instead.
    pub fn take_partial(&mut self) -> Option<Line> {
        if self.discarding {
            self.reset();
            return None;
        }
        self.take(false)
    }

    fn take(&mut self, terminated: bool) -> Option<Line> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = Line {
            bytes: self.buffer.clone(),
            terminated,
        };
        self.buffer.clear();
        Some(line)
    }
}
