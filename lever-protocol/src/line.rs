//! Line framing for the serial command channel
//!
//! Commands are ASCII lines terminated by `\n`. A `\r` before the newline
//! is dropped so hosts may send either line ending. Leading and trailing
//! whitespace is trimmed from every completed line.

use heapless::{String, Vec};

/// Longest accepted line, excluding the terminator
pub const MAX_LINE_LEN: usize = 64;

/// Errors reported while accumulating a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_LINE_LEN`] and was discarded
    Overflow,
    /// Line was not valid UTF-8 and was discarded
    InvalidUtf8,
}

/// Byte-fed line accumulator
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a non-empty line completes and
    /// `Ok(None)` while more bytes are needed. An overlong line is
    /// dropped in full; the error is reported once its terminator
    /// arrives.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<MAX_LINE_LEN>>, LineError> {
        match byte {
            b'\r' => Ok(None),
            b'\n' => {
                let overflowed = self.overflowed;
                let bytes = core::mem::take(&mut self.buffer);
                self.reset();

                if overflowed {
                    return Err(LineError::Overflow);
                }

                let text = core::str::from_utf8(&bytes).map_err(|_| LineError::InvalidUtf8)?;
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                let mut line = String::new();
                // Cannot fail: trimmed is a sub-slice of a MAX_LINE_LEN buffer
                let _ = line.push_str(trimmed);
                Ok(Some(line))
            }
            _ => {
                if !self.overflowed && self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                    self.buffer.clear();
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete line; bytes after it are not consumed.
    /// Also returns the number of bytes consumed.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> (usize, Result<Option<String<MAX_LINE_LEN>>, LineError>) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                result => return (i + 1, result),
            }
        }
        (bytes.len(), Ok(None))
    }
}
