//! Line framing for the AT protocol.
//!
//! Bytes are fed as they arrive and split on `\n`. Each line is held in a
//! buffer of fixed capacity; anything beyond it is dropped, so a runaway
//! line can never grow the buffer.

use std::collections::VecDeque;

use bytes::{BufMut, BytesMut};

/// Default line capacity in bytes.
pub const DEFAULT_LINE_CAPACITY: usize = 64;

/// A line produced by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// Line text with trailing CR/LF removed.
    pub text: String,
    /// True if the terminating `\n` was seen.
    pub complete: bool,
    /// True if bytes beyond the capacity were discarded.
    pub truncated: bool,
}

/// Incremental, bounded line decoder.
#[derive(Debug)]
pub struct LineDecoder {
    current: BytesMut,
    truncated: bool,
    ready: VecDeque<Line>,
    capacity: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_CAPACITY)
    }
}

impl LineDecoder {
    /// Creates a decoder holding at most `capacity` bytes per line.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            current: BytesMut::with_capacity(capacity),
            truncated: false,
            ready: VecDeque::new(),
            capacity,
        }
    }

    /// Maximum bytes kept per line.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Feeds received bytes into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == b'\n' {
                let line = self.finish(true);
                self.ready.push_back(line);
            } else if self.current.len() < self.capacity {
                self.current.put_u8(byte);
            } else {
                self.truncated = true;
            }
        }
    }

    /// Returns the next complete line, if any.
    pub fn decode(&mut self) -> Option<Line> {
        self.ready.pop_front()
    }

    /// Takes whatever partial line has been accumulated.
    ///
    /// Used when a read times out before the terminator arrives.
    pub fn take_partial(&mut self) -> Line {
        self.finish(false)
    }

    /// Returns true if any complete or partial line is buffered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.ready.is_empty() || !self.current.is_empty()
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.current.len() + self.ready.iter().map(|line| line.text.len()).sum::<usize>()
    }

    /// Clears all buffered data.
    pub fn clear(&mut self) {
        self.current.clear();
        self.truncated = false;
        self.ready.clear();
    }

    fn finish(&mut self, complete: bool) -> Line {
        let raw = self.current.split();
        let mut end = raw.len();
        while end > 0 && matches!(raw[end - 1], b'\r' | b'\n') {
            end -= 1;
        }
        let truncated = std::mem::take(&mut self.truncated);
        Line {
            text: String::from_utf8_lossy(&raw[..end]).into_owned(),
            complete,
            truncated,
        }
    }
}
