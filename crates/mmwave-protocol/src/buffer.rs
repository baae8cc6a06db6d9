//! Bounded byte accumulator for the serial data stream.
//!
//! The sensor's data port produces an unbounded stream with no read
//! alignment: a single read can carry a fragment of a frame, several frames,
//! or garbage from a device reset. [`StreamBuffer`] accumulates those reads
//! in a fixed 32 KiB region so the sync and decode stages can operate on a
//! contiguous prefix and drop exactly the bytes they have dealt with.
//!
//! # Zero-Fill Invariant
//!
//! The physical region past `length` is kept zero-filled at all times, not
//! merely treated as garbage. The magic-word scan deliberately covers the
//! **entire** physical region (see [`crate::sync`]), so a stale frame start
//! left beyond `length` by an earlier compaction could otherwise produce a
//! false sync match before fresh data has overwritten it. Every operation
//! that shortens the valid prefix re-zeroes the bytes it vacates.

use mmwave_core::constants::MAX_BUFFER_SIZE;
use mmwave_core::{Error, Result};

/// Fixed-capacity byte accumulator with prefix-discard compaction.
///
/// Exclusively owned by one [`crate::FrameAssembler`] for the lifetime of a
/// connection; nothing else reads or writes it.
///
/// # Overflow Policy
///
/// A chunk that does not fit is rejected whole; no partial append happens
/// and the buffered bytes are untouched. This mirrors the reference decoder
/// and is a documented weakness: once the buffer is full of unsyncable
/// bytes, progress stalls until the caller clears it. An evict-oldest
/// policy would guarantee forward progress but changes behavior the
/// original never specified, so it is intentionally not implemented.
#[derive(Debug)]
pub struct StreamBuffer {
    data: Box<[u8; MAX_BUFFER_SIZE]>,
    length: usize,
}

impl StreamBuffer {
    /// Create an empty, fully zeroed buffer.
    pub fn new() -> Self {
        StreamBuffer {
            data: Box::new([0u8; MAX_BUFFER_SIZE]),
            length: 0,
        }
    }

    /// Number of valid bytes, starting at offset 0.
    pub fn len(&self) -> usize {
        self.length
    }

    /// True when no valid bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Total capacity of the physical region.
    pub fn capacity(&self) -> usize {
        MAX_BUFFER_SIZE
    }

    /// The valid prefix `[0, length)`.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// The entire physical region `[0, capacity)`, including the
    /// zero-filled tail. The sync scan searches this whole region.
    pub fn full_region(&self) -> &[u8] {
        &self.data[..]
    }

    /// Append a chunk of freshly read bytes.
    ///
    /// # Errors
    /// Returns `Error::BufferOverflow` when the chunk does not fit; the
    /// entire chunk is dropped and the buffer is left unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.length + bytes.len() > MAX_BUFFER_SIZE {
            return Err(Error::BufferOverflow {
                length: self.length,
                incoming: bytes.len(),
                capacity: MAX_BUFFER_SIZE,
            });
        }
        self.data[self.length..self.length + bytes.len()].copy_from_slice(bytes);
        self.length += bytes.len();
        Ok(())
    }

    /// Every offset in the full physical region holding `value`.
    ///
    /// Seeds magic-word candidates; scanning beyond `length` is safe and
    /// intentional because the tail is zero-filled.
    pub fn find_byte(&self, value: u8) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == value)
            .map(|(i, _)| i)
            .collect()
    }

    /// Drop the first `n` bytes (pre-sync garbage), shifting the remainder
    /// down and zero-filling the vacated tail.
    ///
    /// `n` larger than the valid length clamps to an empty buffer rather
    /// than underflowing; correct sync logic never triggers the clamp.
    pub fn discard_prefix(&mut self, n: usize) {
        self.shift_down(n);
    }

    /// Drop exactly the `n` bytes of a fully decoded frame. Identical
    /// mechanics to [`StreamBuffer::discard_prefix`]; the distinct name
    /// marks the post-decode call site.
    pub fn consume_prefix(&mut self, n: usize) {
        self.shift_down(n);
    }

    /// Reset to empty, re-zeroing everything that was valid.
    pub fn clear(&mut self) {
        self.data[..self.length].fill(0);
        self.length = 0;
    }

    fn shift_down(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if n >= self.length {
            // Clamp: nothing survives the shift. The tail past `length` is
            // already zero by invariant.
            self.data[..self.length].fill(0);
            self.length = 0;
            return;
        }
        self.data.copy_within(n..self.length, 0);
        let new_length = self.length - n;
        self.data[new_length..self.length].fill(0);
        self.length = new_length;
    }
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}
