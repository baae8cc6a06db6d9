//! Magic-word synchronization against the stream buffer.
//!
//! Frames start with the fixed 8-byte magic word
//! `02 01 04 03 06 05 08 07`. After garbage, dropped bytes or a device
//! reset, the decoder re-locks by scanning for that marker, trimming
//! everything in front of the earliest confirmed match, and checking
//! whether the declared packet length has fully arrived.
//!
//! The scan covers the buffer's entire physical region rather than only the
//! valid prefix; [`crate::buffer::StreamBuffer`]'s zero-fill invariant makes
//! that safe, and candidates confirmed near the end of the valid prefix are
//! exactly how partially received frames are detected early.

use bytes::Buf;
use mmwave_core::constants::{MAGIC_WORD, MIN_SYNC_LENGTH, TOTAL_PACKET_LEN_OFFSET};

use crate::buffer::StreamBuffer;

/// Outcome of one synchronization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Too few bytes buffered to even hold the magic word plus the packet
    /// length mirror; no scan was attempted.
    NotEnoughData,

    /// No confirmed magic word anywhere in the buffer. The buffer is left
    /// untouched so accumulation continues.
    NoSync,

    /// The magic word is at offset 0 (garbage already trimmed) but fewer
    /// than `total_packet_len` bytes have arrived.
    Incomplete(usize),

    /// A complete frame of `total_packet_len` bytes starts at offset 0.
    Ready(usize),
}

/// Locate a frame boundary and trim leading garbage.
///
/// On success the magic word sits at offset 0 and the returned status
/// carries the little-endian `total_packet_len` read from buffer bytes
/// `[12, 16)` — a fixed position for both header layouts, being the fourth
/// 32-bit field after the magic word.
pub fn acquire(buffer: &mut StreamBuffer) -> SyncStatus {
    if buffer.len() <= MIN_SYNC_LENGTH {
        return SyncStatus::NotEnoughData;
    }

    let Some(start) = earliest_magic_offset(buffer) else {
        return SyncStatus::NoSync;
    };

    if start > 0 {
        buffer.discard_prefix(start);
    }

    // Trimming can leave less than a length mirror's worth of bytes when
    // the magic word appeared near the end of the valid prefix.
    if buffer.len() < TOTAL_PACKET_LEN_OFFSET + 4 {
        return SyncStatus::NotEnoughData;
    }

    let mut mirror = &buffer.as_slice()[TOTAL_PACKET_LEN_OFFSET..];
    let total_packet_len = mirror.get_u32_le() as usize;

    if buffer.len() >= total_packet_len {
        SyncStatus::Ready(total_packet_len)
    } else {
        SyncStatus::Incomplete(total_packet_len)
    }
}

/// Earliest offset where all 8 magic bytes are confirmed, scanning the full
/// physical region.
fn earliest_magic_offset(buffer: &StreamBuffer) -> Option<usize> {
    let region = buffer.full_region();
    buffer
        .find_byte(MAGIC_WORD[0])
        .into_iter()
        .find(|&loc| region[loc..].starts_with(&MAGIC_WORD))
}
