//! Protocol-level constants for the TI mmWave UART output format.
//!
//! The sensor emits a continuous byte stream on its data port. Each frame
//! starts with a fixed 8-byte magic word, followed by a fixed-width header
//! and a run of TLV (type-length-value) records:
//!
//! ```text
//! MAGIC(8)  HEADER(32)  TLV ... TLV
//! 02 01 04 03 06 05 08 07
//! ```
//!
//! All multi-byte integers on the wire are little-endian 32-bit words. The
//! header declares the total packet length, the number of detected objects
//! and the number of TLV records that follow.
//!
//! Two firmware variants frame the header differently: one places it
//! directly after the magic word at stream offset 0, the other prefixes a
//! 28-byte vendor preamble. Both share the `total_packet_len` mirror at
//! stream bytes `[12, 16)`, which is what frame synchronization reads.

/// Magic word marking the start of every frame.
pub const MAGIC_WORD: [u8; 8] = [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07];

/// Capacity of the stream accumulator (2^15 bytes).
///
/// Mirrors the sensor demo's working-buffer size; roughly four worst-case
/// frames at typical chirp configurations.
pub const MAX_BUFFER_SIZE: usize = 32 * 1024;

/// Minimum buffered length before a sync scan is attempted.
///
/// Fewer bytes than this can never contain the magic word plus the packet
/// length mirror, so scanning would be wasted work.
pub const MIN_SYNC_LENGTH: usize = 16;

/// Offset of the little-endian `total_packet_len` mirror, relative to the
/// magic word. Fixed for both header layouts.
pub const TOTAL_PACKET_LEN_OFFSET: usize = 12;

/// Size of the frame header in bytes: magic word plus eight u32 fields.
pub const HEADER_SIZE: usize = 40;

/// Length of the vendor preamble that precedes the header in the prefixed
/// layout.
pub const PREFIXED_HEADER_OFFSET: usize = 28;

/// Size of a TLV record header (`type:u32` + `length:u32`).
pub const TLV_HEADER_SIZE: usize = 8;

/// Wire size of one detected point (four f32 values).
pub const POINT_SIZE: usize = 16;

/// TLV type code for the detected-points list.
pub const TLV_DETECTED_POINTS: u32 = 1;

/// TLV type code for the range-Doppler heatmap.
pub const TLV_RANGE_DOPPLER_HEATMAP: u32 = 5;

/// Heatmap cells above this absolute magnitude mark the whole frame as
/// corrupt. Some frames arrive with nonsense values; the reference decoder
/// dropped them at this threshold.
pub const HEATMAP_MAGNITUDE_LIMIT: u16 = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_word_matches_wire_order() {
        // First TLV-format firmware byte order, not a u64 constant.
        assert_eq!(MAGIC_WORD[0], 0x02);
        assert_eq!(MAGIC_WORD.len(), 8);
    }

    #[test]
    fn header_size_covers_magic_and_fields() {
        assert_eq!(HEADER_SIZE, MAGIC_WORD.len() + 8 * 4);
    }

    #[test]
    fn sync_threshold_covers_packet_len_mirror() {
        assert!(MIN_SYNC_LENGTH >= TOTAL_PACKET_LEN_OFFSET + 4);
    }
}
