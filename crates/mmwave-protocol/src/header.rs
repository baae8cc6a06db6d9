//! Fixed-width frame header decoding.
//!
//! Every frame carries the same nine fields — the magic word and eight
//! little-endian `u32` values — but different sensor firmware places the
//! header at different stream offsets:
//!
//! ```text
//! Direct   (2D firmware):  MAGIC HEADER-FIELDS TLVS...
//! Prefixed (3D firmware):  28-byte vendor preamble  MAGIC HEADER-FIELDS TLVS...
//! ```
//!
//! The layout in use is a configuration choice made when constructing the
//! [`crate::FrameAssembler`]; it is never auto-detected from the stream.

use bytes::Buf;
use mmwave_core::constants::{HEADER_SIZE, PREFIXED_HEADER_OFFSET};
use serde::{Deserialize, Serialize};

/// Stream position of the frame header, a property of the sensor firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderLayout {
    /// Header starts at stream offset 0 (2D point-cloud firmware).
    Direct,

    /// A 28-byte vendor preamble precedes the header (3D firmware with
    /// heatmap output).
    Prefixed,
}

impl HeaderLayout {
    /// Byte offset of the header relative to the frame start.
    #[must_use]
    pub fn header_offset(self) -> usize {
        match self {
            HeaderLayout::Direct => 0,
            HeaderLayout::Prefixed => PREFIXED_HEADER_OFFSET,
        }
    }

    /// Byte offset where TLV records begin.
    #[must_use]
    pub fn tlv_offset(self) -> usize {
        self.header_offset() + HEADER_SIZE
    }

    /// Smallest `total_packet_len` that can hold a decodable frame in this
    /// layout.
    #[must_use]
    pub fn min_frame_len(self) -> usize {
        self.tlv_offset()
    }
}

/// Decoded frame header. All integer fields are little-endian `u32` on the
/// wire, in this exact order after the magic word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// The 8-byte magic word as it appeared on the wire.
    pub magic: [u8; 8],

    /// Firmware version, packed BCD-style.
    pub version: u32,

    /// Declared length of the whole packet, preamble included.
    pub total_packet_len: u32,

    /// Device platform code.
    pub platform: u32,

    /// Monotonic frame counter.
    pub frame_number: u32,

    /// Radar SoC cycle count at frame emission.
    pub time_cpu_cycles: u32,

    /// Number of detected points in this frame.
    pub num_detected_obj: u32,

    /// Number of TLV records following the header.
    pub num_tlvs: u32,

    /// Subframe index for advanced-frame configurations.
    pub sub_frame_number: u32,
}

impl FrameHeader {
    /// Decode the header of a synced frame.
    ///
    /// `frame` starts at the magic word (offset 0 of the synced buffer) and
    /// the caller guarantees it holds at least `layout.min_frame_len()`
    /// bytes; the assembler establishes that before calling.
    #[must_use]
    pub fn parse(frame: &[u8], layout: HeaderLayout) -> FrameHeader {
        let mut buf = &frame[layout.header_offset()..];

        let mut magic = [0u8; 8];
        buf.copy_to_slice(&mut magic);

        FrameHeader {
            magic,
            version: buf.get_u32_le(),
            total_packet_len: buf.get_u32_le(),
            platform: buf.get_u32_le(),
            frame_number: buf.get_u32_le(),
            time_cpu_cycles: buf.get_u32_le(),
            num_detected_obj: buf.get_u32_le(),
            num_tlvs: buf.get_u32_le(),
            sub_frame_number: buf.get_u32_le(),
        }
    }
}
