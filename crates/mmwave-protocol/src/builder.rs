//! Wire-frame construction.
//!
//! [`FrameBuilder`] produces byte-exact frames in either header layout:
//! what a sensor would emit for a given point cloud and heatmap. The
//! decoder never needs it on the live path; it exists for device
//! emulation and is what every integration test feeds to the assembler.
//!
//! # Example
//!
//! ```
//! use mmwave_core::DetectedPoint;
//! use mmwave_protocol::{FrameBuilder, HeaderLayout};
//!
//! let wire = FrameBuilder::new(HeaderLayout::Direct)
//!     .frame_number(42)
//!     .detected_points(&[DetectedPoint::new(1.0, 2.0, 0.0, 0.5)])
//!     .build();
//! assert_eq!(wire.len(), 40 + 8 + 16);
//! ```

use bytes::{BufMut, BytesMut};
use mmwave_core::constants::{
    HEADER_SIZE, MAGIC_WORD, TLV_DETECTED_POINTS, TLV_HEADER_SIZE, TLV_RANGE_DOPPLER_HEATMAP,
};
use mmwave_core::{DetectedPoint, HeatmapDims};

use crate::header::HeaderLayout;

/// Builder for one wire frame, fluent-style.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    layout: HeaderLayout,
    version: u32,
    platform: u32,
    frame_number: u32,
    time_cpu_cycles: u32,
    sub_frame_number: u32,
    num_detected_obj: u32,
    tlvs: Vec<(u32, Vec<u8>)>,
}

impl FrameBuilder {
    /// Start a frame in the given layout with all header fields zeroed.
    pub fn new(layout: HeaderLayout) -> Self {
        FrameBuilder {
            layout,
            version: 0,
            platform: 0,
            frame_number: 0,
            time_cpu_cycles: 0,
            sub_frame_number: 0,
            num_detected_obj: 0,
            tlvs: Vec::new(),
        }
    }

    /// Set the firmware version field.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the platform code field.
    pub fn platform(mut self, platform: u32) -> Self {
        self.platform = platform;
        self
    }

    /// Set the frame counter.
    pub fn frame_number(mut self, frame_number: u32) -> Self {
        self.frame_number = frame_number;
        self
    }

    /// Set the CPU cycle timestamp.
    pub fn time_cpu_cycles(mut self, cycles: u32) -> Self {
        self.time_cpu_cycles = cycles;
        self
    }

    /// Set the subframe index.
    pub fn sub_frame_number(mut self, sub_frame_number: u32) -> Self {
        self.sub_frame_number = sub_frame_number;
        self
    }

    /// Override the header's object count independently of any point TLV,
    /// for malformed-frame tests.
    pub fn num_detected_obj(mut self, count: u32) -> Self {
        self.num_detected_obj = count;
        self
    }

    /// Append a detected-points TLV and set the header object count to
    /// match.
    pub fn detected_points(mut self, points: &[DetectedPoint]) -> Self {
        let mut payload = BytesMut::with_capacity(points.len() * 16);
        for p in points {
            payload.put_f32_le(p.x);
            payload.put_f32_le(p.y);
            payload.put_f32_le(p.z);
            payload.put_f32_le(p.velocity);
        }
        self.num_detected_obj = points.len() as u32;
        self.tlvs.push((TLV_DETECTED_POINTS, payload.to_vec()));
        self
    }

    /// Append a heatmap TLV from cells in wire order (column-major,
    /// `range * doppler_bins + doppler` indexing).
    pub fn heatmap_wire(mut self, dims: HeatmapDims, wire_cells: &[i16]) -> Self {
        assert_eq!(wire_cells.len(), dims.range_bins * dims.doppler_bins);
        let mut payload = BytesMut::with_capacity(dims.payload_len());
        for &cell in wire_cells {
            payload.put_i16_le(cell);
        }
        self.tlvs.push((TLV_RANGE_DOPPLER_HEATMAP, payload.to_vec()));
        self
    }

    /// Append an arbitrary TLV record verbatim.
    pub fn raw_tlv(mut self, tlv_type: u32, payload: &[u8]) -> Self {
        self.tlvs.push((tlv_type, payload.to_vec()));
        self
    }

    /// Assemble the frame bytes.
    pub fn build(self) -> Vec<u8> {
        let tlv_bytes: usize = self
            .tlvs
            .iter()
            .map(|(_, payload)| TLV_HEADER_SIZE + payload.len())
            .sum();
        let total_packet_len =
            (self.layout.header_offset() + HEADER_SIZE + tlv_bytes) as u32;

        let mut wire = BytesMut::with_capacity(total_packet_len as usize);

        if self.layout == HeaderLayout::Prefixed {
            // Vendor preamble: carries the magic word the sync stage locks
            // onto and mirrors total_packet_len at bytes [12, 16).
            wire.put_slice(&MAGIC_WORD);
            wire.put_u32_le(self.version);
            wire.put_u32_le(total_packet_len);
            wire.put_u32_le(self.platform);
            wire.put_u32_le(self.frame_number);
            wire.put_u32_le(self.time_cpu_cycles);
        }

        wire.put_slice(&MAGIC_WORD);
        wire.put_u32_le(self.version);
        wire.put_u32_le(total_packet_len);
        wire.put_u32_le(self.platform);
        wire.put_u32_le(self.frame_number);
        wire.put_u32_le(self.time_cpu_cycles);
        wire.put_u32_le(self.num_detected_obj);
        wire.put_u32_le(self.tlvs.len() as u32);
        wire.put_u32_le(self.sub_frame_number);

        for (tlv_type, payload) in &self.tlvs {
            wire.put_u32_le(*tlv_type);
            wire.put_u32_le(payload.len() as u32);
            wire.put_slice(payload);
        }

        wire.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmwave_core::constants::{PREFIXED_HEADER_OFFSET, TOTAL_PACKET_LEN_OFFSET};

    fn mirror(wire: &[u8]) -> u32 {
        u32::from_le_bytes(
            wire[TOTAL_PACKET_LEN_OFFSET..TOTAL_PACKET_LEN_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }

    #[test]
    fn direct_frame_declares_its_own_length() {
        let wire = FrameBuilder::new(HeaderLayout::Direct)
            .raw_tlv(99, &[1, 2, 3])
            .build();
        assert_eq!(wire.len(), HEADER_SIZE + TLV_HEADER_SIZE + 3);
        assert_eq!(mirror(&wire) as usize, wire.len());
        assert!(wire.starts_with(&MAGIC_WORD));
    }

    #[test]
    fn prefixed_frame_mirrors_length_in_preamble() {
        let wire = FrameBuilder::new(HeaderLayout::Prefixed).frame_number(5).build();
        assert_eq!(wire.len(), PREFIXED_HEADER_OFFSET + HEADER_SIZE);
        assert_eq!(mirror(&wire) as usize, wire.len());
        // The header proper starts with its own magic copy at offset 28.
        assert!(wire[PREFIXED_HEADER_OFFSET..].starts_with(&MAGIC_WORD));
    }

    #[test]
    fn detected_points_sets_header_object_count() {
        let wire = FrameBuilder::new(HeaderLayout::Direct)
            .detected_points(&[
                DetectedPoint::new(0.0, 1.0, 2.0, 3.0),
                DetectedPoint::new(4.0, 5.0, 6.0, 7.0),
            ])
            .build();
        // num_detected_obj lives at header offset 24.
        let count = u32::from_le_bytes(wire[24..28].try_into().unwrap());
        assert_eq!(count, 2);
        // num_tlvs at offset 28.
        let tlvs = u32::from_le_bytes(wire[28..32].try_into().unwrap());
        assert_eq!(tlvs, 1);
    }
}
