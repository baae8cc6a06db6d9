//! TLV record decoding.
//!
//! After the header, a frame carries `num_tlvs` self-describing records:
//! a `type:u32` and `length:u32` pair followed by `length` payload bytes.
//! Recognized types are decoded; everything else is skipped by its declared
//! length so an unknown record can never desynchronize the ones after it.
//!
//! Recognized types:
//!
//! | Type | Payload |
//! |------|---------|
//! | 1    | `num_detected_obj` packed points, 4 × f32 LE each |
//! | 5    | range-Doppler heatmap, i16 LE, column-major |
//!
//! The heatmap's wire dimensions are not self-describing; they come from
//! the chirp configuration. A type-5 record without configured dimensions
//! is therefore skipped like an unknown type (the 2D firmware never emits
//! one).
//!
//! The cursor always advances by the declared `length`, including for
//! recognized types and for the corrupt-heatmap case. A record whose
//! payload cannot be fully read inside the frame stops decoding and marks
//! the frame corrupt; the assembler still consumes the declared packet
//! length from the stream, so the next frame decodes cleanly.

use bytes::Buf;
use mmwave_core::constants::{
    HEATMAP_MAGNITUDE_LIMIT, POINT_SIZE, TLV_DETECTED_POINTS, TLV_HEADER_SIZE,
    TLV_RANGE_DOPPLER_HEATMAP,
};
use mmwave_core::{DetectedPoint, HeatmapDims, RangeDopplerHeatmap};
use tracing::trace;

use crate::header::{FrameHeader, HeaderLayout};

/// Everything extracted from one frame's TLV region.
#[derive(Debug, Clone, Default)]
pub struct DecodedPayload {
    /// Detected point cloud; empty when the frame declared zero objects or
    /// carried no point TLV.
    pub points: Vec<DetectedPoint>,

    /// Reordered heatmap, when present and sane.
    pub heatmap: Option<RangeDopplerHeatmap>,

    /// Set when a payload failed its sanity check or could not be read;
    /// the whole frame is dropped by the assembler.
    pub corrupt: bool,

    /// Final cursor position relative to the frame start. May disagree
    /// with `total_packet_len`; the mismatch is not itself fatal.
    pub cursor: usize,
}

/// Decode the TLV region of a synced, complete frame.
///
/// `frame` starts at the magic word and spans exactly the declared packet
/// length.
pub fn decode_payload(
    frame: &[u8],
    header: &FrameHeader,
    layout: HeaderLayout,
    heatmap_dims: Option<HeatmapDims>,
) -> DecodedPayload {
    let mut out = DecodedPayload {
        cursor: layout.tlv_offset(),
        ..DecodedPayload::default()
    };

    for _ in 0..header.num_tlvs {
        if out.cursor + TLV_HEADER_SIZE > frame.len() {
            out.corrupt = true;
            break;
        }

        let mut record = &frame[out.cursor..];
        let tlv_type = record.get_u32_le();
        let tlv_length = record.get_u32_le() as usize;
        let payload_start = out.cursor + TLV_HEADER_SIZE;

        match tlv_type {
            TLV_DETECTED_POINTS => {
                let needed = header.num_detected_obj as usize * POINT_SIZE;
                match payload(frame, payload_start, needed) {
                    Some(bytes) => out.points = decode_points(bytes, header.num_detected_obj),
                    None => {
                        out.corrupt = true;
                        break;
                    }
                }
            }
            TLV_RANGE_DOPPLER_HEATMAP if heatmap_dims.is_some() => {
                let dims = heatmap_dims.unwrap();
                match payload(frame, payload_start, dims.payload_len()) {
                    Some(bytes) => match decode_heatmap(bytes, dims) {
                        Some(heatmap) => out.heatmap = Some(heatmap),
                        // Nonsense magnitudes: drop the whole frame but keep
                        // walking the stream past its declared length.
                        None => out.corrupt = true,
                    },
                    None => {
                        out.corrupt = true;
                        break;
                    }
                }
            }
            _ => {
                trace!(tlv_type, tlv_length, "skipping unrecognized TLV");
            }
        }

        out.cursor = payload_start.saturating_add(tlv_length);
    }

    out
}

/// The `needed`-byte payload window at `start`, or `None` when it runs past
/// the frame end.
fn payload(frame: &[u8], start: usize, needed: usize) -> Option<&[u8]> {
    frame.get(start..start + needed)
}

fn decode_points(mut bytes: &[u8], num_detected_obj: u32) -> Vec<DetectedPoint> {
    let mut points = Vec::with_capacity(num_detected_obj as usize);
    for _ in 0..num_detected_obj {
        points.push(DetectedPoint {
            x: bytes.get_f32_le(),
            y: bytes.get_f32_le(),
            z: bytes.get_f32_le(),
            velocity: bytes.get_f32_le(),
        });
    }
    points
}

/// Decode, sanity-check and reorder a heatmap payload.
///
/// Returns `None` when any cell magnitude exceeds the corruption threshold.
fn decode_heatmap(mut bytes: &[u8], dims: HeatmapDims) -> Option<RangeDopplerHeatmap> {
    let cell_count = dims.range_bins * dims.doppler_bins;
    let mut wire = Vec::with_capacity(cell_count);
    for _ in 0..cell_count {
        wire.push(bytes.get_i16_le());
    }

    if wire
        .iter()
        .any(|v| v.unsigned_abs() > HEATMAP_MAGNITUDE_LIMIT)
    {
        return None;
    }

    Some(RangeDopplerHeatmap::from_cells(
        dims,
        reorder_centered(&wire, dims),
    ))
}

/// Reshape the column-major wire cells into Doppler-major rows, circularly
/// shifted by half the Doppler dimension so zero Doppler is centered.
fn reorder_centered(wire: &[i16], dims: HeatmapDims) -> Vec<i16> {
    let d = dims.doppler_bins;
    let r = dims.range_bins;
    let half = d / 2;

    let mut cells = vec![0i16; d * r];
    for row in 0..d {
        let src_row = (row + half) % d;
        for col in 0..r {
            // Wire order: cell (doppler, range) lives at range * d + doppler.
            cells[row * r + col] = wire[col * d + src_row];
        }
    }
    cells
}
