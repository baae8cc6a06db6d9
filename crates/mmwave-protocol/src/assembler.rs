//! Poll-driven frame assembly.
//!
//! [`FrameAssembler`] owns the stream buffer and runs the whole decode
//! pipeline once per caller tick. The caller performs its non-blocking
//! serial read, hands whatever arrived to [`FrameAssembler::poll`], and
//! gets back at most one frame:
//!
//! ```text
//! ┌────────────┐ append ┌─────────┐ Ready(len) ┌────────┐      ┌──────────┐
//! │Accumulating│───────>│ Syncing │───────────>│ Header │─────>│   TLVs   │
//! └────────────┘        └─────────┘            └────────┘      └──────────┘
//!       ^                    │ NoSync /                             │
//!       │                    │ Incomplete                 consume(len), then
//!       │                    v                        FrameComplete / FrameCorrupt
//!       │               Incomplete outcome                          │
//!       └───────────────────────────────────────────────────────────┘
//! ```
//!
//! No operation blocks; the caller's loop (the sensor's frame period,
//! ~50-100 ms, is the natural interval) drives all progress. Frames come
//! out in wire order, one per poll at most, and a poll that completes a
//! frame leaves any following bytes buffered for the next tick.
//!
//! Two firmware variants share this machine: the decode path is
//! parameterized by a [`FrameFormat`] instead of being duplicated per
//! variant.

use mmwave_core::constants::MAGIC_WORD;
use mmwave_core::{HeatmapDims, ParsedFrame};
use tracing::{debug, trace, warn};

use crate::buffer::StreamBuffer;
use crate::header::{FrameHeader, HeaderLayout};
use crate::sync::{self, SyncStatus};
use crate::tlv;

/// Decode parameters distinguishing the sensor firmware variants.
///
/// # Example
///
/// ```
/// use mmwave_core::HeatmapDims;
/// use mmwave_protocol::{FrameFormat, HeaderLayout};
///
/// // 2D point-cloud firmware
/// let flat = FrameFormat::new(HeaderLayout::Direct);
///
/// // 3D firmware with a 256x16 heatmap
/// let full = FrameFormat::new(HeaderLayout::Prefixed)
///     .with_heatmap(HeatmapDims::new(256, 16));
/// assert!(full.heatmap_dims().is_some());
/// # let _ = flat;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    layout: HeaderLayout,
    heatmap_dims: Option<HeatmapDims>,
}

impl FrameFormat {
    /// Format for the given header layout, without heatmap decoding.
    #[must_use]
    pub fn new(layout: HeaderLayout) -> Self {
        FrameFormat {
            layout,
            heatmap_dims: None,
        }
    }

    /// Enable heatmap decoding with dimensions from the chirp
    /// configuration. Without this, type-5 TLVs are skipped opaquely.
    #[must_use]
    pub fn with_heatmap(mut self, dims: HeatmapDims) -> Self {
        self.heatmap_dims = Some(dims);
        self
    }

    /// The configured header layout.
    #[must_use]
    pub fn layout(&self) -> HeaderLayout {
        self.layout
    }

    /// The configured heatmap dimensions, if any.
    #[must_use]
    pub fn heatmap_dims(&self) -> Option<HeatmapDims> {
        self.heatmap_dims
    }
}

/// Result of one [`FrameAssembler::poll`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// No new frame this tick: still accumulating, unsynced, or waiting for
    /// the rest of a frame whose garbage has already been trimmed.
    Incomplete,

    /// One frame was decoded and consumed from the stream.
    FrameComplete(ParsedFrame),

    /// One frame was consumed from the stream but failed decoding; the
    /// stream is positioned at the next frame boundary.
    FrameCorrupt,
}

/// Streaming decoder for one sensor connection.
///
/// Owns the [`StreamBuffer`] exclusively for the connection's lifetime.
/// Single-threaded by design: create it on the task that does the serial
/// reads and call [`poll`](FrameAssembler::poll) from there.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: StreamBuffer,
    format: FrameFormat,
}

impl FrameAssembler {
    /// Create an assembler for the given frame format.
    pub fn new(format: FrameFormat) -> Self {
        FrameAssembler {
            buffer: StreamBuffer::new(),
            format,
        }
    }

    /// The configured format.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Bytes currently buffered and not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered bytes, e.g. after reconfiguring the sensor.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Feed freshly read bytes and try to decode one frame.
    ///
    /// An empty `new_bytes` is fine and simply re-attempts decoding of
    /// already-buffered data. A chunk that would overflow the buffer is
    /// dropped whole (logged at `warn`), per the documented overflow
    /// policy.
    pub fn poll(&mut self, new_bytes: &[u8]) -> PollOutcome {
        if let Err(err) = self.buffer.append(new_bytes) {
            warn!(%err, "dropping incoming chunk");
        }

        match sync::acquire(&mut self.buffer) {
            SyncStatus::NotEnoughData | SyncStatus::NoSync => {
                trace!(buffered = self.buffer.len(), "no frame boundary yet");
                PollOutcome::Incomplete
            }
            SyncStatus::Incomplete(total_packet_len) => {
                trace!(
                    buffered = self.buffer.len(),
                    total_packet_len, "synced, frame still arriving"
                );
                PollOutcome::Incomplete
            }
            SyncStatus::Ready(total_packet_len) => self.decode_frame(total_packet_len),
        }
    }

    /// Decode the complete frame at the buffer head and consume it.
    fn decode_frame(&mut self, total_packet_len: usize) -> PollOutcome {
        if total_packet_len < self.format.layout.min_frame_len() {
            // A length mirror this small cannot hold a header; consuming it
            // verbatim could leave the magic word in place forever. Shred
            // the marker and let the next poll resynchronize.
            warn!(
                total_packet_len,
                min = self.format.layout.min_frame_len(),
                "declared packet length below decodable minimum; resyncing"
            );
            self.buffer.discard_prefix(MAGIC_WORD.len());
            return PollOutcome::FrameCorrupt;
        }

        let (header, payload) = {
            let frame = &self.buffer.as_slice()[..total_packet_len];
            let header = FrameHeader::parse(frame, self.format.layout);
            let payload =
                tlv::decode_payload(frame, &header, self.format.layout, self.format.heatmap_dims);
            (header, payload)
        };

        // Advance exactly the declared length regardless of decode outcome
        // or cursor mismatch, to stay aligned with the next magic word.
        self.buffer.consume_prefix(total_packet_len);

        if payload.corrupt {
            warn!(
                frame_number = header.frame_number,
                total_packet_len, "dropping corrupt frame"
            );
            return PollOutcome::FrameCorrupt;
        }

        if payload.cursor != total_packet_len {
            debug!(
                frame_number = header.frame_number,
                cursor = payload.cursor,
                total_packet_len,
                "TLV cursor did not land on packet boundary"
            );
        }

        debug!(
            frame_number = header.frame_number,
            points = payload.points.len(),
            heatmap = payload.heatmap.is_some(),
            "frame complete"
        );

        PollOutcome::FrameComplete(ParsedFrame {
            frame_number: header.frame_number,
            sub_frame_number: header.sub_frame_number,
            points: payload.points,
            heatmap: payload.heatmap,
        })
    }
}
