//! Common test utilities for decoder integration tests.
//!
//! Helpers here build wire frames via [`FrameBuilder`], feed byte streams
//! to a [`FrameAssembler`] in arbitrary chunkings, and unwrap poll
//! outcomes with assertion context, so individual tests read as scenarios
//! rather than byte bookkeeping.

use mmwave_core::{DetectedPoint, ParsedFrame};
use mmwave_protocol::{FrameAssembler, FrameBuilder, HeaderLayout, PollOutcome};

/// Garbage bytes guaranteed to contain no magic-word candidate (the first
/// magic byte, 0x02, never occurs).
pub fn garbage(n: usize) -> Vec<u8> {
    (0..n).map(|i| 0xC0u8.wrapping_add(i as u8 % 0x3F)).collect()
}

/// The two-point direct-layout frame used by several scenarios
/// (frame 42, points (1.0, 2.0, 0.0, 0.5) and (-1.0, 3.5, 0.2, 0.0)).
pub fn two_point_frame() -> Vec<u8> {
    FrameBuilder::new(HeaderLayout::Direct)
        .frame_number(42)
        .detected_points(&[
            DetectedPoint::new(1.0, 2.0, 0.0, 0.5),
            DetectedPoint::new(-1.0, 3.5, 0.2, 0.0),
        ])
        .build()
}

/// Unwrap a completed frame out of a poll outcome.
#[track_caller]
pub fn expect_frame(outcome: PollOutcome) -> ParsedFrame {
    match outcome {
        PollOutcome::FrameComplete(frame) => frame,
        other => panic!("expected FrameComplete, got {other:?}"),
    }
}

/// Feed a byte stream in the given chunk sizes and collect every decoded
/// frame, polling once more at the end with no new bytes.
pub fn poll_chunked(asm: &mut FrameAssembler, stream: &[u8], chunk_len: usize) -> Vec<ParsedFrame> {
    let mut frames = Vec::new();
    for chunk in stream.chunks(chunk_len.max(1)) {
        if let PollOutcome::FrameComplete(frame) = asm.poll(chunk) {
            frames.push(frame);
        }
    }
    // Frames whose final bytes arrived in the last chunk may still be
    // buffered; keep polling until a tick produces nothing.
    loop {
        match asm.poll(&[]) {
            PollOutcome::FrameComplete(frame) => frames.push(frame),
            PollOutcome::FrameCorrupt => {}
            PollOutcome::Incomplete => break,
        }
    }
    frames
}
