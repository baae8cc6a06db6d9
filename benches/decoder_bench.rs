//! Performance benchmarks for the streaming frame decoder.
//!
//! The serial loop polls at the sensor frame rate (~10-20 Hz) but a single
//! poll may have to scan a nearly full 32 KiB buffer for the magic word,
//! so sync and decode cost per poll is what matters.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench decoder_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use mmwave_core::{DetectedPoint, HeatmapDims};
use mmwave_protocol::{FrameAssembler, FrameBuilder, FrameFormat, HeaderLayout, PollOutcome};
use std::hint::black_box;

/// A typical direct-layout frame: 32 detected points.
fn point_frame() -> Vec<u8> {
    let points: Vec<DetectedPoint> = (0..32)
        .map(|i| DetectedPoint::new(i as f32 * 0.1, i as f32 * 0.2, 0.0, -0.5))
        .collect();
    FrameBuilder::new(HeaderLayout::Direct)
        .frame_number(1)
        .detected_points(&points)
        .build()
}

/// A prefixed-layout frame carrying a 256x16 heatmap.
fn heatmap_frame(dims: HeatmapDims) -> Vec<u8> {
    let cells: Vec<i16> = (0..dims.range_bins * dims.doppler_bins)
        .map(|i| (i % 4096) as i16)
        .collect();
    FrameBuilder::new(HeaderLayout::Prefixed)
        .frame_number(1)
        .heatmap_wire(dims, &cells)
        .build()
}

fn bench_point_frame_poll(c: &mut Criterion) {
    let wire = point_frame();
    let mut group = c.benchmark_group("poll_point_frame");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("whole_frame_per_poll", |b| {
        let mut asm = FrameAssembler::new(FrameFormat::new(HeaderLayout::Direct));
        b.iter(|| {
            let outcome = asm.poll(black_box(&wire));
            assert!(matches!(outcome, PollOutcome::FrameComplete(_)));
            black_box(outcome);
        });
    });

    group.finish();
}

fn bench_heatmap_frame_poll(c: &mut Criterion) {
    let dims = HeatmapDims::new(256, 16);
    let wire = heatmap_frame(dims);
    let mut group = c.benchmark_group("poll_heatmap_frame");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("reshape_and_center", |b| {
        let mut asm =
            FrameAssembler::new(FrameFormat::new(HeaderLayout::Prefixed).with_heatmap(dims));
        b.iter(|| {
            let outcome = asm.poll(black_box(&wire));
            assert!(matches!(outcome, PollOutcome::FrameComplete(_)));
            black_box(outcome);
        });
    });

    group.finish();
}

fn bench_resync_through_garbage(c: &mut Criterion) {
    let mut stream = vec![0x55u8; 8 * 1024];
    stream.extend_from_slice(&point_frame());
    let mut group = c.benchmark_group("resync");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("garbage_8k_then_frame", |b| {
        let mut asm = FrameAssembler::new(FrameFormat::new(HeaderLayout::Direct));
        b.iter(|| {
            let outcome = asm.poll(black_box(&stream));
            assert!(matches!(outcome, PollOutcome::FrameComplete(_)));
            black_box(outcome);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_point_frame_poll,
    bench_heatmap_frame_poll,
    bench_resync_through_garbage
);
criterion_main!(benches);
