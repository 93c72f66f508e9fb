//! Пропускная способность декодеров.
//!
//! Запуск:
//!   cargo bench -p ppsync-benchmark --bench decode_bench

use std::{hint::black_box, io::Cursor};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ppsync_core::{
    decode_capture, decode_frame, encode_frame, CaptureWriter, FrameReader,
    SampleStats,
};
use ppsync_types::{
    CaptureFileHeader, IqSample, Payload, PositionRecord, FIX_TYPE_3D,
    FRAME_SIZE,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn position() -> PositionRecord {
    PositionRecord {
        longitude_raw: 376_173_000,
        latitude_raw: 557_558_000,
        height_raw: 156_000,
        satellite_count: 12,
        fix_type: FIX_TYPE_3D,
        year: 2024,
        month: 6,
        day: 30,
        hour: 23,
        minute: 59,
        second: 59,
        pll_locked: true,
    }
}

/// Файл захвата из `n` случайных выборок.
fn capture(n: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let header = CaptureFileHeader::new(1_700_000_000, 0, 511);
    let mut writer = CaptureWriter::new(Cursor::new(Vec::new()), header).unwrap();

    for _ in 0..n {
        writer
            .write_sample(IqSample::new(rng.gen(), rng.gen()))
            .unwrap();
    }

    writer.finish().unwrap().into_inner()
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("telemetry");
    let frame = encode_frame(123_456, &Payload::Position(position()));

    group.throughput(Throughput::Bytes(FRAME_SIZE as u64));
    group.bench_function("decode_frame", |b| {
        b.iter(|| decode_frame(black_box(&frame)))
    });

    let stream: Vec<u8> = (0..1_000u32)
        .flat_map(|t| encode_frame(t, &Payload::Position(position())))
        .collect();

    group.throughput(Throughput::Elements(1_000));
    group.bench_function("frame_reader_1000", |b| {
        b.iter(|| FrameReader::new(Cursor::new(black_box(&stream))).count())
    });

    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");

    // 1020 = один буфер приёмника, 30720 ~ 1 мс при 30.72 Msps
    for n in [1_020usize, 30_720, 307_200] {
        let raw = capture(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("decode_iter", n), &raw, |b, raw| {
            b.iter(|| {
                let decoded = decode_capture(black_box(raw)).unwrap();
                decoded.samples.iter().map(|s| s.i as i64).sum::<i64>()
            })
        });

        group.bench_with_input(BenchmarkId::new("stats", n), &raw, |b, raw| {
            b.iter(|| {
                let decoded = decode_capture(black_box(raw)).unwrap();
                SampleStats::from_samples(decoded.samples.iter())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frames, bench_capture);
criterion_main!(benches);
