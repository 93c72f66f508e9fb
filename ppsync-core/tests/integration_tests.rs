use std::{fs::File, io::Cursor};

use ppsync_core::{
    decode_capture, decode_frame, encode_frame, load_capture, read_all_frames, CaptureHeaderExt,
    CaptureWriter, FrameReader, PpsTracker, SampleStats, PPS_FLAG,
};
use ppsync_types::{
    CaptureError, CaptureFileHeader, CaptureWarning, FrameError, IqSample, Payload,
    PositionRecord, CAPTURE_HEADER_SIZE, FRAME_SIZE, MESSAGE_POSITION,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tempfile::NamedTempFile;

// ===========================================================================
// Helpers: детерминированные тест-данные
// ===========================================================================

fn random_position(rng: &mut StdRng) -> PositionRecord {
    PositionRecord {
        longitude_raw: rng.gen(),
        latitude_raw: rng.gen(),
        height_raw: rng.gen(),
        satellite_count: rng.gen(),
        fix_type: rng.gen(),
        year: rng.gen_range(1980..=2100),
        month: rng.gen_range(1..=12),
        day: rng.gen_range(1..=28),
        hour: rng.gen_range(0..24),
        minute: rng.gen_range(0..60),
        second: rng.gen_range(0..60),
        pll_locked: rng.gen(),
    }
}

/// Собирает файл захвата в памяти через [`CaptureWriter`].
fn build_capture(
    header: CaptureFileHeader,
    samples: &[IqSample],
) -> Vec<u8> {
    let mut writer = CaptureWriter::new(Cursor::new(Vec::new()), header).unwrap();
    writer.write_samples(samples).unwrap();
    writer.finish().unwrap().into_inner()
}

// ===========================================================================
// Телеметрия
// ===========================================================================

#[test]
fn test_header_tick_matches_le_bytes() {
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..1_000 {
        let mut frame = [0u8; FRAME_SIZE];
        rng.fill(&mut frame[..]);
        frame[0] = MESSAGE_POSITION;

        let expected = u32::from_le_bytes([frame[1], frame[2], frame[3], frame[4]]);
        let header = ppsync_core::decode_header(&frame).unwrap();

        assert_eq!(header.tick, expected);
        assert_eq!(header.seconds(), expected as f64 / 10_000.0);
    }
}

#[test]
fn test_position_raw_fields_survive_encoding() {
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..1_000 {
        let p = random_position(&mut rng);
        let tick: u32 = rng.gen();
        let frame = encode_frame(tick, &Payload::Position(p));

        let (header, Payload::Position(decoded)) = decode_frame(&frame).unwrap();
        assert_eq!(header.tick, tick);
        assert_eq!(decoded.longitude_raw, p.longitude_raw);
        assert_eq!(decoded.latitude_raw, p.latitude_raw);
        assert_eq!(decoded.height_raw, p.height_raw);
        assert_eq!(decoded, p);
    }
}

#[test]
fn test_every_unknown_type_is_reported() {
    let mut rng = StdRng::seed_from_u64(3);
    let p = random_position(&mut rng);

    for t in 0..=u8::MAX {
        let mut frame = encode_frame(0, &Payload::Position(p));
        frame[0] = t;

        let result = decode_frame(&frame);
        if t == MESSAGE_POSITION {
            assert!(result.is_ok());
        } else {
            assert_eq!(result.unwrap_err(), FrameError::UnknownMessageType(t));
        }
    }
}

#[test]
fn test_garbage_never_panics() {
    let mut rng = StdRng::seed_from_u64(4);

    for _ in 0..5_000 {
        let len = rng.gen_range(0..=FRAME_SIZE);
        let mut buf = vec![0u8; len];
        rng.fill(&mut buf[..]);
        if len > 0 && rng.gen_bool(0.5) {
            buf[0] = MESSAGE_POSITION;
        }

        match decode_frame(&buf) {
            Ok(_) => assert!(len >= 27),
            Err(FrameError::TruncatedHeader { len: l }) => assert!(l < 5),
            Err(e) => assert!(e.is_recoverable()),
        }
    }
}

#[test]
fn test_telemetry_dump_file() {
    let mut rng = StdRng::seed_from_u64(5);
    let tmp = NamedTempFile::new().unwrap();

    let mut raw = Vec::new();
    for i in 0..20u32 {
        let mut frame = encode_frame(i, &Payload::Position(random_position(&mut rng)));
        if i % 5 == 4 {
            frame[0] = 0x42;
        }
        raw.extend_from_slice(&frame);
    }
    std::fs::write(tmp.path(), &raw).unwrap();

    let mut reader = FrameReader::new(File::open(tmp.path()).unwrap());
    let frames = read_all_frames(&mut reader).unwrap();

    assert_eq!(frames.len(), 16);
    assert_eq!(reader.stats().unknown_type, 4);
    assert!(frames.windows(2).all(|w| w[0].header.tick < w[1].header.tick));
}

// ===========================================================================
// Файлы захвата
// ===========================================================================

#[test]
fn test_capture_reference_round_trip() {
    let header = CaptureFileHeader::new(1_700_000_000, 1_000, 1_030);
    let samples = [IqSample::new(1, -1), IqSample::new(100, -100)];
    let raw = build_capture(header, &samples);

    assert_eq!(raw.len(), CAPTURE_HEADER_SIZE + 8);

    let decoded = decode_capture(&raw).unwrap();
    assert_eq!(decoded.header.capture_epoch_seconds, 1_700_000_000);
    assert_eq!(decoded.header.first_sample_index, 1_000);
    assert_eq!(decoded.header.sync_sample_index, 1_030);
    assert_eq!(decoded.samples.to_vec(), samples.to_vec());
}

#[test]
fn test_capture_header_only() {
    let raw = build_capture(CaptureFileHeader::new(1, 1, 1), &[]);
    let decoded = decode_capture(&raw).unwrap();

    assert_eq!(decoded.sample_count(), 0);
    assert!(decoded.warning.is_none());
}

#[test]
fn test_capture_sync_before_first_rejected() {
    let mut raw = CaptureFileHeader::new(0, 0, 0).encode().to_vec();
    raw[8..16].copy_from_slice(&50u64.to_le_bytes());
    raw[16..24].copy_from_slice(&49u64.to_le_bytes());

    assert!(matches!(
        decode_capture(&raw),
        Err(CaptureError::InvalidSyncOffset { .. })
    ));
}

#[test]
fn test_capture_trailing_two_bytes() {
    let mut rng = StdRng::seed_from_u64(6);

    for n in [0usize, 1, 17, 1_020] {
        let samples: Vec<IqSample> = (0..n).map(|_| IqSample::new(rng.gen(), rng.gen())).collect();
        let mut raw = build_capture(CaptureFileHeader::new(0, 0, 0), &samples);
        raw.extend_from_slice(&[0xAB, 0xCD]);
        assert_eq!(raw.len(), 24 + 4 * n + 2);

        let decoded = decode_capture(&raw).unwrap();
        assert_eq!(decoded.sample_count(), n);
        assert_eq!(decoded.warning, Some(CaptureWarning::TrailingBytesIgnored(2)));
        assert_eq!(decoded.samples.to_vec(), samples);
    }
}

#[test]
fn test_capture_file_on_disk() {
    let tmp = NamedTempFile::new().unwrap();
    let header = CaptureFileHeader::new(1_704_067_200, 30_720_000, 30_720_460);

    {
        let file = File::create(tmp.path()).unwrap();
        let mut writer = CaptureWriter::new(file, header).unwrap();
        // 13 буферов по 1020 пар, как пишет приёмник после события PPS
        for k in 0..13i16 {
            let buf: Vec<i16> = (0..2_040).map(|j| (j as i16).wrapping_mul(k)).collect();
            writer.write_interleaved(&buf).unwrap();
        }
        assert_eq!(writer.samples_written(), 13 * 1_020);
        writer.finish().unwrap();
    }

    let raw = load_capture(tmp.path()).unwrap();
    let decoded = decode_capture(&raw).unwrap();

    assert_eq!(decoded.header, header);
    assert_eq!(decoded.sample_count(), 13 * 1_020);

    let summary = decoded.summary(30_720_000);
    assert_eq!(summary.pps_offset_samples, 460);
    assert!((summary.duration_secs - 13.0 * 1_020.0 / 30_720_000.0).abs() < 1e-12);

    let stats = SampleStats::from_samples(decoded.samples.iter());
    assert_eq!(stats.count, 13 * 1_020);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_capture("/definitely/not/here.bin");
    assert!(matches!(result, Err(CaptureError::Io(_))));
}

#[test]
fn test_tracker_headers_decode_back() {
    let mut tracker = PpsTracker::new();
    let mut headers = Vec::new();

    let mut ts = 0u64;
    for buffer in 0..100u64 {
        let raw = if buffer % 30 == 29 {
            PPS_FLAG | (ts + 400)
        } else {
            ts
        };
        if let Some(h) = tracker.observe(raw, 1_020, 1_700_000_000 + buffer) {
            headers.push(h);
        }
        ts += 1_020;
    }

    assert_eq!(headers.len(), 3);
    for h in headers {
        let raw = build_capture(h, &[IqSample::default()]);
        let decoded = decode_capture(&raw).unwrap();
        assert_eq!(decoded.header.pps_offset(), 400);
    }
}
