use std::sync::atomic::Ordering;

use ppsync_core::encode_frame;
use ppsync_monitor::{
    create_source, MonitorConfig, MonitorError, MonitorPipeline, OutputFormat, SourceKind,
};
use ppsync_types::{Payload, PositionRecord, FIX_TYPE_3D, FRAME_SIZE};
use tempfile::NamedTempFile;

fn position(second: u8) -> PositionRecord {
    PositionRecord {
        longitude_raw: 301_234_567,
        latitude_raw: 599_386_000,
        height_raw: 12_500,
        satellite_count: 7,
        fix_type: FIX_TYPE_3D,
        year: 2023,
        month: 11,
        day: 14,
        hour: 22,
        minute: 13,
        second,
        pll_locked: second % 2 == 0,
    }
}

fn config_for(path: &std::path::Path) -> MonitorConfig {
    MonitorConfig {
        source: SourceKind::Serial(path.to_path_buf()),
        output: OutputFormat::Json,
        duration_secs: Some(10),
        ring_capacity: 1_024,
        stats_interval_secs: 60,
        ..MonitorConfig::default()
    }
}

#[test]
fn test_monitor_replays_serial_dump() {
    let tmp = NamedTempFile::new().unwrap();

    let mut raw = Vec::new();
    for s in 0..10u8 {
        let mut frame = encode_frame(s as u32 * 10_000, &Payload::Position(position(s)));
        if s == 5 {
            frame[0] = 0x30;
        }
        raw.extend_from_slice(&frame);
    }
    // Обрыв посреди кадра в конце дампа
    raw.extend_from_slice(&[0x01; FRAME_SIZE / 2]);
    std::fs::write(tmp.path(), &raw).unwrap();

    let config = config_for(tmp.path());
    let source = create_source(&config).unwrap();
    let (pipeline, metrics) = MonitorPipeline::new(config);

    let mut out = Vec::new();
    pipeline.run(source, &mut out).unwrap();

    let events: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(events.len(), 9);
    assert_eq!(metrics.chunks_received.load(Ordering::Relaxed), 10);
    assert_eq!(metrics.unknown_type.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.disciplined_frames.load(Ordering::Relaxed), 5);

    assert_eq!(events[0]["utc"], "2023-11-14T22:13:00");
    assert_eq!(events[8]["seconds"], 9.0);
    assert_eq!(events[8]["payload"]["latitude_raw"], 599_386_000);
}

#[test]
fn test_monitor_text_output() {
    let tmp = NamedTempFile::new().unwrap();
    std::fs::write(
        tmp.path(),
        encode_frame(12_345, &Payload::Position(position(0))),
    )
    .unwrap();

    let mut config = config_for(tmp.path());
    config.output = OutputFormat::Text;

    let source = create_source(&config).unwrap();
    let (pipeline, _) = MonitorPipeline::new(config);

    let mut out = Vec::new();
    pipeline.run(source, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("POSITION INFO"));
    assert!(text.contains("1.2345 s"));
    assert!(text.contains("Latitude      : 59.9386000 deg"));
    assert!(text.contains("2023-11-14 22:13:00"));
}

#[test]
fn test_missing_port_is_reported() {
    let config = MonitorConfig {
        source: SourceKind::Serial("/nonexistent/ttyACM9".into()),
        ..MonitorConfig::default()
    };

    assert!(matches!(
        create_source(&config),
        Err(MonitorError::SourceNotFound(_))
    ));
}
