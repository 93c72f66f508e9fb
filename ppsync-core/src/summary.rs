use chrono::{DateTime, Utc};
use ppsync_types::CaptureFileHeader;
use serde::Serialize;

use crate::capture::DecodedCapture;

/// Сводка по файлу захвата для вывода и JSON.
///
/// Длительность и смещение PPS в секундах зависят от частоты
/// дискретизации, которой в самом файле нет, поэтому она передаётся
/// снаружи.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSummary {
    pub header: CaptureFileHeader,
    pub captured_at: Option<DateTime<Utc>>,
    pub sample_count: u64,
    pub trailing_bytes: usize,
    pub sample_rate_hz: u32,
    pub duration_secs: f64,
    pub pps_offset_samples: u64,
    pub pps_offset_secs: f64,
}

impl CaptureSummary {
    pub fn new(
        capture: &DecodedCapture<'_>,
        sample_rate_hz: u32,
    ) -> Self {
        let sample_count = capture.sample_count() as u64;
        let pps_offset_samples = capture.header.pps_offset();

        Self {
            header: capture.header,
            captured_at: capture.header.captured_at(),
            sample_count,
            trailing_bytes: capture.trailing_bytes(),
            sample_rate_hz,
            duration_secs: samples_to_secs(sample_count, sample_rate_hz),
            pps_offset_samples,
            pps_offset_secs: samples_to_secs(pps_offset_samples, sample_rate_hz),
        }
    }

    /// Фронт PPS попадает внутрь записанных выборок.
    pub fn pps_in_capture(&self) -> bool {
        self.pps_offset_samples < self.sample_count
    }
}

fn samples_to_secs(
    samples: u64,
    sample_rate_hz: u32,
) -> f64 {
    if sample_rate_hz == 0 {
        return 0.0;
    }

    samples as f64 / sample_rate_hz as f64
}

impl std::fmt::Display for CaptureSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        match self.captured_at {
            Some(t) => writeln!(f, "  Captured      : {}", t.format("%Y-%m-%d %H:%M:%S"))?,
            None => writeln!(
                f,
                "  Captured      : <out of range: {}>",
                self.header.capture_epoch_seconds
            )?,
        }
        writeln!(f, "  Samples       : {}", self.sample_count)?;
        writeln!(
            f,
            "  Sample rate   : {:.3} Msps",
            self.sample_rate_hz as f64 / 1e6
        )?;
        writeln!(f, "  Duration      : {:.4} us", self.duration_secs * 1e6)?;
        writeln!(f, "  First sample  : {}", self.header.first_sample_index)?;
        writeln!(f, "  PPS sample    : {}", self.header.sync_sample_index)?;
        writeln!(
            f,
            "  PPS offset    : {} samples ({:.4} us)",
            self.pps_offset_samples,
            self.pps_offset_secs * 1e6
        )?;
        if self.trailing_bytes > 0 {
            writeln!(f, "  Trailing      : {} byte(s) ignored", self.trailing_bytes)?;
        }
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
