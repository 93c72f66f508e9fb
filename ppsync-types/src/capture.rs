//! Файл захвата IQ, синхронизированный по PPS.
//!
//! ```text
//! [0..8]   CAPTURE_EPOCH   u64  UTC секунды на момент создания файла
//! [8..16]  FIRST_SAMPLE    u64  индекс первой выборки файла
//! [16..24] SYNC_SAMPLE     u64  индекс выборки фронта PPS
//! [24..]   IQ_DATA         пары (i16 I, i16 Q)
//! ```
//!
//! Все числа little-endian.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Размер заголовка файла захвата.
pub const CAPTURE_HEADER_SIZE: usize = 24;

/// Размер одной IQ пары (2 байта I + 2 байта Q).
pub const IQ_SAMPLE_SIZE: usize = 4;

/// Частота дискретизации приёмника по умолчанию (30.72 Msps).
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 30_720_000;

/// Заголовок файла захвата.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureFileHeader {
    /// Время создания файла (Unix timestamp, секунды)
    pub capture_epoch_seconds: u64,
    /// Счётчик выборок на момент начала файла
    pub first_sample_index: u64,
    /// Счётчик выборок на фронте PPS
    pub sync_sample_index: u64,
}

/// Некритичные замечания к успешно декодированному файлу.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptureWarning {
    /// Хвост из 1-3 байт не образует целую IQ пару и пропущен
    TrailingBytesIgnored(usize),
}

impl CaptureFileHeader {
    pub fn new(
        capture_epoch_seconds: u64,
        first_sample_index: u64,
        sync_sample_index: u64,
    ) -> Self {
        Self {
            capture_epoch_seconds,
            first_sample_index,
            sync_sample_index,
        }
    }

    /// Смещение фронта PPS от начала файла, в выборках.
    pub fn pps_offset(&self) -> u64 {
        self.sync_sample_index
            .saturating_sub(self.first_sample_index)
    }

    /// Время создания файла в UTC.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.capture_epoch_seconds).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    pub fn is_sync_valid(&self) -> bool {
        self.sync_sample_index >= self.first_sample_index
    }
}

impl std::fmt::Display for CaptureWarning {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            CaptureWarning::TrailingBytesIgnored(n) => {
                write!(f, "{n} trailing byte(s) ignored (partial IQ sample)")
            }
        }
    }
}
