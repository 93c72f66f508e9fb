//! Отслеживание событий PPS в потоке выборок SDR.
//!
//! Драйвер приёмника помечает буфер, содержащий фронт PPS, старшим битом
//! метки времени; остальные 63 бита в этом случае равны индексу выборки
//! фронта. В обычных буферах метка равна индексу первой выборки буфера.

use log::warn;
use ppsync_types::CaptureFileHeader;

/// Флаг PPS в метке времени потока.
pub const PPS_FLAG: u64 = 1 << 63;

/// Разобранная метка времени буфера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpsTimestamp {
    pub sample_index: u64,
    pub pps: bool,
}

impl PpsTimestamp {
    pub fn from_raw(raw: u64) -> Self {
        Self {
            sample_index: raw & !PPS_FLAG,
            pps: raw & PPS_FLAG != 0,
        }
    }

    pub fn to_raw(&self) -> u64 {
        if self.pps {
            self.sample_index | PPS_FLAG
        } else {
            self.sample_index
        }
    }
}

/// Отслеживает индексы буферов и выдаёт заголовок нового файла захвата на
/// каждом уникальном событии PPS.
///
/// Драйвер повторяет метку PPS в нескольких буферах подряд; повторы
/// игнорируются.
#[derive(Debug, Clone, Default)]
pub struct PpsTracker {
    buffer_index: u64,
    pps_index: u64,
    events: u64,
}

impl PpsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Обрабатывает метаданные очередного буфера.
    ///
    /// `samples_in_buffer`: длина буфера в IQ парах; `epoch_seconds`:
    /// текущее UTC время хоста (попадает в заголовок файла).
    pub fn observe(
        &mut self,
        raw_timestamp: u64,
        samples_in_buffer: u32,
        epoch_seconds: u64,
    ) -> Option<CaptureFileHeader> {
        let ts = PpsTimestamp::from_raw(raw_timestamp);

        if !ts.pps {
            self.buffer_index = ts.sample_index;
            return None;
        }

        let prev = self.pps_index;
        self.pps_index = ts.sample_index;
        self.buffer_index += samples_in_buffer as u64;

        if self.pps_index == prev {
            return None;
        }

        let header = CaptureFileHeader::new(
            epoch_seconds,
            self.buffer_index,
            self.pps_index,
        );

        // Фронт до начала записи: индекс начала ещё не известен
        if !header.is_sync_valid() {
            warn!(
                "PPS edge at sample {} precedes capture start {}, skipping",
                header.sync_sample_index, header.first_sample_index
            );
            return None;
        }

        self.events += 1;
        Some(header)
    }

    /// Индекс начала текущего буфера.
    pub fn buffer_index(&self) -> u64 {
        self.buffer_index
    }

    /// Индекс последнего фронта PPS.
    pub fn pps_index(&self) -> u64 {
        self.pps_index
    }

    /// Количество уникальных событий PPS.
    pub fn events(&self) -> u64 {
        self.events
    }
}
