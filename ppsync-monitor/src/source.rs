// Источники телеметрии работают в отдельном потоке и отдают декодеру сырые
// 128-байтовые чанки через bounded канал. Граница чанка считается границей
// кадра: устройство пишет кадры целиком, ресинхронизации нет.
// Порт открывается в raw режиме 8N1 с таймаутом чтения, чтобы байты кадра
// не терялись в line discipline, а поток замечал stop_flag без данных.
// SimulatedSource кодирует позиционные кадры тем же кодером, что и тесты,
// так что pipeline видит поток почти как с настоящего GPSDO.

use std::{
    fs::File,
    io::{self, ErrorKind, Read},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};
use crossbeam_channel::{Sender, TrySendError};
use log::{debug, info, warn};
use ppsync_core::{encode_frame, fill_buffer};
use ppsync_types::{Payload, PositionRecord, FIX_TYPE_3D, FRAME_SIZE, TICKS_PER_SECOND};
use serialport::{DataBits, FlowControl, Parity, StopBits};

use crate::{metrics::MonitorMetrics, MonitorConfig, MonitorError, MonitorResult, SourceKind};

/// Таймаут одного чтения из порта; задаёт задержку реакции на stop_flag.
pub const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Тип сообщения, который симулятор вставляет как «неизвестный».
pub const SIM_UNKNOWN_TYPE: u8 = 0x7E;

/// Абстракция источника телеметрии.
pub trait TelemetrySource: Send {
    /// Информация об источнике
    fn info(&self) -> SourceInfo;

    /// Читает кадры и отправляет их в `tx`. Блокируется до установки
    /// `stop_flag`, конца потока или закрытия канала.
    fn run(
        &mut self,
        tx: Sender<RawChunk>,
        metrics: Arc<MonitorMetrics>,
        stop_flag: Arc<AtomicBool>,
    ) -> MonitorResult<()>;
}

/// Один кадр в том виде, как он пришёл из порта.
#[derive(Debug, Clone)]
pub struct RawChunk {
    /// Порядковый номер чанка в источнике
    pub seq: u64,
    /// Сырые байты (ровно `FRAME_SIZE`)
    pub data: Vec<u8>,
}

/// Информация об источнике (для логирования).
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: String,
    pub path: Option<PathBuf>,
    /// Номинальная частота кадров, если известна
    pub frame_rate_hz: Option<u32>,
}

/// Последовательный порт устройства (или любой байтовый поток).
pub struct SerialSource {
    name: String,
    path: Option<PathBuf>,
    reader: Box<dyn Read + Send>,
}

/// Синтетический GPSDO: позиционные кадры с фиксированной частотой.
pub struct SimulatedSource {
    /// Кадров в секунду
    pub frame_rate_hz: u32,
    /// Каждый N-й кадр получает тип [`SIM_UNKNOWN_TYPE`]
    pub unknown_every: Option<u32>,
    /// Тик первого кадра (для проверки переполнения)
    pub start_tick: u32,
    /// UTC время первого кадра
    pub start_time: NaiveDateTime,
    /// Шаблон позиции; дата и время подставляются для каждого кадра
    pub template: PositionRecord,
    /// Остановиться после N кадров (None = бесконечно)
    pub frame_limit: Option<u64>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SerialSource {
    /// Открывает источник по пути.
    ///
    /// Обычный файл читается как дамп потока. Всё остальное (tty, pty)
    /// открывается как последовательный порт: raw 8N1, без управления
    /// потоком, с таймаутом чтения [`SERIAL_READ_TIMEOUT`].
    pub fn open<P: AsRef<Path>>(
        path: P,
        baud_rate: u32,
    ) -> MonitorResult<Self> {
        let path = path.as_ref();
        let not_found = || MonitorError::SourceNotFound(path.display().to_string());

        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(),
            _ => MonitorError::Io(e),
        })?;

        if meta.is_file() {
            debug!("{} is a regular file, reading as dump", path.display());

            return Ok(Self {
                name: "Dump".to_string(),
                path: Some(path.to_path_buf()),
                reader: Box::new(File::open(path)?),
            });
        }

        let port = serialport::new(path.to_string_lossy(), baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(SERIAL_READ_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => not_found(),
                _ => MonitorError::Serial(e),
            })?;

        debug!("Opened {} at {baud_rate} baud (raw 8N1)", path.display());

        Ok(Self {
            name: "Serial".to_string(),
            path: Some(path.to_path_buf()),
            reader: Box::new(port),
        })
    }

    /// Источник поверх произвольного `Read` (pipe, тестовый буфер).
    pub fn from_reader<R: Read + Send + 'static>(
        name: impl Into<String>,
        reader: R,
    ) -> Self {
        Self {
            name: name.into(),
            path: None,
            reader: Box::new(reader),
        }
    }
}

// Порт отвечает на истёкший таймаут ошибкой, а не нулём байт
fn is_read_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

impl SimulatedSource {
    pub fn new(frame_rate_hz: u32) -> Self {
        Self {
            frame_rate_hz: frame_rate_hz.max(1),
            unknown_every: None,
            start_tick: 0,
            start_time: Utc::now().naive_utc().with_nanosecond(0).unwrap_or_default(),
            template: PositionRecord {
                longitude_raw: 376_173_000,
                latitude_raw: 557_558_000,
                height_raw: 156_000,
                satellite_count: 9,
                fix_type: FIX_TYPE_3D,
                year: 1970,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
                pll_locked: true,
            },
            frame_limit: None,
        }
    }

    fn ticks_per_frame(&self) -> u32 {
        (TICKS_PER_SECOND / self.frame_rate_hz.max(1)).max(1)
    }

    /// Кодирует кадр с номером `k`.
    pub fn frame(
        &self,
        k: u64,
    ) -> [u8; FRAME_SIZE] {
        let rate = self.frame_rate_hz.max(1) as u64;
        let tick = self
            .start_tick
            .wrapping_add(k.wrapping_mul(self.ticks_per_frame() as u64) as u32);

        let offset_ms = (k.saturating_mul(1_000) / rate) as i64;
        let time = TimeDelta::try_milliseconds(offset_ms)
            .and_then(|d| self.start_time.checked_add_signed(d))
            .unwrap_or(self.start_time);

        let position = PositionRecord {
            year: time.year() as i16,
            month: time.month() as u8,
            day: time.day() as u8,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
            ..self.template
        };

        let mut frame = encode_frame(tick, &Payload::Position(position));

        if let Some(n) = self.unknown_every.filter(|&n| n > 0) {
            if (k + 1) % n as u64 == 0 {
                frame[0] = SIM_UNKNOWN_TYPE;
            }
        }

        frame
    }
}

impl TelemetrySource for SerialSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            frame_rate_hz: None,
        }
    }

    fn run(
        &mut self,
        tx: Sender<RawChunk>,
        metrics: Arc<MonitorMetrics>,
        stop_flag: Arc<AtomicBool>,
    ) -> MonitorResult<()> {
        let mut seq: u64 = 0;
        let mut data = vec![0u8; FRAME_SIZE];
        let mut filled = 0;

        while !stop_flag.load(Ordering::Relaxed) {
            // Недочитанный кадр сохраняется в `data` до следующей попытки
            match fill_buffer(&mut self.reader, &mut data, &mut filled) {
                Ok(FRAME_SIZE) => {}
                Ok(0) => {
                    info!("Source reached end of stream after {seq} chunks");
                    break;
                }
                Ok(n) => {
                    warn!("Source ended mid-frame: {n} trailing bytes ignored");
                    break;
                }
                Err(e) if is_read_timeout(&e) => continue,
                Err(e) => return Err(MonitorError::Io(e)),
            }

            let frame = std::mem::replace(&mut data, vec![0u8; FRAME_SIZE]);
            filled = 0;

            metrics.chunks_received.fetch_add(1, Ordering::Relaxed);

            match tx.try_send(RawChunk { seq, data: frame }) {
                Ok(()) => {}
                Err(TrySendError::Full(c)) => {
                    debug!("Channel full, chunk #{} dropped", c.seq);
                    metrics.dropped_chunks.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => break,
            }

            seq += 1;
        }

        Ok(())
    }
}

impl TelemetrySource for SimulatedSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Simulated GPSDO".to_string(),
            path: None,
            frame_rate_hz: Some(self.frame_rate_hz),
        }
    }

    fn run(
        &mut self,
        tx: Sender<RawChunk>,
        metrics: Arc<MonitorMetrics>,
        stop_flag: Arc<AtomicBool>,
    ) -> MonitorResult<()> {
        let frame_period = Duration::from_secs_f64(1.0 / self.frame_rate_hz.max(1) as f64);
        let start = Instant::now();
        let mut k: u64 = 0;

        while !stop_flag.load(Ordering::Relaxed) {
            if self.frame_limit.is_some_and(|limit| k >= limit) {
                break;
            }

            let chunk = RawChunk {
                seq: k,
                data: self.frame(k).to_vec(),
            };
            metrics.chunks_received.fetch_add(1, Ordering::Relaxed);

            match tx.try_send(chunk) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    metrics.dropped_chunks.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => break,
            }

            k += 1;

            // pacing: синхронизация по реальному времени
            let expected = frame_period.mul_f64(k as f64);
            let elapsed = start.elapsed();

            if expected > elapsed {
                thread::sleep(expected - elapsed);
            }
        }

        Ok(())
    }
}

/// Создаёт нужный источник по конфигурации.
pub fn create_source(config: &MonitorConfig) -> MonitorResult<Box<dyn TelemetrySource>> {
    match &config.source {
        SourceKind::Simulated => {
            let mut sim = SimulatedSource::new(config.sim_frame_rate_hz);
            sim.unknown_every = config.sim_unknown_every;
            Ok(Box::new(sim))
        }
        SourceKind::Serial(path) => Ok(Box::new(SerialSource::open(path, config.baud_rate)?)),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
