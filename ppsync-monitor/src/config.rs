use std::path::PathBuf;

/// Скорость порта по умолчанию. CDC-ACM устройства её игнорируют.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Источник телеметрии (выбор при старте).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Встроенный симулятор GPSDO (не требует железа).
    Simulated,
    /// Последовательный порт (tty) или файл с дампом потока.
    Serial(PathBuf),
}

/// Формат вывода декодированных кадров.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Текстовый отчёт по каждому кадру
    Text,
    /// Один JSON объект на строку
    Json,
}

/// Полная конфигурация сессии мониторинга.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Источник кадров
    pub source: SourceKind,
    /// Скорость последовательного порта (8N1, без управления потоком)
    pub baud_rate: u32,
    /// Формат вывода
    pub output: OutputFormat,
    /// Остановиться после N декодированных кадров (None = без ограничения)
    pub max_frames: Option<u64>,
    /// Ограничение по времени (None = до Ctrl+C или конца потока)
    pub duration_secs: Option<u64>,
    /// Ёмкость канала между потоком источника и декодером (в кадрах)
    pub ring_capacity: usize,
    /// Интервал вывода статистики (секунды)
    pub stats_interval_secs: u64,
    /// Частота кадров симулятора (кадров в секунду)
    pub sim_frame_rate_hz: u32,
    /// Симулятор вставляет кадр неизвестного типа каждые N кадров
    pub sim_unknown_every: Option<u32>,
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SourceKind, OutputFormat, MonitorConfig
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for SourceKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            SourceKind::Simulated => write!(f, "sim"),
            SourceKind::Serial(path) => write!(f, "{}", path.display()),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    /// `sim`/`simulated` выбирает симулятор, любая другая строка считается
    /// путём к порту.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s.to_lowercase().as_str() {
            "" => Err("Empty source. Use: sim or a serial port path".to_string()),
            "sim" | "simulated" => Ok(SourceKind::Simulated),
            _ => Ok(SourceKind::Serial(PathBuf::from(s))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: '{s}'. Use: text, json")),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Serial(PathBuf::from("/dev/ttyACM0")),
            baud_rate: DEFAULT_BAUD_RATE,
            output: OutputFormat::Text,
            max_frames: None,
            duration_secs: None,
            ring_capacity: 256,
            stats_interval_secs: 10,
            sim_frame_rate_hz: 1,
            sim_unknown_every: None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
