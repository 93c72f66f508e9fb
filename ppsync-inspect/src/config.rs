use std::path::PathBuf;

use ppsync_types::DEFAULT_SAMPLE_RATE_HZ;

/// Что лежит во входных файлах.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Файлы захвата IQ с PPS заголовком
    Capture,
    /// Дампы телеметрического потока (подряд идущие 128-байтовые кадры)
    Telemetry,
}

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub kind: InputKind,
    pub inputs: Vec<PathBuf>,
    /// Частота дискретизации приёмника (Гц), нужна для длительности и
    /// смещения PPS в секундах
    pub sample_rate_hz: u32,
    /// Сколько первых выборок (или кадров) напечатать
    pub dump: usize,
    /// Вывод одним JSON объектом на файл
    pub json: bool,
    /// Хвостовые байты считать ошибкой файла
    pub strict: bool,
}

impl InspectConfig {
    fn new() -> Self {
        Self {
            kind: InputKind::Capture,
            inputs: Vec::new(),
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            dump: 0,
            json: false,
            strict: false,
        }
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Парсит строку частоты в герцы.
///
/// Поддерживает суффиксы: `GHz`, `MHz`, `kHz`, `Hz` (регистронезависимо).
///
/// # Примеры
/// ```
/// use ppsync_inspect::config::parse_rate_hz;
/// assert_eq!(parse_rate_hz("30.72MHz").unwrap(), 30_720_000);
/// assert_eq!(parse_rate_hz("1.5GHz").unwrap(), 1_500_000_000);
/// assert_eq!(parse_rate_hz("2000000").unwrap(), 2_000_000);
/// ```
pub fn parse_rate_hz(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (num_str, mult) = if let Some(v) = lower.strip_suffix("ghz") {
        (v.trim(), 1_000_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("mhz") {
        (v.trim(), 1_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("khz") {
        (v.trim(), 1_000_f64)
    } else if let Some(v) = lower.strip_suffix("hz") {
        (v.trim(), 1_f64)
    } else {
        (lower.as_str(), 1_f64)
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid rate value '{num_str}': {e}"))?;

    if !n.is_finite() || n <= 0.0 {
        return Err(format!("Rate must be positive: '{s}'"));
    }

    let hz = (n * mult).round();
    if hz > u32::MAX as f64 {
        return Err(format!("Rate {hz} Hz exceeds u32::MAX"));
    }

    Ok(hz as u32)
}
