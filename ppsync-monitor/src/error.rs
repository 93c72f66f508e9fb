use thiserror::Error;

pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Последовательный порт не найден
    #[error("Telemetry source not found: {0}")]
    SourceNotFound(String),

    /// Ошибка ввода/вывода (порт, stdout)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Порт существует, но не открылся или не настроился
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Ошибка сериализации JSON вывода
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonitorError {
    /// Потребитель вывода закрылся (например, `| head`): штатное завершение.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, MonitorError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
