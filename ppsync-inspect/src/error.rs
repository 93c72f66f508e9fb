use std::path::PathBuf;

use ppsync_types::{CaptureError, StreamError};
use thiserror::Error;

pub type InspectResult<T> = Result<T, InspectError>;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Telemetry stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// В строгом режиме хвост файла считается ошибкой
    #[error("{path:?}: {count} trailing bytes (strict mode)")]
    TrailingBytes { path: PathBuf, count: u64 },

    #[error("Config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_conversion() {
        let e: InspectError = CaptureError::TooShortForHeader { len: 3 }.into();
        assert_eq!(
            e.to_string(),
            "Capture error: Capture too short for header: 3 bytes, expected at least 24"
        );
    }

    #[test]
    fn test_trailing_bytes_message() {
        let e = InspectError::TrailingBytes {
            path: PathBuf::from("a.bin"),
            count: 2,
        };
        assert_eq!(e.to_string(), "\"a.bin\": 2 trailing bytes (strict mode)");
    }
}
