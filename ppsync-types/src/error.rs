use thiserror::Error;

use crate::{CAPTURE_HEADER_SIZE, FRAME_HEADER_SIZE};

/// Результат чтения отдельного поля.
pub type ReadResult<T> = std::result::Result<T, ReadError>;

/// Результат декодирования телеметрического кадра.
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Результат декодирования файла захвата.
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Результат чтения потока кадров.
pub type StreamResult<T> = std::result::Result<T, StreamError>;

/// Ошибка уровня курсора: в буфере меньше байт, чем требует поле.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("Insufficient bytes at offset {offset}: need {needed}, {remaining} remaining")]
    InsufficientBytes {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
}

/// Причина, по которой полезная нагрузка кадра не декодировалась.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Нагрузка короче своей фиксированной раскладки
    #[error("{0}")]
    Field(#[from] ReadError),

    /// Поля даты/времени не образуют существующую календарную метку
    #[error(
        "Invalid calendar timestamp: {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
    )]
    InvalidTimestamp {
        year: i16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

/// Ошибки декодирования одного телеметрического кадра.
///
/// Все варианты относятся только к текущему кадру: поток продолжается.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Буфер короче общего заголовка кадра
    #[error("Truncated frame header: {len} bytes, expected at least {min}", min = FRAME_HEADER_SIZE)]
    TruncatedHeader { len: usize },

    /// Кадр корректен, но тип сообщения не поддерживается
    #[error("Unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Тип распознан, но нагрузка повреждена
    #[error("Payload decode error (message type {message_type}): {source}")]
    PayloadDecode {
        message_type: u8,
        #[source]
        source: PayloadError,
    },
}

/// Ошибки декодирования файла захвата IQ.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Буфер короче 24-байтового заголовка
    #[error("Capture too short for header: {len} bytes, expected at least {min}", min = CAPTURE_HEADER_SIZE)]
    TooShortForHeader { len: usize },

    /// Нарушен инвариант sync_sample_index >= first_sample_index
    #[error(
        "Invalid sync offset: PPS sample {sync_sample_index} precedes first sample {first_sample_index}"
    )]
    InvalidSyncOffset {
        first_sample_index: u64,
        sync_sample_index: u64,
    },

    /// Ошибка чтения поля заголовка
    #[error("Field error: {0}")]
    Field(#[from] ReadError),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ошибки потокового чтения кадров из `std::io::Read`.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Ошибка источника (последовательный порт, файл)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Кадр прочитан, но не декодировался; поток можно читать дальше
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

impl FrameError {
    /// Удобный конструктор для ошибок нагрузки.
    pub fn payload<E: Into<PayloadError>>(
        message_type: u8,
        err: E,
    ) -> Self {
        Self::PayloadDecode {
            message_type,
            source: err.into(),
        }
    }

    /// Можно ли пропустить кадр и читать дальше.
    ///
    /// Декодер не хранит состояния между вызовами, поэтому любая ошибка
    /// кадра локальна.
    pub fn is_recoverable(&self) -> bool {
        match self {
            FrameError::TruncatedHeader { .. }
            | FrameError::UnknownMessageType(_)
            | FrameError::PayloadDecode { .. } => true,
        }
    }

    /// Тип сообщения, если заголовок успел декодироваться.
    pub fn message_type(&self) -> Option<u8> {
        match self {
            FrameError::TruncatedHeader { .. } => None,
            FrameError::UnknownMessageType(t) => Some(*t),
            FrameError::PayloadDecode { message_type, .. } => Some(*message_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_messages() {
        let e = FrameError::TruncatedHeader { len: 3 };
        assert_eq!(
            e.to_string(),
            "Truncated frame header: 3 bytes, expected at least 5"
        );

        let e = FrameError::UnknownMessageType(0x7F);
        assert_eq!(e.to_string(), "Unknown message type: 0x7f");
        assert_eq!(e.message_type(), Some(0x7F));
    }

    #[test]
    fn test_payload_error_wraps_read_error() {
        let read = ReadError::InsufficientBytes {
            offset: 20,
            needed: 4,
            remaining: 1,
        };
        let e = FrameError::payload(1, read);

        assert!(e.is_recoverable());
        assert!(e.to_string().contains("need 4"));
        assert!(matches!(
            e,
            FrameError::PayloadDecode {
                message_type: 1,
                source: PayloadError::Field(_)
            }
        ));
    }

    #[test]
    fn test_capture_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: CaptureError = io.into();
        assert!(e.to_string().starts_with("I/O error"));
    }
}
