//! Раскладка телеметрического кадра GPSDO.
//!
//! Устройство непрерывно передаёт кадры фиксированной длины 128 байт:
//!
//! ```text
//! [0]      TYPE     u8   тип сообщения
//! [1..5]   TICK     u32  системный счётчик устройства (LE, 1 тик = 100 мкс)
//! [5..128] PAYLOAD  [u8] нагрузка, раскладка зависит от TYPE
//! ```

use std::time::Duration;

use serde::Serialize;

use crate::PositionRecord;

/// Полный размер кадра в байтах.
pub const FRAME_SIZE: usize = 128;

/// Размер общего заголовка кадра (тип + тик).
pub const FRAME_HEADER_SIZE: usize = 5;

/// Область нагрузки после заголовка.
pub const FRAME_PAYLOAD_CAPACITY: usize = FRAME_SIZE - FRAME_HEADER_SIZE;

/// Частота системного счётчика: 10 000 тиков в секунду.
pub const TICKS_PER_SECOND: u32 = 10_000;

/// Тип сообщения: позиция и состояние PLL.
pub const MESSAGE_POSITION: u8 = 0x01;

/// Общий заголовок кадра.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    /// Тег типа сообщения
    pub message_type: u8,
    /// Время устройства в тиках по 100 мкс (может переполняться)
    pub tick: u32,
}

/// Нагрузка кадра, выбранная по типу сообщения.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// `MESSAGE_POSITION`
    Position(PositionRecord),
}

/// Декодированный кадр: заголовок и нагрузка.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Payload,
}

impl FrameHeader {
    pub fn new(
        message_type: u8,
        tick: u32,
    ) -> Self {
        Self { message_type, tick }
    }

    /// Время устройства в секундах.
    pub fn seconds(&self) -> f64 {
        self.tick as f64 / TICKS_PER_SECOND as f64
    }

    /// Время устройства как [`Duration`] (без потери точности).
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.tick as u64 * 100)
    }
}

impl Payload {
    /// Тег типа, под которым нагрузка передаётся в кадре.
    pub fn message_type(&self) -> u8 {
        match self {
            Payload::Position(_) => MESSAGE_POSITION,
        }
    }
}

impl Frame {
    pub fn new(
        header: FrameHeader,
        payload: Payload,
    ) -> Self {
        Self { header, payload }
    }

    /// Позиционная нагрузка, если кадр её содержит.
    pub fn position(&self) -> Option<&PositionRecord> {
        match &self.payload {
            Payload::Position(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_to_seconds() {
        let h = FrameHeader::new(MESSAGE_POSITION, 123_456);
        assert!((h.seconds() - 12.3456).abs() < 1e-12);
        assert_eq!(h.elapsed(), Duration::from_micros(12_345_600));
    }

    #[test]
    fn test_tick_max_does_not_overflow() {
        let h = FrameHeader::new(0, u32::MAX);
        assert_eq!(h.elapsed().as_micros(), u32::MAX as u128 * 100);
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(FRAME_PAYLOAD_CAPACITY, 123);
        assert_eq!(FRAME_HEADER_SIZE + FRAME_PAYLOAD_CAPACITY, FRAME_SIZE);
    }
}
