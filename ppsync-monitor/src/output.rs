use std::io::Write;

use chrono::NaiveDateTime;
use ppsync_types::{Frame, Payload};
use serde::Serialize;

use crate::{MonitorResult, OutputFormat};

/// Декодированный кадр вместе с производными величинами для вывода.
#[derive(Debug, Clone, Serialize)]
pub struct FrameEvent {
    /// Порядковый номер чанка в источнике
    pub seq: u64,
    /// Тик устройства как есть (u32)
    pub tick: u32,
    /// Тик с учётом переполнений
    pub tick_extended: u64,
    /// `tick_extended` в секундах
    pub seconds: f64,
    pub message_type: u8,
    /// Время GNSS (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc: Option<NaiveDateTime>,
    /// Генератор дисциплинирован (3D + PLL)
    pub disciplined: bool,
    pub payload: Payload,
}

impl FrameEvent {
    pub fn new(
        seq: u64,
        frame: Frame,
        tick_extended: u64,
    ) -> Self {
        let (utc, disciplined) = match &frame.payload {
            Payload::Position(p) => (p.utc(), p.is_disciplined()),
        };

        Self {
            seq,
            tick: frame.header.tick,
            tick_extended,
            seconds: tick_extended as f64 / ppsync_types::TICKS_PER_SECOND as f64,
            message_type: frame.header.message_type,
            utc,
            disciplined,
            payload: frame.payload,
        }
    }
}

impl std::fmt::Display for FrameEvent {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match &self.payload {
            Payload::Position(p) => {
                writeln!(f, "POSITION INFO")?;
                writeln!(f, "  Time          : {:.4} s (tick {})", self.seconds, self.tick)?;
                write!(f, "{p}")
            }
        }
    }
}

/// Пишет событие в выбранном формате (одна запись на кадр).
pub fn write_event<W: Write>(
    out: &mut W,
    format: OutputFormat,
    event: &FrameEvent,
) -> MonitorResult<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{event}\n")?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
