//! Декодер телеметрических кадров GPSDO.
//!
//! Кадр всегда имеет длину [`FRAME_SIZE`]: общий заголовок
//! (тип + тик) и нагрузка, раскладка которой выбирается по типу
//! сообщения. Декодер не хранит состояние между вызовами и не пытается
//! восстановить выравнивание потока: граница чанка считается границей
//! кадра.

use byteorder::LittleEndian;
use ppsync_types::{
    Frame, FrameError, FrameHeader, FrameResult, Payload, PayloadError, PositionRecord,
    FRAME_HEADER_SIZE, FRAME_SIZE, MESSAGE_POSITION, POSITION_PAYLOAD_SIZE,
};

use crate::binary::{FieldReader, FieldWriter};

/// Кодирование/декодирование позиционной нагрузки.
pub trait PositionRecordExt: Sized {
    /// Декодирует нагрузку из начала `buf` (лишние байты игнорируются).
    fn decode(buf: &[u8]) -> Result<Self, PayloadError>;

    /// Дописывает нагрузку в `w` (ровно [`POSITION_PAYLOAD_SIZE`] байт).
    fn encode(
        &self,
        w: &mut FieldWriter,
    );
}

impl PositionRecordExt for PositionRecord {
    fn decode(buf: &[u8]) -> Result<Self, PayloadError> {
        let mut r = FieldReader::new(buf);

        let record = PositionRecord {
            longitude_raw: r.read_i32::<LittleEndian>()?,
            latitude_raw: r.read_i32::<LittleEndian>()?,
            height_raw: r.read_i32::<LittleEndian>()?,
            satellite_count: r.read_u8()?,
            fix_type: r.read_u8()?,
            year: r.read_i16::<LittleEndian>()?,
            month: r.read_u8()?,
            day: r.read_u8()?,
            hour: r.read_u8()?,
            minute: r.read_u8()?,
            second: r.read_u8()?,
            pll_locked: r.read_bool()?,
        };

        if record.utc().is_none() {
            return Err(PayloadError::InvalidTimestamp {
                year: record.year,
                month: record.month,
                day: record.day,
                hour: record.hour,
                minute: record.minute,
                second: record.second,
            });
        }

        Ok(record)
    }

    fn encode(
        &self,
        w: &mut FieldWriter,
    ) {
        w.write_i32::<LittleEndian>(self.longitude_raw);
        w.write_i32::<LittleEndian>(self.latitude_raw);
        w.write_i32::<LittleEndian>(self.height_raw);
        w.write_u8(self.satellite_count);
        w.write_u8(self.fix_type);
        w.write_i16::<LittleEndian>(self.year);
        w.write_u8(self.month);
        w.write_u8(self.day);
        w.write_u8(self.hour);
        w.write_u8(self.minute);
        w.write_u8(self.second);
        w.write_bool(self.pll_locked);
    }
}

/// Декодирует общий заголовок из байт `[0..5)`.
pub fn decode_header(buf: &[u8]) -> FrameResult<FrameHeader> {
    let len = buf.len();
    let truncated = |_| FrameError::TruncatedHeader { len };

    if len < FRAME_HEADER_SIZE {
        return Err(FrameError::TruncatedHeader { len });
    }

    let mut r = FieldReader::new(&buf[..FRAME_HEADER_SIZE]);
    let message_type = r.read_u8().map_err(truncated)?;
    let tick = r.read_u32::<LittleEndian>().map_err(truncated)?;

    Ok(FrameHeader { message_type, tick })
}

/// Декодирует один кадр в заголовок и типизированную нагрузку.
///
/// Неизвестный тип сообщения даёт [`FrameError::UnknownMessageType`]:
/// кадр пропускается, поток продолжается.
pub fn decode_frame(buf: &[u8]) -> FrameResult<(FrameHeader, Payload)> {
    let header = decode_header(buf)?;
    let body = &buf[FRAME_HEADER_SIZE..];

    let payload = match header.message_type {
        MESSAGE_POSITION => PositionRecord::decode(body)
            .map(Payload::Position)
            .map_err(|e| FrameError::payload(MESSAGE_POSITION, e))?,
        other => return Err(FrameError::UnknownMessageType(other)),
    };

    Ok((header, payload))
}

/// То же, что [`decode_frame`], но собирает результат в [`Frame`].
pub fn decode(buf: &[u8]) -> FrameResult<Frame> {
    decode_frame(buf).map(|(header, payload)| Frame { header, payload })
}

/// Кодирует нагрузку в полный кадр. Хвост после нагрузки заполняется нулями.
pub fn encode_frame(
    tick: u32,
    payload: &Payload,
) -> [u8; FRAME_SIZE] {
    let mut w = FieldWriter::with_capacity(FRAME_SIZE);

    w.write_u8(payload.message_type());
    w.write_u32::<LittleEndian>(tick);

    match payload {
        Payload::Position(p) => p.encode(&mut w),
    }

    w.pad_to(FRAME_SIZE);

    let mut frame = [0u8; FRAME_SIZE];
    frame.copy_from_slice(&w.as_slice()[..FRAME_SIZE]);
    frame
}

/// Длина нагрузки для известного типа сообщения.
pub fn payload_size(message_type: u8) -> Option<usize> {
    match message_type {
        MESSAGE_POSITION => Some(POSITION_PAYLOAD_SIZE),
        _ => None,
    }
}
