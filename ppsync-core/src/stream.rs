use std::io::{ErrorKind, Read};

use log::debug;
use ppsync_types::{Frame, FrameError, StreamError, StreamResult, FRAME_SIZE};
use serde::Serialize;

use crate::telemetry;

/// Потоковый читатель телеметрических кадров.
///
/// Читает ровно [`FRAME_SIZE`] байт на кадр и не ищет границы кадров:
/// если источник потерял выравнивание, все последующие кадры будут
/// ошибочными, пока выравнивание не восстановится снаружи.
pub struct FrameReader<R: Read> {
    reader: R,
    buf: [u8; FRAME_SIZE],
    stats: ReadStats,
    eof: bool,
}

/// Статистика, накопленная [`FrameReader`] в процессе чтения.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Успешно декодированных кадров.
    pub frames_ok: u64,
    /// Кадров с неизвестным типом сообщения.
    pub unknown_type: u64,
    /// Кадров с повреждённой нагрузкой.
    pub payload_errors: u64,
    /// Всего обработано байт целых кадров.
    pub bytes_processed: u64,
    /// Байт неполного последнего кадра.
    pub trailing_bytes: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: inner,
            buf: [0u8; FRAME_SIZE],
            stats: ReadStats::default(),
            eof: false,
        }
    }

    /// Возвращает следующий кадр или `None` на EOF.
    ///
    /// Ошибка декодирования кадра не завершает поток: следующий вызов
    /// читает следующий кадр.
    pub fn next_frame(&mut self) -> Option<StreamResult<Frame>> {
        if self.eof {
            return None;
        }

        let n = match self.fill() {
            Ok(n) => n,
            Err(e) => return Some(Err(StreamError::Io(e))),
        };

        if n < FRAME_SIZE {
            self.eof = true;
            if n > 0 {
                debug!("Partial trailing frame: {n} bytes dropped");
                self.stats.trailing_bytes += n as u64;
            }
            return None;
        }

        self.stats.bytes_processed += FRAME_SIZE as u64;

        match telemetry::decode(&self.buf) {
            Ok(frame) => {
                self.stats.frames_ok += 1;
                Some(Ok(frame))
            }
            Err(e) => {
                match e {
                    FrameError::UnknownMessageType(_) => self.stats.unknown_type += 1,
                    FrameError::PayloadDecode { .. } | FrameError::TruncatedHeader { .. } => {
                        self.stats.payload_errors += 1
                    }
                }
                Some(Err(StreamError::Frame(e)))
            }
        }
    }

    /// Накопленная статистика чтения.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> std::io::Result<usize> {
        let mut filled = 0;
        fill_buffer(&mut self.reader, &mut self.buf, &mut filled)
    }
}

/// Дочитывает `buf` начиная с позиции `*filled`.
///
/// Как `read_exact`, но при EOF возвращает число прочитанных байт вместо
/// ошибки. `*filled` обновляется и при ошибке, поэтому после таймаута
/// чтение можно продолжить с того же места.
pub fn fill_buffer<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    filled: &mut usize,
) -> std::io::Result<usize> {
    while *filled < buf.len() {
        match reader.read(&mut buf[*filled..]) {
            Ok(0) => break,
            Ok(n) => *filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(*filled)
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = StreamResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}

/// Convenience: читает все корректные кадры, пропуская ошибочные.
///
/// Ошибки ввода/вывода прерывают чтение.
pub fn read_all_frames<R: Read>(reader: &mut FrameReader<R>) -> StreamResult<Vec<Frame>> {
    let mut frames = Vec::new();

    while let Some(result) = reader.next_frame() {
        match result {
            Ok(frame) => frames.push(frame),
            Err(StreamError::Frame(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(frames)
}
