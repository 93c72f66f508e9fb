//! Декодер и писатель файлов захвата IQ.
//!
//! Файл состоит из 24-байтового заголовка ([`CaptureFileHeader`]) и
//! следующего за ним потока пар `(i16 I, i16 Q)`. Все числа little-endian.

use std::{
    io::{BufWriter, Write},
    iter::FusedIterator,
    path::Path,
    slice::ChunksExact,
};

use byteorder::{ByteOrder, LittleEndian};
use ppsync_types::{
    CaptureError, CaptureFileHeader, CaptureResult, CaptureWarning, IqSample,
    CAPTURE_HEADER_SIZE, IQ_SAMPLE_SIZE,
};

use crate::{
    binary::{FieldReader, FieldWriter},
    summary::CaptureSummary,
};

/// Кодирование/декодирование заголовка файла захвата.
pub trait CaptureHeaderExt: Sized {
    /// Декодирует и проверяет заголовок из первых 24 байт.
    fn decode(buf: &[u8]) -> CaptureResult<Self>;

    /// Сериализация заголовка в 24 байта.
    fn encode(&self) -> [u8; CAPTURE_HEADER_SIZE];
}

impl CaptureHeaderExt for CaptureFileHeader {
    fn decode(buf: &[u8]) -> CaptureResult<Self> {
        if buf.len() < CAPTURE_HEADER_SIZE {
            return Err(CaptureError::TooShortForHeader { len: buf.len() });
        }

        let mut r = FieldReader::new(&buf[..CAPTURE_HEADER_SIZE]);
        let header = CaptureFileHeader {
            capture_epoch_seconds: r.read_u64::<LittleEndian>()?,
            first_sample_index: r.read_u64::<LittleEndian>()?,
            sync_sample_index: r.read_u64::<LittleEndian>()?,
        };

        validate_sync(&header)?;

        Ok(header)
    }

    fn encode(&self) -> [u8; CAPTURE_HEADER_SIZE] {
        let mut w = FieldWriter::with_capacity(CAPTURE_HEADER_SIZE);
        w.write_u64::<LittleEndian>(self.capture_epoch_seconds);
        w.write_u64::<LittleEndian>(self.first_sample_index);
        w.write_u64::<LittleEndian>(self.sync_sample_index);

        let mut buf = [0u8; CAPTURE_HEADER_SIZE];
        buf.copy_from_slice(w.as_slice());
        buf
    }
}

/// Ленивая последовательность IQ выборок поверх байт файла.
///
/// Ничего не копирует; каждый вызов [`IqSamples::iter`] начинает обход
/// заново.
#[derive(Debug, Clone, Copy)]
pub struct IqSamples<'a> {
    data: &'a [u8],
}

/// Итератор по [`IqSamples`].
#[derive(Debug, Clone)]
pub struct IqSampleIter<'a> {
    chunks: ChunksExact<'a, u8>,
}

/// Результат декодирования файла захвата.
#[derive(Debug, Clone)]
pub struct DecodedCapture<'a> {
    pub header: CaptureFileHeader,
    pub samples: IqSamples<'a>,
    /// Замечание о неполной последней выборке
    pub warning: Option<CaptureWarning>,
}

impl<'a> IqSamples<'a> {
    /// Оборачивает байты выборок. Неполная последняя пара отбрасывается.
    pub fn new(data: &'a [u8]) -> Self {
        let whole = data.len() - data.len() % IQ_SAMPLE_SIZE;
        Self {
            data: &data[..whole],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() / IQ_SAMPLE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(
        &self,
        index: usize,
    ) -> Option<IqSample> {
        let start = index.checked_mul(IQ_SAMPLE_SIZE)?;
        let end = start.checked_add(IQ_SAMPLE_SIZE)?;
        self.data.get(start..end).map(decode_sample)
    }

    pub fn iter(&self) -> IqSampleIter<'a> {
        IqSampleIter {
            chunks: self.data.chunks_exact(IQ_SAMPLE_SIZE),
        }
    }

    pub fn to_vec(&self) -> Vec<IqSample> {
        self.iter().collect()
    }

    /// Сырые байты выборок (кратны [`IQ_SAMPLE_SIZE`]).
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

impl<'a> IntoIterator for IqSamples<'a> {
    type Item = IqSample;
    type IntoIter = IqSampleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &IqSamples<'a> {
    type Item = IqSample;
    type IntoIter = IqSampleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Iterator for IqSampleIter<'_> {
    type Item = IqSample;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(decode_sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }

    fn nth(
        &mut self,
        n: usize,
    ) -> Option<Self::Item> {
        self.chunks.nth(n).map(decode_sample)
    }
}

impl DoubleEndedIterator for IqSampleIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back().map(decode_sample)
    }
}

impl ExactSizeIterator for IqSampleIter<'_> {}

impl FusedIterator for IqSampleIter<'_> {}

impl<'a> DecodedCapture<'a> {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Количество пропущенных байт в хвосте файла (0..=3).
    pub fn trailing_bytes(&self) -> usize {
        match self.warning {
            Some(CaptureWarning::TrailingBytesIgnored(n)) => n,
            None => 0,
        }
    }

    /// Производные величины для заданной частоты дискретизации.
    pub fn summary(
        &self,
        sample_rate_hz: u32,
    ) -> CaptureSummary {
        CaptureSummary::new(self, sample_rate_hz)
    }
}

/// Декодирует полный буфер файла захвата.
///
/// Хвост из 1-3 байт не считается ошибкой: выборки декодируются, а в
/// `warning` возвращается [`CaptureWarning::TrailingBytesIgnored`].
pub fn decode_capture(buf: &[u8]) -> CaptureResult<DecodedCapture<'_>> {
    let header = CaptureFileHeader::decode(buf)?;
    let payload = &buf[CAPTURE_HEADER_SIZE..];

    let trailing = payload.len() % IQ_SAMPLE_SIZE;
    let warning = (trailing != 0).then_some(CaptureWarning::TrailingBytesIgnored(trailing));

    Ok(DecodedCapture {
        header,
        samples: IqSamples::new(payload),
        warning,
    })
}

/// Читает файл захвата целиком в память.
pub fn load_capture<P: AsRef<Path>>(path: P) -> CaptureResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Потоковый писатель файлов захвата.
pub struct CaptureWriter<W: Write> {
    writer: BufWriter<W>,
    header: CaptureFileHeader,
    samples_written: u64,
}

impl<W: Write> CaptureWriter<W> {
    /// Создаёт писатель, проверяя заголовок и сразу записывая его в поток.
    pub fn new(
        inner: W,
        header: CaptureFileHeader,
    ) -> CaptureResult<Self> {
        validate_sync(&header)?;

        let mut writer = BufWriter::new(inner);
        writer.write_all(&header.encode())?;

        Ok(Self {
            writer,
            header,
            samples_written: 0,
        })
    }

    pub fn write_sample(
        &mut self,
        sample: IqSample,
    ) -> CaptureResult<()> {
        self.writer.write_all(&encode_sample(sample))?;
        self.samples_written += 1;

        Ok(())
    }

    pub fn write_samples(
        &mut self,
        samples: &[IqSample],
    ) -> CaptureResult<()> {
        for &s in samples {
            self.write_sample(s)?;
        }

        Ok(())
    }

    /// Записывает буфер драйвера в формате IQIQIQ...
    ///
    /// Нечётная длина означает неполную пару и отклоняется целиком.
    pub fn write_interleaved(
        &mut self,
        data: &[i16],
    ) -> CaptureResult<()> {
        if data.len() % 2 != 0 {
            return Err(CaptureError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("interleaved IQ buffer has odd length {}", data.len()),
            )));
        }

        for pair in data.chunks_exact(2) {
            self.write_sample(IqSample::new(pair[0], pair[1]))?;
        }

        Ok(())
    }

    /// Количество записанных IQ пар.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    pub fn header(&self) -> &CaptureFileHeader {
        &self.header
    }

    /// Сбрасывает буфер и возвращает внутренний поток.
    pub fn finish(mut self) -> CaptureResult<W> {
        self.writer.flush()?;

        self.writer
            .into_inner()
            .map_err(|e| CaptureError::Io(e.into_error()))
    }
}

/// Кодирует выборку в 4 байта (I, затем Q).
pub fn encode_sample(sample: IqSample) -> [u8; IQ_SAMPLE_SIZE] {
    let mut buf = [0u8; IQ_SAMPLE_SIZE];
    LittleEndian::write_i16(&mut buf[0..2], sample.i);
    LittleEndian::write_i16(&mut buf[2..4], sample.q);
    buf
}

fn decode_sample(chunk: &[u8]) -> IqSample {
    IqSample {
        i: LittleEndian::read_i16(&chunk[0..2]),
        q: LittleEndian::read_i16(&chunk[2..4]),
    }
}

fn validate_sync(header: &CaptureFileHeader) -> CaptureResult<()> {
    if !header.is_sync_valid() {
        return Err(CaptureError::InvalidSyncOffset {
            first_sample_index: header.first_sample_index,
            sync_sample_index: header.sync_sample_index,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn build(
        header: CaptureFileHeader,
        samples: &[(i16, i16)],
    ) -> Vec<u8> {
        let mut raw = header.encode().to_vec();
        for &(i, q) in samples {
            raw.extend_from_slice(&encode_sample(IqSample::new(i, q)));
        }
        raw
    }

    #[test]
    fn test_header_byte_layout() {
        let h = CaptureFileHeader::new(1_700_000_000, 1_000, 1_030);
        let bytes = h.encode();

        assert_eq!(&bytes[0..8], &1_700_000_000u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &1_000u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &1_030u64.to_le_bytes());
    }

    #[test]
    fn test_round_trip_reference_vector() {
        let header = CaptureFileHeader::new(1_700_000_000, 1_000, 1_030);
        let raw = build(header, &[(1, -1), (100, -100)]);

        let decoded = decode_capture(&raw).unwrap();
        assert_eq!(decoded.header, header);
        assert_eq!(decoded.header.pps_offset(), 30);
        assert!(decoded.warning.is_none());
        assert_eq!(
            decoded.samples.to_vec(),
            vec![IqSample::new(1, -1), IqSample::new(100, -100)]
        );
    }

    #[test]
    fn test_header_only_is_empty_capture() {
        let raw = CaptureFileHeader::new(1, 2, 2).encode();
        let decoded = decode_capture(&raw).unwrap();

        assert!(decoded.samples.is_empty());
        assert_eq!(decoded.samples.iter().count(), 0);
        assert!(decoded.warning.is_none());
    }

    #[test]
    fn test_too_short_for_header() {
        for len in [0usize, 1, 8, 23] {
            let raw = vec![0u8; len];
            match decode_capture(&raw) {
                Err(CaptureError::TooShortForHeader { len: l }) => assert_eq!(l, len),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_sync_offset() {
        let mut raw = CaptureFileHeader::new(0, 1_000, 1_030).encode();
        // sync = 999 < first = 1000
        raw[16..24].copy_from_slice(&999u64.to_le_bytes());

        match decode_capture(&raw) {
            Err(CaptureError::InvalidSyncOffset {
                first_sample_index,
                sync_sample_index,
            }) => {
                assert_eq!(first_sample_index, 1_000);
                assert_eq!(sync_sample_index, 999);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_bytes_warning() {
        for extra in 1..IQ_SAMPLE_SIZE {
            let mut raw = build(
                CaptureFileHeader::new(0, 0, 5),
                &[(1, 2), (3, 4), (5, 6)],
            );
            raw.extend(std::iter::repeat(0xEE).take(extra));

            let decoded = decode_capture(&raw).unwrap();
            assert_eq!(decoded.sample_count(), 3);
            assert_eq!(decoded.trailing_bytes(), extra);
            assert_eq!(
                decoded.warning,
                Some(CaptureWarning::TrailingBytesIgnored(extra))
            );
            assert_eq!(decoded.samples.get(2), Some(IqSample::new(5, 6)));
            assert_eq!(decoded.samples.get(3), None);
        }
    }

    #[test]
    fn test_samples_are_restartable() {
        let raw = build(CaptureFileHeader::new(0, 0, 0), &[(1, 1), (2, 2), (3, 3)]);
        let decoded = decode_capture(&raw).unwrap();

        let first: Vec<_> = decoded.samples.iter().collect();
        let second: Vec<_> = (&decoded.samples).into_iter().collect();
        assert_eq!(first, second);

        let reversed: Vec<_> = decoded.samples.iter().rev().map(|s| s.i).collect();
        assert_eq!(reversed, vec![3, 2, 1]);

        let mut it = decoded.samples.iter();
        assert_eq!(it.len(), 3);
        it.next();
        assert_eq!(it.len(), 2);
        assert_eq!(it.nth(1), Some(IqSample::new(3, 3)));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_writer_matches_encoder() {
        let header = CaptureFileHeader::new(1_700_000_000, 1_000, 1_030);
        let mut writer = CaptureWriter::new(Cursor::new(Vec::new()), header).unwrap();

        writer.write_interleaved(&[1, -1, 100, -100]).unwrap();
        assert_eq!(writer.samples_written(), 2);

        let raw = writer.finish().unwrap().into_inner();
        assert_eq!(raw, build(header, &[(1, -1), (100, -100)]));
    }

    #[test]
    fn test_writer_rejects_odd_interleaved() {
        let header = CaptureFileHeader::new(0, 0, 0);
        let mut writer = CaptureWriter::new(Vec::new(), header).unwrap();

        assert!(writer.write_interleaved(&[1, 2, 3]).is_err());
        assert_eq!(writer.samples_written(), 0);
    }

    #[test]
    fn test_writer_rejects_invalid_header() {
        let header = CaptureFileHeader::new(0, 10, 9);
        assert!(matches!(
            CaptureWriter::new(Vec::new(), header),
            Err(CaptureError::InvalidSyncOffset { .. })
        ));
    }

    #[test]
    fn test_extreme_sample_values() {
        let raw = build(
            CaptureFileHeader::new(0, 0, 0),
            &[(i16::MIN, i16::MAX), (0, -1)],
        );
        let samples = decode_capture(&raw).unwrap().samples.to_vec();

        assert_eq!(samples[0], IqSample::new(i16::MIN, i16::MAX));
        assert!(samples[0].is_clipped());
        assert_eq!(samples[1], IqSample::new(0, -1));
    }
}
