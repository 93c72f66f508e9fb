use byteorder::ByteOrder;
use ppsync_types::{ReadError, ReadResult};

/// Курсор чтения над срезом байт.
///
/// Каждое поле читается явно и по порядку. При нехватке байт возвращается
/// [`ReadError::InsufficientBytes`], а позиция курсора не меняется.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, off: 0 }
    }

    /// Количество непрочитанных байт.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.off
    }

    /// Текущее смещение от начала буфера.
    pub fn position(&self) -> usize {
        self.off
    }

    /// Непрочитанный остаток буфера (курсор не двигается).
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.off..]
    }

    pub fn skip(
        &mut self,
        n: usize,
    ) -> ReadResult<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> ReadResult<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn read_i8(&mut self) -> ReadResult<i8> {
        self.take(1).map(|b| b[0] as i8)
    }

    /// Один байт, `true` для любого ненулевого значения.
    pub fn read_bool(&mut self) -> ReadResult<bool> {
        self.take(1).map(|b| b[0] != 0)
    }

    pub fn read_u16<E: ByteOrder>(&mut self) -> ReadResult<u16> {
        self.take(2).map(E::read_u16)
    }

    pub fn read_i16<E: ByteOrder>(&mut self) -> ReadResult<i16> {
        self.take(2).map(E::read_i16)
    }

    pub fn read_u32<E: ByteOrder>(&mut self) -> ReadResult<u32> {
        self.take(4).map(E::read_u32)
    }

    pub fn read_i32<E: ByteOrder>(&mut self) -> ReadResult<i32> {
        self.take(4).map(E::read_i32)
    }

    pub fn read_u64<E: ByteOrder>(&mut self) -> ReadResult<u64> {
        self.take(8).map(E::read_u64)
    }

    fn take(
        &mut self,
        n: usize,
    ) -> ReadResult<&'a [u8]> {
        let remaining = self.remaining();

        if remaining < n {
            return Err(ReadError::InsufficientBytes {
                offset: self.off,
                needed: n,
                remaining,
            });
        }

        let bytes = &self.buf[self.off..self.off + n];
        self.off += n;

        Ok(bytes)
    }
}
