use byteorder::ByteOrder;

/// Курсор записи: зеркало [`FieldReader`](super::FieldReader) поверх `Vec<u8>`.
#[derive(Debug, Clone, Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(
        &mut self,
        val: u8,
    ) {
        self.buf.push(val);
    }

    pub fn write_bool(
        &mut self,
        val: bool,
    ) {
        self.buf.push(val as u8);
    }

    pub fn write_u16<E: ByteOrder>(
        &mut self,
        val: u16,
    ) {
        let mut b = [0u8; 2];
        E::write_u16(&mut b, val);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_i16<E: ByteOrder>(
        &mut self,
        val: i16,
    ) {
        let mut b = [0u8; 2];
        E::write_i16(&mut b, val);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_u32<E: ByteOrder>(
        &mut self,
        val: u32,
    ) {
        let mut b = [0u8; 4];
        E::write_u32(&mut b, val);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_i32<E: ByteOrder>(
        &mut self,
        val: i32,
    ) {
        let mut b = [0u8; 4];
        E::write_i32(&mut b, val);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_u64<E: ByteOrder>(
        &mut self,
        val: u64,
    ) {
        let mut b = [0u8; 8];
        E::write_u64(&mut b, val);
        self.buf.extend_from_slice(&b);
    }

    /// Дополняет буфер нулями до длины `len` (если он короче).
    pub fn pad_to(
        &mut self,
        len: usize,
    ) {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
