//! Append-only byte cursor used by the container encoders.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Growable output buffer that tracks its current write offset.
///
/// Writing to a `Vec` cannot fail, so unlike `byteorder::WriteBytesExt` the
/// methods here return nothing and can be chained through `&mut self`.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Offset at which the next byte will be written.
    pub fn offset(&self) -> usize {
        self.buf.len()
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn u16_le(&mut self, value: u16) -> &mut Self {
        let mut raw = [0u8; 2];
        LittleEndian::write_u16(&mut raw, value);
        self.bytes(&raw)
    }

    pub fn u32_le(&mut self, value: u32) -> &mut Self {
        let mut raw = [0u8; 4];
        LittleEndian::write_u32(&mut raw, value);
        self.bytes(&raw)
    }

    pub fn u32_be(&mut self, value: u32) -> &mut Self {
        let mut raw = [0u8; 4];
        BigEndian::write_u32(&mut raw, value);
        self.bytes(&raw)
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Consumes the writer and returns the written bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
