//! Owned big-endian output buffer.

use byteorder::{BigEndian, WriteBytesExt};
use half::f16;

use crate::util::Result;

/// Output buffer for encoding CMDL data.
///
/// Each framed section is encoded into its own `Writer`; the final stream is
/// assembled from those staged buffers, so no write ever seeks backwards.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    /// Write a u16 value (big-endian).
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buf.write_u16::<BigEndian>(value)?;
        Ok(())
    }

    /// Write a u32 value (big-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.write_u32::<BigEndian>(value)?;
        Ok(())
    }

    /// Write an f32 value (big-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.buf.write_f32::<BigEndian>(value)?;
        Ok(())
    }

    /// Write a half float (big-endian bits).
    pub fn write_f16(&mut self, value: f16) -> Result<()> {
        self.write_u16(value.to_bits())
    }

    /// Write `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) -> Result<()> {
        self.buf.resize(self.buf.len() + count, 0);
        Ok(())
    }

    /// Write zero bytes until the position is a multiple of `boundary`.
    pub fn pad_to(&mut self, boundary: usize) -> Result<()> {
        let pad = super::format::padding_for(self.pos(), boundary);
        self.buf.resize(self.buf.len() + pad, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_writes() -> Result<()> {
        let mut w = Writer::new();
        w.write_u32(0xDEADBABE)?;
        w.write_u16(2)?;
        w.write_u8(7)?;
        w.write_f32(1.0)?;
        w.write_f16(f16::from_f32(1.0))?;
        assert_eq!(
            w.as_bytes(),
            &[0xDE, 0xAD, 0xBA, 0xBE, 0x00, 0x02, 0x07, 0x3F, 0x80, 0x00, 0x00, 0x3C, 0x00]
        );
        Ok(())
    }

    #[test]
    fn test_pad_to() -> Result<()> {
        let mut w = Writer::new();
        w.pad_to(32)?;
        assert_eq!(w.pos(), 0);
        w.write_bytes(&[1, 2, 3])?;
        w.pad_to(32)?;
        assert_eq!(w.pos(), 32);
        assert!(w.as_bytes()[3..].iter().all(|&b| b == 0));
        Ok(())
    }
}
