//! Bounded big-endian reader over an in-memory CMDL stream.

use byteorder::{BigEndian, ByteOrder};
use half::f16;

use crate::util::{Error, Result};

/// Cursor over a byte slice.
///
/// A reader may be a window into a larger stream (a framed section); `base`
/// is the absolute offset of the window's first byte so errors and layout
/// reports always carry stream offsets.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader over a whole stream.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Position relative to the start of this reader's window.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Absolute stream offset of the cursor.
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Total size of this reader's window.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the window is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the window.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if the cursor reached the end of the window.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Move the cursor back to a previously observed position.
    pub fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.data.len());
        self.pos = pos.min(self.data.len());
    }

    fn eof(&self, needed: usize) -> Error {
        Error::UnexpectedEof { offset: self.offset(), needed }
    }

    /// Read `len` bytes and advance.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.eof(len));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Split off the next `len` bytes as an independent window and advance past them.
    pub fn take(&mut self, len: usize) -> Result<Reader<'a>> {
        let base = self.offset();
        let data = self.read_bytes(len)?;
        Ok(Reader { data, pos: 0, base })
    }

    /// Read a big-endian u32 at an absolute stream offset without moving the cursor.
    ///
    /// Used for the section length table, the only out-of-order read in the format.
    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        let start = offset
            .checked_sub(self.base)
            .ok_or(Error::UnexpectedEof { offset, needed: 4 })?;
        match self.data.get(start..start + 4) {
            Some(bytes) => Ok(BigEndian::read_u32(bytes)),
            None => Err(Error::UnexpectedEof { offset, needed: 4 }),
        }
    }

    /// Consume padding so the cursor is a multiple of `boundary` from the window start.
    ///
    /// Returns the skipped bytes so callers can check them.
    pub fn align_to(&mut self, boundary: usize) -> Result<&'a [u8]> {
        let pad = super::format::padding_for(self.pos, boundary);
        self.read_bytes(pad)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(self.read_bytes(4)?))
    }

    #[inline]
    pub fn read_f16(&mut self) -> Result<f16> {
        Ok(f16::from_bits(self.read_u16()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let data = [0xDE, 0xAD, 0xBA, 0xBE, 0x00, 0x02, 0x3F, 0x80, 0x00, 0x00, 0x3C, 0x00];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBABE);
        assert_eq!(r.read_u16().unwrap(), 2);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.read_f16().unwrap(), f16::from_f32(1.0));
        assert!(r.is_exhausted());
    }

    #[test]
    fn test_eof_reports_offset() {
        let data = [0u8; 3];
        let mut r = Reader::new(&data);
        r.skip(2).unwrap();
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { offset: 2, needed: 4 }));
    }

    #[test]
    fn test_take_keeps_absolute_offsets() {
        let data: Vec<u8> = (0..16).collect();
        let mut r = Reader::new(&data);
        r.skip(4).unwrap();
        let mut window = r.take(8).unwrap();
        assert_eq!(r.pos(), 12);
        assert_eq!(window.offset(), 4);
        assert_eq!(window.len(), 8);
        assert_eq!(window.read_u8().unwrap(), 4);
        assert_eq!(window.offset(), 5);
        assert_eq!(window.u32_at(8).unwrap(), 0x08090A0B);
        assert!(window.u32_at(10).is_err());
        assert!(window.u32_at(0).is_err());
    }

    #[test]
    fn test_align_and_rewind() {
        let data = [0u8; 64];
        let mut r = Reader::new(&data);
        r.skip(5).unwrap();
        assert_eq!(r.align_to(32).unwrap().len(), 27);
        assert_eq!(r.pos(), 32);
        assert!(r.align_to(32).unwrap().is_empty());
        assert_eq!(r.pos(), 32);
        r.rewind(3);
        assert_eq!(r.pos(), 3);
    }
}
