//! Bounds-checked reads over a borrowed byte buffer.

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("truncated: cannot read {len} bytes at offset {offset}, {available} available")]
pub struct Truncated {
    pub offset: usize,
    pub len: usize,
    pub available: usize,
}

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes.get(self.offset..).unwrap_or_default()
    }

    /// Moves to an absolute offset, which may equal the buffer length
    pub fn seek(&mut self, offset: usize) -> Result<(), Truncated> {
        if offset > self.bytes.len() {
            return Err(self.truncated(offset, 0));
        }
        self.offset = offset;
        Ok(())
    }

    #[inline]
    pub fn skip(&mut self, len: usize) -> Result<(), Truncated> {
        self.read(len).map(|_| ())
    }

    pub fn read(&mut self, len: usize) -> Result<&'a [u8], Truncated> {
        let bytes = self.peek_at(self.offset, len)?;
        self.offset += len;
        Ok(bytes)
    }

    /// Reads `len` bytes at an absolute offset without moving
    pub fn peek_at(&self, offset: usize, len: usize) -> Result<&'a [u8], Truncated> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or_else(|| self.truncated(offset, len))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Truncated> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Truncated> {
        self.read_array::<1>().map(|[b]| b)
    }

    #[inline]
    pub fn read_u16_be(&mut self) -> Result<u16, Truncated> {
        self.read_array().map(u16::from_be_bytes)
    }

    #[inline]
    pub fn read_u32_be(&mut self) -> Result<u32, Truncated> {
        self.read_array().map(u32::from_be_bytes)
    }

    const fn truncated(&self, offset: usize, len: usize) -> Truncated {
        Truncated {
            offset,
            len,
            available: self.bytes.len().saturating_sub(offset),
        }
    }
}
