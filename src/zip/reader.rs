//! Bounds-checked little-endian reads over an in-memory archive.
//!
//! The reader holds no position of its own. Every read takes an absolute
//! offset and returns the value together with the offset just past it, so
//! parse steps thread the cursor explicitly.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{VerifyError, VerifyResult};

/// Read-only view over the whole package file.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow `len` bytes starting at `at`.
    pub fn read_bytes(&self, at: usize, len: usize) -> VerifyResult<(&'a [u8], usize)> {
        let end = at.checked_add(len).ok_or(VerifyError::BadContainer)?;
        let bytes = self.buf.get(at..end).ok_or(VerifyError::BadContainer)?;
        Ok((bytes, end))
    }

    pub fn read_u16(&self, at: usize) -> VerifyResult<(u16, usize)> {
        let (bytes, next) = self.read_bytes(at, 2)?;
        Ok((LittleEndian::read_u16(bytes), next))
    }

    pub fn read_u32(&self, at: usize) -> VerifyResult<(u32, usize)> {
        let (bytes, next) = self.read_bytes(at, 4)?;
        Ok((LittleEndian::read_u32(bytes), next))
    }

    /// Read `len` bytes as a string, replacing invalid UTF-8.
    pub fn read_string(&self, at: usize, len: usize) -> VerifyResult<(String, usize)> {
        let (bytes, next) = self.read_bytes(at, len)?;
        Ok((String::from_utf8_lossy(bytes).into_owned(), next))
    }

    /// Advance `at` by `len` without reading, failing if it leaves the buffer.
    pub fn skip(&self, at: usize, len: usize) -> VerifyResult<usize> {
        let next = at.checked_add(len).ok_or(VerifyError::BadContainer)?;
        if next > self.buf.len() {
            return Err(VerifyError::BadContainer);
        }
        Ok(next)
    }

    /// True when a 32-bit little-endian `magic` sits at `at`.
    pub fn has_signature(&self, at: usize, magic: u32) -> bool {
        matches!(self.read_u32(at), Ok((value, _)) if value == magic)
    }
}
