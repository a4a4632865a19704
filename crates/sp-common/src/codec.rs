// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Little-endian record codec
//!
//! On-flash records are decoded field by field through [`Reader`] and
//! produced by [`Writer`]. Both cursors fail with
//! [`Error::TruncatedRecord`] instead of panicking when the buffer runs out.

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::errors::{Error, Result};

/// CRC-32 (ISO-HDLC, as used by zlib) engine
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Compute the CRC-32 of `data`
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Cursor reading little-endian fields from a byte slice
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `buf`
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::TruncatedRecord)?;
        let out = self.buf.get(self.pos..end).ok_or(Error::TruncatedRecord)?;
        self.pos = end;
        Ok(out)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Read a fixed-size byte array
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a little-endian `u32`
    pub fn u32(&mut self) -> Result<u32> {
        self.array::<4>().map(u32::from_le_bytes)
    }

    /// Read a little-endian `u64`
    pub fn u64(&mut self) -> Result<u64> {
        self.array::<8>().map(u64::from_le_bytes)
    }
}

/// Cursor writing little-endian fields into a byte slice
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    /// Create a writer positioned at the start of `buf`
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn slot(&mut self, len: usize) -> Result<&mut [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::TruncatedRecord)?;
        let start = self.pos;
        let out = self.buf.get_mut(start..end).ok_or(Error::TruncatedRecord)?;
        self.pos = end;
        Ok(out)
    }

    /// Write raw bytes
    pub fn bytes(&mut self, data: &[u8]) -> Result<()> {
        self.slot(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Write `len` zero bytes
    pub fn zeros(&mut self, len: usize) -> Result<()> {
        self.slot(len)?.fill(0);
        Ok(())
    }

    /// Write a little-endian `u32`
    pub fn u32(&mut self, value: u32) -> Result<()> {
        self.bytes(&value.to_le_bytes())
    }

    /// Write a little-endian `u64`
    pub fn u64(&mut self, value: u64) -> Result<()> {
        self.bytes(&value.to_le_bytes())
    }
}
