//! Output sink and input cursor used by every formatter.
//!
//! # Writer
//! [`Writer`] appends to a caller-owned `Vec<u8>`.  It also carries the
//! [`Packer`] the call was started from, so nested formatters can resolve
//! element formatters and check out staging buffers without any global state.
//!
//! # Reader
//! [`Reader`] is a forward-only cursor over a borrowed byte slice.  Every read
//! is bounds-checked up front and fails with
//! [`PackError::UnexpectedEndOfInput`] rather than reading short.
//!
//! # Endianness
//! Fixed-width integers written through these helpers (headers, string
//! lengths, flags) are little-endian.  Raw spans written with
//! [`Writer::write_raw_bytes`] are copied verbatim.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::codec::FormatterRegistry;
use crate::error::{PackError, Result};
use crate::packer::Packer;

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct Writer<'a> {
    buf:    &'a mut Vec<u8>,
    packer: &'a Packer,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut Vec<u8>, packer: &'a Packer) -> Self {
        Self { buf, packer }
    }

    #[inline]
    pub fn packer(&self) -> &'a Packer { self.packer }

    #[inline]
    pub fn registry(&self) -> &'a FormatterRegistry { self.packer.registry() }

    /// Total bytes currently held by the underlying sink.
    #[inline]
    pub fn written(&self) -> usize { self.buf.len() }

    #[inline]
    pub fn write_raw_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.buf.write_u8(v)?;
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.buf.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.buf.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    /// Serialize `value` with the formatter registered for `T`.
    pub fn write_value<T: 'static>(&mut self, value: &T) -> Result<()> {
        let formatter = self.registry().resolve::<T>()?;
        formatter.serialize(self, value)
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct Reader<'a> {
    buf:    &'a [u8],
    pos:    usize,
    packer: &'a Packer,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8], packer: &'a Packer) -> Self {
        Self { buf, pos: 0, packer }
    }

    #[inline]
    pub fn packer(&self) -> &'a Packer { self.packer }

    #[inline]
    pub fn registry(&self) -> &'a FormatterRegistry { self.packer.registry() }

    #[inline]
    pub fn position(&self) -> usize { self.pos }

    #[inline]
    pub fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_raw_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(PackError::UnexpectedEndOfInput { needed: n, remaining });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut bytes = self.read_raw_bytes(1)?;
        Ok(bytes.read_u8()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let mut bytes = self.read_raw_bytes(4)?;
        Ok(bytes.read_i32::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut bytes = self.read_raw_bytes(4)?;
        Ok(bytes.read_u32::<LittleEndian>()?)
    }

    /// Deserialize a `T` with the formatter registered for it.
    pub fn read_value<T: 'static>(&mut self) -> Result<T> {
        let formatter = self.registry().resolve::<T>()?;
        formatter.deserialize(self)
    }

    /// Deserialize into an existing `T`, letting the formatter reuse its
    /// storage where it supports that.
    pub fn read_value_into<T: 'static>(&mut self, slot: &mut T) -> Result<()> {
        let formatter = self.registry().resolve::<T>()?;
        formatter.deserialize_into(self, slot)
    }

    /// Upper bound for a pre-allocation driven by an untrusted count: never
    /// reserve more slots than there are bytes left to decode them from.
    #[inline]
    pub(crate) fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.remaining())
    }
}
