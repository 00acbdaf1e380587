//! Length and object headers.
//!
//! Every variable-length container is prefixed by a length header and every
//! fixed-arity structure by an object header.  Both are a little-endian `i32`:
//!
//! ```text
//! -1        container / object is absent (null)
//! 0..=MAX   present; element count (length) or member count (object)
//! < -1      malformed
//! ```
//!
//! The two kinds share an encoding but are kept apart so that decode errors
//! say which one was being read, and so structural layouts can later be
//! special-cased without ambiguity against sequence framing.

use crate::error::{HeaderKind, PackError, Result};
use crate::io_stream::{Reader, Writer};

/// Header value meaning "absent".
pub const NULL_HEADER: i32 = -1;

/// Encode an optional count as a header value.
pub fn encode_header(n: Option<usize>) -> Result<i32> {
    match n {
        None      => Ok(NULL_HEADER),
        Some(len) => i32::try_from(len).map_err(|_| PackError::LengthOverflow { len }),
    }
}

/// Decode a raw header value.  `Ok(None)` is the null sentinel.
pub fn decode_header(kind: HeaderKind, value: i32) -> Result<Option<usize>> {
    match value {
        NULL_HEADER => Ok(None),
        // Non-negative i32 always fits in usize on supported targets.
        v if v >= 0 => Ok(Some(v as usize)),
        v           => Err(PackError::MalformedHeader { kind, value: v }),
    }
}

impl Writer<'_> {
    pub fn write_length_header(&mut self, n: Option<usize>) -> Result<()> {
        let value = encode_header(n)?;
        self.write_i32(value)
    }

    #[inline]
    pub fn write_null_length_header(&mut self) -> Result<()> {
        self.write_i32(NULL_HEADER)
    }

    pub fn write_object_header(&mut self, arity: usize) -> Result<()> {
        let value = encode_header(Some(arity))?;
        self.write_i32(value)
    }

    #[inline]
    pub fn write_null_object_header(&mut self) -> Result<()> {
        self.write_i32(NULL_HEADER)
    }
}

impl Reader<'_> {
    /// Read a length header.  `Ok(None)` means the container is null and no
    /// payload follows.
    pub fn try_read_length_header(&mut self) -> Result<Option<usize>> {
        let value = self.read_i32()?;
        decode_header(HeaderKind::Length, value)
    }

    /// Read an object header.  `Ok(None)` means the object is null.
    pub fn try_read_object_header(&mut self) -> Result<Option<usize>> {
        let value = self.read_i32()?;
        decode_header(HeaderKind::Object, value)
    }

    /// Read an object header and require it to be present with exactly
    /// `arity` members.  `Ok(false)` means null.
    pub fn expect_object_header(&mut self, arity: usize) -> Result<bool> {
        match self.try_read_object_header()? {
            None => Ok(false),
            Some(actual) if actual == arity => Ok(true),
            Some(actual) => Err(PackError::ArityMismatch { expected: arity, actual }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;

    fn roundtrip_length(n: Option<usize>) -> Option<usize> {
        let packer = Packer::default();
        let mut out = Vec::new();
        Writer::new(&mut out, &packer).write_length_header(n).unwrap();
        assert_eq!(out.len(), 4);
        Reader::new(&out, &packer).try_read_length_header().unwrap()
    }

    #[test]
    fn length_header_symmetry() {
        assert_eq!(roundtrip_length(None), None);
        for n in [0usize, 1, 2, 255, 256, 65_535, 1 << 20, i32::MAX as usize] {
            assert_eq!(roundtrip_length(Some(n)), Some(n));
        }
    }

    #[test]
    fn null_header_is_all_ones() {
        let packer = Packer::default();
        let mut out = Vec::new();
        Writer::new(&mut out, &packer).write_null_length_header().unwrap();
        assert_eq!(out, [0xFF; 4]);
    }

    #[test]
    fn negative_header_is_malformed() {
        let packer = Packer::default();
        let bytes = (-2i32).to_le_bytes();
        let err = Reader::new(&bytes, &packer).try_read_object_header().unwrap_err();
        assert!(matches!(
            err,
            PackError::MalformedHeader { kind: HeaderKind::Object, value: -2 }
        ));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let len = i32::MAX as usize + 1;
        assert!(matches!(encode_header(Some(len)), Err(PackError::LengthOverflow { .. })));
    }

    #[test]
    fn object_header_arity_check() {
        let packer = Packer::default();
        let bytes = 3i32.to_le_bytes();
        let err = Reader::new(&bytes, &packer).expect_object_header(2).unwrap_err();
        assert!(matches!(err, PackError::ArityMismatch { expected: 2, actual: 3 }));

        let null = NULL_HEADER.to_le_bytes();
        assert!(!Reader::new(&null, &packer).expect_object_header(2).unwrap());
    }
}
