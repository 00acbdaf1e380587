//! Fixed-arity pair codec for `(K, V)`.
//!
//! # Wire format
//! When both halves are blittable the pair is copied as raw bytes, key first,
//! with no header:
//! ```text
//! [ key bytes ][ value bytes ]
//! ```
//! Otherwise it is an object with arity [`PAIR_ARITY`]:
//! ```text
//! [ 2: i32 ][ key ][ value ]
//! ```
//! `Option<(K, V)>` always uses the object form so that `None` has a null
//! header to live in.  Any header other than 2 is rejected; there is no
//! tolerance for added or missing members.

use std::marker::PhantomData;
use std::slice;

use crate::codec::{Formatter, FormatterRegistry, RawLayout};
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

/// Number of members in a serialized pair.
pub const PAIR_ARITY: usize = 2;

pub struct PairFormatter<K, V>(PhantomData<fn() -> (K, V)>);

impl<K, V> PairFormatter<K, V> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> Default for PairFormatter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static, V: 'static> PairFormatter<K, V> {
    fn write_members(writer: &mut Writer<'_>, key: &K, value: &V) -> Result<()> {
        writer.write_object_header(PAIR_ARITY)?;
        writer.write_value(key)?;
        writer.write_value(value)
    }

    fn read_members(reader: &mut Reader<'_>) -> Result<(K, V)> {
        let key = reader.read_value::<K>()?;
        let value = reader.read_value::<V>()?;
        Ok((key, value))
    }

    fn read_raw(reader: &mut Reader<'_>, keys: &dyn RawLayout<K>, values: &dyn RawLayout<V>) -> Result<(K, V)> {
        let key_size = keys.element_size();
        let bytes = reader.read_raw_bytes(key_size + values.element_size())?;
        let (key, value) = bytes.split_at(key_size);
        Ok((keys.from_bytes(key), values.from_bytes(value)))
    }
}

impl<K: 'static, V: 'static> Formatter<(K, V)> for PairFormatter<K, V> {
    fn serialize(&self, writer: &mut Writer<'_>, (key, value): &(K, V)) -> Result<()> {
        let registry = writer.registry();
        let key_formatter = registry.resolve::<K>()?;
        let value_formatter = registry.resolve::<V>()?;

        if let (Some(keys), Some(values)) = (key_formatter.raw_layout(), value_formatter.raw_layout()) {
            writer.write_raw_bytes(keys.bytes_of(slice::from_ref(key)));
            writer.write_raw_bytes(values.bytes_of(slice::from_ref(value)));
            return Ok(());
        }
        Self::write_members(writer, key, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<(K, V)> {
        let registry = reader.registry();
        let key_formatter = registry.resolve::<K>()?;
        let value_formatter = registry.resolve::<V>()?;

        if let (Some(keys), Some(values)) = (key_formatter.raw_layout(), value_formatter.raw_layout()) {
            return Self::read_raw(reader, keys, values);
        }
        if !reader.expect_object_header(PAIR_ARITY)? {
            return Err(PackError::unexpected_null::<(K, V)>());
        }
        Self::read_members(reader)
    }
}

impl<K: 'static, V: 'static> Formatter<Option<(K, V)>> for PairFormatter<K, V> {
    fn serialize(&self, writer: &mut Writer<'_>, pair: &Option<(K, V)>) -> Result<()> {
        match pair {
            Some((key, value)) => Self::write_members(writer, key, value),
            None               => writer.write_null_object_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<(K, V)>> {
        if !reader.expect_object_header(PAIR_ARITY)? {
            return Ok(None);
        }
        Self::read_members(reader).map(Some)
    }
}

impl FormatterRegistry {
    /// Register `(K, V)` and `Option<(K, V)>`.
    pub fn register_pair<K: 'static, V: 'static>(&self) {
        self.register::<(K, V), _>(PairFormatter::<K, V>::new());
        self.register::<Option<(K, V)>, _>(PairFormatter::<K, V>::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;

    fn packer() -> Packer {
        let packer = Packer::default();
        packer.registry().register_pair::<u16, u32>();
        packer.registry().register_pair::<String, u32>();
        packer
    }

    #[test]
    fn blittable_pair_has_no_header() {
        let packer = packer();
        let bytes = packer.serialize(&(7u16, 9u32)).unwrap();

        let mut expected = 7u16.to_ne_bytes().to_vec();
        expected.extend_from_slice(&9u32.to_ne_bytes());
        assert_eq!(bytes, expected);
        assert_eq!(packer.deserialize::<(u16, u32)>(&bytes).unwrap(), (7, 9));
    }

    #[test]
    fn reference_pair_is_framed() {
        let packer = packer();
        let pair = ("key".to_string(), 5u32);
        let bytes = packer.serialize(&pair).unwrap();
        assert_eq!(&bytes[..4], &2i32.to_le_bytes());
        assert_eq!(packer.deserialize::<(String, u32)>(&bytes).unwrap(), pair);
    }

    #[test]
    fn optional_pair_is_always_framed() {
        let packer = packer();
        let some = packer.serialize(&Some((1u16, 2u32))).unwrap();
        assert_eq!(&some[..4], &2i32.to_le_bytes());
        assert_eq!(some.len(), 4 + 2 + 4);
        assert_eq!(packer.deserialize::<Option<(u16, u32)>>(&some).unwrap(), Some((1, 2)));

        let none = packer.serialize(&None::<(u16, u32)>).unwrap();
        assert_eq!(none, [0xFF; 4]);
        assert_eq!(packer.deserialize::<Option<(u16, u32)>>(&none).unwrap(), None);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let packer = packer();
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 0, 0, 0, b'k', 5, 0, 0, 0]);
        assert!(matches!(
            packer.deserialize::<(String, u32)>(&bytes),
            Err(PackError::ArityMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn null_into_plain_pair_fails() {
        let packer = packer();
        let none = packer.serialize(&None::<(String, u32)>).unwrap();
        assert!(matches!(
            packer.deserialize::<(String, u32)>(&none),
            Err(PackError::UnexpectedNull { .. })
        ));
    }

    #[test]
    fn short_raw_pair_fails() {
        let packer = packer();
        assert!(matches!(
            packer.deserialize::<(u16, u32)>(&[1, 2, 3]),
            Err(PackError::UnexpectedEndOfInput { needed: 6, remaining: 3 })
        ));
    }
}
