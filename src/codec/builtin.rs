//! Builtin element formatters.
//!
//! | Type | Wire |
//! |------|------|
//! | integers, floats, `()` | native bytes (blittable) |
//! | `bool` | one byte, `0` or `1` |
//! | `char` | `u32` LE scalar value |
//! | `String` | length header (byte count) + UTF-8 |
//! | `Option<String>` | as `String`, null header for `None` |
//! | `Option<T>` (generic) | flag byte `0`/`1`, then `T` |

use std::marker::PhantomData;

use crate::codec::{Formatter, FormatterRegistry};
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

/// Load every builtin formatter into `registry`.
pub fn register_defaults(registry: &FormatterRegistry) {
    registry.register_blittable::<u8>();
    registry.register_blittable::<i8>();
    registry.register_blittable::<u16>();
    registry.register_blittable::<i16>();
    registry.register_blittable::<u32>();
    registry.register_blittable::<i32>();
    registry.register_blittable::<u64>();
    registry.register_blittable::<i64>();
    registry.register_blittable::<u128>();
    registry.register_blittable::<i128>();
    registry.register_blittable::<f32>();
    registry.register_blittable::<f64>();
    registry.register_blittable::<()>();

    registry.register::<bool, _>(BoolFormatter);
    registry.register::<char, _>(CharFormatter);
    registry.register::<String, _>(StringFormatter);
    registry.register::<Option<String>, _>(StringFormatter);
}

pub struct BoolFormatter;

impl Formatter<bool> for BoolFormatter {
    fn serialize(&self, writer: &mut Writer<'_>, value: &bool) -> Result<()> {
        writer.write_u8(u8::from(*value))
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<bool> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(PackError::InvalidBool(b)),
        }
    }
}

pub struct CharFormatter;

impl Formatter<char> for CharFormatter {
    fn serialize(&self, writer: &mut Writer<'_>, value: &char) -> Result<()> {
        writer.write_u32(u32::from(*value))
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<char> {
        let scalar = reader.read_u32()?;
        char::from_u32(scalar).ok_or(PackError::InvalidChar(scalar))
    }
}

/// UTF-8 strings framed by a length header counting bytes.
pub struct StringFormatter;

impl StringFormatter {
    fn write_str(writer: &mut Writer<'_>, s: &str) -> Result<()> {
        writer.write_length_header(Some(s.len()))?;
        writer.write_raw_bytes(s.as_bytes());
        Ok(())
    }

    fn read_body(reader: &mut Reader<'_>, len: usize) -> Result<String> {
        let bytes = reader.read_raw_bytes(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }
}

impl Formatter<String> for StringFormatter {
    fn serialize(&self, writer: &mut Writer<'_>, value: &String) -> Result<()> {
        Self::write_str(writer, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<String> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_body(reader, len),
            None      => Err(PackError::unexpected_null::<String>()),
        }
    }

    /// Reuses the destination's allocation.
    fn deserialize_into(&self, reader: &mut Reader<'_>, slot: &mut String) -> Result<()> {
        let len = reader
            .try_read_length_header()?
            .ok_or_else(PackError::unexpected_null::<String>)?;
        let text = std::str::from_utf8(reader.read_raw_bytes(len)?)?;
        slot.clear();
        slot.push_str(text);
        Ok(())
    }
}

impl Formatter<Option<String>> for StringFormatter {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<String>) -> Result<()> {
        match value {
            Some(s) => Self::write_str(writer, s),
            None    => writer.write_null_length_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<String>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_body(reader, len).map(Some),
            None      => Ok(None),
        }
    }
}

/// Nullable wrapper for any registered `T`: a presence flag, then the value.
pub struct OptionFormatter<T>(PhantomData<fn() -> T>);

impl<T> OptionFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for OptionFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Formatter<Option<T>> for OptionFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<T>) -> Result<()> {
        match value {
            Some(v) => {
                writer.write_u8(1)?;
                writer.write_value(v)
            }
            None => writer.write_u8(0),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<T>> {
        match reader.read_u8()? {
            0 => Ok(None),
            1 => reader.read_value::<T>().map(Some),
            b => Err(PackError::InvalidBool(b)),
        }
    }

    fn deserialize_into(&self, reader: &mut Reader<'_>, slot: &mut Option<T>) -> Result<()> {
        match reader.read_u8()? {
            0 => *slot = None,
            1 => match slot {
                Some(existing) => reader.read_value_into(existing)?,
                None => *slot = Some(reader.read_value::<T>()?),
            },
            b => return Err(PackError::InvalidBool(b)),
        }
        Ok(())
    }
}

impl FormatterRegistry {
    /// Register the flag-prefixed `Option<T>` formatter for `T`.
    pub fn register_option<T: 'static>(&self) {
        self.register::<Option<T>, _>(OptionFormatter::<T>::new());
    }
}

#[cfg(test)]
mod tests {
    use crate::packer::Packer;
    use crate::error::PackError;

    #[test]
    fn string_wire_is_length_prefixed_utf8() {
        let packer = Packer::default();
        let bytes = packer.serialize(&"hé".to_string()).unwrap();
        assert_eq!(bytes, [3, 0, 0, 0, b'h', 0xC3, 0xA9]);
        assert_eq!(packer.deserialize::<String>(&bytes).unwrap(), "hé");
    }

    #[test]
    fn null_string_needs_option() {
        let packer = Packer::default();
        let bytes = packer.serialize(&None::<String>).unwrap();
        assert_eq!(bytes, [0xFF; 4]);
        assert_eq!(packer.deserialize::<Option<String>>(&bytes).unwrap(), None);
        assert!(matches!(
            packer.deserialize::<String>(&bytes),
            Err(PackError::UnexpectedNull { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let packer = Packer::default();
        let bytes = [2, 0, 0, 0, 0xFF, 0xFE];
        assert!(matches!(
            packer.deserialize::<String>(&bytes),
            Err(PackError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn bool_and_char() {
        let packer = Packer::default();
        assert_eq!(packer.serialize(&true).unwrap(), [1]);
        assert!(matches!(packer.deserialize::<bool>(&[2]), Err(PackError::InvalidBool(2))));

        let bytes = packer.serialize(&'λ').unwrap();
        assert_eq!(packer.deserialize::<char>(&bytes).unwrap(), 'λ');
        let surrogate = 0xD800u32.to_le_bytes();
        assert!(matches!(
            packer.deserialize::<char>(&surrogate),
            Err(PackError::InvalidChar(0xD800))
        ));
    }

    #[test]
    fn generic_option_roundtrip() {
        let packer = Packer::default();
        packer.registry().register_option::<u16>();

        let some = packer.serialize(&Some(7u16)).unwrap();
        let mut expected = vec![1u8];
        expected.extend_from_slice(&7u16.to_ne_bytes());
        assert_eq!(some, expected);
        assert_eq!(packer.deserialize::<Option<u16>>(&some).unwrap(), Some(7));

        let none = packer.serialize(&None::<u16>).unwrap();
        assert_eq!(none, [0]);
        assert_eq!(packer.deserialize::<Option<u16>>(&none).unwrap(), None);
    }
}
