//! Single-pass iterable codec.
//!
//! The source is consumed exactly once.  If its `size_hint` is exact the
//! count is known up front and elements stream straight to the output.
//! Otherwise every element is first serialized into a pooled staging buffer
//! while counting; then the length header is written and the staged bytes
//! are appended in one copy.  Both paths produce identical bytes.
//!
//! The header carries the element count, never the staged byte length.
//! Decoding always yields a `Vec<T>`.

use std::borrow::Borrow;
use std::marker::PhantomData;

use tracing::trace;

use crate::dispatch;
use crate::error::Result;
use crate::io_stream::{Reader, Writer};

pub struct IterableFormatter<T>(PhantomData<fn() -> T>);

impl<T> IterableFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for IterableFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> IterableFormatter<T> {
    /// Encode `source`, or a null header for `None`.
    pub fn serialize<I>(&self, writer: &mut Writer<'_>, source: Option<I>) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let iter = match source {
            Some(source) => source.into_iter(),
            None         => return writer.write_null_length_header(),
        };
        let formatter = writer.registry().resolve::<T>()?;

        if let (lower, Some(upper)) = iter.size_hint() {
            if lower == upper {
                return dispatch::write_sequence(writer, &*formatter, lower, iter);
            }
        }

        let packer = writer.packer();
        let mut staging = packer.staging().checkout();
        let count = dispatch::write_elements(&mut Writer::new(&mut staging, packer), &*formatter, iter)?;
        trace!(elements = count, staged_bytes = staging.len(), "staged iterable");

        writer.write_length_header(Some(count))?;
        writer.write_raw_bytes(&staging);
        Ok(())
    }

    pub fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<Vec<T>>> {
        let len = match reader.try_read_length_header()? {
            Some(len) => len,
            None      => return Ok(None),
        };
        let formatter = reader.registry().resolve::<T>()?;
        dispatch::read_sequence(reader, &*formatter, len).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Formatter;
    use crate::error::PackError;
    use crate::packer::Packer;

    #[test]
    fn unknown_length_matches_exact_length() {
        let packer = Packer::default();
        packer.registry().register_list::<String>();
        let words: Vec<String> = ["one", "two", "three"].map(String::from).to_vec();

        let exact = packer.serialize_iter::<String, _>(Some(&words)).unwrap();
        let staged = packer
            .serialize_iter::<String, _>(Some(words.iter().filter(|_| true)))
            .unwrap();
        assert_eq!(exact, staged);
        assert_eq!(exact, packer.serialize(&words).unwrap());

        let stats = packer.staging().stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.allocated + stats.reused, 1);
    }

    #[test]
    fn header_is_element_count() {
        let packer = Packer::default();
        let mut n = 0u32;
        let source = std::iter::from_fn(|| {
            n += 1;
            (n <= 3).then_some(n)
        });
        let bytes = packer.serialize_iter::<u32, _>(Some(source)).unwrap();
        assert_eq!(&bytes[..4], &3i32.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 3 * 4);
        assert_eq!(packer.deserialize_iter::<u32>(&bytes).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn null_and_empty() {
        let packer = Packer::default();
        let null = packer.serialize_iter::<u8, Vec<u8>>(None).unwrap();
        assert_eq!(null, [0xFF; 4]);
        assert_eq!(packer.deserialize_iter::<u8>(&null).unwrap(), None);

        let empty = packer.serialize_iter::<u8, _>(Some(std::iter::from_fn(|| None::<u8>))).unwrap();
        assert_eq!(empty, [0; 4]);
        assert_eq!(packer.deserialize_iter::<u8>(&empty).unwrap(), Some(vec![]));
    }

    struct Odd(u8);

    struct OddFormatter;

    impl Formatter<Odd> for OddFormatter {
        fn serialize(&self, writer: &mut Writer<'_>, value: &Odd) -> Result<()> {
            if value.0 % 2 == 0 {
                return Err(PackError::custom("even value"));
            }
            writer.write_u8(value.0)
        }

        fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Odd> {
            reader.read_u8().map(Odd)
        }
    }

    #[test]
    fn element_error_releases_staging() {
        let packer = Packer::default();
        packer.registry().register::<Odd, _>(OddFormatter);

        let source = [Odd(1), Odd(3), Odd(4), Odd(5)];
        let err = packer
            .serialize_iter::<Odd, _>(Some(source.iter().filter(|_| true)))
            .unwrap_err();
        assert!(matches!(err, PackError::Custom(_)));

        let stats = packer.staging().stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.pooled, 1);
    }

    #[test]
    fn staged_nested_lists() {
        let packer = Packer::default();
        packer.registry().register_list::<u16>();
        let rows = (0..4u16).map(|i| (0..i).collect::<Vec<u16>>()).filter(|_| true);
        let bytes = packer.serialize_iter::<Vec<u16>, _>(Some(rows)).unwrap();
        let decoded = packer.deserialize_iter::<Vec<u16>>(&bytes).unwrap().unwrap();
        assert_eq!(decoded, vec![vec![], vec![0], vec![0, 1], vec![0, 1, 2]]);
        assert_eq!(packer.staging().stats().outstanding, 0);
    }
}
