//! Element codec dispatch: one formatter call per element.
//!
//! Used for element types without a raw layout, and for containers whose
//! storage is not a single contiguous span.  Elements are written and read in
//! iteration order; nothing here ever reorders.

use std::borrow::Borrow;

use crate::codec::Formatter;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

/// Write a length header for `count`, then every item of `items`.
///
/// Fails with `CountMismatch` if `items` yields a different number of
/// elements than `count`; the header already on the wire would be wrong.
pub fn write_sequence<T, I>(
    writer:    &mut Writer<'_>,
    formatter: &dyn Formatter<T>,
    count:     usize,
    items:     I,
) -> Result<()>
where
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    writer.write_length_header(Some(count))?;
    let actual = write_elements(writer, formatter, items)?;
    if actual != count {
        return Err(PackError::CountMismatch { declared: count, actual });
    }
    Ok(())
}

/// Write every item with no header.  Returns the number of items written.
pub fn write_elements<T, I>(writer: &mut Writer<'_>, formatter: &dyn Formatter<T>, items: I) -> Result<usize>
where
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    let mut written = 0usize;
    for item in items {
        formatter.serialize(writer, item.borrow())?;
        written += 1;
    }
    Ok(written)
}

/// Read `count` elements into a fresh `Vec`.
pub fn read_sequence<T>(reader: &mut Reader<'_>, formatter: &dyn Formatter<T>, count: usize) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(reader.capacity_hint(count));
    extend_sequence(reader, formatter, count, &mut out)?;
    Ok(out)
}

/// Read `count` elements and push them onto `out`.
pub fn extend_sequence<T>(
    reader:    &mut Reader<'_>,
    formatter: &dyn Formatter<T>,
    count:     usize,
    out:       &mut Vec<T>,
) -> Result<()> {
    for _ in 0..count {
        out.push(formatter.deserialize(reader)?);
    }
    Ok(())
}

/// Overwrite every slot of `dst` in order, reusing each element's storage
/// where its formatter supports that.
pub fn read_sequence_into<T>(reader: &mut Reader<'_>, formatter: &dyn Formatter<T>, dst: &mut [T]) -> Result<()> {
    for slot in dst.iter_mut() {
        formatter.deserialize_into(reader, slot)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;

    #[test]
    fn preserves_order() {
        let packer = Packer::default();
        let formatter = packer.registry().resolve::<String>().unwrap();
        let words = ["zeta", "alpha", "mu"].map(String::from);

        let mut out = Vec::new();
        write_sequence(&mut Writer::new(&mut out, &packer), &*formatter, words.len(), &words).unwrap();

        let mut reader = Reader::new(&out, &packer);
        let count = reader.try_read_length_header().unwrap().unwrap();
        let decoded = read_sequence(&mut reader, &*formatter, count).unwrap();
        assert_eq!(decoded, words);
    }

    #[test]
    fn lying_count_is_an_error() {
        let packer = Packer::default();
        let formatter = packer.registry().resolve::<u8>().unwrap();
        let mut out = Vec::new();
        let err = write_sequence(&mut Writer::new(&mut out, &packer), &*formatter, 5, [1u8, 2]).unwrap_err();
        assert!(matches!(err, PackError::CountMismatch { declared: 5, actual: 2 }));
    }

    #[test]
    fn element_failure_aborts_the_sequence() {
        let packer = Packer::default();
        let formatter = packer.registry().resolve::<bool>().unwrap();
        let bytes = [1u8, 0, 9, 1];
        let err = read_sequence(&mut Reader::new(&bytes, &packer), &*formatter, 4).unwrap_err();
        assert!(matches!(err, PackError::InvalidBool(9)));
    }
}
