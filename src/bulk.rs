//! Bulk span codec: the fast path for blittable element types.
//!
//! ```text
//! [len: i32 LE][len * size_of::<T>() raw bytes]
//! ```
//!
//! No per-element framing and no per-element formatter calls.  The payload is
//! the host's in-memory layout of the slice, so field order, padding rules and
//! numeric endianness must match between producer and consumer for the
//! lifetime of a stream.  Because blittable element formatters also write
//! native bytes, a span written here decodes identically through the element
//! path and vice versa.

use tracing::trace;

use crate::codec::RawLayout;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

/// Write `values` as one length header followed by their raw bytes.
pub fn write_bulk<T>(writer: &mut Writer<'_>, layout: &dyn RawLayout<T>, values: &[T]) -> Result<()> {
    writer.write_length_header(Some(values.len()))?;
    let bytes = layout.bytes_of(values);
    trace!(elements = values.len(), bytes = bytes.len(), "bulk span write");
    writer.write_raw_bytes(bytes);
    Ok(())
}

/// Read a span written by [`write_bulk`].
///
/// A null header yields `None`.  A zero-length span yields an empty slice
/// without touching the cursor again.  Otherwise the whole payload is
/// bounds-checked before anything is allocated.
pub fn read_bulk<T>(reader: &mut Reader<'_>, layout: &dyn RawLayout<T>) -> Result<Option<Box<[T]>>> {
    let len = match reader.try_read_length_header()? {
        Some(len) => len,
        None      => return Ok(None),
    };
    if len == 0 {
        return Ok(Some(Box::default()));
    }

    let bytes = reader.read_raw_bytes(span_bytes(layout, len)?)?;
    let mut values = layout.zeroed(len);
    layout.bytes_of_mut(&mut values).copy_from_slice(bytes);
    trace!(elements = len, bytes = bytes.len(), "bulk span read");
    Ok(Some(values.into_boxed_slice()))
}

/// Overwrite `dst` in place with `dst.len()` raw elements.  No header is read.
pub fn read_bulk_into<T>(reader: &mut Reader<'_>, layout: &dyn RawLayout<T>, dst: &mut [T]) -> Result<()> {
    let bytes = reader.read_raw_bytes(span_bytes(layout, dst.len())?)?;
    layout.bytes_of_mut(dst).copy_from_slice(bytes);
    Ok(())
}

fn span_bytes<T>(layout: &dyn RawLayout<T>, len: usize) -> Result<usize> {
    len.checked_mul(layout.element_size())
        .ok_or(PackError::LengthOverflow { len })
}
