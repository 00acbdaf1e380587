//! Raw-memory formatter for blittable types.
//!
//! This is the only place that reinterprets values as bytes.  The `zerocopy`
//! bounds on [`Blittable`] are what make the reinterpretation sound: no
//! padding, no pointers, every bit pattern valid.  Everything above this
//! module sees only `&[u8]` spans through the [`RawLayout`] capability.

use std::marker::PhantomData;
use std::mem::size_of;

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::codec::Formatter;
use crate::error::Result;
use crate::io_stream::{Reader, Writer};

/// Blittable-type predicate: `T` contains no reference or pointer-like field,
/// has no padding, and accepts every bit pattern.
///
/// Implemented automatically for every type with the matching `zerocopy`
/// derives (`FromBytes`, `IntoBytes`, `Immutable`, `KnownLayout`) that is
/// also `Copy`.
pub trait Blittable:
    FromBytes + IntoBytes + Immutable + KnownLayout + Copy + Send + Sync + 'static
{
}

impl<T> Blittable for T where
    T: FromBytes + IntoBytes + Immutable + KnownLayout + Copy + Send + Sync + 'static
{
}

/// Object-safe view of a blittable `T` as raw bytes.
pub trait RawLayout<T>: Send + Sync {
    #[inline]
    fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// The contiguous bytes backing `values`.
    fn bytes_of<'v>(&self, values: &'v [T]) -> &'v [u8];

    /// Mutable bytes backing `values`; any write leaves valid `T`s behind.
    fn bytes_of_mut<'v>(&self, values: &'v mut [T]) -> &'v mut [u8];

    /// `len` all-zero values, ready to be overwritten through
    /// [`bytes_of_mut`](Self::bytes_of_mut).
    fn zeroed(&self, len: usize) -> Vec<T>;

    /// Build one value from exactly [`element_size`](Self::element_size) bytes.
    fn from_bytes(&self, bytes: &[u8]) -> T;
}

/// Formatter that writes a value as its native bytes.
pub struct RawFormatter<T>(PhantomData<fn() -> T>);

impl<T> RawFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for RawFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Blittable> RawLayout<T> for RawFormatter<T> {
    #[inline]
    fn bytes_of<'v>(&self, values: &'v [T]) -> &'v [u8] {
        values.as_bytes()
    }

    #[inline]
    fn bytes_of_mut<'v>(&self, values: &'v mut [T]) -> &'v mut [u8] {
        values.as_mut_bytes()
    }

    fn zeroed(&self, len: usize) -> Vec<T> {
        vec![T::new_zeroed(); len]
    }

    fn from_bytes(&self, bytes: &[u8]) -> T {
        let mut value = T::new_zeroed();
        value.as_mut_bytes().copy_from_slice(bytes);
        value
    }
}

impl<T: Blittable> Formatter<T> for RawFormatter<T> {
    #[inline]
    fn serialize(&self, writer: &mut Writer<'_>, value: &T) -> Result<()> {
        writer.write_raw_bytes(value.as_bytes());
        Ok(())
    }

    #[inline]
    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<T> {
        let bytes = reader.read_raw_bytes(size_of::<T>())?;
        Ok(RawLayout::from_bytes(self, bytes))
    }

    fn raw_layout(&self) -> Option<&dyn RawLayout<T>> {
        Some(self)
    }
}
