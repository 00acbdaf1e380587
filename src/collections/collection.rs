//! Read-only collection codec.
//!
//! Encodes anything implementing [`ReadOnlyCollection`] and decodes to a flat
//! `Box<[T]>`.  When `T` is blittable and the source exposes contiguous
//! storage, the whole span is written through [`bulk::write_bulk`]; decoding a
//! blittable `T` always goes through [`bulk::read_bulk`], regardless of which
//! path produced the bytes.

use std::collections::{BTreeSet, VecDeque};
use std::marker::PhantomData;

use tracing::trace;

use crate::bulk;
use crate::codec::{Formatter, FormatterRegistry};
use crate::dispatch;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

/// A collection that can report its element count without being consumed.
pub trait ReadOnlyCollection<T> {
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> Self::Iter<'_>;

    /// The backing storage as one slice, if it is contiguous.
    fn as_contiguous(&self) -> Option<&[T]> {
        None
    }
}

impl<T> ReadOnlyCollection<T> for [T] {
    type Iter<'a> = std::slice::Iter<'a, T> where T: 'a;

    fn len(&self) -> usize { <[T]>::len(self) }
    fn iter(&self) -> Self::Iter<'_> { <[T]>::iter(self) }
    fn as_contiguous(&self) -> Option<&[T]> { Some(self) }
}

impl<T> ReadOnlyCollection<T> for Vec<T> {
    type Iter<'a> = std::slice::Iter<'a, T> where T: 'a;

    fn len(&self) -> usize { Vec::len(self) }
    fn iter(&self) -> Self::Iter<'_> { self.as_slice().iter() }
    fn as_contiguous(&self) -> Option<&[T]> { Some(self) }
}

impl<T> ReadOnlyCollection<T> for Box<[T]> {
    type Iter<'a> = std::slice::Iter<'a, T> where T: 'a;

    fn len(&self) -> usize { <[T]>::len(self) }
    fn iter(&self) -> Self::Iter<'_> { <[T]>::iter(self) }
    fn as_contiguous(&self) -> Option<&[T]> { Some(self) }
}

/// Contiguous only while the ring buffer has not wrapped.
impl<T> ReadOnlyCollection<T> for VecDeque<T> {
    type Iter<'a> = std::collections::vec_deque::Iter<'a, T> where T: 'a;

    fn len(&self) -> usize { VecDeque::len(self) }
    fn iter(&self) -> Self::Iter<'_> { VecDeque::iter(self) }

    fn as_contiguous(&self) -> Option<&[T]> {
        match self.as_slices() {
            (front, []) => Some(front),
            _           => None,
        }
    }
}

impl<T> ReadOnlyCollection<T> for BTreeSet<T> {
    type Iter<'a> = std::collections::btree_set::Iter<'a, T> where T: 'a;

    fn len(&self) -> usize { BTreeSet::len(self) }
    fn iter(&self) -> Self::Iter<'_> { BTreeSet::iter(self) }
}

// ── Codec ────────────────────────────────────────────────────────────────────

pub struct CollectionFormatter<T>(PhantomData<fn() -> T>);

impl<T> CollectionFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CollectionFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> CollectionFormatter<T> {
    /// Encode `value`, or a null header for `None`.
    pub fn write<C>(&self, writer: &mut Writer<'_>, value: Option<&C>) -> Result<()>
    where
        C: ReadOnlyCollection<T> + ?Sized,
    {
        let collection = match value {
            Some(c) => c,
            None    => return writer.write_null_length_header(),
        };
        let formatter = writer.registry().resolve::<T>()?;
        if let (Some(layout), Some(span)) = (formatter.raw_layout(), collection.as_contiguous()) {
            return bulk::write_bulk(writer, layout, span);
        }
        dispatch::write_sequence(writer, &*formatter, collection.len(), collection.iter())
    }

    /// Decode a collection written by [`write`](Self::write).
    pub fn read(&self, reader: &mut Reader<'_>) -> Result<Option<Box<[T]>>> {
        let formatter = reader.registry().resolve::<T>()?;
        if let Some(layout) = formatter.raw_layout() {
            return bulk::read_bulk(reader, layout);
        }

        let len = match reader.try_read_length_header()? {
            Some(len) => len,
            None      => return Ok(None),
        };
        if len == 0 {
            return Ok(Some(Box::default()));
        }
        trace!(elements = len, "element-wise collection read");
        let values = dispatch::read_sequence(reader, &*formatter, len)?;
        Ok(Some(values.into_boxed_slice()))
    }
}

impl<T: 'static> Formatter<Box<[T]>> for CollectionFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Box<[T]>) -> Result<()> {
        self.write::<[T]>(writer, Some(&**value))
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Box<[T]>> {
        self.read(reader)?.ok_or_else(PackError::unexpected_null::<Box<[T]>>)
    }
}

impl<T: 'static> Formatter<Option<Box<[T]>>> for CollectionFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<Box<[T]>>) -> Result<()> {
        self.write::<[T]>(writer, value.as_deref())
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<Box<[T]>>> {
        self.read(reader)
    }
}

impl FormatterRegistry {
    /// Register `Box<[T]>` and `Option<Box<[T]>>`.
    pub fn register_collection<T: 'static>(&self) {
        self.register::<Box<[T]>, _>(CollectionFormatter::<T>::new());
        self.register::<Option<Box<[T]>>, _>(CollectionFormatter::<T>::new());
    }
}
