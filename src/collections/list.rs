//! Ordered sequence codec for `Vec<T>`.
//!
//! Decoding into an existing vector reuses it: when its length already
//! equals the incoming count, every slot is overwritten in place and the
//! backing allocation is untouched (blittable elements are copied over as one
//! span).  Otherwise it is cleared and refilled.

use std::marker::PhantomData;

use crate::bulk;
use crate::codec::{Formatter, FormatterRegistry};
use crate::dispatch;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

pub struct ListFormatter<T>(PhantomData<fn() -> T>);

impl<T> ListFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ListFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ListFormatter<T> {
    fn write(writer: &mut Writer<'_>, list: &[T]) -> Result<()> {
        let formatter = writer.registry().resolve::<T>()?;
        dispatch::write_sequence(writer, &*formatter, list.len(), list)
    }

    fn fill(reader: &mut Reader<'_>, list: &mut Vec<T>, len: usize) -> Result<()> {
        let formatter = reader.registry().resolve::<T>()?;
        if list.len() == len {
            return match formatter.raw_layout() {
                Some(layout) => bulk::read_bulk_into(reader, layout, list),
                None         => dispatch::read_sequence_into(reader, &*formatter, list),
            };
        }
        list.clear();
        list.reserve(reader.capacity_hint(len));
        dispatch::extend_sequence(reader, &*formatter, len, list)
    }

    fn read_fresh(reader: &mut Reader<'_>, len: usize) -> Result<Vec<T>> {
        let formatter = reader.registry().resolve::<T>()?;
        dispatch::read_sequence(reader, &*formatter, len)
    }
}

impl<T: 'static> Formatter<Vec<T>> for ListFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Vec<T>) -> Result<()> {
        Self::write(writer, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Vec<T>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_fresh(reader, len),
            None      => Err(PackError::unexpected_null::<Vec<T>>()),
        }
    }

    fn deserialize_into(&self, reader: &mut Reader<'_>, slot: &mut Vec<T>) -> Result<()> {
        match reader.try_read_length_header()? {
            Some(len) => Self::fill(reader, slot, len),
            None      => Err(PackError::unexpected_null::<Vec<T>>()),
        }
    }
}

impl<T: 'static> Formatter<Option<Vec<T>>> for ListFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<Vec<T>>) -> Result<()> {
        match value {
            Some(list) => Self::write(writer, list),
            None       => writer.write_null_length_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<Vec<T>>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_fresh(reader, len).map(Some),
            None      => Ok(None),
        }
    }

    fn deserialize_into(&self, reader: &mut Reader<'_>, slot: &mut Option<Vec<T>>) -> Result<()> {
        let len = match reader.try_read_length_header()? {
            Some(len) => len,
            None => {
                *slot = None;
                return Ok(());
            }
        };
        match slot {
            Some(list) => Self::fill(reader, list, len),
            None => {
                *slot = Some(Self::read_fresh(reader, len)?);
                Ok(())
            }
        }
    }
}

impl FormatterRegistry {
    /// Register `Vec<T>` and `Option<Vec<T>>`.
    pub fn register_list<T: 'static>(&self) {
        self.register::<Vec<T>, _>(ListFormatter::<T>::new());
        self.register::<Option<Vec<T>>, _>(ListFormatter::<T>::new());
    }
}
