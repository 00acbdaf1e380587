//! FIFO queue codec for `VecDeque<T>`, written front to back.
//!
//! A queue shares the list wire format, so bytes written from a `VecDeque`
//! decode as a `Vec` and vice versa.

use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::codec::{Formatter, FormatterRegistry};
use crate::dispatch;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

pub struct QueueFormatter<T>(PhantomData<fn() -> T>);

impl<T> QueueFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for QueueFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> QueueFormatter<T> {
    fn write(writer: &mut Writer<'_>, queue: &VecDeque<T>) -> Result<()> {
        let formatter = writer.registry().resolve::<T>()?;
        dispatch::write_sequence(writer, &*formatter, queue.len(), queue)
    }

    fn read_body(reader: &mut Reader<'_>, len: usize) -> Result<VecDeque<T>> {
        let formatter = reader.registry().resolve::<T>()?;
        dispatch::read_sequence(reader, &*formatter, len).map(VecDeque::from)
    }
}

impl<T: 'static> Formatter<VecDeque<T>> for QueueFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &VecDeque<T>) -> Result<()> {
        Self::write(writer, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<VecDeque<T>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_body(reader, len),
            None      => Err(PackError::unexpected_null::<VecDeque<T>>()),
        }
    }
}

impl<T: 'static> Formatter<Option<VecDeque<T>>> for QueueFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<VecDeque<T>>) -> Result<()> {
        match value {
            Some(queue) => Self::write(writer, queue),
            None        => writer.write_null_length_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<VecDeque<T>>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_body(reader, len).map(Some),
            None      => Ok(None),
        }
    }
}

impl FormatterRegistry {
    /// Register `VecDeque<T>` and `Option<VecDeque<T>>`.
    pub fn register_queue<T: 'static>(&self) {
        self.register::<VecDeque<T>, _>(QueueFormatter::<T>::new());
        self.register::<Option<VecDeque<T>>, _>(QueueFormatter::<T>::new());
    }
}
