//! LIFO stack and its codec.
//!
//! # Order
//! A stack is written top-to-bottom, the order [`Stack::pop`] would yield its
//! elements.  Decoding reads top-to-bottom and rebuilds the identical stack,
//! so `decode(encode(s)) == s` including which element is on top.

use std::marker::PhantomData;

use crate::codec::{Formatter, FormatterRegistry};
use crate::dispatch;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

/// Last-in, first-out sequence backed by a `Vec` (bottom at index 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate from top to bottom.
    pub fn iter(&self) -> std::iter::Rev<std::slice::Iter<'_, T>> {
        self.items.iter().rev()
    }

    /// Rebuild a stack from elements listed top to bottom.
    fn from_top_down(mut top_down: Vec<T>) -> Self {
        top_down.reverse();
        Self { items: top_down }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pushes in iteration order: the last item becomes the top.
impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Codec ────────────────────────────────────────────────────────────────────

pub struct StackFormatter<T>(PhantomData<fn() -> T>);

impl<T> StackFormatter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for StackFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> StackFormatter<T> {
    fn write(writer: &mut Writer<'_>, stack: &Stack<T>) -> Result<()> {
        let formatter = writer.registry().resolve::<T>()?;
        dispatch::write_sequence(writer, &*formatter, stack.len(), stack.iter())
    }

    fn read_body(reader: &mut Reader<'_>, len: usize) -> Result<Stack<T>> {
        let formatter = reader.registry().resolve::<T>()?;
        let top_down = dispatch::read_sequence(reader, &*formatter, len)?;
        Ok(Stack::from_top_down(top_down))
    }
}

impl<T: 'static> Formatter<Stack<T>> for StackFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Stack<T>) -> Result<()> {
        Self::write(writer, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Stack<T>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_body(reader, len),
            None      => Err(PackError::unexpected_null::<Stack<T>>()),
        }
    }
}

impl<T: 'static> Formatter<Option<Stack<T>>> for StackFormatter<T> {
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<Stack<T>>) -> Result<()> {
        match value {
            Some(stack) => Self::write(writer, stack),
            None        => writer.write_null_length_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<Stack<T>>> {
        match reader.try_read_length_header()? {
            Some(len) => Self::read_body(reader, len).map(Some),
            None      => Ok(None),
        }
    }
}

impl FormatterRegistry {
    /// Register `Stack<T>` and `Option<Stack<T>>`.
    pub fn register_stack<T: 'static>(&self) {
        self.register::<Stack<T>, _>(StackFormatter::<T>::new());
        self.register::<Option<Stack<T>>, _>(StackFormatter::<T>::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;

    #[test]
    fn stack_iterates_top_down() {
        let stack: Stack<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(stack.peek(), Some(&3));
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    }

    #[test]
    fn wire_order_is_top_to_bottom() {
        let packer = Packer::default();
        packer.registry().register_stack::<u8>();
        let stack: Stack<u8> = [1, 2, 3].into_iter().collect();
        let bytes = packer.serialize(&stack).unwrap();
        assert_eq!(bytes, [3, 0, 0, 0, 3, 2, 1]);
    }

    #[test]
    fn roundtrip_keeps_the_top() {
        let packer = Packer::default();
        packer.registry().register_stack::<String>();

        let mut stack = Stack::new();
        stack.push("bottom".to_string());
        stack.push("middle".to_string());
        stack.push("top".to_string());

        let bytes = packer.serialize(&Some(stack.clone())).unwrap();
        let mut decoded = packer.deserialize::<Option<Stack<String>>>(&bytes).unwrap().unwrap();
        assert_eq!(decoded, stack);
        assert_eq!(decoded.pop().as_deref(), Some("top"));
        assert_eq!(decoded.pop().as_deref(), Some("middle"));
        assert_eq!(decoded.pop().as_deref(), Some("bottom"));
    }

    #[test]
    fn null_stack() {
        let packer = Packer::default();
        packer.registry().register_stack::<u8>();
        let bytes = packer.serialize(&None::<Stack<u8>>).unwrap();
        assert_eq!(packer.deserialize::<Option<Stack<u8>>>(&bytes).unwrap(), None);
    }
}
