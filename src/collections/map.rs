//! Key-value map and set codecs.
//!
//! # Wire format
//! ```text
//! [ count: i32 ][ key 0 ][ value 0 ][ key 1 ][ value 1 ] ...
//! ```
//! Entries follow the map's own iteration order, with no per-entry header.
//! A set is written the same way with keys only.
//!
//! # Key equality
//! The decoded container is built with the formatter's `BuildHasher`, which
//! together with `K: Eq` is the key-equality policy.  A key that collides
//! with one already decoded fails with [`PackError::DuplicateKey`] instead of
//! silently overwriting.

use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use crate::codec::{Formatter, FormatterRegistry};
use crate::dispatch;
use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

// ── Map ──────────────────────────────────────────────────────────────────────

pub struct MapFormatter<K, V, S = RandomState> {
    hasher:  S,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> MapFormatter<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V> Default for MapFormatter<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> MapFormatter<K, V, S> {
    /// Decoded maps are built with clones of `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher, _marker: PhantomData }
    }
}

impl<K, V, S> MapFormatter<K, V, S>
where
    K: Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher + Clone,
{
    fn write(writer: &mut Writer<'_>, map: &HashMap<K, V, S>) -> Result<()> {
        let registry = writer.registry();
        let keys = registry.resolve::<K>()?;
        let values = registry.resolve::<V>()?;

        writer.write_length_header(Some(map.len()))?;
        for (key, value) in map {
            keys.serialize(writer, key)?;
            values.serialize(writer, value)?;
        }
        Ok(())
    }

    fn read_body(&self, reader: &mut Reader<'_>, len: usize) -> Result<HashMap<K, V, S>> {
        let registry = reader.registry();
        let keys = registry.resolve::<K>()?;
        let values = registry.resolve::<V>()?;

        let mut map = HashMap::with_capacity_and_hasher(reader.capacity_hint(len), self.hasher.clone());
        for _ in 0..len {
            let key = keys.deserialize(reader)?;
            let value = values.deserialize(reader)?;
            if map.insert(key, value).is_some() {
                return Err(PackError::duplicate_key::<K>());
            }
        }
        Ok(map)
    }
}

impl<K, V, S> Formatter<HashMap<K, V, S>> for MapFormatter<K, V, S>
where
    K: Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher + Clone + Send + Sync,
{
    fn serialize(&self, writer: &mut Writer<'_>, value: &HashMap<K, V, S>) -> Result<()> {
        Self::write(writer, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<HashMap<K, V, S>> {
        match reader.try_read_length_header()? {
            Some(len) => self.read_body(reader, len),
            None      => Err(PackError::unexpected_null::<HashMap<K, V, S>>()),
        }
    }
}

impl<K, V, S> Formatter<Option<HashMap<K, V, S>>> for MapFormatter<K, V, S>
where
    K: Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher + Clone + Send + Sync,
{
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<HashMap<K, V, S>>) -> Result<()> {
        match value {
            Some(map) => Self::write(writer, map),
            None      => writer.write_null_length_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<HashMap<K, V, S>>> {
        match reader.try_read_length_header()? {
            Some(len) => self.read_body(reader, len).map(Some),
            None      => Ok(None),
        }
    }
}

// ── Set ──────────────────────────────────────────────────────────────────────

pub struct SetFormatter<T, S = RandomState> {
    hasher:  S,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SetFormatter<T, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<T> Default for SetFormatter<T, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> SetFormatter<T, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher, _marker: PhantomData }
    }
}

impl<T, S> SetFormatter<T, S>
where
    T: Eq + Hash + 'static,
    S: BuildHasher + Clone,
{
    fn write(writer: &mut Writer<'_>, set: &HashSet<T, S>) -> Result<()> {
        let formatter = writer.registry().resolve::<T>()?;
        dispatch::write_sequence(writer, &*formatter, set.len(), set)
    }

    fn read_body(&self, reader: &mut Reader<'_>, len: usize) -> Result<HashSet<T, S>> {
        let formatter = reader.registry().resolve::<T>()?;
        let mut set = HashSet::with_capacity_and_hasher(reader.capacity_hint(len), self.hasher.clone());
        for _ in 0..len {
            if !set.insert(formatter.deserialize(reader)?) {
                return Err(PackError::duplicate_key::<T>());
            }
        }
        Ok(set)
    }
}

impl<T, S> Formatter<HashSet<T, S>> for SetFormatter<T, S>
where
    T: Eq + Hash + 'static,
    S: BuildHasher + Clone + Send + Sync,
{
    fn serialize(&self, writer: &mut Writer<'_>, value: &HashSet<T, S>) -> Result<()> {
        Self::write(writer, value)
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<HashSet<T, S>> {
        match reader.try_read_length_header()? {
            Some(len) => self.read_body(reader, len),
            None      => Err(PackError::unexpected_null::<HashSet<T, S>>()),
        }
    }
}

impl<T, S> Formatter<Option<HashSet<T, S>>> for SetFormatter<T, S>
where
    T: Eq + Hash + 'static,
    S: BuildHasher + Clone + Send + Sync,
{
    fn serialize(&self, writer: &mut Writer<'_>, value: &Option<HashSet<T, S>>) -> Result<()> {
        match value {
            Some(set) => Self::write(writer, set),
            None      => writer.write_null_length_header(),
        }
    }

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<Option<HashSet<T, S>>> {
        match reader.try_read_length_header()? {
            Some(len) => self.read_body(reader, len).map(Some),
            None      => Ok(None),
        }
    }
}

// ── Registration ─────────────────────────────────────────────────────────────

impl FormatterRegistry {
    /// Register `HashMap<K, V>` and `Option<HashMap<K, V>>` with the std hasher.
    pub fn register_map<K, V>(&self)
    where
        K: Eq + Hash + 'static,
        V: 'static,
    {
        self.register_map_with_hasher::<K, V, RandomState>(RandomState::new());
    }

    /// Register `HashMap<K, V, S>` and its `Option` form.  Decoded maps use
    /// clones of `hasher`.
    pub fn register_map_with_hasher<K, V, S>(&self, hasher: S)
    where
        K: Eq + Hash + 'static,
        V: 'static,
        S: BuildHasher + Clone + Send + Sync + 'static,
    {
        self.register::<HashMap<K, V, S>, _>(MapFormatter::<K, V, S>::with_hasher(hasher.clone()));
        self.register::<Option<HashMap<K, V, S>>, _>(MapFormatter::<K, V, S>::with_hasher(hasher));
    }

    /// Register `HashSet<T>` and `Option<HashSet<T>>`.
    pub fn register_set<T>(&self)
    where
        T: Eq + Hash + 'static,
    {
        let hasher = RandomState::new();
        self.register::<HashSet<T>, _>(SetFormatter::<T>::with_hasher(hasher.clone()));
        self.register::<Option<HashSet<T>>, _>(SetFormatter::<T>::with_hasher(hasher));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::BuildHasherDefault;

    #[test]
    fn map_roundtrip() {
        let packer = Packer::default();
        packer.registry().register_map::<String, u64>();

        let map: HashMap<String, u64> = [("a", 1), ("bb", 22), ("ccc", 333)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let bytes = packer.serialize(&map).unwrap();
        assert_eq!(&bytes[..4], &3i32.to_le_bytes());
        assert_eq!(packer.deserialize::<HashMap<String, u64>>(&bytes).unwrap(), map);
    }

    #[test]
    fn null_and_empty_map() {
        let packer = Packer::default();
        packer.registry().register_map::<u32, u32>();

        let null = packer.serialize(&None::<HashMap<u32, u32>>).unwrap();
        assert_eq!(packer.deserialize::<Option<HashMap<u32, u32>>>(&null).unwrap(), None);
        assert!(matches!(
            packer.deserialize::<HashMap<u32, u32>>(&null),
            Err(PackError::UnexpectedNull { .. })
        ));

        let empty = packer.serialize(&HashMap::<u32, u32>::new()).unwrap();
        assert_eq!(empty, [0; 4]);
        assert!(packer.deserialize::<HashMap<u32, u32>>(&empty).unwrap().is_empty());
    }

    #[test]
    fn decoded_map_uses_injected_hasher() {
        type Fixed = BuildHasherDefault<DefaultHasher>;
        let packer = Packer::default();
        packer.registry().register_map_with_hasher::<u8, String, Fixed>(Fixed::default());

        let mut map = HashMap::with_hasher(Fixed::default());
        map.insert(1u8, "one".to_string());
        map.insert(2u8, "two".to_string());

        let bytes = packer.serialize(&map).unwrap();
        let decoded: HashMap<u8, String, Fixed> = packer.deserialize(&bytes).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let packer = Packer::default();
        packer.registry().register_map::<u8, u8>();
        // count 2, entries (7 => 1), (7 => 2)
        let bytes = [2, 0, 0, 0, 7, 1, 7, 2];
        assert!(matches!(
            packer.deserialize::<HashMap<u8, u8>>(&bytes),
            Err(PackError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn set_roundtrip_and_duplicates() {
        let packer = Packer::default();
        packer.registry().register_set::<String>();

        let set: HashSet<String> = ["x", "y"].into_iter().map(String::from).collect();
        let bytes = packer.serialize(&Some(set.clone())).unwrap();
        assert_eq!(packer.deserialize::<Option<HashSet<String>>>(&bytes).unwrap(), Some(set));

        let mut dup = Vec::new();
        dup.extend_from_slice(&2i32.to_le_bytes());
        for _ in 0..2 {
            dup.extend_from_slice(&1i32.to_le_bytes());
            dup.push(b'z');
        }
        assert!(matches!(
            packer.deserialize::<HashSet<String>>(&dup),
            Err(PackError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn truncated_value_fails() {
        let packer = Packer::default();
        packer.registry().register_map::<u8, u32>();
        let bytes = [1, 0, 0, 0, 5, 0xAA];
        assert!(matches!(
            packer.deserialize::<HashMap<u8, u32>>(&bytes),
            Err(PackError::UnexpectedEndOfInput { .. })
        ));
    }
}
