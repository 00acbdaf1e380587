//! Formatter registry: per-type element codecs keyed by `TypeId`.
//!
//! # Identity rules
//! A formatter is registered once per concrete Rust type and resolved by that
//! type's `TypeId`.  Resolution returns a shared `Arc<dyn Formatter<T>>`;
//! the registry is the only cache, so collection codecs resolve once per
//! container call and never memoize on their own.
//!
//! # Blittable types
//! Types satisfying [`Blittable`] are registered through
//! [`FormatterRegistry::register_blittable`].  Their formatter exposes a
//! [`RawLayout`], and collection codecs test for that capability to decide
//! between the bulk span path and per-element dispatch.  The raw layout is
//! the host's native in-memory layout; producer and consumer must agree on
//! it.

pub mod builtin;
pub mod raw;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{PackError, Result};
use crate::io_stream::{Reader, Writer};

pub use raw::{Blittable, RawFormatter, RawLayout};

// ── Formatter trait ──────────────────────────────────────────────────────────

/// Serialize / deserialize capability for a single value of `T`.
///
/// A formatter handles its own nulls: nullable shapes are modelled as
/// `Option<_>` types with their own formatter.
pub trait Formatter<T>: Send + Sync {
    fn serialize(&self, writer: &mut Writer<'_>, value: &T) -> Result<()>;

    fn deserialize(&self, reader: &mut Reader<'_>) -> Result<T>;

    /// Decode into an existing value.  Formatters that can reuse the
    /// destination's storage override this; the default replaces it.
    ///
    /// On error the destination's contents are unspecified.
    fn deserialize_into(&self, reader: &mut Reader<'_>, slot: &mut T) -> Result<()> {
        *slot = self.deserialize(reader)?;
        Ok(())
    }

    /// Raw-memory view of `T`, present only for blittable types.
    fn raw_layout(&self) -> Option<&dyn RawLayout<T>> {
        None
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

type Erased = Arc<dyn Any + Send + Sync>;

/// Thread-safe map from `TypeId` to `Arc<dyn Formatter<T>>`.
///
/// Registration takes `&self`, so a registry can be shared behind an `Arc`
/// and extended after the fact.  Re-registering a type replaces its formatter.
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: RwLock<HashMap<TypeId, Erased>>,
}

impl FormatterRegistry {
    /// An empty registry.  Nothing resolves until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the builtin formatters
    /// (see [`builtin::register_defaults`]).
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        builtin::register_defaults(&registry);
        registry
    }

    pub fn register<T, F>(&self, formatter: F)
    where
        T: 'static,
        F: Formatter<T> + 'static,
    {
        let handle: Arc<dyn Formatter<T>> = Arc::new(formatter);
        let erased: Erased = Arc::new(handle);
        self.formatters.write().insert(TypeId::of::<T>(), erased);
        debug!(type_name = type_name::<T>(), "registered formatter");
    }

    /// Resolve the formatter for `T`.
    ///
    /// Returns `Err(PackError::FormatterNotRegistered)` if nothing was
    /// registered for the type.  Callers must not fall back to another type.
    pub fn resolve<T: 'static>(&self) -> Result<Arc<dyn Formatter<T>>> {
        let erased = self
            .formatters
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or_else(PackError::not_registered::<T>)?;
        erased
            .downcast_ref::<Arc<dyn Formatter<T>>>()
            .cloned()
            .ok_or_else(PackError::not_registered::<T>)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.formatters.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.formatters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `T` as blittable: values are copied as raw native bytes and
    /// containers of `T` become eligible for the bulk span path.
    pub fn register_blittable<T: Blittable>(&self) {
        self.register::<T, _>(RawFormatter::<T>::new());
    }
}
