//! High-level [`Packer`] API: the primary embedding surface.
//!
//! ```
//! use packwire::{Packer, PackOptions};
//!
//! let packer = Packer::new(PackOptions::default());
//! packer.registry().register_list::<String>();
//!
//! let names = Some(vec!["ada".to_string(), "grace".to_string()]);
//! let bytes = packer.serialize(&names)?;
//! let back: Option<Vec<String>> = packer.deserialize(&bytes)?;
//! assert_eq!(back, names);
//! # Ok::<(), packwire::PackError>(())
//! ```

use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::FormatterRegistry;
use crate::collections::IterableFormatter;
use crate::error::Result;
use crate::io_stream::{Reader, Writer};
use crate::staging::StagingPool;

/// Default number of idle staging buffers kept for reuse.
pub const DEFAULT_MAX_POOLED_BUFFERS:    usize = 16;
/// Default capacity of a freshly allocated staging buffer: 4 KiB.
pub const DEFAULT_STAGING_CAPACITY:      usize = 4 * 1024;
/// Staging buffers that grew past this are freed on return: 1 MiB.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

// ── PackOptions ───────────────────────────────────────────────────────────────

/// Configuration for [`Packer::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackOptions {
    pub max_pooled_buffers:       usize,
    pub staging_initial_capacity: usize,
    pub max_retained_capacity:    usize,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            max_pooled_buffers:       DEFAULT_MAX_POOLED_BUFFERS,
            staging_initial_capacity: DEFAULT_STAGING_CAPACITY,
            max_retained_capacity:    DEFAULT_MAX_RETAINED_CAPACITY,
        }
    }
}

impl PackOptions {
    /// Parse options from JSON.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Packer ────────────────────────────────────────────────────────────────────

/// Entry point: owns a formatter registry and a staging pool.
///
/// Cloning is cheap; clones share both.  A `Packer` is `Send + Sync`, so one
/// instance can serve every thread of a process.
#[derive(Clone)]
pub struct Packer {
    registry: Arc<FormatterRegistry>,
    staging:  Arc<StagingPool>,
    options:  PackOptions,
}

impl Packer {
    /// A packer over a registry preloaded with the builtin formatters.
    pub fn new(options: PackOptions) -> Self {
        Self::with_registry(FormatterRegistry::with_defaults(), options)
    }

    pub fn with_registry(registry: FormatterRegistry, options: PackOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            staging:  Arc::new(StagingPool::new(&options)),
            options,
        }
    }

    #[inline]
    pub fn registry(&self) -> &FormatterRegistry { &self.registry }

    #[inline]
    pub fn staging(&self) -> &StagingPool { &self.staging }

    #[inline]
    pub fn options(&self) -> &PackOptions { &self.options }

    // ── Write ─────────────────────────────────────────────────────────────────

    pub fn serialize<T: 'static>(&self, value: &T) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize_into(value, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of `value` to `out`.  On error `out` is restored
    /// to its original length.
    pub fn serialize_into<T: 'static>(&self, value: &T, out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        let result = Writer::new(out, self).write_value(value);
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    /// Encode a sequence that may only be enumerable once.  `None` encodes a
    /// null container.
    pub fn serialize_iter<T, I>(&self, source: Option<I>) -> Result<Vec<u8>>
    where
        T: 'static,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut out = Vec::new();
        IterableFormatter::<T>::new().serialize(&mut Writer::new(&mut out, self), source)?;
        Ok(out)
    }

    // ── Read ──────────────────────────────────────────────────────────────────

    pub fn deserialize<T: 'static>(&self, bytes: &[u8]) -> Result<T> {
        Reader::new(bytes, self).read_value()
    }

    /// Decode into an existing value, reusing its storage where the
    /// formatter supports that.
    pub fn deserialize_into<T: 'static>(&self, bytes: &[u8], slot: &mut T) -> Result<()> {
        Reader::new(bytes, self).read_value_into(slot)
    }

    pub fn deserialize_iter<T: 'static>(&self, bytes: &[u8]) -> Result<Option<Vec<T>>> {
        IterableFormatter::<T>::new().deserialize(&mut Reader::new(bytes, self))
    }
}

impl Default for Packer {
    fn default() -> Self {
        Self::new(PackOptions::default())
    }
}
