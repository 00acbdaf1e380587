//! Staging buffer pool.
//!
//! A sequence that can be enumerated only once and cannot report its length
//! up front is encoded in two phases: serialize every element into a staging
//! buffer while counting, then write the real length header and copy the
//! staged bytes across in one transfer.  The staging buffers come from this
//! pool.
//!
//! # Ownership
//! [`StagingPool::checkout`] hands out a [`StagingBuffer`] guard that owns its
//! `Vec<u8>` exclusively.  Dropping the guard clears the buffer and returns it
//! to the free list, on success and error paths alike.
//!
//! # Bounds
//! At most `max_pooled_buffers` idle buffers are kept, and a buffer that grew
//! beyond `max_retained_capacity` is freed instead of pooled.  Neither bound
//! limits concurrent checkouts; a checkout never blocks on another one.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::packer::PackOptions;

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingStats {
    /// Guards currently checked out.
    pub outstanding: usize,
    /// Idle buffers on the free list.
    pub pooled:      usize,
    /// Checkouts served by a fresh allocation.
    pub allocated:   usize,
    /// Checkouts served from the free list.
    pub reused:      usize,
    /// Returned buffers dropped instead of pooled.
    pub discarded:   usize,
}

pub struct StagingPool {
    free:                  Mutex<Vec<Vec<u8>>>,
    max_pooled_buffers:    usize,
    initial_capacity:      usize,
    max_retained_capacity: usize,

    outstanding: AtomicUsize,
    allocated:   AtomicUsize,
    reused:      AtomicUsize,
    discarded:   AtomicUsize,
}

impl StagingPool {
    pub fn new(options: &PackOptions) -> Self {
        Self {
            free:                  Mutex::new(Vec::new()),
            max_pooled_buffers:    options.max_pooled_buffers,
            initial_capacity:      options.staging_initial_capacity,
            max_retained_capacity: options.max_retained_capacity,
            outstanding: AtomicUsize::new(0),
            allocated:   AtomicUsize::new(0),
            reused:      AtomicUsize::new(0),
            discarded:   AtomicUsize::new(0),
        }
    }

    /// Check out an empty buffer for exclusive use.
    pub fn checkout(&self) -> StagingBuffer<'_> {
        let recycled = self.free.lock().pop();
        let buf = match recycled {
            Some(buf) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                debug!(capacity = self.initial_capacity, "allocating staging buffer");
                Vec::with_capacity(self.initial_capacity)
            }
        };
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        StagingBuffer { buf, pool: self }
    }

    fn release(&self, mut buf: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        buf.clear();

        if buf.capacity() > self.max_retained_capacity {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            warn!(
                capacity = buf.capacity(),
                limit = self.max_retained_capacity,
                "dropping oversized staging buffer"
            );
            return;
        }

        let mut free = self.free.lock();
        if free.len() >= self.max_pooled_buffers {
            drop(free);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(limit = self.max_pooled_buffers, "staging pool full, dropping buffer");
            return;
        }
        free.push(buf);
    }

    /// Free every idle buffer.  Returns the number of bytes released.
    pub fn shrink(&self) -> usize {
        let mut free = self.free.lock();
        let reclaimed = free.iter().map(Vec::capacity).sum();
        free.clear();
        reclaimed
    }

    pub fn stats(&self) -> StagingStats {
        StagingStats {
            outstanding: self.outstanding.load(Ordering::Relaxed),
            pooled:      self.free.lock().len(),
            allocated:   self.allocated.load(Ordering::Relaxed),
            reused:      self.reused.load(Ordering::Relaxed),
            discarded:   self.discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for StagingPool {
    fn default() -> Self {
        Self::new(&PackOptions::default())
    }
}

/// Exclusive handle to a pooled buffer.  Returned to the pool on drop.
pub struct StagingBuffer<'p> {
    buf:  Vec<u8>,
    pool: &'p StagingPool,
}

impl Deref for StagingBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for StagingBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for StagingBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
