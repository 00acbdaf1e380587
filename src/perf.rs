//! Batch encoding and decoding of independent values.
//!
//! # Parallelism
//!
//! With the `parallel` feature, [`serialize_batch`] and [`deserialize_batch`]
//! spread the work across Rayon's global pool.  Every value is encoded into
//! its own output buffer, so the only shared state is the packer's registry
//! (read-locked) and its staging pool, where each worker checks out a buffer
//! of its own.  Without the feature both functions run sequentially and
//! produce identical results.
//!
//! Results keep input order.  If any value fails, the first error in input
//! order is returned.

use crate::error::Result;
use crate::packer::Packer;

/// Encode every value of `values` separately.
pub fn serialize_batch<T>(packer: &Packer, values: &[T]) -> Result<Vec<Vec<u8>>>
where
    T: Sync + 'static,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let results: Vec<Result<Vec<u8>>> = values
            .par_iter()
            .map(|value| packer.serialize(value))
            .collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        values.iter().map(|value| packer.serialize(value)).collect()
    }
}

/// Decode every buffer of `inputs` as a `T`.
pub fn deserialize_batch<T>(packer: &Packer, inputs: &[&[u8]]) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let results: Vec<Result<T>> = inputs
            .par_iter()
            .map(|bytes| packer.deserialize(bytes))
            .collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(|bytes| packer.deserialize(bytes)).collect()
    }
}
