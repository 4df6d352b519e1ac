//! Size Estimation Module
//!
//! Assigns an estimated byte size to each cached value. The cache enforces
//! `Σ size ≤ max_size` with these estimates, so they only need to be
//! deterministic, not exact.

use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

// == Size Estimator ==
/// Computes the estimated size of a value in bytes.
///
/// Returning `None` means the value could not be measured; the cache then
/// rejects it instead of storing it. A returned size of 0 is treated as 1 so
/// no entry escapes accounting.
pub trait SizeEstimator<V>: Send + Sync {
    fn estimate(&self, value: &V) -> Option<u64>;
}

// == JSON Estimator ==
/// Measures the length of the value's `serde_json` encoding.
pub struct JsonSizeEstimator<V> {
    _marker: PhantomData<fn(&V)>,
}

impl<V> JsonSizeEstimator<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for JsonSizeEstimator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SizeEstimator<V> for JsonSizeEstimator<V>
where
    V: Serialize + 'static,
{
    fn estimate(&self, value: &V) -> Option<u64> {
        match serde_json::to_vec(value) {
            Ok(bytes) => Some((bytes.len() as u64).max(1)),
            Err(err) => {
                warn!("Size estimation failed: {}", err);
                None
            }
        }
    }
}

// == Closure Estimator ==
/// A size estimator backed by a closure.
///
/// A panic inside the closure is caught and reported as a failed estimate.
pub struct FnEstimator<F>(pub F);

impl<V, F> SizeEstimator<V> for FnEstimator<F>
where
    F: Fn(&V) -> u64 + Send + Sync + 'static,
{
    fn estimate(&self, value: &V) -> Option<u64> {
        match catch_unwind(AssertUnwindSafe(|| (self.0)(value))) {
            Ok(size) => Some(size.max(1)),
            Err(_) => {
                warn!("Size estimator panicked, rejecting value");
                None
            }
        }
    }
}
