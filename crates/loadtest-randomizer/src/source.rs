//! Random number sources used by the randomizer.
//!
//! Workers call into the source concurrently, so every implementation is
//! `Send + Sync` and takes `&self`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Source of uniformly distributed integers.
pub trait RandomSource: Send + Sync {
    /// Return an integer in `[min, max]`. Callers guarantee `min <= max`.
    fn next_in_range(&self, min: i64, max: i64) -> i64;
}

/// Production source backed by the thread-local generator.
///
/// Each worker thread draws from its own generator, so there is no
/// contention between workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_in_range(&self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        rand::rng().random_range(min..=max)
    }
}

/// Deterministic source seeded from a `u64`.
///
/// All callers share one generator behind a mutex, so the sequence is
/// reproducible for a single caller and merely well-distributed when
/// several workers interleave.
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_in_range(&self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(min..=max)
    }
}

impl std::fmt::Debug for SeededSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededSource").finish_non_exhaustive()
    }
}
