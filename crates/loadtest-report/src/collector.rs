//! Thread-safe sink for request outcomes.

use crate::outcome::RequestOutcome;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Upper bound on the outcomes reserved up front; larger runs grow on demand.
pub const MAX_PREALLOCATED_OUTCOMES: usize = 64 * 1024;

/// Collects outcomes pushed by concurrently running workers.
///
/// Outcomes are kept in arrival order. Each worker runs its iterations
/// sequentially, so one worker's outcomes appear in iteration order, while
/// the interleaving between workers is arbitrary.
#[derive(Debug, Default)]
pub struct ResultCollector {
    outcomes: Mutex<Vec<RequestOutcome>>,
}

impl ResultCollector {
    /// Create a collector sized for `expected` outcomes, up to
    /// [`MAX_PREALLOCATED_OUTCOMES`].
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            outcomes: Mutex::new(Vec::with_capacity(expected.min(MAX_PREALLOCATED_OUTCOMES))),
        }
    }

    /// Take ownership of one outcome.
    pub fn push(&self, outcome: RequestOutcome) {
        self.guard().push(outcome);
    }

    /// Number of outcomes collected so far.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Number of outcomes recorded for one worker.
    pub fn count_for_thread(&self, thread: usize) -> usize {
        self.guard().iter().filter(|o| o.thread == thread).count()
    }

    /// Drain every collected outcome in arrival order.
    ///
    /// Called after the join barrier, when no worker can push anymore.
    pub fn take_outcomes(&self) -> Vec<RequestOutcome> {
        std::mem::take(&mut *self.guard())
    }

    // Pushes are single appends, so a poisoned lock still guards a consistent vector.
    fn guard(&self) -> MutexGuard<'_, Vec<RequestOutcome>> {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
