//! Random selection among healthy pairs.

use rand::seq::SliceRandom;
use std::sync::Arc;

use crate::health::HealthTracker;
use crate::load_balancer::Pair;
use crate::random::RandomSource;

/// Picks a pair for the next cycle.
#[derive(Debug, Clone)]
pub struct PairSelector {
    tracker: Arc<HealthTracker>,
    rng: Arc<RandomSource>,
}

impl PairSelector {
    pub fn new(tracker: Arc<HealthTracker>, rng: Arc<RandomSource>) -> Self {
        Self { tracker, rng }
    }

    /// Select a pair eligible during `cycle`, or any pair if none is.
    ///
    /// Returns `None` only for an empty pool.
    pub fn select<'a>(&self, pool: &'a [Pair], cycle: u64) -> Option<&'a Pair> {
        let eligible: Vec<&Pair> = pool
            .iter()
            .filter(|pair| self.tracker.is_eligible(pair.id, cycle))
            .collect();

        if eligible.is_empty() {
            if !pool.is_empty() {
                tracing::debug!(
                    cycle,
                    pool_size = pool.len(),
                    "Every pair is cooling down, choosing from full pool"
                );
            }
            return self.rng.with(|rng| pool.choose(rng));
        }

        self.rng.with(|rng| eligible.choose(rng).copied())
    }
}
