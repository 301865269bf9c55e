//! Shared pair health tracker.
//!
//! # Responsibilities
//! - Record failures and successes per pair
//! - Answer eligibility for a given cycle
//! - Stay consistent when shared by several workers

use dashmap::DashMap;
use std::sync::Arc;

use crate::config::CooldownConfig;
use crate::health::clock::{Clock, SystemClock};
use crate::health::state::PairHealth;
use crate::load_balancer::PairId;
use crate::observability::metrics;

/// Tracks failures and cooldowns for every pair seen so far.
///
/// Records are created on first failure and kept for the process lifetime.
/// Each update holds the entry lock for the whole read-modify-write, so
/// concurrent reports for the same pair never lose an increment.
#[derive(Debug)]
pub struct HealthTracker {
    records: DashMap<PairId, PairHealth>,
    config: CooldownConfig,
    clock: Arc<dyn Clock>,
}

impl HealthTracker {
    /// Create a tracker on the system clock.
    pub fn new(config: CooldownConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a tracker on a custom clock.
    pub fn with_clock(config: CooldownConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            config,
            clock,
        }
    }

    /// Record a failure of `pair` observed during `cycle`.
    pub fn report_failure(&self, pair: PairId, cycle: u64) -> PairHealth {
        let now_ms = self.clock.now_ms();
        let updated = {
            let mut entry = self.records.entry(pair).or_default();
            entry.record_failure(&self.config, now_ms, cycle);
            *entry
        };

        let remaining_ms = updated.cooldown_until_ms.saturating_sub(now_ms);
        let remaining_min = remaining_ms.div_ceil(60_000);
        let remaining_cycles = updated.cooldown_until_cycle.saturating_sub(cycle);
        tracing::info!(
            pair,
            failures = updated.failure_count,
            cooldown_min = remaining_min,
            cooldown_cycles = remaining_cycles,
            "Pair cooling down for ~{}m / {} cycles",
            remaining_min,
            remaining_cycles
        );
        metrics::record_pair_cooldown(pair, updated.failure_count);

        updated
    }

    /// Record a success of `pair`. No-op for a pair that never failed.
    pub fn report_success(&self, pair: PairId) {
        let failures = match self.records.get_mut(&pair) {
            Some(mut entry) => {
                entry.record_success();
                entry.failure_count
            }
            None => return,
        };
        tracing::debug!(pair, failures, "Pair cooldown cleared");
        metrics::record_pair_failure_count(pair, failures);
    }

    /// Whether `pair` may be selected during `cycle`.
    pub fn is_eligible(&self, pair: PairId, cycle: u64) -> bool {
        match self.records.get(&pair) {
            Some(health) => health.is_eligible(self.clock.now_ms(), cycle),
            None => true,
        }
    }

    /// Copy of the current record, if any.
    pub fn snapshot(&self, pair: PairId) -> Option<PairHealth> {
        self.records.get(&pair).map(|r| *r.value())
    }

    /// Number of pairs with a record.
    pub fn tracked(&self) -> usize {
        self.records.len()
    }
}
