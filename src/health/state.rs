//! Per-pair health record.
//!
//! # States
//! - Eligible: no record, or both cooldown deadlines passed
//! - Cooling down: wall-clock deadline or cycle deadline still ahead
//!
//! # State Transitions
//! ```text
//! Eligible → Cooling down: failure reported (deadlines pushed out)
//! Cooling down → Eligible: now >= until_ms AND cycle >= until_cycle
//! Any → Eligible: success reported (deadlines zeroed, count - 1)
//! ```

use crate::config::CooldownConfig;

/// Health of one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairHealth {
    /// Accumulated failures, capped.
    pub failure_count: u32,
    /// Unix milliseconds before which the pair is skipped.
    pub cooldown_until_ms: u64,
    /// Cycle before which the pair is skipped.
    pub cooldown_until_cycle: u64,
}

impl PairHealth {
    /// True once both deadlines have passed.
    pub fn is_eligible(&self, now_ms: u64, cycle: u64) -> bool {
        now_ms >= self.cooldown_until_ms && cycle >= self.cooldown_until_cycle
    }

    /// Record a failure and push both deadlines out.
    pub fn record_failure(&mut self, config: &CooldownConfig, now_ms: u64, cycle: u64) {
        self.failure_count = (self.failure_count + 1).min(config.max_failures);

        let (cooldown_ms, cooldown_cycles) = cooldown_for(config, self.failure_count);
        self.cooldown_until_ms = now_ms.saturating_add(cooldown_ms);
        self.cooldown_until_cycle = cycle.saturating_add(cooldown_cycles);
    }

    /// Record a success: one failure forgiven, cooldowns cleared.
    pub fn record_success(&mut self) {
        self.failure_count = self.failure_count.saturating_sub(1);
        self.cooldown_until_ms = 0;
        self.cooldown_until_cycle = 0;
    }
}

/// Cooldown length after the `failures`-th failure: base doubled per failure,
/// capped separately for time and cycles.
pub fn cooldown_for(config: &CooldownConfig, failures: u32) -> (u64, u64) {
    let doublings = failures.saturating_sub(1);
    let multiplier = 2u64.saturating_pow(doublings);
    (
        config.base_ms.saturating_mul(multiplier).min(config.max_ms),
        config.base_cycles.saturating_mul(multiplier).min(config.max_cycles),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_doubles_then_caps() {
        let config = CooldownConfig::default();
        assert_eq!(cooldown_for(&config, 1), (60_000, 2));
        assert_eq!(cooldown_for(&config, 2), (120_000, 4));
        assert_eq!(cooldown_for(&config, 3), (240_000, 8));
        assert_eq!(cooldown_for(&config, 4), (480_000, 12));
        assert_eq!(cooldown_for(&config, 5), (900_000, 12));
        assert_eq!(cooldown_for(&config, 20), (900_000, 12));
    }

    #[test]
    fn test_failure_count_is_capped() {
        let config = CooldownConfig::default();
        let mut health = PairHealth::default();
        for _ in 0..25 {
            health.record_failure(&config, 0, 0);
        }
        assert_eq!(health.failure_count, 20);
    }

    #[test]
    fn test_success_floors_at_zero() {
        let mut health = PairHealth::default();
        health.record_success();
        assert_eq!(health, PairHealth::default());
    }
}
