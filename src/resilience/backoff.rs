//! Exponential backoff with optional jitter.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::random::RandomSource;

/// Lower bound of the jitter multiplier.
const JITTER_MIN: f64 = 0.7;
/// Upper bound (exclusive) of the jitter multiplier.
const JITTER_MAX: f64 = 1.3;

/// Parameters of an exponential backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Delay for attempt 0 in milliseconds.
    pub base_ms: u64,
    /// Growth factor per attempt.
    pub factor: f64,
    /// Upper bound on the un-jittered delay in milliseconds.
    pub cap_ms: u64,
    /// Scale the delay by a uniform factor in [0.7, 1.3).
    pub jitter: bool,
}

impl BackoffPolicy {
    /// General-purpose curve used for transient RPC errors.
    pub const DEFAULT: Self = Self {
        base_ms: 1_000,
        factor: 1.6,
        cap_ms: 30_000,
        jitter: true,
    };

    /// Steeper curve used against the proof service.
    pub const PROOF: Self = Self {
        base_ms: 1_500,
        factor: 1.7,
        cap_ms: 45_000,
        jitter: true,
    };

    /// Return a copy with jitter disabled.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// `min(cap, floor(base * factor^attempt))` in milliseconds.
    pub fn raw_delay_ms(&self, attempt: u32) -> u64 {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_ms as f64 * self.factor.powi(exponent);
        // NaN and +inf both collapse to the cap.
        if raw.is_nan() || raw >= self.cap_ms as f64 {
            return self.cap_ms;
        }
        raw.floor().max(0.0) as u64
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Calculate the backoff delay before retrying after `attempt` (0-based).
pub fn calculate_backoff(attempt: u32, policy: &BackoffPolicy, rng: &RandomSource) -> Duration {
    let raw_ms = policy.raw_delay_ms(attempt);
    if !policy.jitter {
        return Duration::from_millis(raw_ms);
    }

    let scale = rng.with(|r| r.gen_range(JITTER_MIN..JITTER_MAX));
    Duration::from_millis((raw_ms as f64 * scale).floor() as u64)
}
