//! Pair selection subsystem.
//!
//! # Data Flow
//! ```text
//! Cycle starts → pool of configured pairs
//!     → selector.rs (keep pairs the health tracker deems eligible)
//!     → fall back to the whole pool if none are eligible
//!     → uniform random pick
//! ```
//!
//! # Design Decisions
//! - Selector is stateless; the health tracker owns all state
//! - Never blocks waiting for a cooldown to clear

pub mod selector;

use crate::config::PairConfig;

/// On-chain pair index.
pub type PairId = u64;

/// A pair in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub id: PairId,
    pub name: String,
}

impl From<&PairConfig> for Pair {
    fn from(config: &PairConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
        }
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id={})", self.name, self.id)
    }
}

pub use selector::PairSelector;
