//! Trade intent generation.

use alloy::primitives::U256;
use rand::Rng;

use crate::config::TradeConfig;
use crate::random::RandomSource;

/// Side and collateral amount for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeIntent {
    pub is_long: bool,
    /// Collateral in the token's smallest unit.
    pub amount: U256,
}

impl TradeIntent {
    /// Draw a side uniformly and an amount uniformly in `[min_amount, max_amount]`.
    pub fn draw(config: &TradeConfig, rng: &RandomSource) -> Self {
        let low = config.min_amount.min(config.max_amount);
        let high = config.min_amount.max(config.max_amount);
        let (is_long, amount) = rng.with(|rng| (rng.gen_bool(0.5), rng.gen_range(low..=high)));
        Self {
            is_long,
            amount: U256::from(amount),
        }
    }

    pub fn side(&self) -> &'static str {
        if self.is_long {
            "long"
        } else {
            "short"
        }
    }
}
