//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the runner.
//! All types derive Serde traits for deserialization from TOML files; every
//! section has defaults so an empty file (or none at all) is valid input to
//! the environment override pass.

use serde::{Deserialize, Serialize};

use crate::resilience::BackoffPolicy;

/// Root configuration for the trading runner.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RunnerConfig {
    /// Proof (attestation) service settings.
    pub proof: ProofConfig,

    /// Pair cooldown settings.
    pub cooldown: CooldownConfig,

    /// Receipt confirmation settings.
    pub confirmation: ConfirmationConfig,

    /// Ledger RPC and contract addresses.
    pub blockchain: BlockchainConfig,

    /// Pair pool and position bounds.
    pub trade: TradeConfig,

    /// Loop count and inter-cycle delays.
    pub run: RunConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Proof service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProofConfig {
    /// Endpoint queried as `GET <endpoint>?pairs=<id>`.
    pub endpoint: String,

    /// Maximum fetch attempts per cycle.
    pub max_attempts: u32,

    /// Per-attempt timeout in seconds.
    pub attempt_timeout_secs: u64,

    /// Optional forward proxy (http or https URL).
    pub proxy_url: Option<String>,

    /// Backoff between attempts. Fields left out of the file keep the
    /// proof curve, not the general one.
    #[serde(deserialize_with = "proof_backoff")]
    pub backoff: BackoffPolicy,

    /// User agents rotated across attempts.
    pub user_agents: Vec<String>,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://proof.brokex.trade/proof".to_string(),
            max_attempts: 10,
            attempt_timeout_secs: 15,
            proxy_url: None,
            backoff: BackoffPolicy::PROOF,
            user_agents: vec![
                "pharos-network/1.0".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            ],
        }
    }
}

/// Backoff table where every field is optional.
#[derive(Debug, Default, Deserialize)]
struct PartialBackoff {
    base_ms: Option<u64>,
    factor: Option<f64>,
    cap_ms: Option<u64>,
    jitter: Option<bool>,
}

impl PartialBackoff {
    fn over(self, base: BackoffPolicy) -> BackoffPolicy {
        BackoffPolicy {
            base_ms: self.base_ms.unwrap_or(base.base_ms),
            factor: self.factor.unwrap_or(base.factor),
            cap_ms: self.cap_ms.unwrap_or(base.cap_ms),
            jitter: self.jitter.unwrap_or(base.jitter),
        }
    }
}

fn proof_backoff<'de, D>(deserializer: D) -> Result<BackoffPolicy, D::Error>
where
    D: serde::Deserializer<'de>,
{
    PartialBackoff::deserialize(deserializer).map(|partial| partial.over(BackoffPolicy::PROOF))
}

/// Pair cooldown configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Wall-clock cooldown after the first failure, in milliseconds.
    pub base_ms: u64,

    /// Upper bound on the wall-clock cooldown, in milliseconds.
    pub max_ms: u64,

    /// Cycle cooldown after the first failure.
    pub base_cycles: u64,

    /// Upper bound on the cycle cooldown.
    pub max_cycles: u64,

    /// Failure count ceiling.
    pub max_failures: u32,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            base_ms: 60_000,
            max_ms: 900_000,
            base_cycles: 2,
            max_cycles: 12,
            max_failures: 20,
        }
    }
}

/// Receipt confirmation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Bounded receipt lookups before the long wait.
    pub tries: u32,

    /// Backoff between lookups.
    pub backoff: BackoffPolicy,

    /// Duration of the fallback wait in seconds.
    pub long_wait_secs: u64,

    /// Poll interval used during the fallback wait, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            tries: 6,
            backoff: BackoffPolicy::DEFAULT,
            long_wait_secs: 120,
            poll_interval_ms: 2_000,
        }
    }
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Expected chain ID.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Trade router contract (`openPosition`).
    pub router_address: String,

    /// Spender approved to pull collateral.
    pub spender_address: String,

    /// Collateral ERC-20 token.
    pub collateral_token: String,

    /// Faucet contract for collateral top-ups. Empty disables the faucet.
    pub faucet_address: String,

    /// Extra gas on top of the estimate, in percent.
    pub gas_buffer_percent: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            router_address: String::new(),
            spender_address: String::new(),
            collateral_token: String::new(),
            faucet_address: String::new(),
            gas_buffer_percent: 20,
        }
    }
}

/// A tradable pair in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PairConfig {
    /// On-chain pair index.
    pub id: u64,

    /// Display name for logs.
    pub name: String,
}

/// Trade sizing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Pair pool to choose from.
    pub pairs: Vec<PairConfig>,

    /// Minimum collateral amount in token base units.
    pub min_amount: u64,

    /// Maximum collateral amount in token base units.
    pub max_amount: u64,

    /// Leverage passed to the router.
    pub leverage: u64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            pairs: Vec::new(),
            min_amount: 10_000_000,
            max_amount: 50_000_000,
            leverage: 1,
        }
    }
}

/// Run loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of cycles per worker. 0 runs no cycles.
    pub loop_count: u64,

    /// Ignore `loop_count` and run until shutdown.
    pub forever: bool,

    /// Lower bound of the inter-cycle delay in milliseconds.
    pub delay_min_ms: u64,

    /// Upper bound of the inter-cycle delay in milliseconds.
    pub delay_max_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            loop_count: 10,
            forever: false,
            delay_min_ms: 5_000,
            delay_max_ms: 15_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
