//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PROOF_MAX_ATTEMPTS, PAIR_COOLDOWN_*, ...)
//!     → validation.rs (semantic checks)
//!     → RunnerConfig (validated, immutable)
//!     → handed to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    BlockchainConfig, ConfirmationConfig, CooldownConfig, ObservabilityConfig, PairConfig,
    ProofConfig, RunConfig, RunnerConfig, TradeConfig,
};
