//! Trade cycle orchestration.
//!
//! # Data Flow
//! ```text
//! run loop (cycle.rs)
//!     → intent.rs (side, amount)
//!     → funding.rs (faucet, allowance)
//!     → PairSelector → ProofFetcher → Ledger::submit_trade
//!     → ConfirmationPoller
//!     → HealthTracker (success or one failure report)
//!     → random delay, or stop on shutdown
//! ```
//!
//! # Design Decisions
//! - Cycle steps run strictly in order on one task
//! - Funding failures are not the pair's fault and leave health untouched

pub mod cycle;
pub mod funding;
pub mod intent;

pub use cycle::{CycleError, CycleOutcome, Orchestrator, RunSummary};
pub use funding::{Funding, FundingError};
pub use intent::TradeIntent;
