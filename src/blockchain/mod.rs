//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private keys)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts, pre-flight, broadcast)
//!     → confirm.rs (bounded receipt lookups, long-wait fallback)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod confirm;
pub mod contracts;
pub mod types;
pub mod wallet;

pub use client::LedgerClient;
pub use confirm::{ConfirmationError, ConfirmationPoller};
pub use types::{Ledger, LedgerError, LedgerResult, Receipt, TokenGateway, TradeRequest};
pub use wallet::Wallet;
