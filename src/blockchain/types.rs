//! Ledger-facing types, traits and error definitions.

use alloy::primitives::{Address, TxHash, U256};
use futures_util::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

use crate::load_balancer::PairId;
use crate::proof::Proof;

/// JSON-RPC code some nodes return when a request is throttled.
pub const RPC_LIMIT_EXCEEDED: i64 = -32004;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Busy, rate-limited or timed-out RPC; worth retrying.
    #[error("Transient RPC error: {0}")]
    Transient(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The static call or gas estimate reverted before broadcast.
    #[error("Pre-flight failed: {0}")]
    Preflight(String),

    /// Contract call failed after broadcast was attempted.
    #[error("Contract call failed: {0}")]
    Contract(String),

    /// Input that cannot be encoded for the contract.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl LedgerError {
    /// Whether the failure is worth a backoff-and-retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout(_))
    }

    /// Classify a raw RPC failure by JSON-RPC code and message text.
    pub fn from_rpc(code: Option<i64>, message: String) -> Self {
        let lower = message.to_ascii_lowercase();
        if code == Some(RPC_LIMIT_EXCEEDED)
            || lower.contains("busy")
            || lower.contains("rate")
            || lower.contains("timeout")
        {
            Self::Transient(message)
        } else {
            Self::Rpc(message)
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Final record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// `true` for final-success, `false` for final-failure (reverted).
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Everything the router needs to open a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub pair: PairId,
    pub proof: Proof,
    pub is_long: bool,
    pub leverage: u64,
    pub amount: U256,
}

/// Ledger operations used by the resilience core.
pub trait Ledger: Send + Sync {
    /// Single receipt lookup; `None` while the transaction is not final.
    fn get_receipt(&self, tx_hash: TxHash) -> BoxFuture<'_, LedgerResult<Option<Receipt>>>;

    /// Wait up to `timeout` for a receipt; `None` if none appeared.
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> BoxFuture<'_, LedgerResult<Option<Receipt>>>;

    /// Broadcast an `openPosition` transaction.
    fn submit_trade<'a>(&'a self, trade: &'a TradeRequest) -> BoxFuture<'a, LedgerResult<TxHash>>;
}

/// Collateral token operations used by the funding step.
pub trait TokenGateway: Send + Sync {
    /// Address that owns the collateral and signs transactions.
    fn owner(&self) -> Address;

    fn balance_of(&self, owner: Address) -> BoxFuture<'_, LedgerResult<U256>>;

    fn allowance(&self, owner: Address, spender: Address) -> BoxFuture<'_, LedgerResult<U256>>;

    fn approve(&self, spender: Address, amount: U256) -> BoxFuture<'_, LedgerResult<TxHash>>;

    /// Claim test collateral; errors if no faucet is configured.
    fn claim_faucet(&self) -> BoxFuture<'_, LedgerResult<TxHash>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_classification() {
        assert!(LedgerError::from_rpc(Some(-32004), "limit".into()).is_transient());
        assert!(LedgerError::from_rpc(None, "server busy".into()).is_transient());
        assert!(LedgerError::from_rpc(None, "Rate limited".into()).is_transient());
        assert!(LedgerError::from_rpc(None, "request timeout".into()).is_transient());
        assert!(!LedgerError::from_rpc(Some(-32000), "nonce too low".into()).is_transient());
        assert!(LedgerError::Timeout(10).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = LedgerError::ChainMismatch {
            expected: 1,
            actual: 5,
        };
        assert!(err.to_string().contains("expected 1"));
    }
}
