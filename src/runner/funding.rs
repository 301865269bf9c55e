//! Collateral funding before a trade.
//!
//! # Responsibilities
//! - Top up from the faucet when the balance cannot cover the amount
//! - Make sure the spender may move the amount (reset a stale allowance first)
//! - Wait for every funding transaction to be final and successful

use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::{ConfirmationError, ConfirmationPoller, LedgerError, TokenGateway};

/// Errors from the funding step.
#[derive(Debug, Error)]
pub enum FundingError {
    #[error("Token call failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Balance {balance} below required {required} and no faucet configured")]
    InsufficientBalance { balance: U256, required: U256 },

    #[error("{step} not confirmed: {source}")]
    Confirmation {
        step: &'static str,
        #[source]
        source: ConfirmationError,
    },

    #[error("{step} transaction {tx_hash} reverted")]
    Reverted { step: &'static str, tx_hash: TxHash },
}

/// Prepares collateral for one wallet.
#[derive(Clone)]
pub struct Funding {
    tokens: Arc<dyn TokenGateway>,
    spender: Address,
    faucet_enabled: bool,
}

impl Funding {
    pub fn new(tokens: Arc<dyn TokenGateway>, spender: Address, faucet_enabled: bool) -> Self {
        Self {
            tokens,
            spender,
            faucet_enabled,
        }
    }

    /// Ensure `amount` of collateral is held and approved for the spender.
    pub async fn ensure(
        &self,
        amount: U256,
        poller: &ConfirmationPoller,
    ) -> Result<(), FundingError> {
        let owner = self.tokens.owner();

        let balance = self.tokens.balance_of(owner).await?;
        if balance < amount {
            if !self.faucet_enabled {
                return Err(FundingError::InsufficientBalance {
                    balance,
                    required: amount,
                });
            }
            tracing::info!(%balance, required = %amount, "Insufficient balance, claiming faucet");
            let tx_hash = self.tokens.claim_faucet().await?;
            confirm("faucet claim", tx_hash, poller).await?;
        }

        let allowance = self.tokens.allowance(owner, self.spender).await?;
        if allowance >= amount {
            tracing::debug!(%allowance, "Allowance sufficient");
            return Ok(());
        }

        if allowance > U256::ZERO {
            tracing::info!(%allowance, "Resetting allowance to zero");
            let tx_hash = self.tokens.approve(self.spender, U256::ZERO).await?;
            confirm("allowance reset", tx_hash, poller).await?;
        }

        tracing::info!(spender = %self.spender, %amount, "Approving collateral");
        let tx_hash = self.tokens.approve(self.spender, amount).await?;
        confirm("approve", tx_hash, poller).await
    }
}

async fn confirm(
    step: &'static str,
    tx_hash: TxHash,
    poller: &ConfirmationPoller,
) -> Result<(), FundingError> {
    let receipt = poller
        .await_confirmation(tx_hash)
        .await
        .map_err(|source| FundingError::Confirmation { step, source })?;
    if !receipt.success {
        return Err(FundingError::Reverted { step, tx_hash });
    }
    tracing::info!(step, tx_hash = %tx_hash, "Funding transaction confirmed");
    Ok(())
}
