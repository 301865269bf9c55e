//! Transaction confirmation with bounded lookups and a long-wait fallback.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::types::{Ledger, LedgerError, Receipt};
use crate::config::ConfirmationConfig;
use crate::observability::metrics;
use crate::random::RandomSource;
use crate::resilience::{calculate_backoff, AttemptOutcome, BackoffPolicy, RetryAttempt, Sleeper};

/// Errors from [`ConfirmationPoller::await_confirmation`].
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// No receipt after the bounded lookups and the long wait.
    #[error("No receipt for {tx_hash} after {tries} lookups and the long wait")]
    Exhausted { tx_hash: TxHash, tries: u32 },

    /// A lookup failed in a way retrying will not fix.
    #[error("Receipt lookup failed: {0}")]
    Fatal(#[source] LedgerError),
}

/// Resolves a submitted transaction to its receipt.
///
/// Only finality is resolved here; whether the receipt reports success is the
/// caller's concern.
#[derive(Clone)]
pub struct ConfirmationPoller {
    ledger: Arc<dyn Ledger>,
    tries: u32,
    backoff: BackoffPolicy,
    long_wait: Duration,
    rng: Arc<RandomSource>,
    sleeper: Arc<dyn Sleeper>,
}

impl ConfirmationPoller {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        config: &ConfirmationConfig,
        rng: Arc<RandomSource>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            ledger,
            tries: config.tries,
            backoff: config.backoff,
            long_wait: Duration::from_secs(config.long_wait_secs),
            rng,
            sleeper,
        }
    }

    pub async fn await_confirmation(&self, tx_hash: TxHash) -> Result<Receipt, ConfirmationError> {
        let subject = tx_hash.to_string();

        for attempt in 0..self.tries {
            let outcome = match self.ledger.get_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    RetryAttempt::new(attempt, AttemptOutcome::Success).log("receipt", &subject);
                    return Ok(receipt);
                }
                Ok(None) => AttemptOutcome::RetryableEmpty,
                Err(e) if e.is_transient() => AttemptOutcome::RetryableError(e.to_string()),
                Err(e) => {
                    RetryAttempt::new(attempt, AttemptOutcome::Fatal(e.to_string()))
                        .log("receipt", &subject);
                    return Err(ConfirmationError::Fatal(e));
                }
            };

            let delay = calculate_backoff(attempt, &self.backoff, &self.rng);
            RetryAttempt::new(attempt, outcome)
                .with_delay(delay)
                .log("receipt", &subject);
            self.sleeper.sleep(delay).await;
        }

        metrics::record_confirmation_fallback();
        tracing::info!(
            tx_hash = %tx_hash,
            wait_secs = self.long_wait.as_secs(),
            "Bounded receipt lookups exhausted, waiting for confirmation"
        );

        match self.ledger.wait_for_receipt(tx_hash, self.long_wait).await {
            Ok(Some(receipt)) => Ok(receipt),
            Ok(None) => Err(ConfirmationError::Exhausted {
                tx_hash,
                tries: self.tries,
            }),
            Err(e) if e.is_transient() => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Long wait failed");
                Err(ConfirmationError::Exhausted {
                    tx_hash,
                    tries: self.tries,
                })
            }
            Err(e) => Err(ConfirmationError::Fatal(e)),
        }
    }
}
