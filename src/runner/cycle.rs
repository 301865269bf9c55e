//! The orchestration loop: select, fetch, submit, confirm, update health.

use alloy::primitives::TxHash;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::{ConfirmationError, ConfirmationPoller, Ledger, LedgerError, TradeRequest};
use crate::config::{RunConfig, TradeConfig};
use crate::health::HealthTracker;
use crate::lifecycle::ShutdownSignal;
use crate::load_balancer::{Pair, PairId, PairSelector};
use crate::observability::{logging, metrics};
use crate::proof::{FetchError, ProofFetcher};
use crate::random::RandomSource;
use crate::resilience::Sleeper;
use crate::runner::funding::{Funding, FundingError};
use crate::runner::intent::TradeIntent;

/// Why a cycle was abandoned.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Funding failed: {0}")]
    Funding(#[from] FundingError),

    #[error("Pair pool is empty")]
    EmptyPool,

    #[error("Proof unavailable for pair {pair}: {source}")]
    Fetch {
        pair: PairId,
        #[source]
        source: FetchError,
    },

    #[error("Submission failed for pair {pair}: {source}")]
    Submit {
        pair: PairId,
        #[source]
        source: LedgerError,
    },

    #[error("Confirmation failed for pair {pair}: {source}")]
    Confirmation {
        pair: PairId,
        #[source]
        source: ConfirmationError,
    },

    #[error("Trade {tx_hash} on pair {pair} reverted")]
    Reverted { pair: PairId, tx_hash: TxHash },
}

impl CycleError {
    /// The pair at fault, if the failure is attributable to one.
    pub fn pair(&self) -> Option<PairId> {
        match self {
            Self::Funding(_) | Self::EmptyPool => None,
            Self::Fetch { pair, .. }
            | Self::Submit { pair, .. }
            | Self::Confirmation { pair, .. }
            | Self::Reverted { pair, .. } => Some(*pair),
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Funding(_) => "funding_failed",
            Self::EmptyPool => "empty_pool",
            Self::Fetch { .. } => "proof_failed",
            Self::Submit { .. } => "submit_failed",
            Self::Confirmation { .. } => "unconfirmed",
            Self::Reverted { .. } => "reverted",
        }
    }
}

/// A cycle that ended with a successful trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub pair: PairId,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Totals for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Runs trade cycles for one wallet.
pub struct Orchestrator {
    pool: Vec<Pair>,
    selector: PairSelector,
    tracker: Arc<HealthTracker>,
    fetcher: ProofFetcher,
    ledger: Arc<dyn Ledger>,
    poller: ConfirmationPoller,
    funding: Option<Funding>,
    trade: TradeConfig,
    rng: Arc<RandomSource>,
    sleeper: Arc<dyn Sleeper>,
    cycle: AtomicU64,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: Vec<Pair>,
        tracker: Arc<HealthTracker>,
        fetcher: ProofFetcher,
        ledger: Arc<dyn Ledger>,
        poller: ConfirmationPoller,
        trade: TradeConfig,
        rng: Arc<RandomSource>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            selector: PairSelector::new(tracker.clone(), rng.clone()),
            pool,
            tracker,
            fetcher,
            ledger,
            poller,
            funding: None,
            trade,
            rng,
            sleeper,
            cycle: AtomicU64::new(0),
        }
    }

    /// Fund collateral before every trade.
    pub fn with_funding(mut self, funding: Funding) -> Self {
        self.funding = Some(funding);
        self
    }

    /// Last cycle number used.
    pub fn current_cycle(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }

    /// Run one cycle.
    ///
    /// `cycle` is the caller's counter; when `None` the internal counter is
    /// advanced instead. A pair-attributable failure is reported to the
    /// health tracker exactly once.
    pub async fn run_cycle(&self, cycle: Option<u64>) -> Result<CycleOutcome, CycleError> {
        let cycle = match cycle {
            Some(cycle) => {
                self.cycle.fetch_max(cycle, Ordering::SeqCst);
                cycle
            }
            None => self.cycle.fetch_add(1, Ordering::SeqCst) + 1,
        };

        let result = self.execute(cycle).await;
        match &result {
            Ok(outcome) => {
                self.tracker.report_success(outcome.pair);
                metrics::record_cycle("success");
                tracing::info!(
                    cycle,
                    pair = outcome.pair,
                    tx_hash = %outcome.tx_hash,
                    block = ?outcome.block_number,
                    "Position opened"
                );
            }
            Err(e) => {
                if let Some(pair) = e.pair() {
                    self.tracker.report_failure(pair, cycle);
                }
                metrics::record_cycle(e.label());
                tracing::warn!(cycle, pair = ?e.pair(), reason = %e, "Cycle abandoned");
            }
        }
        result
    }

    async fn execute(&self, cycle: u64) -> Result<CycleOutcome, CycleError> {
        let pair = self
            .selector
            .select(&self.pool, cycle)
            .ok_or(CycleError::EmptyPool)?;
        let intent = TradeIntent::draw(&self.trade, &self.rng);
        tracing::info!(
            cycle,
            pair = %pair,
            side = intent.side(),
            amount = %intent.amount,
            "Pair selected"
        );

        // Not the pair's fault if this fails.
        if let Some(funding) = &self.funding {
            funding.ensure(intent.amount, &self.poller).await?;
        }

        let proof = self
            .fetcher
            .fetch(pair.id)
            .await
            .map_err(|source| CycleError::Fetch {
                pair: pair.id,
                source,
            })?;

        let request = TradeRequest {
            pair: pair.id,
            proof,
            is_long: intent.is_long,
            leverage: self.trade.leverage,
            amount: intent.amount,
        };
        let tx_hash = self
            .ledger
            .submit_trade(&request)
            .await
            .map_err(|source| CycleError::Submit {
                pair: pair.id,
                source,
            })?;
        tracing::info!(cycle, pair = pair.id, tx_hash = %tx_hash, "Trade submitted");

        let receipt = self
            .poller
            .await_confirmation(tx_hash)
            .await
            .map_err(|source| CycleError::Confirmation {
                pair: pair.id,
                source,
            })?;

        if !receipt.success {
            return Err(CycleError::Reverted {
                pair: pair.id,
                tx_hash,
            });
        }

        Ok(CycleOutcome {
            cycle,
            pair: pair.id,
            tx_hash,
            block_number: receipt.block_number,
        })
    }

    /// Run `loop_count` cycles, or until shutdown when `forever` is set.
    ///
    /// A cycle error never ends the run.
    pub async fn run(&self, config: &RunConfig, mut shutdown: ShutdownSignal) -> RunSummary {
        let mut summary = RunSummary::default();

        let finished =
            |summary: &RunSummary| !config.forever && summary.cycles >= config.loop_count;

        loop {
            if finished(&summary) {
                break;
            }
            if shutdown.is_triggered() {
                tracing::info!(cycles = summary.cycles, "Shutdown observed, stopping");
                break;
            }

            match self.run_cycle(None).await {
                Ok(_) => summary.succeeded += 1,
                Err(_) => summary.failed += 1,
            }
            summary.cycles += 1;

            if finished(&summary) {
                break;
            }

            let delay = self.inter_cycle_delay(config);
            tracing::info!(
                next_in = %logging::format_hms(delay.as_millis() as u64),
                "Waiting before next cycle"
            );
            tokio::select! {
                _ = self.sleeper.sleep(delay) => {}
                _ = shutdown.wait() => {
                    tracing::info!(cycles = summary.cycles, "Shutdown during delay, stopping");
                    break;
                }
            }
        }

        tracing::info!(
            cycles = summary.cycles,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Run finished"
        );
        summary
    }

    fn inter_cycle_delay(&self, config: &RunConfig) -> Duration {
        let low = config.delay_min_ms.min(config.delay_max_ms);
        let high = config.delay_min_ms.max(config.delay_max_ms);
        Duration::from_millis(self.rng.with(|rng| rng.gen_range(low..=high)))
    }
}
