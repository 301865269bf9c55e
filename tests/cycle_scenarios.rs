//! End-to-end cycle scenarios against scripted collaborators.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use cfd_runner::blockchain::{ConfirmationError, ConfirmationPoller};
use cfd_runner::config::{ConfirmationConfig, CooldownConfig, ProofConfig, RunConfig, TradeConfig};
use cfd_runner::health::{HealthTracker, ManualClock};
use cfd_runner::lifecycle::{Shutdown, ShutdownSignal};
use cfd_runner::load_balancer::Pair;
use cfd_runner::proof::ProofFetcher;
use cfd_runner::random::RandomSource;
use cfd_runner::resilience::RecordingSleeper;
use cfd_runner::runner::{CycleError, Funding, FundingError, Orchestrator, RunSummary};
use common::{FailingTokens, ScriptedLedger, ScriptedTransport, SubmitBehavior};

mod common;

struct Harness {
    orchestrator: Orchestrator,
    tracker: Arc<HealthTracker>,
    ledger: Arc<ScriptedLedger>,
    transport: Arc<ScriptedTransport>,
    sleeper: Arc<RecordingSleeper>,
}

fn harness(transport: ScriptedTransport, script: Vec<SubmitBehavior>) -> Harness {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let tracker = Arc::new(HealthTracker::with_clock(CooldownConfig::default(), clock));
    let rng = Arc::new(RandomSource::seeded(42));
    let sleeper = Arc::new(RecordingSleeper::new());
    let transport = Arc::new(transport);
    let ledger = Arc::new(ScriptedLedger::new(script));

    let proof_config = ProofConfig {
        max_attempts: 3,
        ..ProofConfig::default()
    };
    let fetcher = ProofFetcher::new(transport.clone(), &proof_config, rng.clone(), sleeper.clone());
    let poller = ConfirmationPoller::new(
        ledger.clone(),
        &ConfirmationConfig::default(),
        rng.clone(),
        sleeper.clone(),
    );

    let orchestrator = Orchestrator::new(
        vec![Pair {
            id: 5,
            name: "BTC/USD".to_string(),
        }],
        tracker.clone(),
        fetcher,
        ledger.clone(),
        poller,
        TradeConfig::default(),
        rng,
        sleeper.clone(),
    );

    Harness {
        orchestrator,
        tracker,
        ledger,
        transport,
        sleeper,
    }
}

fn good_proof() -> ScriptedTransport {
    ScriptedTransport::always(200, r#"{"proof":"0xabcdef"}"#)
}

fn run_config(loop_count: u64) -> RunConfig {
    RunConfig {
        loop_count,
        forever: false,
        delay_min_ms: 1000,
        delay_max_ms: 1000,
    }
}

#[tokio::test]
async fn test_reverted_trade_reports_one_failure() {
    let h = harness(good_proof(), vec![SubmitBehavior::Mined { success: false }]);

    let err = h.orchestrator.run_cycle(None).await.unwrap_err();
    assert!(matches!(err, CycleError::Reverted { pair: 5, .. }));

    let health = h.tracker.snapshot(5).unwrap();
    assert_eq!(health.failure_count, 1);
    assert_eq!(health.cooldown_until_ms, 1_000_000 + 60_000);
    assert_eq!(health.cooldown_until_cycle, 1 + 2);
}

#[tokio::test]
async fn test_submitted_trade_carries_proof_and_intent() {
    let h = harness(good_proof(), vec![SubmitBehavior::Mined { success: true }]);

    let outcome = h.orchestrator.run_cycle(None).await.unwrap();
    assert_eq!(outcome.pair, 5);
    assert_eq!(outcome.cycle, 1);
    assert_eq!(outcome.block_number, Some(100));

    let submissions = h.ledger.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].proof.as_str(), "0xabcdef");
    assert_eq!(submissions[0].leverage, 1);
    assert!(submissions[0].amount >= alloy::primitives::U256::from(10_000_000u64));
    assert!(submissions[0].amount <= alloy::primitives::U256::from(50_000_000u64));

    // A pair that never failed gets no record.
    assert!(h.tracker.snapshot(5).is_none());
}

#[tokio::test]
async fn test_exhausted_proof_skips_submission() {
    let h = harness(ScriptedTransport::always(503, r#"{"error":"busy"}"#), vec![]);

    let err = h.orchestrator.run_cycle(None).await.unwrap_err();
    assert!(matches!(err, CycleError::Fetch { pair: 5, .. }));

    assert_eq!(h.transport.requests(), vec![5, 5, 5]);
    assert!(h.ledger.submissions().is_empty());
    assert_eq!(h.tracker.snapshot(5).unwrap().failure_count, 1);
    // Two backoff sleeps between three attempts.
    assert_eq!(h.sleeper.calls().len(), 2);
}

#[tokio::test]
async fn test_preflight_revert_reports_failure() {
    let h = harness(good_proof(), vec![SubmitBehavior::PreflightRevert]);

    let err = h.orchestrator.run_cycle(None).await.unwrap_err();
    assert!(matches!(err, CycleError::Submit { pair: 5, .. }));
    assert_eq!(h.tracker.snapshot(5).unwrap().failure_count, 1);
}

#[tokio::test]
async fn test_success_after_failures_decrements_and_clears() {
    let h = harness(
        good_proof(),
        vec![
            SubmitBehavior::Mined { success: false },
            SubmitBehavior::Mined { success: false },
            SubmitBehavior::Mined { success: true },
        ],
    );

    assert!(h.orchestrator.run_cycle(None).await.is_err());
    assert!(h.orchestrator.run_cycle(None).await.is_err());
    assert_eq!(h.tracker.snapshot(5).unwrap().failure_count, 2);

    // Only pair is cooling down; the selector falls back to it.
    h.orchestrator.run_cycle(None).await.unwrap();

    let health = h.tracker.snapshot(5).unwrap();
    assert_eq!(health.failure_count, 1);
    assert_eq!(health.cooldown_until_ms, 0);
    assert_eq!(health.cooldown_until_cycle, 0);
}

#[tokio::test]
async fn test_supplied_cycle_drives_cooldown() {
    let h = harness(good_proof(), vec![SubmitBehavior::Mined { success: false }]);

    assert!(h.orchestrator.run_cycle(Some(10)).await.is_err());
    assert_eq!(h.orchestrator.current_cycle(), 10);
    assert_eq!(h.tracker.snapshot(5).unwrap().cooldown_until_cycle, 12);

    assert!(h.orchestrator.run_cycle(None).await.is_err());
    assert_eq!(h.orchestrator.current_cycle(), 11);
}

#[tokio::test]
async fn test_loop_continues_after_failures() {
    let h = harness(good_proof(), vec![SubmitBehavior::Mined { success: false }]);

    let summary = h
        .orchestrator
        .run(&run_config(3), ShutdownSignal::never())
        .await;

    assert_eq!(
        summary,
        RunSummary {
            cycles: 3,
            succeeded: 0,
            failed: 3
        }
    );
    assert_eq!(h.tracker.snapshot(5).unwrap().failure_count, 3);
    // Inter-cycle delays only; none after the last cycle.
    assert_eq!(
        h.sleeper.calls(),
        vec![Duration::from_millis(1000), Duration::from_millis(1000)]
    );
}

#[tokio::test]
async fn test_shutdown_stops_before_next_cycle() {
    let h = harness(good_proof(), vec![]);
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let config = RunConfig {
        forever: true,
        ..run_config(0)
    };
    let summary = h.orchestrator.run(&config, shutdown.subscribe()).await;
    assert_eq!(summary.cycles, 0);
    assert!(h.ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_zero_loop_count_runs_no_cycles() {
    let h = harness(good_proof(), vec![]);

    let summary = h
        .orchestrator
        .run(&run_config(0), ShutdownSignal::never())
        .await;

    assert_eq!(summary, RunSummary::default());
    assert!(h.transport.requests().is_empty());
    assert!(h.ledger.submissions().is_empty());
    assert!(h.sleeper.calls().is_empty());
}

#[tokio::test]
async fn test_funding_failure_leaves_pair_health_untouched() {
    let h = harness(good_proof(), vec![]);
    let orchestrator = h.orchestrator.with_funding(Funding::new(
        Arc::new(FailingTokens),
        Address::repeat_byte(0x22),
        true,
    ));

    let err = orchestrator.run_cycle(None).await.unwrap_err();
    assert!(matches!(err, CycleError::Funding(FundingError::Ledger(_))));
    assert_eq!(err.pair(), None);

    assert!(h.tracker.snapshot(5).is_none());
    // Funding runs before any proof is requested.
    assert!(h.transport.requests().is_empty());
    assert!(h.ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_unmined_trade_counts_as_pair_failure() {
    let h = harness(good_proof(), vec![SubmitBehavior::NeverMined]);

    let err = h.orchestrator.run_cycle(None).await.unwrap_err();
    assert!(matches!(
        err,
        CycleError::Confirmation {
            pair: 5,
            source: ConfirmationError::Exhausted { tries: 6, .. },
        }
    ));

    assert_eq!(h.ledger.submissions().len(), 1);
    assert_eq!(h.tracker.snapshot(5).unwrap().failure_count, 1);
    // Six bounded lookups, each followed by a backoff sleep.
    assert_eq!(h.sleeper.calls().len(), 6);
}
