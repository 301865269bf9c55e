//! CFD trade runner.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        one task per wallet                   │
//!   │                                                              │
//!   │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!   │  │ funding  │──▶│ selector │──▶│ fetcher  │──▶│  ledger   │  │
//!   │  │          │   │          │   │ (proof)  │   │  submit   │  │
//!   │  └──────────┘   └────┬─────┘   └──────────┘   └─────┬─────┘  │
//!   │                      │                              ▼        │
//!   │                      │                        ┌───────────┐  │
//!   │                      │                        │  poller   │  │
//!   │                      │                        └─────┬─────┘  │
//!   └──────────────────────┼──────────────────────────────┼────────┘
//!                          ▼                              ▼
//!                   ┌────────────────────────────────────────────┐
//!                   │   HealthTracker (shared across wallets)    │
//!                   └────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use cfd_runner::blockchain::{ConfirmationPoller, LedgerClient, Wallet};
use cfd_runner::config::load_config;
use cfd_runner::health::HealthTracker;
use cfd_runner::lifecycle::{spawn_signal_handler, Shutdown};
use cfd_runner::load_balancer::Pair;
use cfd_runner::observability::{logging, metrics};
use cfd_runner::proof::{HttpTransport, ProofFetcher};
use cfd_runner::random::RandomSource;
use cfd_runner::resilience::{Sleeper, TokioSleeper};
use cfd_runner::runner::{Funding, Orchestrator};

#[derive(Debug, Parser)]
#[command(name = "cfd-runner", version, about = "Open CFD positions in a loop")]
struct Args {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of cycles per wallet.
    #[arg(short, long)]
    loops: Option<u64>,

    /// Keep running until Ctrl-C, ignoring the loop count.
    #[arg(long)]
    forever: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(loops) = args.loops {
        config.run.loop_count = loops;
    }
    if args.forever {
        config.run.forever = true;
    }

    logging::init(&config.observability.log_level);

    let run_id = uuid::Uuid::new_v4();
    tracing::info!(%run_id, "cfd-runner v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        endpoint = %config.proof.endpoint,
        rpc_url = %config.blockchain.rpc_url,
        chain_id = config.blockchain.chain_id,
        pairs = config.trade.pairs.len(),
        loop_count = config.run.loop_count,
        forever = config.run.forever,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let wallets = Wallet::from_env(config.blockchain.chain_id)?;
    let spender: alloy::primitives::Address = config.blockchain.spender_address.parse()?;
    let faucet_enabled = !config.blockchain.faucet_address.is_empty();

    let tracker = Arc::new(HealthTracker::new(config.cooldown));
    let rng = Arc::new(RandomSource::from_entropy());
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
    let transport = Arc::new(HttpTransport::from_config(&config.proof)?);
    let fetcher = ProofFetcher::new(transport, &config.proof, rng.clone(), sleeper.clone());
    let pool: Vec<Pair> = config.trade.pairs.iter().map(Pair::from).collect();

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_handler(shutdown.clone());

    let mut workers = Vec::with_capacity(wallets.len());
    for wallet in &wallets {
        let client = Arc::new(LedgerClient::new(
            &config.blockchain,
            &config.confirmation,
            wallet,
        )?);

        match client.verify_chain_id().await {
            Ok(()) => tracing::info!(address = %wallet.address(), "Connected to chain"),
            Err(e) => tracing::warn!(address = %wallet.address(), error = %e, "Chain check failed"),
        }

        let poller = ConfirmationPoller::new(
            client.clone(),
            &config.confirmation,
            rng.clone(),
            sleeper.clone(),
        );
        let orchestrator = Orchestrator::new(
            pool.clone(),
            tracker.clone(),
            fetcher.clone(),
            client.clone(),
            poller,
            config.trade.clone(),
            rng.clone(),
            sleeper.clone(),
        )
        .with_funding(Funding::new(client, spender, faucet_enabled));

        let run_config = config.run.clone();
        let signal = shutdown.subscribe();
        let address = wallet.address();
        let worker_span = tracing::info_span!("worker", %run_id, %address);
        workers.push(tokio::spawn(tracing::Instrument::instrument(
            async move { orchestrator.run(&run_config, signal).await },
            worker_span,
        )));
    }

    for (wallet, worker) in wallets.iter().zip(workers) {
        match worker.await {
            Ok(summary) => tracing::info!(
                address = %wallet.address(),
                cycles = summary.cycles,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Worker finished"
            ),
            Err(e) => tracing::error!(address = %wallet.address(), error = %e, "Worker panicked"),
        }
    }

    tracing::info!(pairs_tracked = tracker.tracked(), "Shutdown complete");
    Ok(())
}
