//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for Ctrl-C (and SIGTERM on unix)
//! - Trigger graceful shutdown: workers stop at the next cycle boundary
//! - A second Ctrl-C exits immediately

use std::sync::Arc;

use crate::lifecycle::shutdown::Shutdown;

/// Spawn the signal listener.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown requested, finishing the current cycle");
        shutdown.trigger();

        wait_for_signal().await;
        tracing::warn!("Second signal received, exiting now");
        std::process::exit(130);
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
