//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proof_attempts_total` (counter): proof attempts by outcome
//! - `proof_exhausted_total` (counter): fetches that ran out of attempts
//! - `pair_cooldowns_total` (counter): failure reports by pair
//! - `pair_failure_count` (gauge): current failure count by pair
//! - `confirmation_fallbacks_total` (counter): long waits after bounded lookups
//! - `cycles_total` (counter): cycle results by outcome
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests call these freely.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_proof_attempt(outcome: &'static str) {
    metrics::counter!("proof_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_proof_exhausted() {
    metrics::counter!("proof_exhausted_total").increment(1);
}

pub fn record_pair_cooldown(pair: u64, failure_count: u32) {
    metrics::counter!("pair_cooldowns_total", "pair" => pair.to_string()).increment(1);
    record_pair_failure_count(pair, failure_count);
}

pub fn record_pair_failure_count(pair: u64, failure_count: u32) {
    metrics::gauge!("pair_failure_count", "pair" => pair.to_string()).set(failure_count as f64);
}

pub fn record_confirmation_fallback() {
    metrics::counter!("confirmation_fallbacks_total").increment(1);
}

pub fn record_cycle(outcome: &'static str) {
    metrics::counter!("cycles_total", "outcome" => outcome).increment(1);
}
