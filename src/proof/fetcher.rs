//! Resilient proof fetcher.

use rand::seq::SliceRandom;
use std::sync::Arc;

use crate::config::ProofConfig;
use crate::load_balancer::PairId;
use crate::observability::{logging, metrics};
use crate::proof::classify::classify;
use crate::proof::transport::ProofTransport;
use crate::proof::types::{Classification, FetchError, FetchResult, Proof, RawResponse};
use crate::random::RandomSource;
use crate::resilience::{calculate_backoff, AttemptOutcome, BackoffPolicy, RetryAttempt, Sleeper};

/// Fallback when no user agent is configured.
const DEFAULT_USER_AGENT: &str = "cfd-runner/0.1";
/// Characters of body kept in diagnostic previews.
const PREVIEW_CHARS: usize = 140;

/// Fetches proofs, retrying until a well-formed one arrives or attempts run out.
#[derive(Clone)]
pub struct ProofFetcher {
    transport: Arc<dyn ProofTransport>,
    max_attempts: u32,
    backoff: BackoffPolicy,
    user_agents: Vec<String>,
    rng: Arc<RandomSource>,
    sleeper: Arc<dyn Sleeper>,
}

impl ProofFetcher {
    pub fn new(
        transport: Arc<dyn ProofTransport>,
        config: &ProofConfig,
        rng: Arc<RandomSource>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            transport,
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff,
            user_agents: config.user_agents.clone(),
            rng,
            sleeper,
        }
    }

    /// Fetch a proof for `pair`.
    ///
    /// Retries every non-success classification with backoff. Fails with
    /// [`FetchError::Exhausted`] once `max_attempts` attempts have failed.
    pub async fn fetch(&self, pair: PairId) -> FetchResult<Proof> {
        let subject = pair.to_string();
        let mut last_reason = String::new();

        for attempt in 0..self.max_attempts {
            let user_agent = self.pick_user_agent();
            tracing::info!(pair, attempt = attempt + 1, "Fetching proof");

            let classification = match self.transport.get(pair, &user_agent).await {
                Ok(response) => {
                    log_response(pair, attempt, &response);
                    classify(&response)
                }
                Err(e) => Classification::RetryableError(e.to_string()),
            };

            let outcome = match classification {
                Classification::Success(proof) => {
                    metrics::record_proof_attempt(AttemptOutcome::Success.label());
                    RetryAttempt::new(attempt, AttemptOutcome::Success).log("proof", &subject);
                    return Ok(proof);
                }
                Classification::RetryableEmpty => AttemptOutcome::RetryableEmpty,
                Classification::RetryableError(reason) => AttemptOutcome::RetryableError(reason),
                Classification::MalformedBody(reason) => {
                    AttemptOutcome::RetryableError(format!("malformed body: {}", reason))
                }
            };
            metrics::record_proof_attempt(outcome.label());
            last_reason = outcome.to_string();

            let mut record = RetryAttempt::new(attempt, outcome);
            if attempt + 1 < self.max_attempts {
                let delay = calculate_backoff(attempt, &self.backoff, &self.rng);
                record = record.with_delay(delay);
                record.log("proof", &subject);
                self.sleeper.sleep(delay).await;
            } else {
                record.log("proof", &subject);
            }
        }

        metrics::record_proof_exhausted();
        Err(FetchError::Exhausted {
            pair,
            attempts: self.max_attempts,
            last_reason,
        })
    }

    fn pick_user_agent(&self) -> String {
        self.rng
            .with(|rng| self.user_agents.choose(rng).cloned())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}

fn log_response(pair: PairId, attempt: u32, response: &RawResponse) {
    let content_type = response.content_type.as_deref().unwrap_or("N/A");
    tracing::debug!(
        pair,
        attempt = attempt + 1,
        status = ?response.status,
        content_type,
        "Proof response"
    );
    if !content_type.to_ascii_lowercase().contains("application/json") {
        tracing::warn!(
            pair,
            attempt = attempt + 1,
            status = ?response.status,
            content_type,
            preview = %logging::preview(&response.body, PREVIEW_CHARS),
            "Proof response is not JSON"
        );
    }
}
