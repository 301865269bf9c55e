//! Retry bookkeeping.
//!
//! Every retry loop in the crate produces one `RetryAttempt` per external call
//! and logs it, so no retry is silent.

use std::fmt;
use std::time::Duration;

/// How one attempt of an external call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Nothing usable yet (absent proof, receipt not final).
    RetryableEmpty,
    /// A transient failure with a reason.
    RetryableError(String),
    /// Not worth retrying.
    Fatal(String),
}

impl AttemptOutcome {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableEmpty | Self::RetryableError(_))
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::RetryableEmpty => "retryable_empty",
            Self::RetryableError(_) => "retryable_error",
            Self::Fatal(_) => "fatal",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::RetryableEmpty => write!(f, "empty result"),
            Self::RetryableError(reason) => write!(f, "retryable: {}", reason),
            Self::Fatal(reason) => write!(f, "fatal: {}", reason),
        }
    }
}

/// One attempt of a retried call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 0-based attempt index.
    pub attempt: u32,
    /// Delay scheduled before the next attempt, if any.
    pub delay: Option<Duration>,
    pub outcome: AttemptOutcome,
}

impl RetryAttempt {
    pub fn new(attempt: u32, outcome: AttemptOutcome) -> Self {
        Self {
            attempt,
            delay: None,
            outcome,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Emit the diagnostic line for this attempt.
    pub fn log(&self, operation: &str, subject: &str) {
        let delay_ms = self.delay.map(|d| d.as_millis() as u64);
        match &self.outcome {
            AttemptOutcome::Success => tracing::debug!(
                operation,
                subject,
                attempt = self.attempt + 1,
                "Attempt succeeded"
            ),
            AttemptOutcome::Fatal(_) => tracing::error!(
                operation,
                subject,
                attempt = self.attempt + 1,
                outcome = %self.outcome,
                "Attempt failed permanently"
            ),
            _ => tracing::warn!(
                operation,
                subject,
                attempt = self.attempt + 1,
                outcome = %self.outcome,
                delay_ms = ?delay_ms,
                "Attempt failed, retrying"
            ),
        }
    }
}
