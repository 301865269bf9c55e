//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! External call (proof GET, receipt lookup):
//!     → attempt fails transiently
//!     → retries.rs (record RetryAttempt, log it)
//!     → backoff.rs (delay from attempt index)
//!     → sleeper.rs (wait, or record in tests)
//!     → next attempt
//! ```
//!
//! # Design Decisions
//! - One backoff formula for every retry loop
//! - Randomness and sleeping are injected, never ambient
//! - Attempt counts are bounded; exhaustion is surfaced, never swallowed

pub mod backoff;
pub mod retries;
pub mod sleeper;

pub use backoff::{calculate_backoff, BackoffPolicy};
pub use retries::{AttemptOutcome, RetryAttempt};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
