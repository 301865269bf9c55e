//! Pair health subsystem.
//!
//! # Data Flow
//! ```text
//! Cycle outcome observed (runner):
//!     → tracker.rs report_failure / report_success
//!     → state.rs (count + dual cooldown update)
//!
//! Pair selection (load_balancer):
//!     → tracker.rs is_eligible(pair, cycle)
//!     → clock.rs (wall time) + cycle counter (logical time)
//! ```
//!
//! # Design Decisions
//! - A pair is skipped until BOTH the wall-clock and the cycle deadline pass
//! - One success forgives one failure but clears the cooldown entirely
//! - Health state is per pair and may be shared by several workers

pub mod clock;
pub mod state;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use state::PairHealth;
pub use tracker::HealthTracker;
