//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every worker's ShutdownSignal → run loop stops between cycles
//! ```
//!
//! # Design Decisions
//! - A cycle in flight is never cancelled; the loop checks between cycles
//! - The inter-cycle delay is interruptible

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::spawn_signal_handler;
