//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every retry and every abandoned cycle emits a log line
//! - Log fields: pair, cycle, attempt, tx_hash
//! - Metrics are cheap and off by default

pub mod logging;
pub mod metrics;
