//! CFD trade runner library.
//!
//! Opens leveraged positions in a loop while tolerating an unreliable proof
//! service and a congested ledger.

pub mod blockchain;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod proof;
pub mod random;
pub mod resilience;
pub mod runner;

pub use config::RunnerConfig;
pub use health::HealthTracker;
pub use lifecycle::Shutdown;
pub use runner::Orchestrator;
