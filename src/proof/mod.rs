//! Proof (attestation) subsystem.
//!
//! # Data Flow
//! ```text
//! Pair selected
//!     → fetcher.rs (attempt loop, user-agent rotation)
//!     → transport.rs (GET <endpoint>?pairs=<id>, proxy, 15s deadline)
//!     → classify.rs (Success | RetryableEmpty | RetryableError | MalformedBody)
//!     → backoff + retry, or return the proof
//! ```
//!
//! # Design Decisions
//! - Only a well-formed, non-error JSON body with a proof is a success
//! - Nothing is fatal mid-loop; exhaustion is the only failure surfaced
//! - Transport is a trait so the loop is testable without sockets

pub mod classify;
pub mod fetcher;
pub mod transport;
pub mod types;

pub use fetcher::ProofFetcher;
pub use transport::{HttpTransport, ProofTransport};
pub use types::{Classification, FetchError, FetchResult, Proof, RawResponse};
