//! Proof service types and error definitions.

use std::fmt;
use thiserror::Error;

use crate::load_balancer::PairId;

/// Opaque attestation payload returned by the proof service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof(pub String);

impl Proof {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A response as seen by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status; `None` when the transport did not report one.
    pub status: Option<u16>,
    /// `content-type` header value, if present.
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// JSON response with a status code.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Some("application/json"), body)
    }
}

/// Verdict on one proof response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Well-formed, non-error JSON carrying a proof.
    Success(Proof),
    /// JSON without a usable `proof` field.
    RetryableEmpty,
    /// Error status, error field, gateway page, rate limit, network failure.
    RetryableError(String),
    /// Declared or sniffed JSON that failed to parse.
    MalformedBody(String),
}

/// Errors that can occur while fetching a proof.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt failed.
    #[error("Proof API failed after {attempts} attempts for pair {pair}: {last_reason}")]
    Exhausted {
        pair: PairId,
        attempts: u32,
        last_reason: String,
    },

    /// A single attempt exceeded its deadline.
    #[error("Proof request timed out after {0} seconds")]
    Timeout(u64),

    /// A single attempt failed at the network level.
    #[error("Proof request failed: {0}")]
    Transport(String),

    /// The fetcher cannot be built or the request cannot be formed.
    #[error("Malformed proof request: {0}")]
    Malformed(String),
}

/// Result type for proof operations.
pub type FetchResult<T> = Result<T, FetchError>;
