//! Proof response classification.
//!
//! Only a parsed, non-error JSON body carrying a truthy `proof` field counts
//! as success. Everything else is retryable: the loop keeps trying until its
//! attempts run out instead of giving up on any single response shape.

use serde_json::Value;

use crate::proof::types::{Classification, Proof, RawResponse};

/// Statuses that mean "try again later" for non-JSON bodies. `0` is what
/// proxies report for a dropped upstream connection.
const RETRYABLE_STATUSES: [u16; 5] = [0, 429, 502, 503, 504];

/// Body fragments that indicate a gateway page or rate limiting.
const RETRY_SIGNALS: [&str; 6] = [
    "cloudflare",
    "rate",
    "busy",
    "temporarily",
    "forbidden",
    "blocked",
];

/// Classify one response.
pub fn classify(response: &RawResponse) -> Classification {
    let content_type = response
        .content_type
        .as_deref()
        .unwrap_or("")
        .to_ascii_lowercase();
    let is_success_status = response
        .status
        .map(|s| (200..300).contains(&s))
        .unwrap_or(true);

    let treat_as_json = content_type.contains("application/json")
        || (content_type.is_empty() && looks_like_json(&response.body));

    if treat_as_json {
        return classify_json(response, is_success_status);
    }

    let status = response.status.unwrap_or(200);
    if RETRYABLE_STATUSES.contains(&status) {
        return Classification::RetryableError(format!("status {}", status));
    }

    let body = response.body.to_ascii_lowercase();
    if body.contains("<html") {
        return Classification::RetryableError(format!("HTML page (status {})", status));
    }
    if let Some(signal) = RETRY_SIGNALS.iter().find(|s| body.contains(*s)) {
        return Classification::RetryableError(format!(
            "retry signal '{}' (status {})",
            signal, status
        ));
    }

    Classification::RetryableError(format!("unrecognised non-JSON response (status {})", status))
}

fn classify_json(response: &RawResponse, is_success_status: bool) -> Classification {
    let json: Value = match serde_json::from_str(&response.body) {
        Ok(json) => json,
        Err(e) => return Classification::MalformedBody(e.to_string()),
    };

    if !is_success_status {
        let status = response.status.unwrap_or_default();
        return Classification::RetryableError(format!("status {}", status));
    }

    if let Some(error) = json.get("error").filter(|e| is_truthy(e)) {
        return Classification::RetryableError(format!("service error: {}", error));
    }

    match json.get("proof") {
        Some(proof) if is_truthy(proof) => Classification::Success(Proof(match proof {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        _ => Classification::RetryableEmpty,
    }
}

/// First non-whitespace character opens an object or array.
pub fn looks_like_json(body: &str) -> bool {
    matches!(body.trim_start().chars().next(), Some('{') | Some('['))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
