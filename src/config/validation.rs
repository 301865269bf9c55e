//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, min <= max)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RunnerConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;
use std::collections::HashSet;
use std::fmt;

use crate::config::schema::RunnerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a fully merged configuration.
pub fn validate_config(config: &RunnerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Proof service
    if url::Url::parse(&config.proof.endpoint).is_err() {
        errors.push(ValidationError::new("proof.endpoint", "not a valid URL"));
    }
    if config.proof.max_attempts == 0 {
        errors.push(ValidationError::new("proof.max_attempts", "must be at least 1"));
    }
    if config.proof.attempt_timeout_secs == 0 {
        errors.push(ValidationError::new("proof.attempt_timeout_secs", "must be > 0"));
    }
    if let Some(proxy) = &config.proof.proxy_url {
        match url::Url::parse(proxy) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "proof.proxy_url",
                format!("unsupported proxy scheme '{}'", url.scheme()),
            )),
            Err(_) => errors.push(ValidationError::new("proof.proxy_url", "not a valid URL")),
        }
    }
    if config.proof.backoff.factor < 1.0 {
        errors.push(ValidationError::new("proof.backoff.factor", "must be >= 1.0"));
    }

    // Cooldowns
    let cooldown = &config.cooldown;
    if cooldown.base_ms > cooldown.max_ms {
        errors.push(ValidationError::new("cooldown.base_ms", "exceeds cooldown.max_ms"));
    }
    if cooldown.base_cycles > cooldown.max_cycles {
        errors.push(ValidationError::new("cooldown.base_cycles", "exceeds cooldown.max_cycles"));
    }
    if cooldown.max_failures == 0 {
        errors.push(ValidationError::new("cooldown.max_failures", "must be at least 1"));
    }

    // Confirmation
    if config.confirmation.tries == 0 {
        errors.push(ValidationError::new("confirmation.tries", "must be at least 1"));
    }
    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new("confirmation.poll_interval_ms", "must be > 0"));
    }

    // Ledger
    let chain = &config.blockchain;
    if url::Url::parse(&chain.rpc_url).is_err() {
        errors.push(ValidationError::new("blockchain.rpc_url", "not a valid URL"));
    }
    for (field, value) in [
        ("blockchain.router_address", &chain.router_address),
        ("blockchain.spender_address", &chain.spender_address),
        ("blockchain.collateral_token", &chain.collateral_token),
    ] {
        if value.parse::<Address>().is_err() {
            errors.push(ValidationError::new(field, "not a valid address"));
        }
    }
    if !chain.faucet_address.is_empty() && chain.faucet_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new("blockchain.faucet_address", "not a valid address"));
    }

    // Trade
    let trade = &config.trade;
    if trade.pairs.is_empty() {
        errors.push(ValidationError::new("trade.pairs", "pair pool is empty"));
    }
    let mut seen = HashSet::new();
    for pair in &trade.pairs {
        if !seen.insert(pair.id) {
            errors.push(ValidationError::new(
                "trade.pairs",
                format!("duplicate pair id {}", pair.id),
            ));
        }
    }
    if trade.min_amount == 0 || trade.min_amount > trade.max_amount {
        errors.push(ValidationError::new(
            "trade.min_amount",
            "must be > 0 and <= trade.max_amount",
        ));
    }
    if trade.leverage == 0 {
        errors.push(ValidationError::new("trade.leverage", "must be at least 1"));
    }

    // Run loop
    if config.run.delay_min_ms > config.run.delay_max_ms {
        errors.push(ValidationError::new("run.delay_min_ms", "exceeds run.delay_max_ms"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PairConfig;

    pub(crate) fn valid_config() -> RunnerConfig {
        let mut config = RunnerConfig::default();
        config.blockchain.router_address = "0x0000000000000000000000000000000000000001".into();
        config.blockchain.spender_address = "0x0000000000000000000000000000000000000002".into();
        config.blockchain.collateral_token = "0x0000000000000000000000000000000000000003".into();
        config.trade.pairs = vec![
            PairConfig { id: 0, name: "BTC/USD".into() },
            PairConfig { id: 1, name: "ETH/USD".into() },
        ];
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_reports_every_problem() {
        let errors = validate_config(&RunnerConfig::default()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"blockchain.router_address"));
        assert!(fields.contains(&"blockchain.spender_address"));
        assert!(fields.contains(&"blockchain.collateral_token"));
        assert!(fields.contains(&"trade.pairs"));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = valid_config();
        config.cooldown.base_ms = 10_000_000;
        config.run.delay_min_ms = 10;
        config.run.delay_max_ms = 5;
        config.trade.pairs.push(PairConfig { id: 1, name: "dup".into() });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.message.contains("duplicate pair id 1")));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = valid_config();
        config.proof.max_attempts = 0;
        config.confirmation.tries = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_proxy_must_be_http() {
        let mut config = valid_config();
        config.proof.proxy_url = Some("socks5://127.0.0.1:1080".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "proof.proxy_url");

        config.proof.proxy_url = Some("http://127.0.0.1:3128".into());
        assert!(validate_config(&config).is_ok());
    }
}
