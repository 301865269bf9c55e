//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::RunnerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file into a config without validating it.
pub fn read_config(path: &Path) -> Result<RunnerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: optional file, then process environment,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<RunnerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => RunnerConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-style keys onto `config`.
///
/// `lookup` returns the raw value of a key, if set. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut RunnerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = get("PROOF_ENDPOINT") {
        config.proof.endpoint = v;
    }
    if let Some(v) = get("PROXY_URL") {
        config.proof.proxy_url = Some(v);
    }
    if let Some(v) = get("RPC_URL") {
        config.blockchain.rpc_url = v;
    }

    override_number(&get, "PROOF_MAX_ATTEMPTS", &mut config.proof.max_attempts)?;
    override_number(&get, "PAIR_COOLDOWN_BASE_MS", &mut config.cooldown.base_ms)?;
    override_number(&get, "PAIR_COOLDOWN_MAX_MS", &mut config.cooldown.max_ms)?;
    override_number(&get, "PAIR_COOLDOWN_BASE_ROUNDS", &mut config.cooldown.base_cycles)?;
    override_number(&get, "PAIR_COOLDOWN_MAX_ROUNDS", &mut config.cooldown.max_cycles)?;
    override_number(&get, "LOOP_COUNT", &mut config.run.loop_count)?;
    override_number(&get, "TIMEOUT_MIN_MS", &mut config.run.delay_min_ms)?;
    override_number(&get, "TIMEOUT_MAX_MS", &mut config.run.delay_max_ms)?;
    override_number(&get, "CHAIN_ID", &mut config.blockchain.chain_id)?;

    Ok(())
}

fn override_number<T, G>(get: &G, key: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(key) {
        *slot = raw.parse().map_err(|_| ConfigError::Env { key, value: raw })?;
    }
    Ok(())
}
