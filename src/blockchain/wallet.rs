//! Wallet loading.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{LedgerError, LedgerResult};

/// Environment variable holding one key or a comma-separated list of keys.
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// A signing wallet.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key (with or without 0x).
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> LedgerResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), chain_id, "Wallet loaded");
        Ok(Self { signer, chain_id })
    }

    /// Parse a comma-separated list of keys.
    pub fn from_key_list(keys: &str, chain_id: u64) -> LedgerResult<Vec<Self>> {
        let wallets = keys
            .split(',')
            .filter(|k| !k.trim().is_empty())
            .map(|k| Self::from_private_key(k, chain_id))
            .collect::<LedgerResult<Vec<_>>>()?;

        if wallets.is_empty() {
            return Err(LedgerError::Wallet("No private keys provided".to_string()));
        }
        Ok(wallets)
    }

    /// Load every wallet listed in `PRIVATE_KEY`.
    pub fn from_env(chain_id: u64) -> LedgerResult<Vec<Self>> {
        let keys = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            LedgerError::Wallet(format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR))
        })?;
        Self::from_key_list(&keys, chain_id)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Network wallet for the provider's signing filler.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
