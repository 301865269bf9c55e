//! Ledger RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint with a signing wallet
//! - Look up and wait for transaction receipts
//! - Pre-flight, estimate and broadcast `openPosition`
//! - Read and approve collateral, claim the faucet
//! - Classify RPC failures as transient or not

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::{RpcError, TransportErrorKind};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::contracts::{IFaucet, ITradeRouter, IERC20};
use crate::blockchain::types::{
    Ledger, LedgerError, LedgerResult, Receipt, TokenGateway, TradeRequest,
};
use crate::blockchain::wallet::Wallet;
use crate::config::{BlockchainConfig, ConfirmationConfig};

/// Alloy-backed ledger and token gateway for one wallet.
#[derive(Clone)]
pub struct LedgerClient {
    provider: DynProvider,
    owner: Address,
    chain_id: u64,
    router: Address,
    collateral: Address,
    faucet: Option<Address>,
    timeout_duration: Duration,
    poll_interval: Duration,
    gas_buffer_percent: u64,
}

impl LedgerClient {
    /// Create a client that signs with `wallet`.
    pub fn new(
        config: &BlockchainConfig,
        confirmation: &ConfirmationConfig,
        wallet: &Wallet,
    ) -> LedgerResult<Self> {
        let rpc_url: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(rpc_url)
            .erased();

        let faucet = if config.faucet_address.is_empty() {
            None
        } else {
            Some(parse_address("faucet_address", &config.faucet_address)?)
        };

        Ok(Self {
            provider,
            owner: wallet.address(),
            chain_id: config.chain_id,
            router: parse_address("router_address", &config.router_address)?,
            collateral: parse_address("collateral_token", &config.collateral_token)?,
            faucet,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            poll_interval: Duration::from_millis(confirmation.poll_interval_ms.max(1)),
            gas_buffer_percent: config.gas_buffer_percent,
        })
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> LedgerResult<()> {
        let actual = self.rpc(self.provider.get_chain_id()).await?;
        if actual != self.chain_id {
            return Err(LedgerError::ChainMismatch {
                expected: self.chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Run an RPC call under the client timeout.
    async fn rpc<F, T>(&self, call: F) -> LedgerResult<T>
    where
        F: IntoFuture<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        match timeout(self.timeout_duration, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(rpc_error(&e)),
            Err(_) => Err(LedgerError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Run a contract call under the client timeout.
    async fn bounded<F: IntoFuture>(&self, call: F) -> LedgerResult<F::Output> {
        timeout(self.timeout_duration, call)
            .await
            .map_err(|_| LedgerError::Timeout(self.timeout_duration.as_secs()))
    }

    async fn fetch_receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<Receipt>> {
        let receipt = self
            .rpc(self.provider.get_transaction_receipt(tx_hash))
            .await?;
        Ok(receipt.as_ref().map(to_receipt))
    }

    async fn poll_until_receipt(&self, tx_hash: TxHash) -> LedgerResult<Receipt> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.fetch_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                Err(e) if e.is_transient() => {
                    tracing::debug!(tx_hash = %tx_hash, error = %e, "Receipt lookup throttled")
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn open_position(&self, trade: &TradeRequest) -> LedgerResult<TxHash> {
        let proof: Bytes = trade
            .proof
            .as_str()
            .parse()
            .map_err(|e| LedgerError::InvalidInput(format!("proof is not hex bytes: {}", e)))?;

        let router = ITradeRouter::new(self.router, self.provider.clone());
        let call = router.openPosition(
            U256::from(trade.pair),
            proof,
            trade.is_long,
            U256::from(trade.leverage),
            trade.amount,
            U256::ZERO,
            U256::ZERO,
        );

        // A revert here costs nothing; a revert on-chain costs gas.
        self.bounded(call.call())
            .await?
            .map_err(|e| contract_error(e, LedgerError::Preflight))?;

        let estimate = self
            .bounded(call.estimate_gas())
            .await?
            .map_err(|e| contract_error(e, LedgerError::Preflight))?;
        let gas_limit = estimate.saturating_mul(100 + self.gas_buffer_percent) / 100;

        tracing::info!(
            pair = trade.pair,
            is_long = trade.is_long,
            amount = %trade.amount,
            gas_limit,
            "Broadcasting openPosition"
        );

        let pending = self
            .bounded(call.gas(gas_limit).send())
            .await?
            .map_err(|e| contract_error(e, LedgerError::Contract))?;
        Ok(*pending.tx_hash())
    }
}

impl Ledger for LedgerClient {
    fn get_receipt(&self, tx_hash: TxHash) -> BoxFuture<'_, LedgerResult<Option<Receipt>>> {
        self.fetch_receipt(tx_hash).boxed()
    }

    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        wait: Duration,
    ) -> BoxFuture<'_, LedgerResult<Option<Receipt>>> {
        async move {
            match timeout(wait, self.poll_until_receipt(tx_hash)).await {
                Ok(result) => result.map(Some),
                Err(_) => Ok(None),
            }
        }
        .boxed()
    }

    fn submit_trade<'a>(&'a self, trade: &'a TradeRequest) -> BoxFuture<'a, LedgerResult<TxHash>> {
        self.open_position(trade).boxed()
    }
}

impl TokenGateway for LedgerClient {
    fn owner(&self) -> Address {
        self.owner
    }

    fn balance_of(&self, owner: Address) -> BoxFuture<'_, LedgerResult<U256>> {
        async move {
            let token = IERC20::new(self.collateral, self.provider.clone());
            self.bounded(token.balanceOf(owner).call())
                .await?
                .map_err(|e| contract_error(e, LedgerError::Contract))
        }
        .boxed()
    }

    fn allowance(&self, owner: Address, spender: Address) -> BoxFuture<'_, LedgerResult<U256>> {
        async move {
            let token = IERC20::new(self.collateral, self.provider.clone());
            self.bounded(token.allowance(owner, spender).call())
                .await?
                .map_err(|e| contract_error(e, LedgerError::Contract))
        }
        .boxed()
    }

    fn approve(&self, spender: Address, amount: U256) -> BoxFuture<'_, LedgerResult<TxHash>> {
        async move {
            let token = IERC20::new(self.collateral, self.provider.clone());
            let pending = self
                .bounded(token.approve(spender, amount).send())
                .await?
                .map_err(|e| contract_error(e, LedgerError::Contract))?;
            Ok(*pending.tx_hash())
        }
        .boxed()
    }

    fn claim_faucet(&self) -> BoxFuture<'_, LedgerResult<TxHash>> {
        async move {
            let faucet = self
                .faucet
                .ok_or_else(|| LedgerError::InvalidInput("no faucet configured".to_string()))?;
            let contract = IFaucet::new(faucet, self.provider.clone());
            let pending = self
                .bounded(contract.claim().send())
                .await?
                .map_err(|e| contract_error(e, LedgerError::Contract))?;
            Ok(*pending.tx_hash())
        }
        .boxed()
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("owner", &self.owner)
            .field("chain_id", &self.chain_id)
            .field("router", &self.router)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

fn parse_address(field: &str, value: &str) -> LedgerResult<Address> {
    value
        .parse()
        .map_err(|e| LedgerError::InvalidInput(format!("{} '{}': {}", field, value, e)))
}

fn to_receipt(receipt: &TransactionReceipt) -> Receipt {
    Receipt {
        tx_hash: ReceiptResponse::transaction_hash(receipt),
        success: ReceiptResponse::status(receipt),
        block_number: ReceiptResponse::block_number(receipt),
    }
}

fn rpc_error(e: &RpcError<TransportErrorKind>) -> LedgerError {
    LedgerError::from_rpc(e.as_error_resp().map(|payload| payload.code), e.to_string())
}

/// Transient failures stay transient; everything else becomes `wrap(msg)`.
fn contract_error(e: alloy::contract::Error, wrap: fn(String) -> LedgerError) -> LedgerError {
    match LedgerError::from_rpc(None, e.to_string()) {
        LedgerError::Rpc(message) => wrap(message),
        transient => transient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
            router_address: "0x0000000000000000000000000000000000000001".to_string(),
            spender_address: "0x0000000000000000000000000000000000000002".to_string(),
            collateral_token: "0x0000000000000000000000000000000000000003".to_string(),
            faucet_address: String::new(),
            gas_buffer_percent: 20,
        }
    }

    fn client(config: &BlockchainConfig) -> LedgerResult<LedgerClient> {
        let wallet = Wallet::from_private_key(TEST_KEY, config.chain_id)?;
        LedgerClient::new(config, &ConfirmationConfig::default(), &wallet)
    }

    #[tokio::test]
    async fn test_client_creation_is_offline() {
        let client = client(&test_config()).unwrap();
        assert_eq!(
            client.owner().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn test_invalid_router_address() {
        let mut config = test_config();
        config.router_address = "nope".to_string();
        let err = client(&config).unwrap_err();
        assert!(err.to_string().contains("router_address"));
    }

    #[tokio::test]
    async fn test_unreachable_rpc_is_an_error() {
        let client = client(&test_config()).unwrap();
        assert!(client.verify_chain_id().await.is_err());
    }

    #[tokio::test]
    async fn test_faucet_required_for_claim() {
        let client = client(&test_config()).unwrap();
        let err = client.claim_faucet().await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_non_hex_proof_rejected_before_rpc() {
        let client = client(&test_config()).unwrap();
        let trade = TradeRequest {
            pair: 0,
            proof: crate::proof::Proof("not-hex".to_string()),
            is_long: true,
            leverage: 1,
            amount: U256::from(10u64),
        };
        let err = client.submit_trade(&trade).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }
}
