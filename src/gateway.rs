//! Gateway access to the source/destination chain RPC endpoints.
//!
//! The verifier only ever talks to the chain through the [`Gateway`] trait,
//! which keeps the validation pipeline testable with in-memory mocks. The
//! concrete [`HttpGateway`] wraps one or more alloy HTTP providers and tries
//! them in order when the primary fails.

use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};

use crate::types::{LogEntry, TxReceipt};

/// Chain queries consumed by the verification core.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch the receipt for a transaction. `Ok(None)` means the transaction
    /// is unknown or not yet mined.
    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>>;

    /// Chain identity the gateway's signer operates on (`eth_chainId`).
    async fn get_signer_chain_id(&self) -> Result<U256>;

    /// Whether code is deployed at `address` on this gateway's chain.
    async fn is_contract_address(&self, address: Address) -> Result<bool>;

    /// Latest block number, used by the scan loops.
    async fn get_block_number(&self) -> Result<u64>;
}

/// Parse a comma-separated RPC URL string into individual trimmed URLs.
pub fn parse_rpc_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// HTTP gateway over one primary provider plus ordered fallbacks.
pub struct HttpGateway {
    providers: Vec<RootProvider<Http<Client>>>,
    /// Primary endpoint, kept for diagnostics only.
    api_address: String,
}

impl HttpGateway {
    /// Build providers for each URL; at least one URL is required.
    pub fn new(urls: &[String]) -> Result<Self> {
        if urls.is_empty() {
            return Err(eyre!("at least one gateway RPC URL is required"));
        }
        let providers = urls
            .iter()
            .map(|url| {
                let parsed = url
                    .parse()
                    .wrap_err_with(|| format!("invalid gateway RPC URL: {url}"))?;
                Ok(ProviderBuilder::new().on_http(parsed))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            providers,
            api_address: urls[0].clone(),
        })
    }

    /// Primary endpoint URL.
    pub fn api_address(&self) -> &str {
        &self.api_address
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>> {
        let mut last_err = None;
        for provider in &self.providers {
            match provider.get_transaction_receipt(tx_hash).await {
                Ok(receipt) => return Ok(receipt.map(convert_receipt)),
                Err(e) => last_err = Some(e),
            }
        }
        Err(eyre!("get_transaction_receipt failed on all endpoints: {:?}", last_err))
    }

    async fn get_signer_chain_id(&self) -> Result<U256> {
        let mut last_err = None;
        for provider in &self.providers {
            match provider.get_chain_id().await {
                Ok(id) => return Ok(U256::from(id)),
                Err(e) => last_err = Some(e),
            }
        }
        Err(eyre!("get_chain_id failed on all endpoints: {:?}", last_err))
    }

    async fn is_contract_address(&self, address: Address) -> Result<bool> {
        let mut last_err = None;
        for provider in &self.providers {
            match provider.get_code_at(address).await {
                Ok(code) => return Ok(!code.is_empty()),
                Err(e) => last_err = Some(e),
            }
        }
        Err(eyre!("get_code failed on all endpoints: {:?}", last_err))
    }

    async fn get_block_number(&self) -> Result<u64> {
        let mut last_err = None;
        for provider in &self.providers {
            match provider.get_block_number().await {
                Ok(n) => return Ok(n),
                Err(e) => last_err = Some(e),
            }
        }
        Err(eyre!("get_block_number failed on all endpoints: {:?}", last_err))
    }
}

/// Narrow an alloy RPC receipt down to what the verifier consumes.
fn convert_receipt(receipt: alloy::rpc::types::TransactionReceipt) -> TxReceipt {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| LogEntry {
            address: log.address(),
            topics: log.topics().to_vec(),
            data: Some(log.data().data.clone()),
            removed: Some(log.removed),
        })
        .collect();
    TxReceipt {
        from: receipt.from,
        recipient: receipt.to,
        logs,
    }
}
