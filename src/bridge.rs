//! Bridge instance: read-only configuration, collaborator handles, and the
//! write-once signer chain id.
//!
//! One `Bridge` is built per watched chain at startup and shared (behind an
//! `Arc`) by the scan tasks and every per-transaction verification. Nothing
//! on it mutates after the identity bootstrap commits the chain id.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use alloy::primitives::U256;

use crate::config::{ChainConfig, Config, ServerConfig, TokenConfig};
use crate::gateway::Gateway;
use crate::identity::NetworkIdentity;
use crate::registry::{AddressRegistry, DstChainRules};

pub struct Bridge {
    chain: ChainConfig,
    server: ServerConfig,
    /// Token configs keyed by lowercased pair id.
    tokens: HashMap<String, TokenConfig>,
    gateway: Arc<dyn Gateway>,
    registry: Arc<dyn AddressRegistry>,
    dst_rules: Arc<dyn DstChainRules>,
    networks: Box<dyn NetworkIdentity>,
    /// Written exactly once by the identity bootstrap, read-only after.
    signer_chain_id: OnceLock<U256>,
}

impl Bridge {
    pub fn new(
        config: &Config,
        gateway: Arc<dyn Gateway>,
        registry: Arc<dyn AddressRegistry>,
        dst_rules: Arc<dyn DstChainRules>,
        networks: Box<dyn NetworkIdentity>,
    ) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|t| (t.pair_id.to_lowercase(), t.clone()))
            .collect();
        Self {
            chain: config.chain.clone(),
            server: config.server.clone(),
            tokens,
            gateway,
            registry,
            dst_rules,
            networks,
            signer_chain_id: OnceLock::new(),
        }
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn registry(&self) -> &dyn AddressRegistry {
        self.registry.as_ref()
    }

    pub fn dst_rules(&self) -> &dyn DstChainRules {
        self.dst_rules.as_ref()
    }

    pub fn networks(&self) -> &dyn NetworkIdentity {
        self.networks.as_ref()
    }

    /// Whether this instance watches the source side of its pairs.
    pub fn is_src(&self) -> bool {
        self.server.is_src
    }

    /// Swap servers refuse contract addresses as bind targets.
    pub fn is_swap_server(&self) -> bool {
        self.server.is_swap_server
    }

    /// Whether bind addresses must be pre-registered.
    pub fn must_register_account(&self) -> bool {
        self.server.must_register_account
    }

    /// Token configuration for a pair, if registered.
    pub fn get_token_config(&self, pair_id: &str) -> Option<&TokenConfig> {
        self.tokens.get(&pair_id.to_lowercase())
    }

    /// Direction-aware value-bounds check for a pair. Unknown pairs fail.
    pub fn check_swap_value(&self, pair_id: &str, value: U256) -> bool {
        let Some(token) = self.get_token_config(pair_id) else {
            return false;
        };
        let (min, max) = if self.server.is_src {
            (token.minimum_swap, token.maximum_swap)
        } else {
            (token.minimum_swap_out, token.maximum_swap_out)
        };
        value >= min && value <= max
    }

    /// Commit the verified signer chain id. Returns false if a value was
    /// already committed; the first write always wins.
    pub fn commit_signer_chain_id(&self, chain_id: U256) -> bool {
        self.signer_chain_id.set(chain_id).is_ok()
    }

    /// Signer chain id, once the identity bootstrap has committed it.
    pub fn signer_chain_id(&self) -> Option<U256> {
        self.signer_chain_id.get().copied()
    }
}

#[cfg(test)]
pub mod tests_support {
    //! Shared fixtures for bridge-dependent tests.

    use super::*;
    use crate::config::GatewayConfig;
    use crate::identity::EthNetworks;
    use crate::registry::{EvmAddressRules, FileRegistry};
    use crate::types::TxReceipt;
    use alloy::primitives::{Address, B256};
    use async_trait::async_trait;
    use eyre::{eyre, Result};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Gateway mock: fails the chain-id query a configured number of times,
    /// then answers; contract-code queries return a canned result and are
    /// counted so tests can assert the check was (not) performed.
    pub struct FlakyGateway {
        fail_chain_id_times: u32,
        chain_id: U256,
        chain_id_calls: AtomicU32,
        /// `None` means the code query itself errors (transient failure).
        contract_result: Option<bool>,
        contract_calls: AtomicU32,
    }

    impl FlakyGateway {
        pub fn new(fail_chain_id_times: u32, chain_id: U256) -> Self {
            Self {
                fail_chain_id_times,
                chain_id,
                chain_id_calls: AtomicU32::new(0),
                contract_result: Some(false),
                contract_calls: AtomicU32::new(0),
            }
        }

        pub fn with_contract_result(mut self, result: Option<bool>) -> Self {
            self.contract_result = result;
            self
        }

        pub fn chain_id_calls(&self) -> u32 {
            self.chain_id_calls.load(Ordering::SeqCst)
        }

        pub fn contract_calls(&self) -> u32 {
            self.contract_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Gateway for FlakyGateway {
        async fn get_transaction_receipt(&self, _tx_hash: B256) -> Result<Option<TxReceipt>> {
            Ok(None)
        }

        async fn get_signer_chain_id(&self) -> Result<U256> {
            let n = self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_chain_id_times {
                Err(eyre!("gateway unreachable"))
            } else {
                Ok(self.chain_id)
            }
        }

        async fn is_contract_address(&self, _address: Address) -> Result<bool> {
            self.contract_calls.fetch_add(1, Ordering::SeqCst);
            match self.contract_result {
                Some(is_contract) => Ok(is_contract),
                None => Err(eyre!("code query failed")),
            }
        }

        async fn get_block_number(&self) -> Result<u64> {
            Ok(0)
        }
    }

    /// Token pair used across tests.
    pub fn test_token() -> TokenConfig {
        TokenConfig {
            pair_id: "usdt2fsn".to_string(),
            contract_address: "0x1111111111111111111111111111111111111111".to_string(),
            deposit_address: "0x2222222222222222222222222222222222222222".to_string(),
            allow_swapin_from_contract: false,
            minimum_swap: U256::from(100u64),
            maximum_swap: U256::from(1_000_000u64),
            minimum_swap_out: U256::from(50u64),
            maximum_swap_out: U256::from(500_000u64),
        }
    }

    pub fn test_config(net_id: &str) -> Config {
        Config {
            chain: ChainConfig {
                blockchain: "Ethereum".to_string(),
                net_id: net_id.to_string(),
                enable_scan: true,
                enable_scan_pool: false,
                scan_interval_ms: 10,
                call_by_contract_whitelist: vec![],
            },
            gateway: GatewayConfig {
                api_address: "http://localhost:8545".to_string(),
                api_fallback_addresses: vec![],
                retry_interval_ms: 10,
            },
            server: ServerConfig {
                is_swap_server: true,
                must_register_account: false,
                is_src: true,
            },
            tokens: vec![test_token()],
            registered_address_file: None,
        }
    }

    /// Bridge over a mock gateway with the default test config.
    pub fn test_bridge(gateway: Arc<FlakyGateway>, net_id: &str) -> Bridge {
        test_bridge_with(gateway, test_config(net_id), FileRegistry::new())
    }

    pub fn test_bridge_with(
        gateway: Arc<FlakyGateway>,
        config: Config,
        registry: FileRegistry,
    ) -> Bridge {
        Bridge::new(
            &config,
            gateway,
            Arc::new(registry),
            Arc::new(EvmAddressRules),
            Box::new(EthNetworks),
        )
    }
}
