//! Process configuration, loaded once from the environment (plus an optional
//! `.env` file) and a JSON token-pair file. Read-only for the lifetime of
//! the process.

use alloy::primitives::U256;
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::gateway::parse_rpc_urls;
use crate::types::is_equal_ignore_case;

/// Main configuration for the operator.
#[derive(Debug, Clone)]
pub struct Config {
    pub chain: ChainConfig,
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub tokens: Vec<TokenConfig>,
    /// Optional newline-separated file of pre-registered bind addresses.
    pub registered_address_file: Option<String>,
}

/// Source-chain configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Human-readable chain family, selects the network identity table
    /// ("Ethereum" or "Fusion").
    pub blockchain: String,
    /// Network label resolved against the identity table ("mainnet",
    /// "testnet", or "custom" to skip the identity equality check).
    pub net_id: String,
    pub enable_scan: bool,
    pub enable_scan_pool: bool,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,
    /// Contracts allowed to forward deposits on behalf of users.
    #[serde(default)]
    pub call_by_contract_whitelist: Vec<String>,
}

impl ChainConfig {
    /// Whether `address` may appear as an intermediate contract caller.
    pub fn is_in_call_by_contract_whitelist(&self, address: &str) -> bool {
        self.call_by_contract_whitelist
            .iter()
            .any(|a| is_equal_ignore_case(a, address))
    }
}

/// Remote gateway endpoints and identity-bootstrap retry pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub api_address: String,
    #[serde(default)]
    pub api_fallback_addresses: Vec<String>,
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
}

impl GatewayConfig {
    /// All RPC URLs: primary followed by fallbacks.
    pub fn all_api_addresses(&self) -> Vec<String> {
        let mut urls = vec![self.api_address.clone()];
        urls.extend(self.api_fallback_addresses.iter().cloned());
        urls
    }
}

/// Deployment-mode flags.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Swap servers refuse contract addresses as bind targets.
    pub is_swap_server: bool,
    /// Require bind addresses to be pre-registered before crediting.
    pub must_register_account: bool,
    /// Whether this instance watches the source side of its pairs.
    pub is_src: bool,
}

/// Static per-pair token configuration, loaded once, read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub pair_id: String,
    pub contract_address: String,
    pub deposit_address: String,
    #[serde(default)]
    pub allow_swapin_from_contract: bool,
    /// Source-side value bounds (inclusive).
    #[serde(with = "u256_decimal")]
    pub minimum_swap: U256,
    #[serde(with = "u256_decimal")]
    pub maximum_swap: U256,
    /// Destination-side value bounds (inclusive).
    #[serde(with = "u256_decimal")]
    pub minimum_swap_out: U256,
    #[serde(with = "u256_decimal")]
    pub maximum_swap_out: U256,
}

/// Token-pair bounds are decimal strings in the JSON file.
mod u256_decimal {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

fn default_scan_interval() -> u64 {
    3000
}

fn default_retry_interval() -> u64 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads a `.env` file if present, then reads from the environment.
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load from a specific `.env` file path.
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("failed to load .env file from {path}"))?;
        }
        Self::load_from_env()
    }

    fn load_from_env() -> Result<Self> {
        let gateway_raw = env::var("GATEWAY_API_ADDRESS")
            .map_err(|_| eyre!("GATEWAY_API_ADDRESS environment variable is required"))?;
        let gateway_urls = parse_rpc_urls(&gateway_raw);
        if gateway_urls.is_empty() {
            return Err(eyre!("GATEWAY_API_ADDRESS cannot be empty"));
        }

        let chain = ChainConfig {
            blockchain: env::var("BLOCKCHAIN").unwrap_or_else(|_| "Ethereum".to_string()),
            net_id: env::var("NET_ID")
                .map_err(|_| eyre!("NET_ID environment variable is required"))?,
            enable_scan: env_bool("ENABLE_SCAN", false),
            enable_scan_pool: env_bool("ENABLE_SCAN_POOL", false),
            scan_interval_ms: env::var("SCAN_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_scan_interval()),
            call_by_contract_whitelist: env::var("CALL_BY_CONTRACT_WHITELIST")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        };

        let gateway = GatewayConfig {
            api_address: gateway_urls[0].clone(),
            api_fallback_addresses: gateway_urls[1..].to_vec(),
            retry_interval_ms: env::var("RETRY_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_retry_interval()),
        };

        let server = ServerConfig {
            is_swap_server: env_bool("IS_SWAP_SERVER", false),
            must_register_account: env_bool("MUST_REGISTER_ACCOUNT", false),
            is_src: env_bool("IS_SRC", true),
        };

        let pairs_file = env::var("TOKEN_PAIRS_FILE")
            .map_err(|_| eyre!("TOKEN_PAIRS_FILE environment variable is required"))?;
        let tokens = load_token_configs(&pairs_file)?;

        let config = Config {
            chain,
            gateway,
            server,
            tokens,
            registered_address_file: env::var("REGISTERED_ADDRESS_FILE").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.chain.net_id.is_empty() {
            return Err(eyre!("chain.net_id cannot be empty"));
        }
        if self.gateway.api_address.is_empty() {
            return Err(eyre!("gateway.api_address cannot be empty"));
        }
        for addr in &self.chain.call_by_contract_whitelist {
            if !is_hex_address(addr) {
                return Err(eyre!("whitelist entry '{addr}' is not a valid hex address"));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for token in &self.tokens {
            token.validate()?;
            if !seen.insert(token.pair_id.to_lowercase()) {
                return Err(eyre!("duplicate pair id '{}'", token.pair_id));
            }
        }
        Ok(())
    }
}

impl TokenConfig {
    /// Validate one pair entry.
    pub fn validate(&self) -> Result<()> {
        if self.pair_id.is_empty() {
            return Err(eyre!("token pair_id cannot be empty"));
        }
        if !is_hex_address(&self.contract_address) {
            return Err(eyre!(
                "token '{}' contract_address must be a hex address (42 chars with 0x prefix)",
                self.pair_id
            ));
        }
        if !is_hex_address(&self.deposit_address) {
            return Err(eyre!(
                "token '{}' deposit_address must be a hex address (42 chars with 0x prefix)",
                self.pair_id
            ));
        }
        if self.minimum_swap > self.maximum_swap {
            return Err(eyre!(
                "token '{}' minimum_swap exceeds maximum_swap",
                self.pair_id
            ));
        }
        if self.minimum_swap_out > self.maximum_swap_out {
            return Err(eyre!(
                "token '{}' minimum_swap_out exceeds maximum_swap_out",
                self.pair_id
            ));
        }
        Ok(())
    }
}

/// Load token-pair configurations from a JSON file.
pub fn load_token_configs(path: &str) -> Result<Vec<TokenConfig>> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read token pairs file {path}"))?;
    let tokens: Vec<TokenConfig> =
        serde_json::from_str(&raw).wrap_err_with(|| format!("invalid token pairs file {path}"))?;
    Ok(tokens)
}

/// Split a comma-separated env value into trimmed entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn is_hex_address(addr: &str) -> bool {
    addr.len() == 42
        && addr.starts_with("0x")
        && addr[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
