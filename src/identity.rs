//! Chain-identity bootstrap.
//!
//! Runs once per bridge instance at startup: resolve the configured network
//! label to an expected chain id, poll the gateway until it answers, and
//! commit the identity to the bridge. A mismatch on a known network is fatal
//! to the process; nothing may sign or verify against the wrong chain.

use std::time::Duration;

use alloy::primitives::U256;
use tracing::{error, info};

use crate::bridge::Bridge;
use crate::error::IdentityError;

/// Chain-variant capability: maps a network label to its canonical chain id.
///
/// Variant bridges (e.g. fusion) differ from the base eth bridge only in
/// this table, so the variation point is a trait object on the bridge rather
/// than a parallel bridge type.
pub trait NetworkIdentity: Send + Sync {
    /// Expected chain id for a network label, if the label is known.
    fn expected_chain_id(&self, network: &str) -> Option<U256>;

    /// Custom networks skip the identity equality check entirely.
    fn is_custom(&self, network: &str) -> bool {
        network.eq_ignore_ascii_case("custom")
    }
}

/// Ethereum network table.
#[derive(Debug, Default)]
pub struct EthNetworks;

impl NetworkIdentity for EthNetworks {
    fn expected_chain_id(&self, network: &str) -> Option<U256> {
        let id: u64 = match network.to_ascii_lowercase().as_str() {
            "mainnet" => 1,
            "goerli" => 5,
            "sepolia" => 11_155_111,
            _ => return None,
        };
        Some(U256::from(id))
    }
}

/// Fusion network table.
#[derive(Debug, Default)]
pub struct FsnNetworks;

impl NetworkIdentity for FsnNetworks {
    fn expected_chain_id(&self, network: &str) -> Option<U256> {
        let id: u64 = match network.to_ascii_lowercase().as_str() {
            "mainnet" => 32_659,
            "testnet" | "devnet" => 46_688,
            _ => return None,
        };
        Some(U256::from(id))
    }
}

/// Pacing for the identity polling loop.
///
/// Production uses an unbounded policy: the bridge cannot usefully start
/// without the identity and the gateway is expected to eventually recover.
/// Tests pass `max_attempts` so the loop terminates.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Resolve, poll, check, and commit the signer chain id.
///
/// Returns the committed id on success. All error variants are fatal
/// configuration problems; the caller owns process termination.
pub async fn verify_signer_chain_id(
    bridge: &Bridge,
    policy: &RetryPolicy,
) -> Result<U256, IdentityError> {
    let network = bridge.chain_config().net_id.to_ascii_lowercase();
    let is_custom = bridge.networks().is_custom(&network);
    let expected = bridge.networks().expected_chain_id(&network);

    if !is_custom && expected.is_none() {
        return Err(IdentityError::UnsupportedNetwork(network));
    }

    let mut attempt: u32 = 0;
    let chain_id = loop {
        match bridge.gateway().get_signer_chain_id().await {
            Ok(id) => break id,
            Err(err) => {
                attempt += 1;
                error!(%err, attempt, "can not get gateway chain id, will retry");
                if let Some(max) = policy.max_attempts {
                    if attempt >= max {
                        return Err(IdentityError::RetriesExhausted);
                    }
                }
                tokio::time::sleep(policy.interval).await;
            }
        }
    };

    if !is_custom {
        let expected = expected.unwrap_or_default();
        if chain_id != expected {
            return Err(IdentityError::ChainIdMismatch {
                network,
                expected: expected.to_string(),
                got: chain_id.to_string(),
            });
        }
    }

    bridge.commit_signer_chain_id(chain_id);
    info!(%network, %chain_id, "verify chain id succeed");
    Ok(chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::tests_support::{test_bridge, FlakyGateway};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_eth_network_table() {
        let networks = EthNetworks;
        assert_eq!(networks.expected_chain_id("mainnet"), Some(U256::from(1)));
        assert_eq!(networks.expected_chain_id("MAINNET"), Some(U256::from(1)));
        assert_eq!(
            networks.expected_chain_id("sepolia"),
            Some(U256::from(11_155_111u64))
        );
        assert_eq!(networks.expected_chain_id("nosuchnet"), None);
        assert!(networks.is_custom("custom"));
        assert!(!networks.is_custom("mainnet"));
    }

    #[test]
    fn test_fsn_network_table() {
        let networks = FsnNetworks;
        assert_eq!(
            networks.expected_chain_id("mainnet"),
            Some(U256::from(32_659u64))
        );
        assert_eq!(
            networks.expected_chain_id("testnet"),
            networks.expected_chain_id("devnet")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_gateway_answers() {
        // Gateway fails twice, then reports mainnet's chain id.
        let gateway = Arc::new(FlakyGateway::new(2, U256::from(1)));
        let bridge = test_bridge(gateway.clone(), "mainnet");
        let policy = RetryPolicy::bounded(Duration::from_secs(3), 10);

        let id = tokio_test::assert_ok!(verify_signer_chain_id(&bridge, &policy).await);
        assert_eq!(id, U256::from(1));
        assert_eq!(gateway.chain_id_calls(), 3);
        assert_eq!(bridge.signer_chain_id(), Some(U256::from(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_on_known_network_is_fatal() {
        let gateway = Arc::new(FlakyGateway::new(0, U256::from(5)));
        let bridge = test_bridge(gateway, "mainnet");
        let policy = RetryPolicy::bounded(Duration::from_secs(3), 10);

        let err = tokio_test::assert_err!(verify_signer_chain_id(&bridge, &policy).await);
        assert!(matches!(err, IdentityError::ChainIdMismatch { .. }));
        assert_eq!(bridge.signer_chain_id(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_network_accepts_any_id() {
        let gateway = Arc::new(FlakyGateway::new(0, U256::from(777)));
        let bridge = test_bridge(gateway, "custom");
        let policy = RetryPolicy::bounded(Duration::from_secs(3), 10);

        let id = verify_signer_chain_id(&bridge, &policy).await.unwrap();
        assert_eq!(id, U256::from(777));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_network_is_fatal_before_polling() {
        let gateway = Arc::new(FlakyGateway::new(0, U256::from(1)));
        let bridge = test_bridge(gateway.clone(), "nosuchnet");
        let policy = RetryPolicy::bounded(Duration::from_secs(3), 10);

        let err = verify_signer_chain_id(&bridge, &policy).await.unwrap_err();
        assert_eq!(err, IdentityError::UnsupportedNetwork("nosuchnet".into()));
        assert_eq!(gateway.chain_id_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_policy_gives_up() {
        let gateway = Arc::new(FlakyGateway::new(u32::MAX, U256::from(1)));
        let bridge = test_bridge(gateway, "mainnet");
        let policy = RetryPolicy::bounded(Duration::from_millis(10), 3);

        let err = verify_signer_chain_id(&bridge, &policy).await.unwrap_err();
        assert_eq!(err, IdentityError::RetriesExhausted);
    }
}
