//! Error taxonomy for swap-in verification.
//!
//! Rejections are split by recoverability: permanent rejections mean the
//! transaction will never be a valid swap-in under current rules, while
//! transient failures mean the whole verification should be retried later.
//! Startup identity failures are a separate, fatal taxonomy owned by main.

use thiserror::Error;

/// Result of verifying one candidate swap-in transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapinError {
    /// The transaction did not target the token contract (or an allowed
    /// forwarding contract).
    #[error("tx with wrong contract")]
    WrongContract,
    /// A transfer event of the right shape existed but never paid the
    /// configured deposit address.
    #[error("tx with wrong receiver")]
    WrongReceiver,
    /// No transfer event of the tracked signature was found at all.
    #[error("deposit log not found or removed")]
    DepositNotFound,
    /// The bind address equals the deposit address (degenerate self-transfer).
    #[error("tx with wrong sender")]
    WrongSender,
    /// Transferred value is outside the configured bounds for the pair.
    #[error("tx with wrong value")]
    WrongValue,
    /// No token configuration is registered for the pair identifier.
    #[error("unknown pair id")]
    UnknownPairId,
    /// The bind address is not a syntactically valid destination-chain address.
    #[error("tx with wrong memo (bind address)")]
    WrongMemo,
    /// Pre-registration is required and the bind address is not registered.
    #[error("tx sender not registered")]
    SenderNotRegistered,
    /// The bind address is a contract on the destination chain.
    #[error("bind address is contract")]
    BindAddrIsContract,
    /// A gateway query failed; the verification should be retried later.
    #[error("rpc query error: {0}")]
    RpcQuery(String),
}

impl SwapinError {
    /// True for infrastructure failures that warrant retrying the whole
    /// verification, false for permanent rejections.
    pub fn is_transient(&self) -> bool {
        matches!(self, SwapinError::RpcQuery(_))
    }
}

/// Fatal startup failures from chain-identity verification.
///
/// None of these are recoverable at runtime; `main` logs the diagnostic and
/// exits rather than letting the process sign against the wrong network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),
    #[error("gateway chain id '{got}' is not '{expected}' for network {network}")]
    ChainIdMismatch {
        network: String,
        expected: String,
        got: String,
    },
    /// Only reachable under a bounded test policy; the production policy
    /// retries without limit.
    #[error("gateway chain id query retries exhausted")]
    RetriesExhausted,
}
