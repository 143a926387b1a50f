//! Common types for swap-in verification
//!
//! Receipts and logs are snapshots of what the gateway returned for one
//! source-chain transaction; `SwapInfo` is the per-verification accumulator
//! filled in by the validation chain.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// One emitted event from a transaction's execution trace.
///
/// `removed` is set by the gateway when a chain reorganization invalidated
/// the log; such entries must never qualify as deposits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Option<Bytes>,
    pub removed: Option<bool>,
}

/// Transaction receipt as needed by the verifier.
///
/// `recipient = None` means the transaction did not target a contract
/// (plain value transfer); such receipts can never carry a token swap-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub from: Address,
    pub recipient: Option<Address>,
    pub logs: Vec<LogEntry>,
}

/// Per-verification accumulator, progressively filled by the validation
/// chain. One instance per transaction verification, never shared.
///
/// All address fields are lowercased hex strings; case carries no meaning
/// on either chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInfo {
    pub pair_id: String,
    pub hash: String,
    pub height: u64,
    pub timestamp: u64,
    /// Sender of the deposit transaction.
    pub from: String,
    /// Immediate target of the deposit transaction (receipt recipient).
    pub tx_to: String,
    /// Recipient decoded from the matched transfer event.
    pub to: String,
    /// Destination-chain address to credit, decoded from the transfer event.
    pub bind: String,
    pub value: U256,
}

/// Case-insensitive address comparison. Addresses are canonical hex strings
/// whose case carries no semantic meaning.
pub fn is_equal_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Lowercased `0x`-prefixed hex rendering of an address.
pub fn address_to_lower_hex(addr: &Address) -> String {
    format!("{addr:#x}")
}
