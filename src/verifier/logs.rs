//! Transfer-log extraction.
//!
//! Scans a receipt's logs for the ERC20 `Transfer` event paying the
//! configured deposit address. Single pass, order-preserving; the first
//! event whose recipient matches wins even if later events also match.

use alloy::primitives::{keccak256, Address, B256, U256};

use crate::error::SwapinError;
use crate::types::{address_to_lower_hex, is_equal_ignore_case, LogEntry};

/// Signature hash of the tracked event: `Transfer(address,address,uint256)`.
pub fn transfer_log_signature() -> B256 {
    keccak256(b"Transfer(address,address,uint256)")
}

/// Extract the qualifying transfer from a transaction's logs.
///
/// Returns the lowercased `(from, to)` addresses and the transferred value.
/// `WrongReceiver` means a structurally matching transfer existed but never
/// paid `deposit_address`; `DepositNotFound` means no such event existed at
/// all. Callers use the distinction for diagnostics.
pub fn parse_swapin_tx_logs(
    logs: &[LogEntry],
    contract_address: &str,
    deposit_address: &str,
) -> Result<(String, String, U256), SwapinError> {
    let signature = transfer_log_signature();
    let mut transfer_log_exists = false;

    for log in logs {
        if log.removed == Some(true) {
            continue;
        }
        if !is_equal_ignore_case(&address_to_lower_hex(&log.address), contract_address) {
            continue;
        }
        // Structural shape of a two-indexed-argument event: signature topic,
        // indexed sender, indexed recipient, value in the data payload.
        let Some(data) = log.data.as_ref() else {
            continue;
        };
        if log.topics.len() != 3 {
            continue;
        }
        if log.topics[0] != signature {
            continue;
        }
        transfer_log_exists = true;

        let to = address_to_lower_hex(&Address::from_word(log.topics[2]));
        if !is_equal_ignore_case(&to, deposit_address) {
            // A transaction may pay several recipients; keep scanning.
            continue;
        }
        let from = address_to_lower_hex(&Address::from_word(log.topics[1]));
        let take = data.len().min(32);
        let value = U256::from_be_slice(&data[..take]);
        return Ok((from, to, value));
    }

    if transfer_log_exists {
        Err(SwapinError::WrongReceiver)
    } else {
        Err(SwapinError::DepositNotFound)
    }
}
