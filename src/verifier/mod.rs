//! The swap-in validation chain.
//!
//! Every stage may short-circuit with a terminal [`SwapinError`]; a
//! `SwapInfo` is only considered valid once all stages have passed. The
//! accumulator is still partially populated on failure so callers can log
//! what was seen, but it must never reach crediting logic.

pub mod logs;

pub use logs::{parse_swapin_tx_logs, transfer_log_signature};

use std::str::FromStr;

use alloy::primitives::Address;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::config::TokenConfig;
use crate::error::SwapinError;
use crate::types::{address_to_lower_hex, is_equal_ignore_case, SwapInfo, TxReceipt};

impl Bridge {
    /// Verify one candidate swap-in transaction against its receipt.
    ///
    /// `allow_unstable` marks verifications performed before the transaction
    /// reached sufficient confirmation depth; the audit record is emitted
    /// only on the stable pass to avoid duplicate noise.
    pub async fn verify_swapin(
        &self,
        swap: &mut SwapInfo,
        allow_unstable: bool,
        token: &TokenConfig,
        receipt: &TxReceipt,
    ) -> Result<(), SwapinError> {
        self.verify_swapin_receipt(swap, receipt, token)?;
        self.check_swapin_info(swap).await?;

        if !allow_unstable {
            info!(
                pair_id = %swap.pair_id,
                txid = %swap.hash,
                height = swap.height,
                timestamp = swap.timestamp,
                from = %swap.from,
                tx_to = %swap.tx_to,
                to = %swap.to,
                bind = %swap.bind,
                value = %swap.value,
                "verify swapin stable pass"
            );
        }
        Ok(())
    }

    /// Contract-origin policy plus transfer extraction (stages 1-3).
    fn verify_swapin_receipt(
        &self,
        swap: &mut SwapInfo,
        receipt: &TxReceipt,
        token: &TokenConfig,
    ) -> Result<(), SwapinError> {
        let Some(recipient) = receipt.recipient else {
            return Err(SwapinError::WrongContract);
        };
        swap.tx_to = address_to_lower_hex(&recipient);
        swap.from = address_to_lower_hex(&receipt.from);

        if !token.allow_swapin_from_contract
            && !is_equal_ignore_case(&swap.tx_to, &token.contract_address)
            && !self
                .chain_config()
                .is_in_call_by_contract_whitelist(&swap.tx_to)
        {
            return Err(SwapinError::WrongContract);
        }

        match parse_swapin_tx_logs(&receipt.logs, &token.contract_address, &token.deposit_address)
        {
            Ok((from, to, value)) => {
                swap.to = to;
                swap.value = value;
                swap.bind = from;
                Ok(())
            }
            Err(err) => {
                if err != SwapinError::WrongReceiver {
                    debug!(txid = %swap.hash, %err, "parse swapin tx logs failed");
                }
                Err(err)
            }
        }
    }

    /// Semantic checks over the extracted fields (stages 4-7).
    async fn check_swapin_info(&self, swap: &SwapInfo) -> Result<(), SwapinError> {
        if swap.bind == swap.to {
            return Err(SwapinError::WrongSender);
        }
        if !self.check_swap_value(&swap.pair_id, swap.value) {
            return Err(SwapinError::WrongValue);
        }
        // Defensive re-check; configuration may have changed since dispatch.
        let token = self
            .get_token_config(&swap.pair_id)
            .ok_or(SwapinError::UnknownPairId)?;
        self.check_swapin_bind_address(&swap.bind, token.allow_swapin_from_contract)
            .await
    }

    /// Bind-address validation (stage 7): destination-chain syntax,
    /// registration, and the contract-impersonation check.
    async fn check_swapin_bind_address(
        &self,
        bind: &str,
        allow_contract_address: bool,
    ) -> Result<(), SwapinError> {
        if !self.dst_rules().is_valid_address(bind) {
            warn!(%bind, "wrong bind address in swapin");
            return Err(SwapinError::WrongMemo);
        }
        if self.must_register_account() && !self.registry().is_address_registered(bind) {
            return Err(SwapinError::SenderNotRegistered);
        }
        if self.is_swap_server()
            && !allow_contract_address
            && !self.chain_config().is_in_call_by_contract_whitelist(bind)
        {
            let address = Address::from_str(bind).map_err(|_| SwapinError::WrongMemo)?;
            let is_contract = match self.gateway().is_contract_address(address).await {
                Ok(is_contract) => is_contract,
                Err(err) => {
                    warn!(%bind, %err, "query is contract address failed");
                    return Err(SwapinError::RpcQuery(err.to_string()));
                }
            };
            if is_contract {
                return Err(SwapinError::BindAddrIsContract);
            }
        }
        Ok(())
    }
}
