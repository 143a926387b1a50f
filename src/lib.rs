//! Verification core for crediting ERC20 swap-in deposits across chains.
//!
//! Given a transaction observed on a source chain, decide deterministically
//! whether it is a valid deposit to credit on the destination chain, and
//! extract the canonical swap parameters. The crate also owns the startup
//! chain-identity bootstrap and the scan-job activation policy; receipts,
//! chain ids, and contract code are fetched through the [`gateway::Gateway`]
//! trait.

pub mod bridge;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod registry;
pub mod scan;
pub mod types;
pub mod verifier;
