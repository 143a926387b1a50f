//! Bind-address collaborators: the registration store and the
//! destination-chain address syntax rule.

use std::collections::HashSet;
use std::path::Path;

use eyre::{Result, WrapErr};

/// Registration store consulted when the deployment requires
/// pre-registered bind addresses.
pub trait AddressRegistry: Send + Sync {
    fn is_address_registered(&self, address: &str) -> bool;
}

/// Destination-chain address syntax rules.
pub trait DstChainRules: Send + Sync {
    fn is_valid_address(&self, address: &str) -> bool;
}

/// In-memory registry backed by a newline-separated address file.
#[derive(Debug, Default)]
pub struct FileRegistry {
    addresses: HashSet<String>,
}

impl FileRegistry {
    /// Empty registry; rejects everything until addresses are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load addresses from a file, one per line, `#` comments allowed.
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(Path::new(path))
            .wrap_err_with(|| format!("failed to read registered address file {path}"))?;
        let addresses = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Ok(Self { addresses })
    }

    pub fn insert(&mut self, address: &str) {
        self.addresses.insert(address.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl AddressRegistry for FileRegistry {
    fn is_address_registered(&self, address: &str) -> bool {
        self.addresses.contains(&address.to_lowercase())
    }
}

/// EVM destination chains accept 20-byte hex addresses.
#[derive(Debug, Default)]
pub struct EvmAddressRules;

impl DstChainRules for EvmAddressRules {
    fn is_valid_address(&self, address: &str) -> bool {
        address.len() == 42
            && address.starts_with("0x")
            && address[2..].bytes().all(|b| b.is_ascii_hexdigit())
    }
}
