//! Catalog of wallet networks the control panel supports.
//!
//! A wallet connected to a chain that is not in the catalog is flagged as
//! being on the wrong network, and the panel offers to switch it to one that
//! is. Concrete network data lives in `orbitdeck-evm`
//! (`orbitdeck_evm::SUPPORTED_CHAINS`); applications assemble a
//! [`ChainCatalog`] from that slice plus any networks added by configuration.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// A network the panel can point a wallet at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedChain {
    /// EIP-155 chain id.
    pub chain_id: ChainId,
    /// Human-readable network name (e.g., "Arbitrum One").
    pub name: Cow<'static, str>,
    /// Symbol of the native gas token (e.g., "ETH").
    pub native_symbol: Cow<'static, str>,
    /// Decimals of the native gas token.
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,
    /// Block explorer root URL, without trailing slash.
    pub explorer_base_url: Cow<'static, str>,
    /// Public RPC endpoint, used when asking the wallet to add this network.
    pub rpc_url: Cow<'static, str>,
}

const fn default_native_decimals() -> u8 {
    18
}

impl SupportedChain {
    /// Creates a catalog entry from static strings.
    #[must_use]
    pub const fn new_static(
        chain_id: ChainId,
        name: &'static str,
        native_symbol: &'static str,
        explorer_base_url: &'static str,
        rpc_url: &'static str,
    ) -> Self {
        Self {
            chain_id,
            name: Cow::Borrowed(name),
            native_symbol: Cow::Borrowed(native_symbol),
            native_decimals: default_native_decimals(),
            explorer_base_url: Cow::Borrowed(explorer_base_url),
            rpc_url: Cow::Borrowed(rpc_url),
        }
    }

    /// Explorer page for an account or contract address.
    #[must_use]
    pub fn explorer_address_url(&self, address: &str) -> String {
        format!(
            "{}/address/{address}",
            self.explorer_base_url.trim_end_matches('/')
        )
    }

    /// Explorer page for a transaction hash.
    #[must_use]
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_base_url.trim_end_matches('/'))
    }
}

/// Lookup table of supported networks keyed by chain id.
///
/// Iteration order is ascending chain id, so listings are deterministic.
///
/// # Example
///
/// ```ignore
/// use orbitdeck::networks::ChainCatalog;
///
/// let catalog = ChainCatalog::from_chains(orbitdeck_evm::SUPPORTED_CHAINS);
/// assert!(catalog.contains(42161));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainCatalog {
    chains: BTreeMap<ChainId, SupportedChain>,
}

impl ChainCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated from a slice of entries.
    #[must_use]
    pub fn from_chains(chains: &[SupportedChain]) -> Self {
        let mut catalog = Self::new();
        catalog.register(chains.iter().cloned());
        catalog
    }

    /// Registers additional networks. A later entry replaces an earlier one
    /// with the same chain id.
    pub fn register(&mut self, chains: impl IntoIterator<Item = SupportedChain>) {
        for chain in chains {
            self.chains.insert(chain.chain_id, chain);
        }
    }

    /// Builder-style method: registers additional networks and returns `self`.
    #[must_use]
    pub fn with_chains(mut self, chains: impl IntoIterator<Item = SupportedChain>) -> Self {
        self.register(chains);
        self
    }

    /// Looks up a network by chain id.
    #[must_use]
    pub fn get(&self, chain_id: ChainId) -> Option<&SupportedChain> {
        self.chains.get(&chain_id)
    }

    /// Returns `true` if the chain id is in the catalog.
    #[must_use]
    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// Iterates entries in ascending chain id order.
    pub fn iter(&self) -> impl Iterator<Item = &SupportedChain> {
        self.chains.values()
    }

    /// Returns the number of registered networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no networks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
