//! Known EVM networks the panel can point a wallet at.

use orbitdeck::chain::ChainId;
use orbitdeck::networks::{ChainCatalog, SupportedChain};

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: ChainId = 1;

/// Ethereum Sepolia (testnet) chain ID.
pub const ETHEREUM_SEPOLIA: ChainId = 11_155_111;

/// Arbitrum One chain ID.
pub const ARBITRUM_ONE: ChainId = 42161;

/// Arbitrum Nova chain ID.
pub const ARBITRUM_NOVA: ChainId = 42170;

/// Arbitrum Sepolia (testnet) chain ID.
pub const ARBITRUM_SEPOLIA: ChainId = 421_614;

/// Networks Orbit chains can settle to, plus their L1s.
pub const SUPPORTED_CHAINS: &[SupportedChain] = &[
    SupportedChain::new_static(
        ETHEREUM_MAINNET,
        "Ethereum",
        "ETH",
        "https://etherscan.io",
        "https://eth.llamarpc.com",
    ),
    SupportedChain::new_static(
        ARBITRUM_ONE,
        "Arbitrum One",
        "ETH",
        "https://arbiscan.io",
        "https://arb1.arbitrum.io/rpc",
    ),
    SupportedChain::new_static(
        ARBITRUM_NOVA,
        "Arbitrum Nova",
        "ETH",
        "https://nova.arbiscan.io",
        "https://nova.arbitrum.io/rpc",
    ),
    SupportedChain::new_static(
        ARBITRUM_SEPOLIA,
        "Arbitrum Sepolia",
        "ETH",
        "https://sepolia.arbiscan.io",
        "https://sepolia-rollup.arbitrum.io/rpc",
    ),
    SupportedChain::new_static(
        ETHEREUM_SEPOLIA,
        "Sepolia",
        "ETH",
        "https://sepolia.etherscan.io",
        "https://rpc.sepolia.org",
    ),
];

/// Returns a catalog holding [`SUPPORTED_CHAINS`].
#[must_use]
pub fn default_catalog() -> ChainCatalog {
    ChainCatalog::from_chains(SUPPORTED_CHAINS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_arbitrum() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), SUPPORTED_CHAINS.len());
        assert!(catalog.contains(ARBITRUM_ONE));
        assert!(catalog.contains(ARBITRUM_SEPOLIA));
        assert!(!catalog.contains(39713));
    }

    #[test]
    fn test_chain_ids_are_unique() {
        let mut ids: Vec<_> = SUPPORTED_CHAINS.iter().map(|c| c.chain_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SUPPORTED_CHAINS.len());
    }
}
