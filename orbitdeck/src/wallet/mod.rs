//! Wallet provider abstraction and session management.
//!
//! The panel never signs anything itself. It talks to an injected EIP-1193
//! style provider through the [`WalletProvider`] trait and keeps the resulting
//! connection in a [`WalletSessionManager`]. The concrete JSON-RPC adapter
//! lives in `orbitdeck-evm`.

mod session;

pub use session::{ConnectOutcome, ConnectionState, WalletSession, WalletSessionManager};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::chain::{ChainId, ChainIdError};
use crate::error::ErrorKind;
use crate::networks::SupportedChain;

/// Error object returned by a wallet provider request.
///
/// Mirrors the EIP-1193 `ProviderRpcError` shape: a numeric code plus a
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("wallet provider error {code}: {message}")]
pub struct ProviderError {
    /// EIP-1193 / JSON-RPC error code.
    pub code: i64,
    /// Provider-supplied description.
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request (EIP-1193).
    pub const USER_REJECTED: i64 = 4001;
    /// The requested chain has not been added to the wallet (EIP-3085).
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// JSON-RPC internal error, used for transport failures.
    pub const INTERNAL: i64 = -32603;

    /// Creates a provider error.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Wraps a transport-level failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    /// Returns `true` if the user declined the request.
    #[must_use]
    pub const fn is_user_rejected(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    /// Returns `true` if the wallet does not know the requested chain.
    #[must_use]
    pub const fn is_unrecognized_chain(&self) -> bool {
        self.code == Self::UNRECOGNIZED_CHAIN
    }

    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self.code {
            Self::USER_REJECTED => ErrorKind::ProviderRejected,
            Self::UNRECOGNIZED_CHAIN => ErrorKind::UnsupportedChain,
            _ => ErrorKind::NetworkTransport,
        }
    }
}

/// An event pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `accountsChanged`: the authorized accounts, most recent first.
    /// Empty when the user revoked access or locked the wallet.
    AccountsChanged(Vec<String>),
    /// `chainChanged`: the new chain id as reported on the wire (hex).
    ChainChanged(String),
}

/// Identifier of an event subscription, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A live event subscription.
///
/// Events arrive on `events` in emission order. Pass `id` to
/// [`WalletProvider::unsubscribe`] to stop delivery.
#[derive(Debug)]
pub struct ProviderSubscription {
    /// Handle for unsubscribing.
    pub id: SubscriptionId,
    /// Event stream.
    pub events: mpsc::UnboundedReceiver<ProviderEvent>,
}

/// An EIP-1193 wallet provider.
///
/// Chain ids cross this boundary in their hex wire form; conversion to
/// [`ChainId`] happens in the session manager.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`: prompts the user to authorize accounts.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// `eth_accounts`: already-authorized accounts, without prompting.
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// `eth_chainId`: the wallet's current chain id as a hex quantity.
    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// `wallet_switchEthereumChain` with `[{chainId: chain_id_hex}]`.
    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError>;

    /// `wallet_addEthereumChain` with the network's parameters.
    async fn add_chain(&self, chain: &SupportedChain) -> Result<(), ProviderError>;

    /// Starts delivering `accountsChanged` and `chainChanged` events.
    fn subscribe(&self) -> ProviderSubscription;

    /// Stops delivering events to a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Errors surfaced by [`WalletSessionManager`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// No wallet provider is installed.
    #[error("No wallet provider detected. Install MetaMask or another Web3 wallet to continue.")]
    ProviderUnavailable,
    /// The user declined the wallet prompt.
    #[error("wallet request was rejected")]
    Rejected,
    /// The wallet authorized zero accounts.
    #[error("wallet returned no accounts")]
    NoAccounts,
    /// The provider failed the request.
    #[error(transparent)]
    Provider(ProviderError),
    /// The provider reported a chain id that could not be parsed.
    #[error("wallet reported an invalid chain id")]
    ChainId(#[from] ChainIdError),
    /// The requested network is not in the supported catalog.
    #[error("chain {0} is not a supported network")]
    UnsupportedChain(ChainId),
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejected() {
            Self::Rejected
        } else {
            Self::Provider(err)
        }
    }
}

impl WalletError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            Self::Rejected | Self::NoAccounts => ErrorKind::ProviderRejected,
            Self::Provider(err) => err.kind(),
            Self::ChainId(err) => err.kind(),
            Self::UnsupportedChain(_) => ErrorKind::UnsupportedChain,
        }
    }
}

/// Abbreviates an address for display: `0x1234...abcd`.
///
/// Keeps the first six and last four characters. Strings of ten characters or
/// fewer are returned unchanged.
#[must_use]
pub fn short_address(address: &str) -> String {
    let count = address.chars().count();
    if count <= 10 {
        return address.to_owned();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = address.chars().skip(count - 4).collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(short_address("0x123"), "0x123");
        assert_eq!(short_address("0x12345678"), "0x12345678");
        assert_eq!(short_address(""), "");
    }

    #[test]
    fn test_user_rejection_maps_to_rejected() {
        let err = WalletError::from(ProviderError::new(4001, "User rejected the request."));
        assert_eq!(err, WalletError::Rejected);
        assert!(err.kind().is_silent());
    }

    #[test]
    fn test_provider_error_kinds() {
        assert_eq!(
            ProviderError::new(4902, "Unrecognized chain").kind(),
            ErrorKind::UnsupportedChain
        );
        assert_eq!(
            ProviderError::internal("socket closed").kind(),
            ErrorKind::NetworkTransport
        );
        let wrapped = WalletError::from(ProviderError::new(-32000, "busy"));
        assert_eq!(wrapped.kind(), ErrorKind::NetworkTransport);
    }

    #[test]
    fn test_unavailable_message_prompts_install() {
        let msg = WalletError::ProviderUnavailable.to_string();
        assert!(msg.contains("Install"));
        assert_eq!(
            WalletError::ProviderUnavailable.kind(),
            ErrorKind::ProviderUnavailable
        );
    }
}
