//! EIP-1193 adapter.
//!
//! [`Eip1193Provider`] turns the raw `request({method, params})` surface of an
//! injected wallet into the typed [`WalletProvider`] the session manager uses:
//!
//! - method names and parameter shapes for each call
//! - response decoding and account address validation
//! - `accountsChanged` / `chainChanged` payload decoding via [`ProviderEventHub`]

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::Address;
use dashmap::DashMap;
use orbitdeck::chain;
use orbitdeck::networks::SupportedChain;
use orbitdeck::wallet::{
    ProviderError, ProviderEvent, ProviderSubscription, SubscriptionId, WalletProvider,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;

/// Name of the event carrying the authorized account list.
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
/// Name of the event carrying the new chain id.
pub const CHAIN_CHANGED: &str = "chainChanged";

/// The raw request surface of an injected wallet.
#[async_trait::async_trait]
pub trait Eip1193Transport: Send + Sync {
    /// Sends `{method, params}` and returns the `result` value.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Registers for wallet events.
    fn subscribe(&self) -> ProviderSubscription;

    /// Removes an event registration.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Native currency block of an add-network request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
}

/// Parameter object of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    /// Hex chain id.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Gas token.
    pub native_currency: NativeCurrency,
    /// RPC endpoints.
    pub rpc_urls: Vec<String>,
    /// Explorer roots.
    pub block_explorer_urls: Vec<String>,
}

impl From<&SupportedChain> for AddEthereumChainParameter {
    fn from(chain: &SupportedChain) -> Self {
        Self {
            chain_id: chain::to_hex(chain.chain_id),
            chain_name: chain.name.to_string(),
            native_currency: NativeCurrency {
                name: chain.native_symbol.to_string(),
                symbol: chain.native_symbol.to_string(),
                decimals: chain.native_decimals,
            },
            rpc_urls: vec![chain.rpc_url.to_string()],
            block_explorer_urls: vec![chain.explorer_base_url.to_string()],
        }
    }
}

/// Fan-out of wallet events to any number of subscribers.
///
/// Transports hold one hub and feed it whatever the wallet emits; each
/// subscriber receives events in emission order.
#[derive(Debug, Default)]
pub struct ProviderEventHub {
    subscribers: DashMap<u64, mpsc::UnboundedSender<ProviderEvent>>,
    next_id: AtomicU64,
}

impl ProviderEventHub {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn subscribe(&self) -> ProviderSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, events) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        ProviderSubscription {
            id: SubscriptionId(id),
            events,
        }
    }

    /// Removes a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.remove(&id.0);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers an event to every subscriber, dropping closed ones.
    pub fn publish(&self, event: &ProviderEvent) {
        self.subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    /// Decodes a raw wallet event and publishes it.
    ///
    /// Returns `false` (and publishes nothing) for events other than
    /// `accountsChanged` / `chainChanged` or payloads of the wrong shape.
    pub fn publish_raw(&self, name: &str, payload: &Value) -> bool {
        match decode_event(name, payload) {
            Some(event) => {
                self.publish(&event);
                true
            }
            None => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(event = name, "Ignoring wallet event");
                false
            }
        }
    }
}

/// Decodes an `accountsChanged` or `chainChanged` payload.
#[must_use]
pub fn decode_event(name: &str, payload: &Value) -> Option<ProviderEvent> {
    match name {
        ACCOUNTS_CHANGED => serde_json::from_value::<Vec<String>>(payload.clone())
            .ok()
            .map(ProviderEvent::AccountsChanged),
        CHAIN_CHANGED => payload
            .as_str()
            .map(|id| ProviderEvent::ChainChanged(id.to_owned())),
        _ => None,
    }
}

/// [`WalletProvider`] over any EIP-1193 transport.
#[derive(Debug, Clone)]
pub struct Eip1193Provider<T> {
    transport: T,
}

impl<T> Eip1193Provider<T> {
    /// Wraps a transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the wrapped transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

fn malformed(method: &str, detail: impl std::fmt::Display) -> ProviderError {
    ProviderError::internal(format!("malformed {method} result: {detail}"))
}

fn decode_accounts(method: &str, result: Value) -> Result<Vec<String>, ProviderError> {
    let accounts: Vec<String> =
        serde_json::from_value(result).map_err(|e| malformed(method, e))?;
    for account in &accounts {
        Address::from_str(account).map_err(|e| malformed(method, format!("{account}: {e}")))?;
    }
    Ok(accounts)
}

#[async_trait::async_trait]
impl<T: Eip1193Transport> WalletProvider for Eip1193Provider<T> {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.transport.request("eth_requestAccounts", json!([])).await?;
        decode_accounts("eth_requestAccounts", result)
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.transport.request("eth_accounts", json!([])).await?;
        decode_accounts("eth_accounts", result)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        match self.transport.request("eth_chainId", json!([])).await? {
            Value::String(id) => Ok(id),
            other => Err(malformed("eth_chainId", other)),
        }
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError> {
        self.transport
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": chain_id_hex }]),
            )
            .await
            .map(|_| ())
    }

    async fn add_chain(&self, chain: &SupportedChain) -> Result<(), ProviderError> {
        let parameter = AddEthereumChainParameter::from(chain);
        let params =
            serde_json::to_value([parameter]).map_err(|e| malformed("wallet_addEthereumChain", e))?;
        self.transport
            .request("wallet_addEthereumChain", params)
            .await
            .map(|_| ())
    }

    fn subscribe(&self) -> ProviderSubscription {
        self.transport.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.transport.unsubscribe(id);
    }
}
