//! Wallet connection state machine.
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> ChainSupported | ChainUnsupported
//!       ^                                            |
//!       +-------- disconnect / accountsChanged([]) --+
//! ```
//!
//! All mutation goes through [`WalletSessionManager`]. Provider events and
//! `connect()` share one async gate, so an event that arrives while a
//! connection attempt is in flight is applied after that attempt settles, in
//! emission order. `disconnect()` does not take the gate: it is synchronous and
//! whichever of it and an in-flight `connect()` writes last wins.

use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;

use super::{
    ProviderEvent, ProviderSubscription, SubscriptionId, WalletError, WalletProvider,
    short_address,
};
use crate::chain::{self, ChainId};
use crate::networks::ChainCatalog;

/// Snapshot of the wallet connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    /// Active account, if connected.
    pub address: Option<String>,
    /// Chain the wallet is on, once known.
    pub chain_id: Option<ChainId>,
    /// Whether the wallet has authorized an account.
    pub connected: bool,
}

impl WalletSession {
    fn connected(address: String, chain_id: ChainId) -> Self {
        Self {
            address: Some(address),
            chain_id: Some(chain_id),
            connected: true,
        }
    }

    /// Abbreviated active address, for display.
    #[must_use]
    pub fn short_address(&self) -> Option<String> {
        self.address.as_deref().map(short_address)
    }
}

/// Coarse connection state, derived from the session and the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No account authorized.
    Disconnected,
    /// A `connect()` call is awaiting the wallet.
    Connecting,
    /// Connected, chain not yet known.
    Connected,
    /// Connected to a network in the catalog.
    ChainSupported,
    /// Connected to a network outside the catalog.
    ChainUnsupported,
}

/// Result of a [`WalletSessionManager::connect`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The wallet authorized an account.
    Connected(WalletSession),
    /// Another `connect()` was already in flight; this call did nothing.
    InFlight,
}

struct Listener {
    id: SubscriptionId,
    task: JoinHandle<()>,
}

struct Inner {
    provider: Option<Arc<dyn WalletProvider>>,
    catalog: ChainCatalog,
    session: watch::Sender<WalletSession>,
    connecting: AtomicBool,
    gate: AsyncMutex<()>,
    attached: AtomicBool,
    listener: Mutex<Option<Listener>>,
}

impl Inner {
    fn detach(&self, listener: Option<Listener>) {
        if let Some(Listener { id, task }) = listener {
            task.abort();
            if let Some(provider) = &self.provider {
                provider.unsubscribe(id);
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.detach(listener);
    }
}

/// Clears the in-flight flag when a connection attempt ends, including when
/// its future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the wallet connection for one panel instance.
///
/// Cheap to clone; clones share state. Consumers receive the manager by
/// injection rather than looking it up globally.
///
/// # Example
///
/// ```ignore
/// let manager = WalletSessionManager::new(Some(provider), catalog);
/// manager.attach();
/// manager.restore().await;
/// match manager.connect().await {
///     Ok(ConnectOutcome::Connected(session)) => println!("{:?}", session.address),
///     Ok(ConnectOutcome::InFlight) => {}
///     Err(err) if err.kind().is_silent() => {}
///     Err(err) => eprintln!("{err}"),
/// }
/// ```
#[derive(Clone)]
pub struct WalletSessionManager {
    inner: Arc<Inner>,
}

impl Debug for WalletSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSessionManager")
            .field("has_provider", &self.inner.provider.is_some())
            .field("session", &*self.inner.session.borrow())
            .field("networks", &self.inner.catalog.len())
            .finish_non_exhaustive()
    }
}

impl WalletSessionManager {
    /// Creates a disconnected manager.
    ///
    /// `provider` is `None` when no wallet is installed; `connect()` then
    /// fails with [`WalletError::ProviderUnavailable`].
    #[must_use]
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, catalog: ChainCatalog) -> Self {
        let (session, _) = watch::channel(WalletSession::default());
        Self {
            inner: Arc::new(Inner {
                provider,
                catalog,
                session,
                connecting: AtomicBool::new(false),
                gate: AsyncMutex::new(()),
                attached: AtomicBool::new(false),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> WalletSession {
        self.inner.session.borrow().clone()
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<WalletSession> {
        self.inner.session.subscribe()
    }

    /// Networks considered supported.
    #[must_use]
    pub fn catalog(&self) -> &ChainCatalog {
        &self.inner.catalog
    }

    /// Current coarse state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.inner.connecting.load(Ordering::Acquire) {
            return ConnectionState::Connecting;
        }
        let session = self.inner.session.borrow();
        if !session.connected {
            return ConnectionState::Disconnected;
        }
        match session.chain_id {
            None => ConnectionState::Connected,
            Some(id) if self.inner.catalog.contains(id) => ConnectionState::ChainSupported,
            Some(_) => ConnectionState::ChainUnsupported,
        }
    }

    /// Returns `true` if the wallet reports a chain outside the catalog.
    ///
    /// An unknown chain id is not considered wrong.
    #[must_use]
    pub fn is_wrong_chain(&self) -> bool {
        self.inner
            .session
            .borrow()
            .chain_id
            .is_some_and(|id| !self.inner.catalog.contains(id))
    }

    /// Abbreviated active address, for display.
    #[must_use]
    pub fn short_address(&self) -> Option<String> {
        self.inner.session.borrow().short_address()
    }

    fn provider(&self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        self.inner
            .provider
            .clone()
            .ok_or(WalletError::ProviderUnavailable)
    }

    fn reset(&self) {
        self.inner.session.send_replace(WalletSession::default());
    }

    /// Asks the wallet to authorize an account, then reads its chain id.
    ///
    /// Calls made while another `connect()` is in flight return
    /// [`ConnectOutcome::InFlight`] without contacting the wallet.
    ///
    /// # Errors
    ///
    /// [`WalletError::ProviderUnavailable`] when no wallet is installed. Any
    /// other failure (rejection, zero accounts, provider error, unparseable
    /// chain id) resets the session to disconnected before being returned.
    pub async fn connect(&self) -> Result<ConnectOutcome, WalletError> {
        let provider = self.provider()?;
        let Some(_in_flight) = InFlight::acquire(&self.inner.connecting) else {
            return Ok(ConnectOutcome::InFlight);
        };
        let _gate = self.inner.gate.lock().await;

        match authorize(provider.as_ref()).await {
            Ok(session) => {
                #[cfg(feature = "telemetry")]
                tracing::info!(
                    address = session.address.as_deref(),
                    chain_id = session.chain_id,
                    "Wallet connected"
                );
                self.inner.session.send_replace(session.clone());
                Ok(ConnectOutcome::Connected(session))
            }
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(kind = %err.kind(), error = %err, "Wallet connect failed");
                self.reset();
                Err(err)
            }
        }
    }

    /// Adopts an already-authorized account without prompting the user.
    ///
    /// Intended for startup. Returns `true` if a session was restored. Every
    /// failure is swallowed and leaves the session disconnected.
    pub async fn restore(&self) -> bool {
        let Ok(provider) = self.provider() else {
            return false;
        };
        let Some(_in_flight) = InFlight::acquire(&self.inner.connecting) else {
            return false;
        };
        let _gate = self.inner.gate.lock().await;

        match authorized_session(provider.as_ref()).await {
            Ok(Some(session)) => {
                self.inner.session.send_replace(session);
                true
            }
            Ok(None) => false,
            Err(err) => {
                log_ignored("restore", &err);
                self.reset();
                false
            }
        }
    }

    /// Forgets the session locally. The wallet itself is not contacted.
    ///
    /// Idempotent.
    pub fn disconnect(&self) {
        self.reset();
    }

    /// Applies a provider event, after any in-flight `connect()` settles.
    ///
    /// `accountsChanged([])` disconnects; a non-empty list adopts its first
    /// account. `chainChanged` updates only the chain id; an unparseable value
    /// is ignored.
    pub async fn handle_event(&self, event: ProviderEvent) {
        let _gate = self.inner.gate.lock().await;
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => self.reset(),
                Some(address) => self.inner.session.send_modify(|session| {
                    session.address = Some(address);
                    session.connected = true;
                }),
            },
            ProviderEvent::ChainChanged(raw) => match chain::parse_any(&raw) {
                Ok(id) => self
                    .inner
                    .session
                    .send_modify(|session| session.chain_id = Some(id)),
                Err(err) => log_ignored("chainChanged", &err),
            },
        }
    }

    /// Subscribes to provider events and applies them in the background.
    ///
    /// Installs at most one subscription over the manager's lifetime; returns
    /// `false` if one was already installed or there is no provider. Must be
    /// called from within a tokio runtime.
    pub fn attach(&self) -> bool {
        let Some(provider) = self.inner.provider.clone() else {
            return false;
        };
        if self.inner.attached.swap(true, Ordering::AcqRel) {
            return false;
        }

        let ProviderSubscription { id, mut events } = provider.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                Self { inner }.handle_event(event).await;
            }
        });

        *self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Listener { id, task });
        true
    }

    /// Stops the background subscription installed by [`attach`](Self::attach).
    ///
    /// The subscription is not reinstalled by a later `attach()`.
    pub fn teardown(&self) {
        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.inner.detach(listener);
    }

    /// Asks the wallet to move to `target`.
    ///
    /// If the wallet does not know the network (code 4902) it is asked once
    /// to add it; there is no retry loop. The session is not modified here:
    /// the wallet's `chainChanged` event carries the new chain id.
    ///
    /// # Errors
    ///
    /// [`WalletError::UnsupportedChain`] if `target` is not in the catalog,
    /// otherwise whatever the switch (or fallback add) request returned.
    pub async fn switch_to_supported_chain(&self, target: ChainId) -> Result<(), WalletError> {
        let provider = self.provider()?;
        let chain = self
            .inner
            .catalog
            .get(target)
            .ok_or(WalletError::UnsupportedChain(target))?;

        match provider.switch_chain(&chain::to_hex(target)).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_unrecognized_chain() => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(chain_id = target, "Wallet does not know chain, adding it");
                provider.add_chain(chain).await.map_err(WalletError::from)
            }
            Err(err) => Err(err.into()),
        }
    }
}

async fn authorize(provider: &dyn WalletProvider) -> Result<WalletSession, WalletError> {
    let accounts = provider.request_accounts().await?;
    let address = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
    let chain_id = chain::parse_any(&provider.chain_id().await?)?;
    Ok(WalletSession::connected(address, chain_id))
}

async fn authorized_session(
    provider: &dyn WalletProvider,
) -> Result<Option<WalletSession>, WalletError> {
    let accounts = provider.accounts().await?;
    let Some(address) = accounts.into_iter().next() else {
        return Ok(None);
    };
    let chain_id = chain::parse_any(&provider.chain_id().await?)?;
    Ok(Some(WalletSession::connected(address, chain_id)))
}

#[cfg(feature = "telemetry")]
fn log_ignored<E: Display>(context: &'static str, err: &E) {
    tracing::warn!(context, error = %err, "Ignoring wallet failure");
}

#[cfg(not(feature = "telemetry"))]
fn log_ignored<E: Display>(_context: &'static str, _err: &E) {}
