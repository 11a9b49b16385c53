#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EIP-1193 wallet support for `OrbitDeck`.
//!
//! This crate connects the transport-agnostic session manager in `orbitdeck`
//! to real EVM wallets.
//!
//! # Modules
//!
//! - [`provider`] - [`Eip1193Provider`], an adapter from the raw
//!   `request({method, params})` surface to `orbitdeck::wallet::WalletProvider`,
//!   plus [`ProviderEventHub`] for fanning out wallet events
//! - network constants and [`SUPPORTED_CHAINS`], re-exported at the crate root
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod provider;

mod networks;
pub use networks::*;

pub use provider::{
    AddEthereumChainParameter, Eip1193Provider, Eip1193Transport, NativeCurrency,
    ProviderEventHub,
};
