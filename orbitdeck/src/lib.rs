#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the `OrbitDeck` rollup control panel.
//!
//! This crate holds the stateful pieces of a control panel that provisions and
//! monitors Arbitrum Orbit chains: the wallet session state machine, the chain
//! registry data model, and the table engine that turns registry records into a
//! visible page. It is transport-agnostic; the HTTP clients live in
//! `orbitdeck-http` and the EIP-1193 wallet adapter in `orbitdeck-evm`.
//!
//! # Modules
//!
//! - [`chain`] - Chain id conversion between the hex wire form and `u64`
//! - [`clipboard`] - Clipboard copies with a self-expiring "copied" indicator
//! - [`deploy`] - Deployment form state and request validation
//! - [`error`] - Error taxonomy shared by every component
//! - [`networks`] - Catalog of wallet networks the panel supports
//! - [`record`] - Canonical chain records and legacy-shape normalization
//! - [`table`] - Filtering, sorting, and pagination of chain records
//! - [`timestamp`] - Lenient timestamps for registry records
//! - [`wallet`] - Wallet provider abstraction and session manager
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod chain;
pub mod clipboard;
pub mod deploy;
pub mod error;
pub mod networks;
pub mod record;
pub mod table;
pub mod timestamp;
pub mod wallet;

pub use error::ErrorKind;
