#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP clients for the `OrbitDeck` backend.
//!
//! # Modules
//!
//! - [`constants`] - Endpoint paths and the default base URL
//! - [`error`] - Client error types (feature: `client`)
//! - [`registry`] - Chain registry client and last-known-good dashboard (feature: `client`)
//! - [`deploy`] - Single-flight deployment submitter (feature: `client`)
//!
//! # Feature Flags
//!
//! - `client` - `reqwest`-based clients
//! - `telemetry` - Tracing spans around each request

pub mod constants;

#[cfg(feature = "client")]
pub mod deploy;
#[cfg(feature = "client")]
pub mod error;
#[cfg(feature = "client")]
pub mod registry;

#[cfg(feature = "client")]
pub use deploy::{DeploymentSubmitter, SubmitOutcome};
#[cfg(feature = "client")]
pub use error::{DeployError, RegistryError};
#[cfg(feature = "client")]
pub use registry::{Dashboard, RecordSource, RegistryClient, RegistryFetch};
