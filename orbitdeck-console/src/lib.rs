//! Command-line console for `OrbitDeck`.
//!
//! # Modules
//!
//! - [`config`] - Console configuration with environment variable expansion
//! - [`commands`] - Registry, network, and deployment commands returning
//!   serializable reports

pub mod commands;
pub mod config;

pub use commands::{ChainsQuery, ConsoleError};
pub use config::{ConfigError, ConsoleConfig};
