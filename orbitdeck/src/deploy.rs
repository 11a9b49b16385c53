//! Deployment form state and request validation.
//!
//! The form carries every choice the operator makes on the create screen, but
//! only three values go on the wire: the numeric chain id, the rollup name,
//! and the wallet address of the requester. The rest of the stack is fixed
//! for now and recorded for display.

use serde::{Deserialize, Serialize};

use crate::chain::{self, ChainId};
use crate::error::ErrorKind;

/// Chain id pre-filled on a fresh form.
pub const DEFAULT_CHAIN_ID: ChainId = 39713;
/// Block gas limit pre-filled on a fresh form.
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 60_000_000;
/// Withdrawal challenge period, in blocks, pre-filled on a fresh form.
pub const DEFAULT_WITHDRAW_PERIOD: u64 = 600;

/// Account type the chain is deployed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Organization {
    /// Personal account.
    Personal,
    /// Company account.
    Company,
}

/// Rollup framework.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    /// Arbitrum Orbit (L3 on Arbitrum).
    #[default]
    ArbitrumOrbit,
}

/// Parent chain the rollup settles to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementLayer {
    /// Arbitrum One.
    #[default]
    ArbitrumOne,
}

/// Where transaction data is published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataAvailability {
    /// Data availability committee.
    #[default]
    Anytrust,
}

/// Target environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test network.
    #[default]
    Testnet,
    /// Production network.
    Mainnet,
}

/// Everything entered on the create screen.
///
/// `chain_id` is kept as the raw text the operator typed; it is only parsed
/// when building a [`DeployRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentForm {
    /// Owning account type, once chosen.
    pub organization: Option<Organization>,
    /// Display name of the rollup.
    pub rollup_name: String,
    /// Chain id as typed.
    pub chain_id: String,
    /// Rollup framework.
    pub framework: Framework,
    /// Settlement layer.
    pub settlement_layer: SettlementLayer,
    /// Data availability mode.
    pub data_availability: DataAvailability,
    /// Target environment.
    pub environment: Environment,
    /// Whether the chain uses a custom gas token.
    pub custom_gas_token: bool,
    /// Block gas limit.
    pub block_gas_limit: u64,
    /// Withdrawal challenge period, in blocks.
    pub withdraw_period: u64,
    /// Whether to enroll the chain with the automation service.
    pub automation_enabled: bool,
}

impl Default for DeploymentForm {
    fn default() -> Self {
        Self {
            organization: None,
            rollup_name: String::new(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            framework: Framework::default(),
            settlement_layer: SettlementLayer::default(),
            data_availability: DataAvailability::default(),
            environment: Environment::default(),
            custom_gas_token: false,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            withdraw_period: DEFAULT_WITHDRAW_PERIOD,
            automation_enabled: false,
        }
    }
}

/// Local validation failures. Nothing is sent when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No wallet is connected.
    #[error("connect a wallet before deploying")]
    MissingWallet,
    /// The chain id field is not a base-10 integer.
    #[error("chain id must be a number, got '{0}'")]
    InvalidChainId(String),
}

impl ValidationError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Body of a deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Requested chain id.
    pub chain_id: ChainId,
    /// Rollup display name.
    pub chain_name: String,
    /// Wallet address of the requester.
    pub user_address: String,
}

impl DeploymentForm {
    /// Creates a form with the default stack.
    #[must_use]
    pub fn new(rollup_name: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            rollup_name: rollup_name.into(),
            chain_id: chain_id.into(),
            ..Self::default()
        }
    }

    /// Validates the form against the connected wallet and builds the wire
    /// request.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingWallet`] if `wallet_address` is absent or
    /// blank, checked first; [`ValidationError::InvalidChainId`] if the chain
    /// id is not a base-10 integer.
    pub fn to_request(&self, wallet_address: Option<&str>) -> Result<DeployRequest, ValidationError> {
        let user_address = wallet_address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(ValidationError::MissingWallet)?;
        let chain_id = chain::parse_decimal(&self.chain_id)
            .map_err(|_| ValidationError::InvalidChainId(self.chain_id.trim().to_owned()))?;
        Ok(DeployRequest {
            chain_id,
            chain_name: self.rollup_name.trim().to_owned(),
            user_address: user_address.to_owned(),
        })
    }
}
