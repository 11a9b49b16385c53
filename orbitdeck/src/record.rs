//! Canonical chain records and normalization of registry payloads.
//!
//! The registry API has returned deployment records in several shapes: the
//! current snake_case schema, camelCase fields from an earlier frontend
//! contract, and a handful of renamed keys (`user_address` for the owner,
//! `deployed_at` for the creation time). All of that is resolved here, in one
//! place, through the [`ALIAS_TABLE`]. Code downstream of [`normalize`] only
//! ever sees [`ChainRecord`].
//!
//! # Precedence
//!
//! For every field the canonical key is read first. A legacy alias is only
//! consulted when the canonical key is missing, `null`, or holds a value of the
//! wrong shape. Each alias belongs to exactly one canonical field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chain::{self, ChainId};
use crate::error::ErrorKind;
use crate::timestamp::RecordTimestamp;

/// Placeholder shown when a record carries no usable chain id.
pub const MISSING_CHAIN_ID: &str = "N/A";

/// Envelope key under which the registry may wrap its record list.
pub const ENVELOPE_KEY: &str = "chains";

/// Lifecycle state of a deployed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainStatus {
    /// Sequencer running, accepting transactions.
    Active,
    /// Operator paused the chain.
    Paused,
    /// Deployment job still in progress.
    Deploying,
    /// Missing or unrecognized status.
    #[default]
    Unknown,
}

impl ChainStatus {
    /// Parses a status label case-insensitively; anything unrecognized is
    /// [`ChainStatus::Unknown`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "paused" => Self::Paused,
            "deploying" => Self::Deploying,
            _ => Self::Unknown,
        }
    }

    /// Lowercase label as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Deploying => "deploying",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployed chain in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRecord {
    /// EIP-155 chain id, if the record carried a usable one.
    pub chain_id: Option<ChainId>,
    /// Display name of the rollup. Empty when the record had none.
    pub chain_name: String,
    /// Public RPC endpoint.
    pub rpc_url: Option<String>,
    /// Wallet address that requested the deployment. Empty when unknown.
    pub owner_address: String,
    /// Lifecycle state.
    pub status: ChainStatus,
    /// Address of the Orbit rollup contract on the parent chain.
    pub orbit_contract_address: Option<String>,
    /// When the deployment was created.
    pub created_at: Option<RecordTimestamp>,
    /// When the record last changed.
    pub updated_at: Option<RecordTimestamp>,
}

impl ChainRecord {
    /// Creates a record with the required fields; everything else is absent.
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        chain_name: impl Into<String>,
        owner_address: impl Into<String>,
        status: ChainStatus,
    ) -> Self {
        Self {
            chain_id: Some(chain_id),
            chain_name: chain_name.into(),
            rpc_url: None,
            owner_address: owner_address.into(),
            status,
            orbit_contract_address: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Chain id as shown to users: the decimal id, or `"N/A"`.
    #[must_use]
    pub fn display_chain_id(&self) -> String {
        self.chain_id
            .map_or_else(|| MISSING_CHAIN_ID.to_owned(), |id| id.to_string())
    }
}

/// A canonical field and the legacy keys that may stand in for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKeys {
    /// Current snake_case key.
    pub canonical: &'static str,
    /// Legacy keys, consulted in order when the canonical key is unusable.
    pub aliases: &'static [&'static str],
}

impl FieldKeys {
    /// Returns the first usable value, canonical key first.
    fn resolve<T>(&self, obj: &Map<String, Value>, read: impl Fn(&Value) -> Option<T>) -> Option<T> {
        std::iter::once(self.canonical)
            .chain(self.aliases.iter().copied())
            .filter_map(|key| obj.get(key))
            .find_map(read)
    }
}

/// Keys for [`ChainRecord::chain_id`].
pub const CHAIN_ID: FieldKeys = FieldKeys {
    canonical: "chain_id",
    aliases: &["chainId"],
};
/// Keys for [`ChainRecord::chain_name`].
pub const CHAIN_NAME: FieldKeys = FieldKeys {
    canonical: "chain_name",
    aliases: &["chainName", "name", "rollup_name", "rollupName"],
};
/// Keys for [`ChainRecord::rpc_url`].
pub const RPC_URL: FieldKeys = FieldKeys {
    canonical: "rpc_url",
    aliases: &["rpcUrl", "rpc"],
};
/// Keys for [`ChainRecord::owner_address`].
pub const OWNER_ADDRESS: FieldKeys = FieldKeys {
    canonical: "owner_address",
    aliases: &["ownerAddress", "user_address", "userAddress"],
};
/// Keys for [`ChainRecord::status`].
pub const STATUS: FieldKeys = FieldKeys {
    canonical: "status",
    aliases: &["state"],
};
/// Keys for [`ChainRecord::orbit_contract_address`].
pub const ORBIT_CONTRACT_ADDRESS: FieldKeys = FieldKeys {
    canonical: "orbit_contract_address",
    aliases: &["orbitContractAddress", "rollup_address", "rollupAddress"],
};
/// Keys for [`ChainRecord::created_at`].
pub const CREATED_AT: FieldKeys = FieldKeys {
    canonical: "created_at",
    aliases: &["createdAt", "deployed_at", "deployedAt"],
};
/// Keys for [`ChainRecord::updated_at`].
pub const UPDATED_AT: FieldKeys = FieldKeys {
    canonical: "updated_at",
    aliases: &["updatedAt"],
};

/// Every canonical field with its legacy aliases.
pub const ALIAS_TABLE: &[FieldKeys] = &[
    CHAIN_ID,
    CHAIN_NAME,
    RPC_URL,
    OWNER_ADDRESS,
    STATUS,
    ORBIT_CONTRACT_ADDRESS,
    CREATED_AT,
    UPDATED_AT,
];

fn read_chain_id(value: &Value) -> Option<ChainId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => chain::parse_any(s).ok(),
        _ => None,
    }
}

fn read_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_status(value: &Value) -> Option<ChainStatus> {
    value.as_str().map(ChainStatus::from_label)
}

/// Maps one raw registry object onto the canonical schema.
///
/// Never fails: missing optional fields stay `None`, a missing name or owner
/// becomes an empty string, and a missing status is [`ChainStatus::Unknown`].
#[must_use]
pub fn normalize(raw: &Map<String, Value>) -> ChainRecord {
    ChainRecord {
        chain_id: CHAIN_ID.resolve(raw, read_chain_id),
        chain_name: CHAIN_NAME.resolve(raw, read_text).unwrap_or_default(),
        rpc_url: RPC_URL.resolve(raw, read_text),
        owner_address: OWNER_ADDRESS.resolve(raw, read_text).unwrap_or_default(),
        status: STATUS.resolve(raw, read_status).unwrap_or_default(),
        orbit_contract_address: ORBIT_CONTRACT_ADDRESS.resolve(raw, read_text),
        created_at: CREATED_AT.resolve(raw, RecordTimestamp::from_json),
        updated_at: UPDATED_AT.resolve(raw, RecordTimestamp::from_json),
    }
}

/// A registry payload whose top-level shape is not a record list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a list or an object with a 'chains' list, got {found}")]
pub struct MalformedPayload {
    /// Short description of what was received.
    pub found: &'static str,
}

impl MalformedPayload {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedResponse
    }
}

const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Extracts and normalizes records from a registry response body.
///
/// Accepts a bare list or an object holding the list under
/// [`ENVELOPE_KEY`]. List entries that are not objects are skipped.
///
/// # Errors
///
/// Returns [`MalformedPayload`] for any other top-level shape, including an
/// envelope whose `chains` member is not a list.
pub fn parse_payload(body: &Value) -> Result<Vec<ChainRecord>, MalformedPayload> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get(ENVELOPE_KEY) {
            Some(Value::Array(items)) => items,
            Some(other) => return Err(MalformedPayload { found: describe(other) }),
            None => return Err(MalformedPayload { found: "an object without a chains list" }),
        },
        other => return Err(MalformedPayload { found: describe(other) }),
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object();
            #[cfg(feature = "telemetry")]
            if obj.is_none() {
                tracing::warn!(entry = describe(item), "Skipping non-object registry entry");
            }
            obj.map(normalize)
        })
        .collect())
}

/// Sample deployments shown when the registry cannot be reached.
#[must_use]
pub fn fallback_records() -> Vec<ChainRecord> {
    let sample = |id, name: &str, status, deployed: &str| ChainRecord {
        created_at: RecordTimestamp::parse_str(deployed),
        ..ChainRecord::new(id, name, "", status)
    };
    vec![
        sample(39713, "Zora Network", ChainStatus::Active, "2024-01-15"),
        sample(42161, "Gaming Chain", ChainStatus::Active, "2024-02-01"),
        sample(10, "DeFi Protocol", ChainStatus::Paused, "2024-01-28"),
    ]
}

/// Per-status counts for the dashboard overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// Number of records.
    pub total: usize,
    /// Records with [`ChainStatus::Active`].
    pub active: usize,
    /// Records with [`ChainStatus::Paused`].
    pub paused: usize,
    /// Records with [`ChainStatus::Deploying`].
    pub deploying: usize,
    /// Records with [`ChainStatus::Unknown`].
    pub unknown: usize,
}

/// Counts records by status.
#[must_use]
pub fn summarize(records: &[ChainRecord]) -> StatusSummary {
    records.iter().fold(StatusSummary::default(), |mut acc, record| {
        acc.total += 1;
        match record.status {
            ChainStatus::Active => acc.active += 1,
            ChainStatus::Paused => acc.paused += 1,
            ChainStatus::Deploying => acc.deploying += 1,
            ChainStatus::Unknown => acc.unknown += 1,
        }
        acc
    })
}
