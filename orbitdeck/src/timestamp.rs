//! Timestamps attached to registry records.
//!
//! The registry has stored creation and update times in several shapes over
//! its lifetime: RFC 3339 strings, bare `YYYY-MM-DD` dates, and Unix epoch
//! numbers in either seconds or milliseconds. [`RecordTimestamp`] accepts all
//! of them and normalizes to UTC.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Epoch values above this are treated as milliseconds (year 2286 in seconds).
const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// A point in time on a chain record, normalized to UTC.
///
/// # Serialization
///
/// Serialized as an RFC 3339 string. Deserialization accepts every form
/// [`RecordTimestamp::parse_str`] and [`RecordTimestamp::from_epoch`] do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordTimestamp(DateTime<Utc>);

impl RecordTimestamp {
    /// Parses a textual timestamp.
    ///
    /// Accepts RFC 3339 (`2024-01-15T10:00:00Z`), a naive `YYYY-MM-DD HH:MM:SS`
    /// or `YYYY-MM-DDTHH:MM:SS` taken as UTC, a bare `YYYY-MM-DD` date taken as
    /// midnight UTC, and a string of digits taken as an epoch value.
    #[must_use]
    pub fn parse_str(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            return Some(Self(at.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Self(Utc.from_utc_datetime(&naive)));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|naive| Self(Utc.from_utc_datetime(&naive)));
        }
        s.parse::<i64>().ok().and_then(Self::from_epoch)
    }

    /// Interprets a Unix epoch number, in seconds or milliseconds.
    ///
    /// Returns `None` for values chrono cannot represent.
    #[must_use]
    pub fn from_epoch(value: i64) -> Option<Self> {
        let at = if value.unsigned_abs() >= MILLIS_THRESHOLD.unsigned_abs() {
            DateTime::from_timestamp_millis(value)
        } else {
            DateTime::from_timestamp(value, 0)
        };
        at.map(Self)
    }

    /// Reads a timestamp out of an arbitrary JSON value.
    ///
    /// Returns `None` for `null`, booleans, objects, arrays, and strings that
    /// match no supported form.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse_str(s),
            serde_json::Value::Number(n) => n.as_i64().and_then(Self::from_epoch),
            _ => None,
        }
    }

    /// Returns seconds since the Unix epoch.
    #[must_use]
    pub fn as_secs(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Display for RecordTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}

impl Serialize for RecordTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for RecordTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("unrecognized timestamp format"))
    }
}
