use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerChatError;

/// Database time format. Lexicographic order of this text form matches
/// chronological order, which is what the server relies on.
const DB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A UTC instant with millisecond precision.
///
/// Serialized in the database time format (`2024-05-01 12:30:00.250`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }

    /// Build from Unix milliseconds. Out-of-range values clamp to the
    /// earliest representable instant.
    pub fn from_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// The instant `millis` milliseconds earlier (saturating).
    pub fn minus_millis(&self, millis: i64) -> Self {
        self.0
            .checked_sub_signed(chrono::Duration::milliseconds(millis))
            .map(Self)
            .unwrap_or(*self)
    }

    pub fn to_db_string(&self) -> String {
        self.0.format(DB_TIME_FORMAT).to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_millis(value.timestamp_millis())
    }
}

impl FromStr for Timestamp {
    type Err = LedgerChatError;

    /// Accepts the database format with or without a fractional part, and
    /// RFC 3339 as sent by some push payloads.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(naive.and_utc().into());
            }
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc).into())
            .map_err(|_| LedgerChatError::InvalidTimestamp {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Timestamp {
    type Error = LedgerChatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_db_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
