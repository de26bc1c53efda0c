use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// One subscriber entry from the remote user directory
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    #[serde(default, deserialize_with = "deserialize_expire_date")]
    pub expire_date: Option<String>,
}

/// `expire_date` arrives as a date string or as bare unix seconds
fn deserialize_expire_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

impl UserRecord {
    /// Expiry as an absolute instant, `None` when absent or unreadable
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expire_date.as_deref().and_then(parse_expiry)
    }
}

/// Remote user directory.
///
/// Upstream publishes either an object keyed by arbitrary ids or a plain
/// array; both become an ordered list (object entries in key order).
/// Entries that are not user records are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawDirectory {
    Keyed(BTreeMap<String, Value>),
    List(Vec<Value>),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "RawDirectory")]
pub struct UserDirectory {
    pub users: Vec<UserRecord>,
}

impl From<RawDirectory> for UserDirectory {
    fn from(raw: RawDirectory) -> Self {
        let entries: Vec<Value> = match raw {
            RawDirectory::Keyed(map) => map.into_values().collect(),
            RawDirectory::List(list) => list,
        };

        let users = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(index, "Skipping malformed directory entry: {}", e);
                    None
                }
            })
            .collect();
        Self { users }
    }
}

/// Outcome of a credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Granted { expiry: Option<DateTime<Utc>> },
    Expired { expiry: DateTime<Utc> },
    Rejected,
}

impl AuthResult {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthResult::Granted { .. } => StatusCode::OK,
            AuthResult::Expired { .. } => StatusCode::PAYMENT_REQUIRED,
            AuthResult::Rejected => StatusCode::FORBIDDEN,
        }
    }
}

/// Parse an `expire_date` value.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD` (both UTC),
/// or unix seconds.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }

    raw.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}
