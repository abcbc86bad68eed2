//! Tracking record model and the composite sort key.
//!
//! Every tracking number a user registers is stored under the user's id
//! (partition key) and a composite sort key `"<carrier>_<number>"`.  The
//! carrier comes first so that all numbers for one user-carrier pair sit
//! next to each other and can be listed with a prefix query.
//!
//! The delimiter is not escaped.  Carrier and number must not contain `_`
//! or prefix queries become ambiguous; decoding always splits on the
//! first occurrence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between carrier and number inside a composite key.
pub const KEY_DELIMITER: char = '_';

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Composite key
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A decoded `(carrier, number)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingKey {
    pub carrier: String,
    pub number: String,
}

impl TrackingKey {
    pub fn new(carrier: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            carrier: carrier.into(),
            number: number.into(),
        }
    }

    /// Build the sort-key string `"<carrier>_<number>"`.
    pub fn encode(&self) -> String {
        encode_key(&self.carrier, &self.number)
    }

    /// Split a stored sort key back into carrier and number.
    pub fn decode(composite: &str) -> Result<Self> {
        let (carrier, number) = decode_key(composite)?;
        Ok(Self { carrier, number })
    }
}

impl fmt::Display for TrackingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_DELIMITER}{}", self.carrier, self.number)
    }
}

pub fn encode_key(carrier: &str, number: &str) -> String {
    format!("{carrier}{KEY_DELIMITER}{number}")
}

/// Split on the first delimiter.  Fails when the delimiter is absent.
pub fn decode_key(composite: &str) -> Result<(String, String)> {
    match composite.split_once(KEY_DELIMITER) {
        Some((carrier, number)) => Ok((carrier.to_owned(), number.to_owned())),
        None => Err(Error::InvalidKey(format!(
            "{composite:?} has no {KEY_DELIMITER:?} delimiter"
        ))),
    }
}

/// Sort-key prefix matching every number registered under `carrier`.
pub fn carrier_prefix(carrier: &str) -> String {
    format!("{carrier}{KEY_DELIMITER}")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completion flag
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Persisted marker separating open trackings from delivered ones.
/// Stored as `"0"` / `"1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompletionFlag {
    #[default]
    #[serde(rename = "0")]
    Pending,
    #[serde(rename = "1")]
    Delivered,
}

impl CompletionFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "0",
            Self::Delivered => "1",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "0" => Some(Self::Pending),
            "1" => Some(Self::Delivered),
            _ => None,
        }
    }

    pub fn is_delivered(self) -> bool {
        self == Self::Delivered
    }
}

impl fmt::Display for CompletionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tracking record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One tracking number registered by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// Opaque platform user identifier (partition key).
    pub user_id: String,
    /// `"<carrier>_<number>"` (sort key).
    pub sort_key: String,
    pub flag: CompletionFlag,
    /// User-assigned display name.  Empty means unset.
    #[serde(default)]
    pub alias: String,
    /// Write-time date stamp, informational only.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TrackingRecord {
    pub fn key(&self) -> Result<TrackingKey> {
        TrackingKey::decode(&self.sort_key)
    }

    pub fn alias(&self) -> Option<&str> {
        if self.alias.is_empty() {
            None
        } else {
            Some(&self.alias)
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.flag.is_delivered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_joins_with_underscore() {
        assert_eq!(encode_key("yamato", "1234567890"), "yamato_1234567890");
        assert_eq!(TrackingKey::new("sagawa", "42").encode(), "sagawa_42");
    }

    #[test]
    fn decode_recovers_pair() {
        let key = TrackingKey::decode("yamato_1234567890").unwrap();
        assert_eq!(key, TrackingKey::new("yamato", "1234567890"));
        assert_eq!(key.to_string(), "yamato_1234567890");
    }

    #[test]
    fn decode_splits_on_first_delimiter() {
        let (carrier, number) = decode_key("japanpost_12_34").unwrap();
        assert_eq!(carrier, "japanpost");
        assert_eq!(number, "12_34");
    }

    #[test]
    fn decode_without_delimiter_fails() {
        let err = decode_key("yamato1234").unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }

    #[test]
    fn carrier_prefix_includes_delimiter() {
        assert_eq!(carrier_prefix("yamato"), "yamato_");
        assert!(encode_key("yamato", "1").starts_with(&carrier_prefix("yamato")));
        assert!(!encode_key("yamatox", "1").starts_with(&carrier_prefix("yamato")));
    }

    #[test]
    fn flag_wire_values() {
        assert_eq!(CompletionFlag::Pending.as_str(), "0");
        assert_eq!(CompletionFlag::Delivered.as_str(), "1");
        assert_eq!(CompletionFlag::parse("1"), Some(CompletionFlag::Delivered));
        assert_eq!(CompletionFlag::parse("2"), None);
        assert_eq!(
            serde_json::to_string(&CompletionFlag::Delivered).unwrap(),
            "\"1\""
        );
    }

    #[test]
    fn empty_alias_is_unset() {
        let mut record = TrackingRecord {
            user_id: "u1".into(),
            sort_key: "yamato_1".into(),
            flag: CompletionFlag::Pending,
            alias: String::new(),
            updated_at: None,
        };
        assert_eq!(record.alias(), None);
        record.alias = "Mom's gift".into();
        assert_eq!(record.alias(), Some("Mom's gift"));
    }
}
