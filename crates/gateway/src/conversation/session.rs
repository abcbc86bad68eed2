//! Cross-turn session state: the tracking most recently discussed.
//!
//! The transport carries an opaque key-value payload between turns.  Only
//! two string keys are used, `company` and `number`; conversion happens
//! here and nowhere else.

use serde_json::{Map, Value};
use tk_domain::tracking::TrackingKey;

pub const KEY_COMPANY: &str = "company";
pub const KEY_NUMBER: &str = "number";

pub type SessionPayload = Map<String, Value>;

/// The `(company, number)` pair awaiting an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    pub company: String,
    pub number: String,
}

impl ConversationSession {
    pub fn new(company: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            number: number.into(),
        }
    }

    /// Present only when both keys hold non-empty strings.
    pub fn from_payload(payload: &SessionPayload) -> Option<Self> {
        let company = non_empty_str(payload, KEY_COMPANY)?;
        let number = non_empty_str(payload, KEY_NUMBER)?;
        Some(Self::new(company, number))
    }

    pub fn to_payload(&self) -> SessionPayload {
        let mut payload = Map::new();
        payload.insert(KEY_COMPANY.into(), Value::String(self.company.clone()));
        payload.insert(KEY_NUMBER.into(), Value::String(self.number.clone()));
        payload
    }

    pub fn key(&self) -> TrackingKey {
        TrackingKey::new(self.company.clone(), self.number.clone())
    }
}

fn non_empty_str<'a>(payload: &'a SessionPayload, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
