//! Intent and slot vocabulary of the voice model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const INTENT_TRACKING: &str = "TrackingRequestIntent";
pub const INTENT_SET_ALIAS: &str = "SetAliasIntent";
pub const INTENT_LIST_ALL: &str = "getAllTrackingIntent";
pub const INTENT_HELP: &str = "AMAZON.HelpIntent";

pub const SLOT_COMPANY: &str = "trackingCompany";
pub const SLOT_NUMBER_PARTS: [&str; 4] = [
    "trackingNumberOne",
    "trackingNumberTwo",
    "trackingNumberThree",
    "trackingNumberFour",
];
pub const SLOT_ALIAS: &str = "tackingAlias";

/// Marker the speech recognizer leaves for a digit it could not resolve.
pub const UNRESOLVED_MARKER: char = '?';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    TrackingRequest,
    SetAlias,
    ListAll,
    Help,
    Unknown,
}

impl Intent {
    pub fn parse(name: &str) -> Self {
        match name {
            INTENT_TRACKING => Self::TrackingRequest,
            INTENT_SET_ALIAS => Self::SetAlias,
            INTENT_LIST_ALL => Self::ListAll,
            INTENT_HELP => Self::Help,
            _ => Self::Unknown,
        }
    }
}

/// One filled slot: the raw utterance plus entity-resolution candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolutions: Vec<String>,
}

impl Slot {
    pub fn raw(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            resolutions: Vec::new(),
        }
    }

    pub fn resolved_to(mut self, canonical: impl Into<String>) -> Self {
        self.resolutions.push(canonical.into());
        self
    }

    /// First resolution when the model produced one, otherwise the raw value.
    pub fn resolved(&self) -> &str {
        self.resolutions
            .first()
            .map(String::as_str)
            .unwrap_or(self.value.as_str())
    }
}

pub type Slots = BTreeMap<String, Slot>;

pub(crate) fn slot_value<'a>(slots: &'a Slots, name: &str) -> &'a str {
    slots.get(name).map(|s| s.value.trim()).unwrap_or("")
}

pub(crate) fn slot_resolved<'a>(slots: &'a Slots, name: &str) -> &'a str {
    slots.get(name).map(|s| s.resolved().trim()).unwrap_or("")
}

/// What the tracking-request slots amount to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingSlots {
    Complete { company: String, number: String },
    /// A digit group came back with an unresolved marker.
    Misheard,
    /// Company or a digit group is missing, or a value cannot form a key.
    Incomplete,
}

pub fn read_tracking_slots(slots: &Slots) -> TrackingSlots {
    let parts: Vec<&str> = SLOT_NUMBER_PARTS
        .iter()
        .map(|name| slot_value(slots, name))
        .collect();

    if parts.iter().any(|p| p.contains(UNRESOLVED_MARKER)) {
        return TrackingSlots::Misheard;
    }

    let company = slot_resolved(slots, SLOT_COMPANY);
    if company.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return TrackingSlots::Incomplete;
    }

    let number = parts.concat();
    if company.contains(tk_domain::tracking::KEY_DELIMITER)
        || number.contains(tk_domain::tracking::KEY_DELIMITER)
    {
        return TrackingSlots::Incomplete;
    }

    TrackingSlots::Complete {
        company: company.to_owned(),
        number,
    }
}
