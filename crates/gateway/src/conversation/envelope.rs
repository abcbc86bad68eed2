//! Wire shapes of the skill endpoint.

use serde::{Deserialize, Serialize};

use super::router::TurnResponse;
use super::session::SessionPayload;
use super::slots::Slots;

pub const REQUEST_LAUNCH: &str = "LaunchRequest";
pub const REQUEST_INTENT: &str = "IntentRequest";
pub const RESPONSE_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRequest {
    #[serde(default = "d_request_type")]
    pub request_type: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub slots: Slots,
    pub user_id: String,
    #[serde(default)]
    pub session_attributes: SessionPayload,
}

fn d_request_type() -> String {
    REQUEST_INTENT.into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResponse {
    pub version: String,
    pub speech: String,
    pub card: Card,
    pub should_end_session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<SessionPayload>,
}

impl From<TurnResponse> for SkillResponse {
    fn from(turn: TurnResponse) -> Self {
        Self {
            version: RESPONSE_VERSION.into(),
            speech: turn.speech,
            card: Card {
                title: turn.card_title,
                content: turn.card_text,
            },
            should_end_session: turn.should_end_session,
            session_attributes: turn.session.map(|s| s.to_payload()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::session::ConversationSession;

    #[test]
    fn request_defaults_to_intent_request() {
        let req: SkillRequest = serde_json::from_str(r#"{"user_id":"u1"}"#).unwrap();
        assert_eq!(req.request_type, REQUEST_INTENT);
        assert!(req.intent.is_none());
        assert!(req.slots.is_empty());
        assert!(req.session_attributes.is_empty());
    }

    #[test]
    fn closed_session_omits_attributes() {
        let resp = SkillResponse::from(TurnResponse::new("tracking", "done", true));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["card"]["content"], "done");
        assert!(json.get("session_attributes").is_none());
    }

    #[test]
    fn open_session_carries_company_and_number() {
        let turn = TurnResponse::new("tracking", "ok", false)
            .with_session(ConversationSession::new("yamato", "1"));
        let json = serde_json::to_value(SkillResponse::from(turn)).unwrap();
        assert_eq!(json["session_attributes"]["company"], "yamato");
        assert_eq!(json["session_attributes"]["number"], "1");
    }
}
