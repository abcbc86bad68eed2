//! ConversationRouter: one user turn in, one spoken reply out.
//!
//! Every path yields a reply.  Store reads that fail degrade to "nothing
//! stored"; a failed write turns into an apology.  The carrier is called
//! at most once per tracking number per turn, strictly in sequence.

use std::sync::Arc;

use chrono::Utc;
use tk_carrier::CarrierLookup;
use tk_domain::config::ConversationConfig;
use tk_domain::trace::TraceEvent;
use tk_domain::tracking::{encode_key, CompletionFlag, TrackingKey};
use tk_store::TrackingStore;

use super::envelope::{SkillRequest, SkillResponse, REQUEST_INTENT, REQUEST_LAUNCH};
use super::reconciler::{reconcile, Posture, WriteDecision};
use super::session::ConversationSession;
use super::slots::{read_tracking_slots, slot_value, Intent, Slots, TrackingSlots, SLOT_ALIAS};
use super::speech;

const FALLBACK_GREETING: &str = "宅配こです";

/// Reply to one turn.  `session` is the state to hand back to the
/// transport; `None` clears whatever it was holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResponse {
    pub speech: String,
    pub should_end_session: bool,
    pub card_title: String,
    pub card_text: String,
    pub session: Option<ConversationSession>,
}

impl TurnResponse {
    /// Card text mirrors the speech.
    pub fn new(card_title: &str, speech: impl Into<String>, should_end_session: bool) -> Self {
        let speech = speech.into();
        Self {
            card_text: speech.clone(),
            speech,
            should_end_session,
            card_title: card_title.to_owned(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: ConversationSession) -> Self {
        self.session = Some(session);
        self
    }
}

pub struct ConversationRouter {
    store: TrackingStore,
    carrier: Arc<dyn CarrierLookup>,
    config: ConversationConfig,
}

impl ConversationRouter {
    pub fn new(
        store: TrackingStore,
        carrier: Arc<dyn CarrierLookup>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            store,
            carrier,
            config,
        }
    }

    pub fn store(&self) -> &TrackingStore {
        &self.store
    }

    /// Dispatch a full skill request by its request type.
    pub async fn handle_request(&self, req: &SkillRequest) -> SkillResponse {
        let turn = match req.request_type.as_str() {
            REQUEST_LAUNCH => self.greeting(),
            REQUEST_INTENT => {
                let session = ConversationSession::from_payload(&req.session_attributes);
                let intent = req.intent.as_deref().unwrap_or_default();
                self.handle(intent, &req.slots, &req.user_id, session).await
            }
            other => {
                tracing::warn!(request_type = %other, "unhandled request type");
                TurnResponse::new(speech::CARD_UNKNOWN_REQUEST, speech::unknown_request(other), true)
            }
        };
        turn.into()
    }

    /// Route one intent.
    pub async fn handle(
        &self,
        intent_name: &str,
        slots: &Slots,
        user_id: &str,
        session: Option<ConversationSession>,
    ) -> TurnResponse {
        let turn = match Intent::parse(intent_name) {
            Intent::TrackingRequest => self.handle_tracking(slots, user_id).await,
            Intent::SetAlias => self.handle_set_alias(slots, user_id, session).await,
            Intent::ListAll => self.handle_list_all(user_id).await,
            Intent::Help => TurnResponse::new(speech::CARD_TRACKING_HELP, speech::TRACKING_HELP, false),
            Intent::Unknown => TurnResponse::new(speech::CARD_HELP, speech::HELP, false),
        };

        TraceEvent::IntentHandled {
            user_id: user_id.to_owned(),
            intent: intent_name.to_owned(),
            should_end_session: turn.should_end_session,
            session_opened: turn.session.is_some(),
        }
        .emit();
        turn
    }

    fn greeting(&self) -> TurnResponse {
        let greetings = &self.config.greetings;
        let text = if greetings.is_empty() {
            FALLBACK_GREETING
        } else {
            let pick = Utc::now().timestamp_subsec_nanos() as usize % greetings.len();
            greetings[pick].as_str()
        };
        TurnResponse::new(speech::CARD_GREETING, text, false)
    }

    // ── Tracking request ──────────────────────────────────────────

    async fn handle_tracking(&self, slots: &Slots, user_id: &str) -> TurnResponse {
        let (company, number) = match read_tracking_slots(slots) {
            TrackingSlots::Complete { company, number } => (company, number),
            TrackingSlots::Misheard => {
                return TurnResponse::new(speech::CARD_TRACKING, speech::MISHEARD_NUMBER, false)
            }
            TrackingSlots::Incomplete => {
                return TurnResponse::new(speech::CARD_TRACKING, speech::NOT_UNDERSTOOD, false)
            }
        };

        let sort_key = encode_key(&company, &number);
        let prior = self.store.get(user_id, &sort_key).await.into_value();
        let result = self.carrier.lookup(&company, &number).await;
        let decision = reconcile(&result, prior.as_ref());

        if let WriteDecision::Put { flag, alias } = &decision.write {
            if self.store.put(user_id, &sort_key, *flag, alias).await.is_err() {
                return TurnResponse::new(speech::CARD_TRACKING, speech::WRITE_FAILED, false);
            }
        }

        let turn = match decision.posture {
            Posture::Delivered | Posture::AlreadyDelivered => {
                TurnResponse::new(speech::CARD_TRACKING, speech::DELIVERED, true)
            }
            Posture::InTransit => {
                TurnResponse::new(speech::CARD_TRACKING, speech::in_transit(&result.status), false)
            }
            Posture::NotRegistered => {
                TurnResponse::new(speech::CARD_TRACKING, speech::not_registered(), false)
            }
            Posture::InvalidNumber => {
                TurnResponse::new(speech::CARD_TRACKING, speech::invalid_number(&number), false)
            }
        };

        if decision.opens_session {
            turn.with_session(ConversationSession::new(company, number))
        } else {
            turn
        }
    }

    // ── Alias assignment ──────────────────────────────────────────

    async fn handle_set_alias(
        &self,
        slots: &Slots,
        user_id: &str,
        session: Option<ConversationSession>,
    ) -> TurnResponse {
        let Some(session) = session else {
            return TurnResponse::new(speech::CARD_TRACKING, speech::NO_TRACKING_IN_SESSION, false);
        };

        let alias = slot_value(slots, SLOT_ALIAS);
        if alias.is_empty() {
            return TurnResponse::new(speech::CARD_TRACKING, speech::NOT_UNDERSTOOD, false)
                .with_session(session);
        }

        // The session may predate a delivery recorded by another turn;
        // naming a parcel never reopens it.
        let sort_key = session.key().encode();
        let flag = match self.store.get(user_id, &sort_key).await.into_value() {
            Some(record) if record.flag == CompletionFlag::Delivered => CompletionFlag::Delivered,
            _ => CompletionFlag::Pending,
        };
        match self.store.put(user_id, &sort_key, flag, alias).await {
            Ok(()) => TurnResponse::new(speech::CARD_TRACKING, speech::ALIAS_SAVED, true),
            Err(_) => TurnResponse::new(speech::CARD_TRACKING, speech::WRITE_FAILED, false),
        }
    }

    // ── List all ──────────────────────────────────────────────────

    async fn handle_list_all(&self, user_id: &str) -> TurnResponse {
        let pending = self.store.query_all_pending(user_id).await.into_value();

        let mut lines = Vec::with_capacity(pending.len());
        for record in &pending {
            let TrackingKey { carrier, number } = match record.key() {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        sort_key = %record.sort_key,
                        error = %e,
                        "skipping undecodable tracking key"
                    );
                    continue;
                }
            };

            let result = self.carrier.lookup(&carrier, &number).await;
            let decision = reconcile(&result, Some(record));
            if let WriteDecision::Put { flag, alias } = &decision.write {
                if let Err(e) = self.store.put(user_id, &record.sort_key, *flag, alias).await {
                    tracing::warn!(
                        user_id = %user_id,
                        sort_key = %record.sort_key,
                        error = %e,
                        "list-all write-back failed"
                    );
                }
            }

            if decision.posture == Posture::Delivered && self.config.exclude_delivered_from_listing {
                continue;
            }

            let name = match record.alias() {
                Some(alias) => alias.to_owned(),
                None => speech::spoken_digits(&number),
            };
            lines.push((carrier, name, result.status));
        }

        let mut text = speech::list_header(lines.len());
        for (i, (carrier, name, status)) in lines.iter().enumerate() {
            text.push_str(&speech::list_line(i + 1, carrier, name, status));
        }
        TurnResponse::new(speech::CARD_ALL_TRACKING, text, true)
    }
}
