//! The conversational core: slots in, reconciled store writes and speech out.

pub mod envelope;
pub mod reconciler;
pub mod router;
pub mod session;
pub mod slots;
pub mod speech;

pub use envelope::{Card, SkillRequest, SkillResponse};
pub use reconciler::{reconcile, Posture, Reconciliation, WriteDecision};
pub use router::{ConversationRouter, TurnResponse};
pub use session::{ConversationSession, SessionPayload};
pub use slots::{Intent, Slot, Slots};
