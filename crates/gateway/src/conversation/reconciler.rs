//! Status reconciliation: what to persist after one carrier lookup.
//!
//! | lookup                         | persisted flag     | session |
//! |--------------------------------|--------------------|---------|
//! | success, `配達完了`            | Delivered (write)  | closed  |
//! | success, any other status      | Pending (write)    | opened  |
//! | failure, `伝票番号誤り`        | no write           | closed  |
//! | failure, anything else         | Pending (write)    | opened  |
//!
//! "Anything else" on failure covers `伝票番号未登録`, unknown statuses and
//! transport faults: all read as a number the carrier has not indexed yet.
//!
//! Delivered is terminal.  When the stored record is already delivered,
//! a non-delivered lookup leaves it untouched and opens no session.
//! Writes carry the stored alias forward so a flag change never clears it.

use tk_carrier::types::{STATUS_DELIVERED, STATUS_INVALID_NUMBER};
use tk_carrier::LookupResult;
use tk_domain::tracking::{CompletionFlag, TrackingRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posture {
    Delivered,
    InTransit,
    NotRegistered,
    InvalidNumber,
    /// Stored as delivered; the lookup disagrees and is ignored.
    AlreadyDelivered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDecision {
    Put { flag: CompletionFlag, alias: String },
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub posture: Posture,
    pub write: WriteDecision,
    pub opens_session: bool,
}

impl Reconciliation {
    /// The flag that will be persisted, if any.
    pub fn flag(&self) -> Option<CompletionFlag> {
        match self.write {
            WriteDecision::Put { flag, .. } => Some(flag),
            WriteDecision::Leave => None,
        }
    }
}

pub fn reconcile(result: &LookupResult, prior: Option<&TrackingRecord>) -> Reconciliation {
    let prior_delivered = prior.is_some_and(TrackingRecord::is_delivered);
    let alias = prior.map(|r| r.alias.clone()).unwrap_or_default();

    if result.is_success() && result.status == STATUS_DELIVERED {
        return Reconciliation {
            posture: Posture::Delivered,
            write: WriteDecision::Put {
                flag: CompletionFlag::Delivered,
                alias,
            },
            opens_session: false,
        };
    }

    if !result.is_success() && result.status == STATUS_INVALID_NUMBER {
        return Reconciliation {
            posture: Posture::InvalidNumber,
            write: WriteDecision::Leave,
            opens_session: false,
        };
    }

    if prior_delivered {
        return Reconciliation {
            posture: Posture::AlreadyDelivered,
            write: WriteDecision::Leave,
            opens_session: false,
        };
    }

    let posture = if result.is_success() {
        Posture::InTransit
    } else {
        Posture::NotRegistered
    };
    Reconciliation {
        posture,
        write: WriteDecision::Put {
            flag: CompletionFlag::Pending,
            alias,
        },
        opens_session: true,
    }
}
