use serde::Serialize;

/// Structured trace events emitted across all takuhai crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    CarrierLookup {
        carrier: String,
        number: String,
        success: bool,
        status: String,
        duration_ms: u64,
    },
    TrackingWritten {
        user_id: String,
        sort_key: String,
        flag: String,
        has_alias: bool,
    },
    TrackingWriteFailed {
        user_id: String,
        sort_key: String,
        error: String,
    },
    StoreReadDegraded {
        operation: String,
        user_id: String,
        reason: String,
    },
    TrackingDeleted {
        user_id: String,
        sort_key: String,
    },
    IntentHandled {
        user_id: String,
        intent: String,
        should_end_session: bool,
        session_opened: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "tk_event");
    }
}
