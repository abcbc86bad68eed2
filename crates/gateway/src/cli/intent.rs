//! `takuhai intent`: drive one turn through the router without HTTP.

use std::sync::Arc;

use serde_json::Value;
use tk_domain::config::Config;

use crate::bootstrap;
use crate::conversation::{SessionPayload, Slot, Slots, SkillRequest};

pub struct IntentArgs {
    pub user: String,
    pub name: Option<String>,
    pub request_type: String,
    pub slots: Vec<(String, String)>,
    pub session: Vec<(String, String)>,
}

/// Build the request the HTTP endpoint would have received.
pub fn to_request(args: IntentArgs) -> SkillRequest {
    let slots: Slots = args
        .slots
        .into_iter()
        .map(|(name, value)| (name, Slot::raw(value)))
        .collect();
    let session_attributes: SessionPayload = args
        .session
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    SkillRequest {
        request_type: args.request_type,
        intent: args.name,
        slots,
        user_id: args.user,
        session_attributes,
    }
}

pub async fn run(config: Arc<Config>, args: IntentArgs) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config).await?;
    let response = state.conversation.handle_request(&to_request(args)).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    if let Err(e) = state.store.flush().await {
        tracing::warn!(error = %e, "tracking store flush failed");
    }
    Ok(())
}
