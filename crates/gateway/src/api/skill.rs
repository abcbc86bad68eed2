//! `POST /v1/skill`: one voice-assistant turn.
//!
//! The voice platform's adapter posts a normalized [`SkillRequest`] and
//! relays the returned [`SkillResponse`] back to the device.  Session
//! attributes travel in both directions; the server keeps no per-user
//! state between calls.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::conversation::SkillRequest;
use crate::state::AppState;

pub async fn skill(
    State(state): State<AppState>,
    Json(body): Json<SkillRequest>,
) -> impl IntoResponse {
    if body.user_id.trim().is_empty() {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "user_id must not be empty" })),
        )
            .into_response();
    }

    tracing::debug!(
        user_id = %body.user_id,
        request_type = %body.request_type,
        intent = ?body.intent,
        "skill request"
    );

    Json(state.conversation.handle_request(&body).await).into_response()
}
