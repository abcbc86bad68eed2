//! Store maintenance endpoints.
//!
//! Read-only views plus best-effort delete over the same tracking table
//! the conversation writes.  Reads report whether the store answered or
//! the result is a degraded empty fallback.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use tk_domain::tracking::{encode_key, CompletionFlag, KEY_DELIMITER};
use tk_store::ReadOutcome;

use crate::state::AppState;

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn degraded(reason: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "error": format!("store unavailable: {reason}") })),
    )
        .into_response()
}

/// Key parts may not contain the composite-key delimiter.
fn sort_key(company: &str, number: &str) -> Option<String> {
    if company.is_empty()
        || number.is_empty()
        || company.contains(KEY_DELIMITER)
        || number.contains(KEY_DELIMITER)
    {
        return None;
    }
    Some(encode_key(company, number))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/users/:user_id/trackings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// List every record under this carrier instead of all pending ones.
    #[serde(default)]
    pub company: Option<String>,
}

pub async fn list_trackings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let outcome = match query.company.as_deref() {
        Some(company) if company.contains(KEY_DELIMITER) => {
            return bad_request("company must not contain '_'");
        }
        Some(company) => state.store.query_by_carrier_prefix(&user_id, company).await,
        None => state.store.query_all_pending(&user_id).await,
    };

    if let ReadOutcome::Degraded { reason, .. } = &outcome {
        return degraded(reason);
    }
    let trackings = outcome.into_value();
    Json(serde_json::json!({
        "user_id": user_id,
        "count": trackings.len(),
        "trackings": trackings,
    }))
    .into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/users/:user_id/trackings/:company/:number
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_tracking(
    State(state): State<AppState>,
    Path((user_id, company, number)): Path<(String, String, String)>,
) -> impl IntoResponse {
    let Some(key) = sort_key(&company, &number) else {
        return bad_request("company and number must be non-empty and must not contain '_'");
    };

    let record = match state.store.get(&user_id, &key).await {
        ReadOutcome::Fresh(record) => record,
        ReadOutcome::Degraded { reason, .. } => return degraded(&reason),
    };
    let Some(record) = record else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "tracking not found" })),
        )
            .into_response();
    };

    let pending = !state
        .store
        .query_by_key_and_flag(&user_id, &key, CompletionFlag::Pending)
        .await
        .into_value()
        .is_empty();

    Json(serde_json::json!({
        "tracking": record,
        "pending": pending,
    }))
    .into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/users/:user_id/trackings/:company/:number
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Best-effort: the reply carries no confirmation that a record existed.
pub async fn delete_tracking(
    State(state): State<AppState>,
    Path((user_id, company, number)): Path<(String, String, String)>,
) -> impl IntoResponse {
    let Some(key) = sort_key(&company, &number) else {
        return bad_request("company and number must be non-empty and must not contain '_'");
    };
    state.store.delete(&user_id, &key).await;
    Json(serde_json::json!({ "sort_key": key, "status": "accepted" })).into_response()
}
