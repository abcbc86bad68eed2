//! API authentication middleware.
//!
//! The env var named by `server.api_token_env` (default `TK_API_TOKEN`) is
//! read **once at startup** and its SHA-256 digest cached in `AppState`.
//! - Token set: protected requests must carry `Authorization: Bearer <token>`.
//! - Token unset or empty: dev mode, requests pass through.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token_hash.as_deref() else {
        return next.run(req).await;
    };

    if !token_matches(expected, bearer_token(req.headers())) {
        tracing::debug!(path = %req.uri().path(), "rejected request without valid API token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid or missing API token" })),
        )
            .into_response();
    }

    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

/// Compare fixed-length digests in constant time so the token length
/// does not leak.
fn token_matches(expected_hash: &[u8], provided: &str) -> bool {
    let provided_hash = Sha256::digest(provided.as_bytes());
    bool::from(provided_hash.as_slice().ct_eq(expected_hash))
}
