use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": {
            "backend": state.config.store.backend,
            "table": state.store.table(),
        },
        "carrier_mode": state.config.carrier.mode,
    }))
}
