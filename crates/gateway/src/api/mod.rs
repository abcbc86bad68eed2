pub mod auth;
pub mod health;
pub mod skill;
pub mod trackings;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the `TK_API_TOKEN` bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/v1/health", get(health::health));

    let protected = Router::new()
        // Voice skill turn
        .route("/v1/skill", post(skill::skill))
        // Store maintenance
        .route("/v1/users/:user_id/trackings", get(trackings::list_trackings))
        .route(
            "/v1/users/:user_id/trackings/:company/:number",
            get(trackings::get_tracking).delete(trackings::delete_tracking),
        )
        // Apply API auth middleware to all protected routes.
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}
