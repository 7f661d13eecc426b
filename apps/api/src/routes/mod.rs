pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::labs::handlers as labs;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Room for multipart boundaries and the session_id field on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.upload_policy.max_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Match API
        .route("/api/v1/matches", post(matching::handle_create_match))
        .route(
            "/api/v1/matches/:session_id",
            get(matching::handle_get_saved_matches),
        )
        // Lab directory
        .route("/api/v1/labs", get(labs::handle_list_labs))
        .route("/api/v1/labs/:id", get(labs::handle_get_lab))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
