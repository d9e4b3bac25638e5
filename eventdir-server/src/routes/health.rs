//! Liveness and refresh status

use axum::{Json, Router, extract::State, routing::get};

use crate::state::{AppState, Health};

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health - Reports the last refresh error, if any
async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(state.health().await)
}
