//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::StorageBackend;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Backend holding the highlight map
    pub store: StorageBackend,
    /// Whether submitted pages are sanitized before parsing
    pub sanitize: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store: config.storage.backend,
        sanitize: config.highlighter.sanitize,
    })
}
