//! Route modules for the Web Highlighter server

pub mod health;
pub mod highlights;
pub mod pages;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/pages", pages::router())
        .nest("/api/v1/highlights", highlights::router())
        .with_state(state)
}
