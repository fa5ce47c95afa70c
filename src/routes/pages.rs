//! Page API routes
//!
//! Each request carries a page snapshot; a fresh session is attached to it,
//! the event is handled and the resulting HTML is sent back.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::anchor::HighlightRecord;
use crate::dom::{sanitize_html, Document};
use crate::error::{AppError, Result};
use crate::page::{Command, PageContext, PageSession, ReadyState, SelectionSpec};
use crate::state::AppState;

/// Create the pages router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restore", post(restore_page))
        .route("/highlights", post(create_highlight))
        .route("/commands", post(apply_command))
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub url: String,
    pub html: String,
    pub restored: Vec<String>,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHighlightRequest {
    pub url: String,
    pub html: String,
    pub selection: SelectionSpec,
}

#[derive(Debug, Serialize)]
pub struct CreateHighlightResponse {
    pub record: HighlightRecord,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub url: String,
    pub html: String,
    pub command: Command,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub html: String,
    pub applied: bool,
}

fn open_page(state: &AppState, url: &str, html: String) -> Result<PageSession> {
    let html = if state.config().highlighter.sanitize {
        sanitize_html(&html)?
    } else {
        html
    };

    let mut context = PageContext::new();
    state
        .highlighter()
        .attach(&mut context, url, Document::parse(&html))
        .ok_or_else(|| AppError::Internal(format!("Page context for {} reused", url)))
}

/// Restore persisted highlights into a page
async fn restore_page(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RestoreResponse>> {
    let mut session = open_page(&state, &request.url, request.html)?;
    let report = session
        .start(ReadyState::Complete)
        .await
        .unwrap_or_default();

    Ok(Json(RestoreResponse {
        url: session.url().to_string(),
        html: session.document().to_html(),
        restored: report.restored,
        unresolved: report.unresolved,
    }))
}

/// Highlight a selection and persist it
async fn create_highlight(
    State(state): State<AppState>,
    Json(request): Json<CreateHighlightRequest>,
) -> Result<(StatusCode, Json<CreateHighlightResponse>)> {
    let mut session = open_page(&state, &request.url, request.html)?;
    let range = request
        .selection
        .to_range(session.document())
        .ok_or_else(|| AppError::BadRequest("Selection does not resolve in page".to_string()))?;

    let record = session
        .on_selection(&range)
        .await
        .ok_or_else(|| AppError::BadRequest("Selection contains no text".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateHighlightResponse {
            record,
            html: session.document().to_html(),
        }),
    ))
}

/// Apply a management command to a page
async fn apply_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandResponse>> {
    let mut session = open_page(&state, &request.url, request.html)?;
    let applied = session.handle_command(request.command).await;

    Ok(Json(CommandResponse {
        html: session.into_document().to_html(),
        applied,
    }))
}
