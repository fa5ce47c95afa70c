//! Highlights API routes

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::anchor::HighlightRecord;
use crate::catalog::ListQuery;
use crate::error::Result;
use crate::page::Command;
use crate::state::AppState;

/// Create the highlights router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_highlights).delete(clear_highlights))
        .route("/domains", get(list_domains))
        .route("/merge", post(merge_highlights))
        .route("/:id", patch(edit_highlight).delete(delete_highlight))
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub text: String,
}

/// A changed record plus the command to forward to its page
#[derive(Debug, Serialize)]
pub struct RecordChange {
    pub record: HighlightRecord,
    pub command: Command,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
    pub command: Command,
}

/// List highlights, newest first
async fn list_highlights(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<HighlightRecord>>> {
    Ok(Json(state.catalog().list(&query).await?))
}

/// List the hostnames that have highlights
async fn list_domains(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.catalog().domains().await?))
}

/// Join the texts of several highlights
async fn merge_highlights(
    State(state): State<AppState>,
    Json(request): Json<MergeRequest>,
) -> Result<Json<MergeResponse>> {
    let text = state.catalog().merge(&request.ids).await?;
    Ok(Json(MergeResponse { text }))
}

/// Edit the text of a highlight
async fn edit_highlight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EditRequest>,
) -> Result<Json<RecordChange>> {
    let (record, command) = state.catalog().edit(&id, &request.text).await?;
    Ok(Json(RecordChange { record, command }))
}

/// Delete a highlight
async fn delete_highlight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordChange>> {
    let (record, command) = state.catalog().delete(&id).await?;
    Ok(Json(RecordChange { record, command }))
}

/// Delete every highlight
async fn clear_highlights(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let (cleared, command) = state.catalog().clear().await?;
    Ok(Json(ClearResponse { cleared, command }))
}
