use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::suggestion::Suggestion;
use crate::state::AppState;
use crate::suggestions::path::apply_suggestion;

#[derive(Debug, Deserialize)]
pub struct ApplySuggestionRequest {
    pub structured_cv: Value,
    pub suggestion: Suggestion,
}

#[derive(Debug, Deserialize)]
pub struct SessionApplyRequest {
    pub suggestion: Suggestion,
}

#[derive(Debug, Serialize)]
pub struct ApplySuggestionResponse {
    pub status: &'static str,
    pub updated_cv: Value,
    pub applied_suggestion: Suggestion,
    /// Display form of the field that changed, e.g. `Experience → #1 → Description`.
    pub target: String,
    pub previous_value: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already_applied: bool,
}

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    pub status: &'static str,
    pub suggestion_id: String,
    pub updated_cv: Value,
    pub restored_value: Value,
}

/// POST /api/v1/cv/apply-suggestion
/// Applies one suggestion to the CV sent in the request and returns the result.
pub async fn handle_apply_suggestion(
    Json(req): Json<ApplySuggestionRequest>,
) -> Result<Json<ApplySuggestionResponse>, AppError> {
    let ApplySuggestionRequest {
        mut structured_cv,
        suggestion,
    } = req;
    let previous_value = apply_suggestion(&mut structured_cv, &suggestion)?;
    Ok(Json(ApplySuggestionResponse {
        status: "success",
        target: suggestion.target_path().to_string(),
        updated_cv: structured_cv,
        applied_suggestion: suggestion,
        previous_value,
        already_applied: false,
    }))
}

/// POST /api/v1/sessions/:id/suggestions/apply
pub async fn handle_session_apply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SessionApplyRequest>,
) -> Result<Json<ApplySuggestionResponse>, AppError> {
    let (outcome, updated_cv) = state.sessions.apply(id, &req.suggestion).await?;
    Ok(Json(ApplySuggestionResponse {
        status: "success",
        target: req.suggestion.target_path().to_string(),
        updated_cv,
        applied_suggestion: req.suggestion,
        previous_value: outcome.previous,
        already_applied: outcome.already_applied,
    }))
}

/// POST /api/v1/sessions/:id/suggestions/:suggestion_id/undo
pub async fn handle_session_undo(
    State(state): State<AppState>,
    Path((id, suggestion_id)): Path<(Uuid, String)>,
) -> Result<Json<UndoResponse>, AppError> {
    let (restored_value, updated_cv) = state.sessions.undo(id, &suggestion_id).await?;
    Ok(Json(UndoResponse {
        status: "success",
        suggestion_id,
        updated_cv,
        restored_value,
    }))
}
