use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::formatting::markdown::generate_markdown_cv;
use crate::formatting::text_html::format_cv_text;
use crate::ingest::validation::{contact_warnings, sanitize_text, validate_text_length};
use crate::models::suggestion::FieldPath;
use crate::sessions::store::{CvSession, NewSession};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub structured_cv: Value,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub analysis: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AppliedSuggestionView {
    pub key: String,
    pub target: String,
    pub field_path: FieldPath,
    pub original_value: Value,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub structured_cv: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    pub has_original_text: bool,
    pub applied_suggestions: Vec<AppliedSuggestionView>,
    pub contact_warnings: Vec<String>,
}

impl From<CvSession> for SessionView {
    fn from(session: CvSession) -> Self {
        let applied_suggestions = session
            .ledger
            .applied()
            .into_iter()
            .map(|(key, change)| AppliedSuggestionView {
                key: key.to_string(),
                target: change.path.to_string(),
                field_path: change.path.clone(),
                original_value: change.original.clone(),
                applied_at: change.applied_at,
            })
            .collect();
        SessionView {
            id: session.id,
            created_at: session.created_at,
            updated_at: session.updated_at,
            contact_warnings: contact_warnings(&session.structured_cv),
            structured_cv: session.structured_cv,
            job_description: session.job_description,
            analysis: session.analysis,
            has_original_text: session.original_text.is_some(),
            applied_suggestions,
        }
    }
}

/// Sanitises an optional job description; blank input counts as absent.
pub fn clean_job_description(raw: Option<&str>, max_chars: usize) -> Result<Option<String>, AppError> {
    let Some(cleaned) = raw.map(sanitize_text).filter(|jd| !jd.is_empty()) else {
        return Ok(None);
    };
    validate_text_length(Some(&cleaned), 1, max_chars)
        .map_err(|msg| AppError::Validation(format!("Job description: {msg}")))?;
    Ok(Some(cleaned))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    if !req.structured_cv.is_object() {
        return Err(AppError::Validation(
            "structured_cv must be a JSON object".to_string(),
        ));
    }
    let job_description = clean_job_description(
        req.job_description.as_deref(),
        state.config.max_job_description_chars,
    )?;

    let session = state
        .sessions
        .create(NewSession {
            structured_cv: req.structured_cv,
            original_text: req.original_text.filter(|t| !t.trim().is_empty()),
            job_description,
            analysis: req.analysis,
        })
        .await;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/markdown
pub async fn handle_download_markdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(id).await?;
    let markdown = generate_markdown_cv(&session.structured_cv);
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"cv.md\""),
        ],
        markdown,
    ))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = state.sessions.get(id).await?;
    let text = session.original_text.unwrap_or_default();
    Ok(Html(format_cv_text(&text)))
}
