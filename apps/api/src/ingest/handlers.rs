use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::formatting::text_html::{format_cv_text, is_valid_cv_text};
use crate::ingest::extract::{extract_text, normalize_extracted, DocumentKind};
use crate::sessions::handlers::clean_job_description;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub file_size_bytes: usize,
    pub extracted_text_length: usize,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub html: String,
    pub is_valid_cv: bool,
    pub file_info: FileInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// POST /api/v1/cv/extract
/// Accepts `cv_file` (PDF, DOCX or plain text) or `cv_text`, plus an optional
/// `job_description`, and returns the extracted text with an HTML preview.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let max_bytes = state.config.max_upload_bytes();
    let mut upload: Option<Upload> = None;
    let mut pasted: Option<String> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "cv_file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > max_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File exceeds the {} MB upload limit",
                        state.config.max_upload_mb
                    )));
                }
                upload = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            }
            "cv_text" => pasted = Some(field.text().await.map_err(multipart_error)?),
            "job_description" => {
                job_description = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }

    let job_description = clean_job_description(
        job_description.as_deref(),
        state.config.max_job_description_chars,
    )?;

    let (text, file_info) = match (upload, pasted) {
        (Some(upload), _) => {
            let kind = DocumentKind::detect(&upload.file_name, upload.content_type.as_deref())?;
            let file_size_bytes = upload.data.len();
            let data = upload.data;
            let text = tokio::task::spawn_blocking(move || extract_text(kind, &data))
                .await
                .context("Text extraction task failed")??;
            info!(
                "Extracted {} chars from '{}' ({file_size_bytes} bytes)",
                text.len(),
                upload.file_name
            );
            let file_info = FileInfo {
                filename: upload.file_name,
                file_size_bytes,
                extracted_text_length: text.chars().count(),
                source: "file",
            };
            (text, file_info)
        }
        (None, Some(pasted)) => {
            let text = normalize_extracted(&pasted);
            if text.is_empty() {
                return Err(AppError::Validation("cv_text is empty".to_string()));
            }
            let file_info = FileInfo {
                filename: "pasted_text".to_string(),
                file_size_bytes: pasted.len(),
                extracted_text_length: text.chars().count(),
                source: "text",
            };
            (text, file_info)
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Provide either a cv_file upload or cv_text".to_string(),
            ))
        }
    };

    Ok(Json(ExtractResponse {
        html: format_cv_text(&text),
        is_valid_cv: is_valid_cv_text(&text),
        text,
        file_info,
        job_description,
    }))
}
