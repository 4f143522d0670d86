use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formatting::markdown::generate_markdown_cv;
use crate::formatting::text_html::{format_cv_text, is_valid_cv_text};

#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub html: String,
    pub is_valid_cv: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkdownRequest {
    /// A StructuredCV object, or a string that is already Markdown.
    #[serde(default)]
    pub structured_cv: Value,
}

#[derive(Debug, Serialize)]
pub struct MarkdownResponse {
    pub markdown: String,
}

/// POST /api/v1/cv/format
pub async fn handle_format(Json(req): Json<FormatRequest>) -> Json<FormatResponse> {
    let text = req.text.unwrap_or_default();
    Json(FormatResponse {
        html: format_cv_text(&text),
        is_valid_cv: is_valid_cv_text(&text),
    })
}

/// POST /api/v1/cv/markdown
pub async fn handle_markdown(Json(req): Json<MarkdownRequest>) -> Json<MarkdownResponse> {
    Json(MarkdownResponse {
        markdown: generate_markdown_cv(&req.structured_cv),
    })
}
