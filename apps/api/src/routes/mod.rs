pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::formatting::handlers as formatting;
use crate::ingest::handlers as ingest;
use crate::sessions::handlers as sessions;
use crate::state::AppState;
use crate::suggestions::handlers as suggestions;

/// Headroom above the file limit for multipart framing and the text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless CV tools
        .route("/api/v1/cv/format", post(formatting::handle_format))
        .route("/api/v1/cv/markdown", post(formatting::handle_markdown))
        .route(
            "/api/v1/cv/apply-suggestion",
            post(suggestions::handle_apply_suggestion),
        )
        .route("/api/v1/cv/extract", post(ingest::handle_extract))
        // Analysis sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/suggestions/apply",
            post(suggestions::handle_session_apply),
        )
        .route(
            "/api/v1/sessions/:id/suggestions/:suggestion_id/undo",
            post(suggestions::handle_session_undo),
        )
        .route(
            "/api/v1/sessions/:id/markdown",
            get(sessions::handle_download_markdown),
        )
        .route("/api/v1/sessions/:id/preview", get(sessions::handle_preview))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
