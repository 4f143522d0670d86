use crate::config::Config;
use crate::sessions::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// In-memory analysis sessions; nothing survives a restart.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
        AppState { config, sessions }
    }
}
