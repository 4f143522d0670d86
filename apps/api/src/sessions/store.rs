//! In-memory StructuredCV sessions.
//!
//! All mutations of a session run under the store's write lock, so two
//! applications against the same session never interleave.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::suggestion::Suggestion;
use crate::suggestions::ledger::{ApplyOutcome, SuggestionLedger};

#[derive(Debug, Clone)]
pub struct CvSession {
    pub id: Uuid,
    pub structured_cv: Value,
    /// Raw extracted text, kept for the HTML preview.
    pub original_text: Option<String>,
    pub job_description: Option<String>,
    /// The analysis document returned by the scoring backend, stored as-is.
    pub analysis: Option<Value>,
    pub ledger: SuggestionLedger,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NewSession {
    pub structured_cv: Value,
    pub original_text: Option<String>,
    pub job_description: Option<String>,
    pub analysis: Option<Value>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, CvSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, session: &CvSession, now: DateTime<Utc>) -> bool {
        now - session.updated_at > self.ttl
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("Session {id} not found"))
    }

    /// Stores a new session, discarding any that have expired.
    pub async fn create(&self, new: NewSession) -> CvSession {
        let now = Utc::now();
        let session = CvSession {
            id: Uuid::new_v4(),
            structured_cv: new.structured_cv,
            original_text: new.original_text,
            job_description: new.job_description,
            analysis: new.analysis,
            ledger: SuggestionLedger::default(),
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {pruned} expired session(s)");
        }
        sessions.insert(session.id, session.clone());
        info!("Created session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<CvSession, AppError> {
        let sessions = self.inner.read().await;
        sessions
            .get(&id)
            .filter(|s| !self.is_expired(s, Utc::now()))
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.inner.write().await.remove(&id);
        match removed {
            Some(_) => {
                info!("Deleted session {id}");
                Ok(())
            }
            None => Err(Self::not_found(id)),
        }
    }

    /// Runs `f` against a live session under the write lock.
    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CvSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.inner.write().await;
        let now = Utc::now();
        let session = sessions
            .get_mut(&id)
            .filter(|s| !self.is_expired(s, now))
            .ok_or_else(|| Self::not_found(id))?;
        let result = f(&mut *session)?;
        session.updated_at = now;
        Ok(result)
    }

    /// Applies a suggestion to the session's CV. On failure the CV is unchanged.
    pub async fn apply(
        &self,
        id: Uuid,
        suggestion: &Suggestion,
    ) -> Result<(ApplyOutcome, Value), AppError> {
        let outcome = self
            .with_session(id, |session| {
                let CvSession {
                    structured_cv,
                    ledger,
                    ..
                } = session;
                let outcome = ledger.apply(structured_cv, suggestion)?;
                Ok((outcome, structured_cv.clone()))
            })
            .await?;
        info!(
            "Session {id}: applied suggestion '{}' at {}",
            outcome.0.key,
            suggestion.target_path()
        );
        Ok(outcome)
    }

    /// Reverts a previously applied suggestion. Returns the restored value and the CV.
    pub async fn undo(&self, id: Uuid, key: &str) -> Result<(Value, Value), AppError> {
        let result = self
            .with_session(id, |session| {
                let CvSession {
                    structured_cv,
                    ledger,
                    ..
                } = session;
                let restored = ledger.undo(structured_cv, key)?;
                Ok((restored, structured_cv.clone()))
            })
            .await?;
        info!("Session {id}: undid suggestion '{key}'");
        Ok(result)
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.len()
    }
}
