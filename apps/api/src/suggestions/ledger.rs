//! Per-session record of applied suggestions, used to revert them.
//!
//! Each suggestion remembers the value it displaced the first time it was
//! applied. Undo writes that value back and forgets the entry, so only one
//! step is reversible per suggestion. Two different suggestions touching the
//! same field each keep their own original; undoing the older one overwrites
//! the newer edit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::suggestion::{FieldPath, Suggestion};
use crate::suggestions::path::{apply_suggestion, replace_at_path, SuggestionError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedChange {
    pub path: FieldPath,
    pub original: Value,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    pub key: String,
    pub previous: Value,
    /// True when this suggestion had already been applied; the original is kept.
    pub already_applied: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionLedger {
    changes: HashMap<String, AppliedChange>,
}

impl SuggestionLedger {
    pub fn apply(
        &mut self,
        doc: &mut Value,
        suggestion: &Suggestion,
    ) -> Result<ApplyOutcome, SuggestionError> {
        let previous = apply_suggestion(doc, suggestion)?;
        let key = suggestion.ledger_key();
        let already_applied = self.changes.contains_key(&key);
        if !already_applied {
            self.changes.insert(
                key.clone(),
                AppliedChange {
                    path: suggestion.target_path(),
                    original: previous.clone(),
                    applied_at: Utc::now(),
                },
            );
        }
        Ok(ApplyOutcome {
            key,
            previous,
            already_applied,
        })
    }

    /// Restores the value a suggestion replaced. Returns the restored value.
    pub fn undo(&mut self, doc: &mut Value, key: &str) -> Result<Value, SuggestionError> {
        let change = self
            .changes
            .get(key)
            .ok_or_else(|| SuggestionError::NothingToUndo(key.to_string()))?;
        let restored = change.original.clone();
        replace_at_path(doc, &change.path, restored.clone())?;
        self.changes.remove(key);
        Ok(restored)
    }

    #[cfg(test)]
    pub fn is_applied(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    pub fn applied(&self) -> Vec<(&str, &AppliedChange)> {
        let mut applied: Vec<_> = self
            .changes
            .iter()
            .map(|(key, change)| (key.as_str(), change))
            .collect();
        applied.sort_by_key(|(_, change)| change.applied_at);
        applied
    }
}
