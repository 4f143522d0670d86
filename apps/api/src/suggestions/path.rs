//! Field path resolution and atomic replacement inside a StructuredCV.
//!
//! The whole path is resolved before anything is written, so a failed
//! application leaves the document untouched.

use serde_json::Value;
use thiserror::Error;

use crate::models::suggestion::{FieldPath, PathSegment, Suggestion};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SuggestionError {
    #[error("Suggestion has no field path or target field")]
    EmptyPath,

    #[error("Suggestion has no improved value")]
    MissingImprovedValue,

    #[error("Field '{segment}' does not exist under {at}")]
    MissingKey { segment: String, at: String },

    #[error("Index {index} is out of bounds under {at} (length {len})")]
    IndexOutOfBounds { index: usize, len: usize, at: String },

    #[error("Expected an array index under {at}, got '{segment}'")]
    InvalidIndex { segment: String, at: String },

    #[error("Cannot descend into a {kind} value at {at}")]
    NotAContainer { kind: &'static str, at: String },

    #[error("No applied change recorded for suggestion '{0}'")]
    NothingToUndo(String),
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn prefix_label(segments: &[PathSegment]) -> String {
    if segments.is_empty() {
        "the CV root".to_string()
    } else {
        FieldPath(segments.to_vec()).to_string()
    }
}

/// Returns the existing slot at `segments`. Keys must exist; indices must be in bounds.
pub fn resolve_mut<'a>(
    doc: &'a mut Value,
    segments: &[PathSegment],
) -> Result<&'a mut Value, SuggestionError> {
    let mut current = doc;
    for (depth, segment) in segments.iter().enumerate() {
        let at = || prefix_label(&segments[..depth]);
        current = match current {
            Value::Object(map) => {
                let key = segment.as_key();
                map.get_mut(&key)
                    .ok_or_else(|| SuggestionError::MissingKey { segment: key.clone(), at: at() })?
            }
            Value::Array(items) => {
                let index = segment.as_index().ok_or_else(|| SuggestionError::InvalidIndex {
                    segment: segment.as_key(),
                    at: at(),
                })?;
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or_else(|| SuggestionError::IndexOutOfBounds { index, len, at: at() })?
            }
            other => {
                return Err(SuggestionError::NotAContainer {
                    kind: kind_name(other),
                    at: at(),
                })
            }
        };
    }
    Ok(current)
}

/// Replaces the value at `path` and returns the value it displaced.
pub fn replace_at_path(
    doc: &mut Value,
    path: &FieldPath,
    value: Value,
) -> Result<Value, SuggestionError> {
    if path.is_empty() {
        return Err(SuggestionError::EmptyPath);
    }
    let slot = resolve_mut(doc, path.segments())?;
    Ok(std::mem::replace(slot, value))
}

/// Writes the suggestion's improved value into `doc`, returning the previous value.
pub fn apply_suggestion(doc: &mut Value, suggestion: &Suggestion) -> Result<Value, SuggestionError> {
    if suggestion.improved_value.is_null() {
        return Err(SuggestionError::MissingImprovedValue);
    }
    replace_at_path(doc, &suggestion.target_path(), suggestion.improved_value.clone())
}
