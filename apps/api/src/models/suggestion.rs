use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// One step into a StructuredCV document: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
    /// A negative or fractional number. Kept so resolution can reject it
    /// with a path error instead of the whole request failing to parse.
    Unusable(Number),
}

impl PathSegment {
    /// Numeric segments, and keys that spell a number, address array slots.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(k) => k.parse().ok(),
            PathSegment::Unusable(_) => None,
        }
    }

    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Index(i) => i.to_string(),
            PathSegment::Key(k) => k.clone(),
            PathSegment::Unusable(n) => n.to_string(),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Location of a value inside a StructuredCV, e.g. `["experience", 0, "description"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(pub Vec<PathSegment>);

impl FieldPath {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

/// Human-readable form: `Experience → #1 → Description`.
impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("Unknown field");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|segment| match segment.as_index() {
                Some(i) => format!("#{}", i + 1),
                None => {
                    let key = segment.as_key();
                    let mut chars = key.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                }
            })
            .collect();
        f.write_str(&parts.join(" → "))
    }
}

/// The analysis backend numbers its suggestions, but string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionId::Number(n) => write!(f, "{n}"),
            SuggestionId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Value>", rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

/// Anything other than a known severity name, strings or not, reads as medium.
impl From<Option<Value>> for Severity {
    fn from(value: Option<Value>) -> Self {
        match value
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("critical") => Severity::Critical,
            Some("high") => Severity::High,
            Some("low") => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

/// A field-targeted improvement proposed by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<SuggestionId>,
    #[serde(default)]
    pub field_path: FieldPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    /// Top-level key used when `field_path` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    #[serde(default)]
    pub original_value: Value,
    #[serde(default)]
    pub improved_value: Value,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, rename = "issue_type", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

impl Suggestion {
    /// The path this suggestion writes to, falling back to `[targetField]`.
    pub fn target_path(&self) -> FieldPath {
        match (&self.field_path, &self.target_field) {
            (path, _) if !path.is_empty() => path.clone(),
            (_, Some(target)) if !target.trim().is_empty() => {
                FieldPath(vec![PathSegment::Key(target.clone())])
            }
            _ => FieldPath::default(),
        }
    }

    /// Key under which an application is remembered for undo:
    /// the suggestion id, else the field id, else the target path.
    pub fn ledger_key(&self) -> String {
        if let Some(id) = &self.suggestion_id {
            return id.to_string();
        }
        if let Some(field_id) = self.field_id.as_deref().filter(|f| !f.is_empty()) {
            return field_id.to_string();
        }
        self.target_path()
            .segments()
            .iter()
            .map(PathSegment::as_key)
            .collect::<Vec<_>>()
            .join(".")
    }
}
