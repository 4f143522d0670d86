//! Input validators for uploaded text and contact details.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::models::cv::StructuredCv;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]+$").expect("valid phone regex"));
static ENCODED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;[^&]*&gt;").expect("valid tag regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// An absolute URL with a scheme, e.g. `https://github.com/jane`.
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

/// Digits, spaces, `-`, `+` and parentheses only, with at least ten digits.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_CHARS.is_match(phone) && phone.chars().filter(char::is_ascii_digit).count() >= 10
}

/// Checks the trimmed character count of `text` against `min..=max`.
pub fn validate_text_length(text: Option<&str>, min: usize, max: usize) -> Result<(), String> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Err("Text is required".to_string());
    };
    let length = text.trim().chars().count();
    if length < min {
        return Err(format!("Text must be at least {min} characters"));
    }
    if length > max {
        return Err(format!("Text must be at most {max} characters"));
    }
    Ok(())
}

/// Neutralises markup: angle brackets are entity-encoded, then anything that
/// was a tag is dropped entirely.
pub fn sanitize_text(text: &str) -> String {
    let encoded = text.replace('<', "&lt;").replace('>', "&gt;");
    ENCODED_TAG.replace_all(&encoded, "").trim().to_string()
}

/// Profile links are usually written without a scheme.
fn is_plausible_link(link: &str) -> bool {
    is_valid_url(link) || is_valid_url(&format!("https://{link}"))
}

/// Human-readable warnings about contact details that look malformed.
pub fn contact_warnings(structured_cv: &Value) -> Vec<String> {
    let contact = StructuredCv::from_value(structured_cv).contact;
    let mut warnings = Vec::new();

    if let Some(email) = contact.email.as_deref().filter(|e| !is_valid_email(e)) {
        warnings.push(format!("Contact email '{email}' does not look like a valid address"));
    }
    if let Some(phone) = contact.phone.as_deref().filter(|p| !is_valid_phone(p)) {
        warnings.push(format!("Contact phone '{phone}' does not look like a valid number"));
    }
    for link in contact.all_links().into_iter().filter(|l| !is_plausible_link(l)) {
        warnings.push(format!("Contact link '{link}' is not a valid URL"));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_url() {
        assert!(is_valid_url("https://github.com/jane"));
        assert!(!is_valid_url("github.com/jane"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+1 (555) 010-0199"));
        assert!(!is_valid_phone("555-0199"));
        assert!(!is_valid_phone("call 5550100199"));
    }

    #[test]
    fn test_text_length() {
        assert_eq!(validate_text_length(None, 0, 10), Err("Text is required".into()));
        assert_eq!(validate_text_length(Some(""), 0, 10), Err("Text is required".into()));
        assert_eq!(
            validate_text_length(Some("  ab  "), 3, 10),
            Err("Text must be at least 3 characters".into())
        );
        assert_eq!(
            validate_text_length(Some("abcdef"), 0, 5),
            Err("Text must be at most 5 characters".into())
        );
        assert_eq!(validate_text_length(Some("abc"), 1, 5), Ok(()));
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  Hello <b>world</b>  "), "Hello world");
        assert_eq!(sanitize_text("<script>alert(1)</script>Rust"), "alert(1)Rust");
        assert_eq!(sanitize_text("a > b"), "a &gt; b");
    }

    #[test]
    fn test_contact_warnings() {
        let warnings = contact_warnings(&json!({
            "contact": {
                "email": "jane-at-example",
                "phone": "12",
                "linkedin": "linkedin.com/in/jane",
                "website": "not a url"
            }
        }));
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings[0].contains("email"));
        assert!(warnings[1].contains("phone"));
        assert!(warnings[2].contains("not a url"));
    }

    #[test]
    fn test_contact_warnings_skip_sentinel() {
        let warnings = contact_warnings(&json!({
            "contact": {"email": "Not provided", "phone": "Not provided"}
        }));
        assert!(warnings.is_empty());
    }
}
