//! Turns raw extracted CV text into print-ready HTML.
//!
//! Each line is classified by a chain of independent predicates (first match wins):
//! blank → bullet → section header → date range → job title → paragraph.
//! Every style is inlined so the output can be dropped into a print window
//! without any stylesheet.

use std::sync::LazyLock;

use regex::Regex;

use crate::formatting::escape::escape_html;

pub const EMPTY_CV_PLACEHOLDER: &str =
    r#"<div style="padding: 20px; text-align: center; color: #666;">No CV content available</div>"#;

const CONTAINER_OPEN: &str = "<div style=\"font-family: Georgia, 'Times New Roman', serif; font-size: 11pt; line-height: 1.6; color: #333; padding: 40px; max-width: 850px; margin: 0 auto; background: white;\">";
const SPACER: &str = r#"<div style="height: 12px;"></div>"#;
const LIST_OPEN: &str = r#"<ul style="margin: 8px 0 16px 0; padding-left: 24px; line-height: 1.6;">"#;
const LIST_ITEM_STYLE: &str = "margin-bottom: 6px;";
const HEADER_STYLE: &str = "font-size: 16pt; font-weight: 600; margin: 24px 0 12px 0; padding-bottom: 4px; border-bottom: 2px solid #333; color: #1a1a1a;";
const DATE_STYLE: &str = "margin: 8px 0; color: #666; font-style: italic; font-size: 10pt;";
const TITLE_STYLE: &str = "font-size: 13pt; font-weight: 600; margin: 16px 0 6px 0; color: #2c3e50;";
const PARAGRAPH_STYLE: &str = "margin: 0 0 10px 0; line-height: 1.6; color: #333;";

const JOB_TITLE_KEYWORDS: &[&str] = &[
    "developer",
    "engineer",
    "manager",
    "analyst",
    "designer",
    "architect",
    "consultant",
    "specialist",
    "coordinator",
    "director",
    "lead",
    "senior",
    "junior",
    "intern",
    "associate",
    "assistant",
    "administrator",
    "officer",
];

static BULLET_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*]\s").expect("valid bullet regex"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[.)]\s").expect("valid numbered regex"));
static BULLET_SYMBOL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*]\s+").expect("valid bullet prefix regex"));
static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[.)]\s+").expect("valid numbered prefix regex"));
static FOUR_DIGIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("valid year regex"));

/// How a single (trimmed) line of CV text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// List item content with its marker removed.
    Bullet(&'a str),
    /// Header text with a single trailing colon removed.
    SectionHeader(&'a str),
    DateRange(&'a str),
    JobTitle(&'a str),
    Paragraph(&'a str),
}

/// `•`, `-` or `*` followed by whitespace, or `N.` / `N)` followed by whitespace.
pub fn is_bullet_point(line: &str) -> bool {
    let trimmed = line.trim();
    BULLET_SYMBOL.is_match(trimmed) || NUMBERED_ITEM.is_match(trimmed)
}

/// All-caps line of at least two characters with a Latin capital, or a line ending in `:`.
pub fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim();
    let all_caps = trimmed == trimmed.to_uppercase()
        && trimmed.chars().count() >= 2
        && trimmed.chars().any(|c| c.is_ascii_uppercase());
    all_caps || trimmed.ends_with(':')
}

/// A four-digit year together with a dash (`-`, `–`, `—`) or the word "present".
pub fn is_date_range(line: &str) -> bool {
    let trimmed = line.trim();
    FOUR_DIGIT_YEAR.is_match(trimmed)
        && (trimmed.contains(['-', '–', '—']) || trimmed.to_lowercase().contains("present"))
}

pub fn is_job_title(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    JOB_TITLE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Removes a leading bullet symbol, then a leading `N.`/`N)` marker.
pub fn strip_list_marker(line: &str) -> &str {
    let rest = BULLET_SYMBOL_PREFIX
        .find(line)
        .map_or(line, |m| &line[m.end()..]);
    NUMBERED_PREFIX.find(rest).map_or(rest, |m| &rest[m.end()..])
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if is_bullet_point(trimmed) {
        LineKind::Bullet(strip_list_marker(trimmed))
    } else if is_section_header(trimmed) {
        LineKind::SectionHeader(trimmed.strip_suffix(':').unwrap_or(trimmed))
    } else if is_date_range(trimmed) {
        LineKind::DateRange(trimmed)
    } else if is_job_title(trimmed) {
        LineKind::JobTitle(trimmed)
    } else {
        LineKind::Paragraph(trimmed)
    }
}

/// Accumulates the HTML body, holding bullet items until the run ends.
#[derive(Default)]
struct HtmlBody {
    html: String,
    pending_items: Vec<String>,
}

impl HtmlBody {
    fn flush_list(&mut self) {
        if self.pending_items.is_empty() {
            return;
        }
        self.html.push_str(LIST_OPEN);
        for item in self.pending_items.drain(..) {
            self.html
                .push_str(&format!(r#"<li style="{LIST_ITEM_STYLE}">{item}</li>"#));
        }
        self.html.push_str("</ul>");
    }

    fn element(&mut self, tag: &str, style: &str, text: &str) {
        self.flush_list();
        self.html
            .push_str(&format!(r#"<{tag} style="{style}">{}</{tag}>"#, escape_html(text)));
    }

    fn push(&mut self, kind: LineKind<'_>) {
        match kind {
            LineKind::Blank => {
                self.flush_list();
                self.html.push_str(SPACER);
            }
            LineKind::Bullet(item) => self.pending_items.push(escape_html(item)),
            LineKind::SectionHeader(text) => self.element("h2", HEADER_STYLE, text),
            LineKind::DateRange(text) => self.element("p", DATE_STYLE, text),
            LineKind::JobTitle(text) => self.element("h3", TITLE_STYLE, text),
            LineKind::Paragraph(text) => self.element("p", PARAGRAPH_STYLE, text),
        }
    }
}

/// Converts raw CV text into one styled `<div>` container.
///
/// Empty input yields [`EMPTY_CV_PLACEHOLDER`]. Output is a pure function of
/// the input. Line content is HTML-escaped.
pub fn format_cv_text(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_CV_PLACEHOLDER.to_string();
    }

    let mut body = HtmlBody::default();
    for line in text.split('\n') {
        body.push(classify_line(line));
    }
    body.flush_list();

    format!("{CONTAINER_OPEN}{}</div>", body.html)
}

/// A CV text is worth analysing once it has at least 50 non-padding characters.
pub fn is_valid_cv_text(text: &str) -> bool {
    text.trim().chars().count() >= 50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_returns_placeholder() {
        assert_eq!(format_cv_text(""), EMPTY_CV_PLACEHOLDER);
        assert!(format_cv_text("").contains("No CV content available"));
    }

    #[test]
    fn test_plain_text_becomes_paragraphs() {
        let html = format_cv_text("John Doe\nSoftware Engineer\n2020-2023");
        assert!(html.contains("<p"));
        assert!(html.contains("John Doe"));
        assert!(html.starts_with("<div"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_headers_detected() {
        let html = format_cv_text("EXPERIENCE\nSome experience details");
        assert!(html.contains("<h2"));
        assert!(html.contains(">EXPERIENCE</h2>"));
    }

    #[test]
    fn test_colon_header_loses_colon() {
        assert_eq!(classify_line("Skills:"), LineKind::SectionHeader("Skills"));
        let html = format_cv_text("Skills:");
        assert!(html.contains(">Skills</h2>"));
    }

    #[test]
    fn test_bullet_variants_merge_into_one_list() {
        let html = format_cv_text("• One\n- Two\n3. Three\n4) Four");
        assert_eq!(html.matches("<ul").count(), 1);
        assert_eq!(html.matches("<li").count(), 4);
        for item in ["One", "Two", "Three", "Four"] {
            assert!(html.contains(&format!(">{item}</li>")), "missing {item}");
        }
    }

    #[test]
    fn test_bullet_run_split_by_other_lines() {
        let html = format_cv_text("* a\n* b\n\n* c\nplain words\n* d");
        assert_eq!(html.matches("<ul").count(), 3);
        assert_eq!(html.matches("<li").count(), 4);
    }

    #[test]
    fn test_list_flushed_before_following_element() {
        let html = format_cv_text("- first\nEDUCATION");
        let list_end = html.find("</ul>").unwrap();
        let header = html.find("<h2").unwrap();
        assert!(list_end < header);
    }

    #[test]
    fn test_job_title_detected() {
        let html = format_cv_text("Senior Software Engineer");
        assert!(html.contains("<h3"));
    }

    #[test]
    fn test_date_range_detected() {
        assert!(format_cv_text("2020-2023").contains("font-style: italic"));
        assert!(is_date_range("Jan 2020 – Present"));
        assert!(is_date_range("Since 2019, present"));
        assert!(!is_date_range("Graduated 2019"));
    }

    #[test]
    fn test_classification_order_bullet_before_header() {
        assert_eq!(classify_line("- ACME CORP"), LineKind::Bullet("ACME CORP"));
    }

    #[test]
    fn test_classification_order_header_before_date() {
        assert_eq!(
            classify_line("2019 - 2021:"),
            LineKind::SectionHeader("2019 - 2021")
        );
    }

    #[test]
    fn test_classification_order_date_before_title() {
        assert_eq!(
            classify_line("Engineer, 2019 - 2021"),
            LineKind::DateRange("Engineer, 2019 - 2021")
        );
    }

    #[test]
    fn test_header_needs_latin_capital() {
        assert!(!is_section_header("2020"));
        assert!(!is_section_header("A"));
        assert!(is_section_header("CV"));
        assert!(is_section_header("WORK HISTORY 2020"));
    }

    #[test]
    fn test_bullet_requires_whitespace_after_marker() {
        assert!(!is_bullet_point("-dash"));
        assert!(!is_bullet_point("2020.5 years"));
        assert!(is_bullet_point("  12. twelfth"));
    }

    #[test]
    fn test_strip_list_marker_removes_both_prefixes() {
        assert_eq!(strip_list_marker("- 1. nested"), "nested");
        assert_eq!(strip_list_marker("•   spaced"), "spaced");
    }

    #[test]
    fn test_blank_line_adds_spacer() {
        let html = format_cv_text("a\n\nb");
        assert_eq!(html.matches("height: 12px").count(), 1);
    }

    #[test]
    fn test_whitespace_only_input_is_not_placeholder() {
        let html = format_cv_text("   ");
        assert!(!html.contains("No CV content available"));
        assert!(html.contains("height: 12px"));
    }

    #[test]
    fn test_crlf_lines() {
        let html = format_cv_text("SUMMARY\r\n- item\r\n");
        assert!(html.contains(">SUMMARY</h2>"));
        assert!(html.contains(">item</li>"));
    }

    #[test]
    fn test_content_is_html_escaped() {
        let html = format_cv_text("<script>alert(1)</script>\n- a & b");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(">a &amp; b</li>"));
    }

    #[test]
    fn test_deterministic_output() {
        let text = "JANE DOE\nLead Developer\n2018 - Present\n- Built things\n\nNotes";
        assert_eq!(format_cv_text(text), format_cv_text(text));
    }

    #[test]
    fn test_is_valid_cv_text() {
        assert!(!is_valid_cv_text(""));
        assert!(!is_valid_cv_text("short"));
        assert!(!is_valid_cv_text(&format!("   {}   ", "a".repeat(49))));
        assert!(is_valid_cv_text(&"A".repeat(60)));
    }
}
