//! ATS-friendly Markdown export of a StructuredCV.
//!
//! Layout:
//! - bold for section headings and entry names
//! - italics for dates
//! - `- ` entries with `  - ` detail lines
//!
//! Only field values are escaped; the markup around them is ours.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::formatting::escape::escape_md;
use crate::models::cv::{
    Certification, Contact, DateSpan, Education, Experience, Involvement, OtherBody, OtherItem,
    OtherSection, Project, SkillGroup, StructuredCv,
};

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));
static ESCAPED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:\\#){1,6}) ").expect("valid heading regex"));

/// Renders a CV to Markdown. Never fails.
///
/// - `null` → empty string
/// - a string is treated as existing Markdown and sanitised line by line
/// - anything else is read as a StructuredCV (non-objects render as empty)
pub fn generate_markdown_cv(input: &Value) -> String {
    match input {
        Value::Null => String::new(),
        Value::String(markdown) => sanitize_markdown(markdown),
        other => StructuredCv::from_value(other).to_markdown(),
    }
}

impl StructuredCv {
    pub fn to_markdown(&self) -> String {
        let blocks: Vec<String> = [
            contact_block(&self.contact),
            self.summary
                .as_deref()
                .and_then(|s| section("Summary", md(Some(s)).into_iter().collect())),
            section("Experience", flat_map_entries(&self.experience, experience_lines)),
            section("Education", flat_map_entries(&self.education, education_lines)),
            section("Skills", self.skills.iter().filter_map(skill_line).collect()),
            section("Projects", flat_map_entries(&self.projects, project_lines)),
            section(
                "Certifications",
                flat_map_entries(&self.certifications, certification_lines),
            ),
            section(
                "Activities & Associations",
                flat_map_entries(&self.activities, involvement_lines),
            ),
            section(
                "Volunteer Experience",
                flat_map_entries(&self.volunteer, involvement_lines),
            ),
        ]
        .into_iter()
        .flatten()
        .chain(self.other_sections.iter().filter_map(other_section_block))
        .collect();

        finalize(&blocks.join("\n"))
    }
}

/// Escaped value, or `None` if nothing survives cleaning.
fn md<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|v| escape_md(Some(v.as_ref())))
        .filter(|v| !v.is_empty())
}

/// Heading for an `other_sections` key that cleans to nothing.
const FALLBACK_SECTION_TITLE: &str = "Other";

/// `**Title**` followed by its lines; sections without lines are omitted.
fn section(title: &str, lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let title = md(Some(title)).unwrap_or_else(|| FALLBACK_SECTION_TITLE.to_string());
    Some(format!("**{title}**\n\n{}\n", lines.join("\n")))
}

fn flat_map_entries<T>(entries: &[T], render: fn(&T) -> Vec<String>) -> Vec<String> {
    entries.iter().flat_map(render).collect()
}

/// `snake_case_key` → `Snake Case Key`.
pub fn display_name(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn date_text(dates: &DateSpan) -> Option<String> {
    let joined = match (&dates.start, &dates.end) {
        (Some(start), Some(end)) => format!("{start} – {end}"),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => return None,
    };
    md(Some(&joined))
}

/// Builds `- **Primary**, Secondary — *dates*`, dropping whatever is missing.
fn headline(primary: Option<&str>, secondary: Option<&str>, dates: Option<String>) -> Option<String> {
    let mut head = md(primary).map(|p| format!("**{p}**")).unwrap_or_default();
    if let Some(secondary) = md(secondary) {
        if head.is_empty() {
            head = secondary;
        } else {
            head.push_str(&format!(", {secondary}"));
        }
    }
    if let Some(dates) = dates {
        if head.is_empty() {
            head = format!("*{dates}*");
        } else {
            head.push_str(&format!(" — *{dates}*"));
        }
    }
    (!head.is_empty()).then(|| format!("- {head}"))
}

/// An entry is its headline plus nested details. Without a headline the
/// details are promoted to top-level items so the list stays well formed.
fn entry(head: Option<String>, details: Vec<String>) -> Vec<String> {
    match head {
        Some(head) => std::iter::once(head)
            .chain(details.into_iter().map(|d| format!("  - {d}")))
            .collect(),
        None => details.into_iter().map(|d| format!("- {d}")).collect(),
    }
}

fn contact_block(contact: &Contact) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(name) = md(contact.name.as_deref()) {
        lines.push(format!("**{name}**"));
    }

    let mut parts: Vec<String> = [&contact.email, &contact.phone, &contact.location]
        .into_iter()
        .filter_map(|field| md(field.as_deref()))
        .collect();
    let links: Vec<String> = contact
        .all_links()
        .into_iter()
        .filter_map(|link| md(Some(link)))
        .collect();
    if !links.is_empty() {
        parts.push(links.join(" · "));
    }
    if !parts.is_empty() {
        lines.push(parts.join(" | "));
    }

    (!lines.is_empty()).then(|| format!("{}\n", lines.join("\n")))
}

fn experience_lines(exp: &Experience) -> Vec<String> {
    let details = [&exp.location, &exp.description]
        .into_iter()
        .filter_map(|field| md(field.as_deref()))
        .chain(exp.bullets.iter().filter_map(|b| md(Some(b))))
        .collect();
    entry(
        headline(exp.title.as_deref(), exp.company.as_deref(), date_text(&exp.dates)),
        details,
    )
}

fn education_lines(edu: &Education) -> Vec<String> {
    let details = md(edu.gpa.as_deref())
        .map(|gpa| format!("GPA: {gpa}"))
        .into_iter()
        .chain(md(edu.description.as_deref()))
        .collect();
    entry(
        headline(edu.degree.as_deref(), edu.institution.as_deref(), date_text(&edu.dates)),
        details,
    )
}

fn skill_line(group: &SkillGroup) -> Option<String> {
    let items: Vec<String> = group.items.iter().filter_map(|i| md(Some(i))).collect();
    if items.is_empty() {
        return None;
    }
    let items = items.join(", ");
    Some(match md(Some(&display_name(&group.category))) {
        Some(category) => format!("- {category}: {items}"),
        None => format!("- {items}"),
    })
}

fn project_lines(project: &Project) -> Vec<String> {
    let technologies: Vec<String> = project
        .technologies
        .iter()
        .filter_map(|t| md(Some(t)))
        .collect();
    let details = md(project.description.as_deref())
        .into_iter()
        .chain((!technologies.is_empty()).then(|| format!("Technologies: {}", technologies.join(", "))))
        .collect();
    entry(
        headline(project.name.as_deref(), None, date_text(&project.dates)),
        details,
    )
}

fn certification_lines(cert: &Certification) -> Vec<String> {
    let details = md(cert.credential.as_deref())
        .map(|c| format!("Credential: {c}"))
        .into_iter()
        .collect();
    entry(
        headline(cert.name.as_deref(), cert.issuer.as_deref(), md(cert.date.as_deref())),
        details,
    )
}

fn involvement_lines(item: &Involvement) -> Vec<String> {
    entry(
        headline(item.organization.as_deref(), item.role.as_deref(), date_text(&item.dates)),
        md(item.description.as_deref()).into_iter().collect(),
    )
}

fn other_item_line(item: &OtherItem) -> Option<String> {
    match item {
        OtherItem::Text(text) => md(Some(text)).map(|t| format!("- {t}")),
        OtherItem::Entry {
            content,
            subtitle,
            date,
        } => {
            if md(content.as_deref()).is_none() && md(subtitle.as_deref()).is_none() {
                return None;
            }
            headline(content.as_deref(), subtitle.as_deref(), md(date.as_deref()))
        }
    }
}

fn other_section_block(other: &OtherSection) -> Option<String> {
    let lines = match &other.body {
        OtherBody::Items(items) => items.iter().filter_map(other_item_line).collect(),
        OtherBody::Text(text) => md(Some(text)).map(|t| format!("- {t}")).into_iter().collect(),
        OtherBody::Pairs(pairs) => pairs
            .iter()
            .filter_map(|(key, value)| {
                md(Some(value)).map(|v| format!("- {}: {v}", escape_md(Some(key.as_str()))))
            })
            .collect(),
    };
    section(&display_name(&other.key), lines)
}

/// Sanitises free-form Markdown: every line is escaped, then leading heading
/// markers (`#` … `######` followed by a space) are restored. `- ` bullets
/// survive as-is because `-` is never escaped, and leading indentation is
/// kept so nested lists stay nested.
pub fn sanitize_markdown(markdown: &str) -> String {
    let lines: Vec<String> = markdown.lines().map(sanitize_line).collect();
    finalize(&lines.join("\n"))
}

fn sanitize_line(line: &str) -> String {
    let content = line.trim_start();
    let escaped = escape_md(Some(content));
    if escaped.is_empty() {
        return escaped;
    }
    let indent = line[..line.len() - content.len()].replace('\t', "    ");
    let escaped = ESCAPED_HEADING.replace(&escaped, |caps: &regex::Captures| {
        format!("{} ", caps[1].replace(r"\#", "#"))
    });
    format!("{indent}{escaped}")
}

/// Collapses runs of 3+ newlines to a blank line and ends with exactly one newline.
fn finalize(markdown: &str) -> String {
    let collapsed = EXCESS_NEWLINES.replace_all(markdown, "\n\n");
    format!("{}\n", collapsed.trim())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_object_is_single_newline() {
        assert_eq!(generate_markdown_cv(&json!({})), "\n");
    }

    #[test]
    fn test_null_is_empty() {
        assert_eq!(generate_markdown_cv(&Value::Null), "");
    }

    #[test]
    fn test_non_object_input_does_not_panic() {
        assert_eq!(generate_markdown_cv(&json!([1, "two"])), "\n");
        assert_eq!(generate_markdown_cv(&json!(17)), "\n");
    }

    #[test]
    fn test_experience_entry() {
        let md = generate_markdown_cv(&json!({
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "startDate": "2020",
                "endDate": "2022",
                "bullets": ["Shipped X"]
            }]
        }));
        assert!(md.contains("**Experience**"));
        assert!(md.contains("- **Engineer**, Acme — *2020 – 2022*"));
        assert!(md.contains("\n  - Shipped X"));
        assert!(md.ends_with('\n') && !md.ends_with("\n\n"));
    }

    #[test]
    fn test_experience_details_order() {
        let md = generate_markdown_cv(&json!({
            "experience": [{
                "title": "Dev",
                "location": "Berlin",
                "description": "Backend work",
                "bullets": ["One", "", "Two"]
            }]
        }));
        assert!(md.contains("- **Dev**\n  - Berlin\n  - Backend work\n  - One\n  - Two\n"));
    }

    #[test]
    fn test_skills_line() {
        let md = generate_markdown_cv(&json!({"skills": {"technical": ["Python", "Go"]}}));
        assert!(md.lines().any(|l| l == "- Technical: Python, Go"));
    }

    #[test]
    fn test_skill_category_display_name() {
        let md = generate_markdown_cv(&json!({
            "skills": {"programming_languages": ["C++"]}
        }));
        assert!(md.contains(r"- Programming Languages: C\+\+"));
    }

    #[test]
    fn test_not_provided_never_rendered() {
        let np = "Not provided";
        let md = generate_markdown_cv(&json!({
            "contact": {"name": np, "email": np, "phone": np, "location": np, "linkedin": np},
            "summary": np,
            "experience": [{"title": np, "company": np, "location": np, "description": np,
                            "startDate": np, "endDate": np, "bullets": [np]}],
            "education": [{"degree": np, "institution": np, "gpa": np, "description": np}],
            "skills": {"technical": [np]},
            "projects": [{"name": np, "description": np, "technologies": [np]}],
            "certifications": [{"name": np, "issuer": np, "date": np, "credential": np}],
            "activities": [{"organization": np, "title": np, "description": np}],
            "volunteer": [{"organization": np, "role": np, "description": np}],
            "other_sections": {"awards": [np, {"content": np, "date": np}], "misc": np}
        }));
        assert!(!md.contains("Not provided"));
        assert_eq!(md, "\n");
    }

    #[test]
    fn test_no_empty_section_headers() {
        let md = generate_markdown_cv(&json!({
            "experience": [{}],
            "education": [],
            "skills": {"technical": []},
            "other_sections": {"awards": []}
        }));
        assert!(!md.contains("**"));
    }

    #[test]
    fn test_section_order() {
        let md = generate_markdown_cv(&json!({
            "other_sections": {"hobbies": ["Chess"]},
            "volunteer": [{"organization": "Shelter"}],
            "activities": [{"organization": "IEEE"}],
            "certifications": [{"name": "CKA"}],
            "projects": [{"name": "cvlens"}],
            "skills": {"tools": ["Git"]},
            "education": [{"degree": "BSc"}],
            "experience": [{"title": "Dev"}],
            "summary": "Builder",
            "contact": {"name": "Jane"}
        }));
        let order = [
            "**Jane**",
            "**Summary**",
            "**Experience**",
            "**Education**",
            "**Skills**",
            "**Projects**",
            "**Certifications**",
            "**Activities & Associations**",
            "**Volunteer Experience**",
            "**Hobbies**",
        ];
        let positions: Vec<usize> = order.iter().map(|h| md.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{md}");
    }

    #[test]
    fn test_contact_block() {
        let md = generate_markdown_cv(&json!({
            "contact": {
                "name": "Jane Doe",
                "email": "jane@example.com",
                "phone": "+1 555 0100",
                "location": "Paris",
                "linkedin": "linkedin.com/in/jane",
                "github": "github.com/jane"
            }
        }));
        assert_eq!(
            md,
            "**Jane Doe**\njane@example\\.com | \\+1 555 0100 | Paris | linkedin\\.com/in/jane · github\\.com/jane\n"
        );
    }

    #[test]
    fn test_summary_and_objective_alias() {
        let md = generate_markdown_cv(&json!({"objective": "Build *fast* things"}));
        assert_eq!(md, "**Summary**\n\nBuild \\*fast\\* things\n");
    }

    #[test]
    fn test_only_start_date() {
        let md = generate_markdown_cv(&json!({
            "education": [{"degree": "MSc", "institution": "ETH", "startDate": "2021", "gpa": 5.5}]
        }));
        assert!(md.contains("- **MSc**, ETH — *2021*\n  - GPA: 5\\.5"));
    }

    #[test]
    fn test_entry_without_headline_promotes_details() {
        let md = generate_markdown_cv(&json!({"projects": [{"description": "Side project"}]}));
        assert!(md.contains("**Projects**\n\n- Side project\n"));
    }

    #[test]
    fn test_company_without_title() {
        let md = generate_markdown_cv(&json!({"experience": [{"company": "Acme", "endDate": "2020"}]}));
        assert!(md.contains("- Acme — *2020*"));
    }

    #[test]
    fn test_projects_and_certifications() {
        let md = generate_markdown_cv(&json!({
            "projects": [{"name": "cvlens", "description": "CV tooling", "technologies": ["Rust", "axum"]}],
            "certifications": [{"name": "AWS SAA", "issuer": "Amazon", "date": "2023", "credential": "ABC-123"}]
        }));
        assert!(md.contains("- **cvlens**\n  - CV tooling\n  - Technologies: Rust, axum"));
        assert!(md.contains("- **AWS SAA**, Amazon — *2023*\n  - Credential: ABC-123"));
    }

    #[test]
    fn test_activities_and_volunteer() {
        let md = generate_markdown_cv(&json!({
            "activities": [{"organization": "IEEE", "title": "Chair", "startDate": "2019", "endDate": "Present", "description": "Ran meetups"}],
            "volunteer": [{"organization": "Red Cross", "role": "Driver"}]
        }));
        assert!(md.contains("**Activities & Associations**\n\n- **IEEE**, Chair — *2019 – Present*\n  - Ran meetups"));
        assert!(md.contains("**Volunteer Experience**\n\n- **Red Cross**, Driver"));
    }

    #[test]
    fn test_other_sections_rendering() {
        let md = generate_markdown_cv(&json!({
            "other_sections": {
                "vie_associative": [
                    {"content": "Robotics club", "subtitle": "Founder", "date": "2018"},
                    "Chess team"
                ],
                "motto": "Ship it",
                "profiles": {"blog": "blog.dev"}
            }
        }));
        assert!(md.contains("**Vie Associative**\n\n- **Robotics club**, Founder — *2018*\n- Chess team"));
        assert!(md.contains("**Motto**\n\n- Ship it"));
        assert!(md.contains("**Profiles**\n\n- blog: blog\\.dev"));
    }

    #[test]
    fn test_user_content_cannot_inject_markup() {
        let md = generate_markdown_cv(&json!({
            "experience": [{"title": "# Hacker", "bullets": ["[link](http://x)"]}]
        }));
        assert!(md.contains(r"**\# Hacker**"));
        assert!(md.contains(r"\[link\]\(http://x\)"));
    }

    #[test]
    fn test_no_triple_newlines() {
        let md = generate_markdown_cv(&json!({
            "contact": {"name": "A"},
            "summary": "B",
            "experience": [{"title": "C"}],
            "skills": {"x": ["y"]}
        }));
        assert!(!md.contains("\n\n\n"));
        assert!(md.ends_with('\n') && !md.ends_with("\n\n"));
    }

    #[test]
    fn test_string_input_keeps_headings_and_bullets() {
        let md = generate_markdown_cv(&json!("# Jane Doe\n## Experience\n- Built *things* v2.0\nplain (text)"));
        assert_eq!(
            md,
            "# Jane Doe\n## Experience\n- Built \\*things\\* v2\\.0\nplain \\(text\\)\n"
        );
    }

    #[test]
    fn test_string_input_inner_hash_stays_escaped() {
        let md = sanitize_markdown("Skills: C# and F#");
        assert_eq!(md, "Skills: C\\# and F\\#\n");
        assert_eq!(sanitize_markdown("#hashtag"), "\\#hashtag\n");
    }

    #[test]
    fn test_string_input_collapses_blank_lines() {
        assert_eq!(sanitize_markdown("a\n\n\n\nb"), "a\n\nb\n");
    }

    #[test]
    fn test_string_input_keeps_nested_indentation() {
        assert_eq!(
            sanitize_markdown("- parent\n  - child\n\t- tabbed *x*"),
            "- parent\n  - child\n    - tabbed \\*x\\*\n"
        );
    }

    #[test]
    fn test_other_section_with_blank_key_gets_fallback_title() {
        let md = generate_markdown_cv(&json!({"other_sections": {"": ["x"], "_": ["y"]}}));
        assert!(!md.contains("****"), "{md}");
        assert_eq!(md, "**Other**\n\n- x\n\n**Other**\n\n- y\n");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("other_skills"), "Other Skills");
        assert_eq!(display_name("awards"), "Awards");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_deterministic() {
        let cv = json!({"contact": {"name": "A"}, "skills": {"b": ["c"], "a": ["d"]}});
        assert_eq!(generate_markdown_cv(&cv), generate_markdown_cv(&cv));
    }
}
