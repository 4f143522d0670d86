//! Typed view of a StructuredCV document.
//!
//! The analysis backend produces loosely-shaped JSON: fields may be missing,
//! `null`, numbers instead of strings, or the literal sentinel "Not provided".
//! `StructuredCv::from_value` never fails; anything unusable becomes `None`
//! or is dropped from its list.

use serde_json::{Map, Value};

/// Placeholder the CV parser emits for fields it could not find.
pub const NOT_PROVIDED: &str = "Not provided";

/// Returns the textual content of a scalar JSON value, or `None` when the
/// value is absent, falsy, blank, or the "Not provided" sentinel.
///
/// This is the single place that decides whether a field carries data.
pub fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty() && trimmed != NOT_PROVIDED).then(|| trimmed.to_string())
        }
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// First key in `keys` holding usable text.
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(present_text))
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(present_text).collect())
        .unwrap_or_default()
}

fn object_list<T>(value: Option<&Value>, build: impl Fn(&Map<String, Value>) -> T) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).map(build).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateSpan {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateSpan {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            start: first_text(obj, &["startDate", "start_date", "start"]),
            end: first_text(obj, &["endDate", "end_date", "end"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub links: Vec<String>,
}

impl Contact {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            name: first_text(obj, &["name", "full_name"]),
            email: first_text(obj, &["email"]),
            phone: first_text(obj, &["phone"]),
            location: first_text(obj, &["location"]),
            linkedin: first_text(obj, &["linkedin"]),
            github: first_text(obj, &["github"]),
            website: first_text(obj, &["website"]),
            links: text_list(obj.get("links")),
        }
    }

    /// Profile links in display order: LinkedIn, GitHub, website, then extras.
    pub fn all_links(&self) -> Vec<&str> {
        [&self.linkedin, &self.github, &self.website]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .chain(self.links.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Experience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub dates: DateSpan,
    pub description: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub dates: DateSpan,
    pub gpa: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillGroup {
    /// Raw category key, e.g. `programming_languages`. Empty for an uncategorised list.
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub name: Option<String>,
    pub dates: DateSpan,
    pub description: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub credential: Option<String>,
}

/// An activity or volunteer entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Involvement {
    pub organization: Option<String>,
    pub role: Option<String>,
    pub dates: DateSpan,
    pub description: Option<String>,
}

impl Involvement {
    fn from_object(obj: &Map<String, Value>, role_keys: &[&str]) -> Self {
        Self {
            organization: first_text(obj, &["organization"]),
            role: first_text(obj, role_keys),
            dates: DateSpan::from_object(obj),
            description: first_text(obj, &["description"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtherItem {
    Text(String),
    Entry {
        content: Option<String>,
        subtitle: Option<String>,
        date: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtherBody {
    Items(Vec<OtherItem>),
    Text(String),
    Pairs(Vec<(String, String)>),
}

/// A section the parser could not map onto a standard field.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherSection {
    /// Raw section key, e.g. `vie_associative`.
    pub key: String,
    pub body: OtherBody,
}

impl OtherSection {
    fn from_entry(key: &str, value: &Value) -> Option<Self> {
        let body = match value {
            Value::Array(items) => OtherBody::Items(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(obj) => Some(OtherItem::Entry {
                            content: first_text(obj, &["content", "text", "title"]),
                            subtitle: first_text(obj, &["subtitle", "note"]),
                            date: first_text(obj, &["date"]),
                        }),
                        Value::String(_) => present_text(item).map(OtherItem::Text),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Object(obj) => OtherBody::Pairs(
                obj.iter()
                    .filter_map(|(k, v)| present_text(v).map(|v| (k.clone(), v)))
                    .collect(),
            ),
            other => OtherBody::Text(present_text(other)?),
        };
        Some(Self {
            key: key.to_string(),
            body,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredCv {
    pub contact: Contact,
    pub summary: Option<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<SkillGroup>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub activities: Vec<Involvement>,
    pub volunteer: Vec<Involvement>,
    pub other_sections: Vec<OtherSection>,
}

impl StructuredCv {
    /// Builds the typed view from arbitrary JSON. Non-objects yield an empty CV.
    pub fn from_value(value: &Value) -> Self {
        let Some(cv) = value.as_object() else {
            return Self::default();
        };

        let contact = ["contact", "contacts"]
            .iter()
            .find_map(|key| cv.get(*key).and_then(Value::as_object))
            .map(Contact::from_object)
            .unwrap_or_default();

        Self {
            contact,
            summary: first_text(cv, &["summary", "objective"]),
            experience: object_list(cv.get("experience"), |e| Experience {
                title: first_text(e, &["title"]),
                company: first_text(e, &["company"]),
                location: first_text(e, &["location"]),
                dates: DateSpan::from_object(e),
                description: first_text(e, &["description"]),
                bullets: text_list(e.get("bullets")),
            }),
            education: object_list(cv.get("education"), |e| Education {
                degree: first_text(e, &["degree"]),
                institution: first_text(e, &["institution"]),
                dates: DateSpan::from_object(e),
                gpa: first_text(e, &["gpa"]),
                description: first_text(e, &["description"]),
            }),
            skills: skill_groups(cv.get("skills")),
            projects: object_list(cv.get("projects"), |p| Project {
                name: first_text(p, &["name"]),
                dates: DateSpan::from_object(p),
                description: first_text(p, &["description"]),
                technologies: text_list(p.get("technologies")),
            }),
            certifications: object_list(cv.get("certifications"), |c| Certification {
                name: first_text(c, &["name"]),
                issuer: first_text(c, &["issuer"]),
                date: first_text(c, &["date"]),
                credential: first_text(c, &["credential", "credential_id"]),
            }),
            activities: object_list(cv.get("activities"), |a| {
                Involvement::from_object(a, &["title", "role"])
            }),
            volunteer: object_list(cv.get("volunteer"), |v| {
                Involvement::from_object(v, &["role", "title"])
            }),
            other_sections: cv
                .get("other_sections")
                .and_then(Value::as_object)
                .map(|sections| {
                    sections
                        .iter()
                        .filter_map(|(key, value)| OtherSection::from_entry(key, value))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn skill_groups(value: Option<&Value>) -> Vec<SkillGroup> {
    match value {
        Some(Value::Object(categories)) => categories
            .iter()
            .map(|(category, items)| SkillGroup {
                category: category.clone(),
                items: text_list(Some(items)),
            })
            .filter(|group| !group.items.is_empty())
            .collect(),
        Some(list @ Value::Array(_)) => {
            let items = text_list(Some(list));
            if items.is_empty() {
                vec![]
            } else {
                vec![SkillGroup {
                    category: String::new(),
                    items,
                }]
            }
        }
        _ => vec![],
    }
}
