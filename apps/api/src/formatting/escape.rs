//! Escaping helpers shared by the Markdown generator and the HTML formatter.

/// Markdown escapes, applied in order. Backslash MUST stay first: every later
/// replacement inserts a backslash that must not be escaped again.
const MD_ESCAPES: &[(char, &str)] = &[
    ('\\', "\\\\"),
    ('`', "\\`"),
    ('*', "\\*"),
    ('_', "\\_"),
    ('{', "\\{"),
    ('}', "\\}"),
    ('[', "\\["),
    (']', "\\]"),
    ('(', "\\("),
    (')', "\\)"),
    ('#', "\\#"),
    ('+', "\\+"),
    ('.', "\\."),
    ('!', "\\!"),
    ('|', "\\|"),
    ('>', "\\>"),
];

fn is_stripped_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Normalises user text: drops C0/C1 control characters (newlines and tabs
/// included), collapses whitespace runs to one space, and trims.
pub fn clean_text(value: &str) -> String {
    let stripped: String = value.chars().filter(|c| !is_stripped_control(*c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escapes a user-provided value for safe inclusion in generated Markdown.
///
/// `None` is treated as the empty string. Only field values go through here;
/// markup emitted by the generator itself (`**…**`, `- `) never does.
pub fn escape_md(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    MD_ESCAPES
        .iter()
        .fold(clean_text(value), |acc, (needle, replacement)| {
            acc.replace(*needle, replacement)
        })
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
