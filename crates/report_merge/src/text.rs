//! Text normalization helpers shared by every report surface

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Placeholder shown for missing values in typographic output
pub const DASH: &str = "—";
/// Placeholder shown for missing values in plain output
pub const DASH_ASCII: &str = "-";

fn non_blank<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trimmed value, or `—` when missing or blank
pub fn dash<S: AsRef<str>>(value: Option<S>) -> String {
    non_blank(value).unwrap_or_else(|| DASH.to_string())
}

/// Trimmed value, or `-` when missing or blank
pub fn dash_ascii<S: AsRef<str>>(value: Option<S>) -> String {
    non_blank(value).unwrap_or_else(|| DASH_ASCII.to_string())
}

/// `a, b, c`, or `—` for an empty list
pub fn list_or_dash<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return DASH.to_string();
    }
    items.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ")
}

/// `1. a  2. b`, or `-` for an empty list
pub fn numbered_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return DASH_ASCII.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Numbered items on separate lines, or `-` for an empty list
pub fn numbered_lines<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return DASH_ASCII.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format an ISO date as `DD.MM.YYYY`.
///
/// Accepts `YYYY-MM-DD` as well as full timestamps; anything else is returned
/// unchanged. Blank input yields `-`.
pub fn format_date<S: AsRef<str>>(value: Option<S>) -> String {
    let Some(raw) = non_blank(value) else {
        return DASH_ASCII.to_string();
    };

    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(&raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|dt| dt.date())
        });

    match date {
        Some(d) => d.format("%d.%m.%Y").to_string(),
        None => raw,
    }
}

/// Remove markup tags and decode the common character entities
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&nbsp;", "\u{00A0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Escape text for inclusion in XML character data or attribute values
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make a string safe to use inside a file name
pub fn sanitize_file_id(id: &str) -> String {
    id.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}
