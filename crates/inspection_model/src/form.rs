//! Tolerant access to loosely-typed form data
//!
//! Form data arrives from the editing UI as an arbitrary JSON document. Any
//! field may be missing, null, a number where a string was expected, or nested
//! one level deeper than usual. Every accessor here therefore returns an
//! `Option` or an empty collection instead of failing.

use crate::error::{ModelError, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Read-only view over one inspection form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    root: Value,
}

impl FormData {
    /// Wrap an already parsed JSON value
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse form data from a JSON string. The root must be an object.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(data)?;
        if !root.is_object() {
            return Err(ModelError::InvalidRoot(format!(
                "expected a JSON object, got {}",
                json_kind(&root)
            )));
        }
        Ok(Self { root })
    }

    /// Read and parse form data from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The underlying JSON document
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look up a value by key or dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Text of a value, `None` when missing or null
    pub fn text(&self, path: &str) -> Option<String> {
        self.get(path).and_then(value_text)
    }

    /// Trimmed text of a value, `None` when missing, null or blank
    pub fn non_blank(&self, path: &str) -> Option<String> {
        self.get(path).and_then(non_blank_text)
    }

    /// First non-blank value among several paths
    pub fn first_non_blank(&self, paths: &[&str]) -> Option<String> {
        first_non_blank(&self.root, paths)
    }

    /// Array at a path, or an empty slice when absent or not an array
    pub fn list(&self, path: &str) -> &[Value] {
        list_at(&self.root, path)
    }

    /// Non-blank string items of an array
    pub fn str_list(&self, path: &str) -> Vec<String> {
        self.list(path).iter().filter_map(non_blank_text).collect()
    }

    /// Object at a path
    pub fn object(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }

    /// Nested view rooted at a path; an empty form when absent
    pub fn section(&self, path: &str) -> FormData {
        match self.get(path) {
            Some(value) if value.is_object() => FormData::new(value.clone()),
            _ => FormData::default(),
        }
    }
}

impl From<Value> for FormData {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

/// Look up a key in an object, then fall back to dotted-path traversal.
///
/// An exact key match wins, so keys that contain dots themselves stay
/// reachable.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    if let Some(found) = object.get(path) {
        return Some(found);
    }
    if !path.contains('.') {
        return None;
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Array at a path of any JSON value
pub fn list_at<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    match lookup(value, path) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Text of a path of any JSON value
pub fn text_at(value: &Value, path: &str) -> Option<String> {
    lookup(value, path).and_then(value_text)
}

/// Trimmed non-blank text of a path of any JSON value
pub fn non_blank_at(value: &Value, path: &str) -> Option<String> {
    lookup(value, path).and_then(non_blank_text)
}

/// First non-blank text among several paths of any JSON value
pub fn first_non_blank(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| non_blank_at(value, path))
}

/// Convert a JSON value to display text.
///
/// Strings are returned as-is, numbers in their shortest decimal form,
/// booleans as `true`/`false`, containers as compact JSON. Null yields `None`.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => format_number(f),
            _ => n.to_string(),
        }),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Trimmed text of a value, `None` when null or blank
pub fn non_blank_text(value: &Value) -> Option<String> {
    value_text(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Format a finite number the way form values are displayed: integral
/// values without a fractional part, everything else in shortest form.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{}", n)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FormData {
        FormData::new(json!({
            "evidencni": "RZ-2024-01",
            "typRevize": "  ",
            "voltage": 230,
            "ratio": 0.5,
            "conclusion": { "safety": "able", "validUntil": "2027-01-01" },
            "performedTasks": ["Kontrola krytů", "", null, 12],
            "a.b": "literal"
        }))
    }

    #[test]
    fn test_text_and_blank() {
        let form = sample();
        assert_eq!(form.text("evidencni").as_deref(), Some("RZ-2024-01"));
        assert_eq!(form.text("typRevize").as_deref(), Some("  "));
        assert_eq!(form.non_blank("typRevize"), None);
        assert_eq!(form.text("missing"), None);
    }

    #[test]
    fn test_numbers_as_text() {
        let form = sample();
        assert_eq!(form.text("voltage").as_deref(), Some("230"));
        assert_eq!(form.text("ratio").as_deref(), Some("0.5"));
    }

    #[test]
    fn test_dotted_paths() {
        let form = sample();
        assert_eq!(form.text("conclusion.safety").as_deref(), Some("able"));
        assert_eq!(form.text("conclusion.missing"), None);
        assert_eq!(form.text("a.b").as_deref(), Some("literal"));
    }

    #[test]
    fn test_str_list_skips_blank_items() {
        let form = sample();
        assert_eq!(form.str_list("performedTasks"), vec!["Kontrola krytů", "12"]);
        assert!(form.list("evidencni").is_empty());
        assert!(form.list("nothing").is_empty());
    }

    #[test]
    fn test_section_of_missing_path_is_empty() {
        let form = sample();
        assert_eq!(form.section("lps").text("class"), None);
        assert_eq!(form.section("conclusion").text("safety").as_deref(), Some("able"));
    }

    #[test]
    fn test_from_json_str_rejects_non_object() {
        assert!(matches!(
            FormData::from_json_str("[1, 2]"),
            Err(ModelError::InvalidRoot(_))
        ));
        assert!(matches!(
            FormData::from_json_str("{"),
            Err(ModelError::JsonParse(_))
        ));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(15.5), "15.5");
        assert_eq!(format_number(-0.0), "0");
    }
}
