//! Template data model
//!
//! Two shapes are produced by the data builder: a nested scope of named
//! values and repeated sections for loop-aware templates, and a flat
//! key → text map for literal token templates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value bound to a template key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    /// Rendered text
    Text(String),
    /// Repeated section items
    List(Vec<TemplateScope>),
    /// Named group of values
    Group(TemplateScope),
}

impl TemplateValue {
    /// Whether a section over this value renders nothing
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty() || s == "false",
            Self::List(items) => items.is_empty(),
            Self::Group(scope) => scope.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<TemplateScope>> for TemplateValue {
    fn from(items: Vec<TemplateScope>) -> Self {
        Self::List(items)
    }
}

impl From<TemplateScope> for TemplateValue {
    fn from(scope: TemplateScope) -> Self {
        Self::Group(scope)
    }
}

/// Named values visible to a template or to one repeated section item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateScope {
    values: BTreeMap<String, TemplateValue>,
}

impl TemplateScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a key; a dotted name descends through groups when the exact key
    /// is absent
    pub fn lookup(&self, name: &str) -> Option<&TemplateValue> {
        if let Some(value) = self.values.get(name) {
            return Some(value);
        }
        let (head, rest) = name.split_once('.')?;
        match self.values.get(head)? {
            TemplateValue::Group(inner) => inner.lookup(rest),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(TemplateValue::as_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flat key → text map for literal token substitution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatData {
    values: BTreeMap<String, String>,
}

impl FlatData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Define every listed key, using an empty string for missing ones
    pub fn complete(&mut self, keys: &[&str]) {
        for key in keys {
            self.values.entry((*key).to_string()).or_default();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_lookup_dotted() {
        let scope = TemplateScope::new()
            .with("EVIDENCNI", "RZ-1")
            .with("tech", TemplateScope::new().with("name", "Jan Novák"))
            .with("a.b", "literal");

        assert_eq!(scope.text("EVIDENCNI"), Some("RZ-1"));
        assert_eq!(scope.text("tech.name"), Some("Jan Novák"));
        assert_eq!(scope.text("a.b"), Some("literal"));
        assert_eq!(scope.lookup("tech.missing"), None);
        assert_eq!(scope.lookup("EVIDENCNI.x"), None);
    }

    #[test]
    fn test_value_emptiness() {
        assert!(TemplateValue::from("").is_empty());
        assert!(TemplateValue::from("false").is_empty());
        assert!(!TemplateValue::from("x").is_empty());
        assert!(TemplateValue::List(vec![]).is_empty());
        assert!(!TemplateValue::List(vec![TemplateScope::new()]).is_empty());
    }

    #[test]
    fn test_flat_complete() {
        let mut data = FlatData::new();
        data.insert("A", "1");
        data.complete(&["A", "B"]);
        assert_eq!(data.get("A"), Some("1"));
        assert_eq!(data.get("B"), Some(""));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_scope_serializes_as_plain_json() {
        let scope = TemplateScope::new()
            .with("NAME", "x")
            .with("ITEMS", vec![TemplateScope::new().with("A", "1")]);
        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json, serde_json::json!({ "ITEMS": [{ "A": "1" }], "NAME": "x" }));
    }
}
