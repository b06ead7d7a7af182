//! Error types for report merging

use std::fmt;
use thiserror::Error;

/// Errors that can occur while building or rendering report templates
#[derive(Debug, Error)]
pub enum MergeError {
    /// Section tags are unbalanced or mismatched; every offending tag is listed
    #[error("Template structure error: {}", join_issues(.issues))]
    TemplateStructure { issues: Vec<TagIssue> },

    /// Tags that could not be resolved against the template data
    #[error("Template could not be filled: {}", join_issues(.issues))]
    Render { issues: Vec<UnresolvedTag> },

    /// Error parsing JSON data
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// A structural problem with one section tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIssue {
    /// Package part the tag was found in
    pub part: String,
    /// What is wrong with the tag
    pub kind: TagIssueKind,
}

/// Kinds of section tag problems
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagIssueKind {
    /// A section was opened but never closed
    Unclosed { name: String },
    /// A section was closed with a different name than the one open
    Mismatched { opened: String, closed: String },
    /// A closing tag appeared with no open section
    UnopenedClose { name: String },
}

impl TagIssue {
    /// Names of the tags involved in this issue
    pub fn tag_names(&self) -> Vec<&str> {
        match &self.kind {
            TagIssueKind::Unclosed { name } | TagIssueKind::UnopenedClose { name } => vec![name],
            TagIssueKind::Mismatched { opened, closed } => vec![opened, closed],
        }
    }
}

impl fmt::Display for TagIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TagIssueKind::Unclosed { name } => write!(f, "unclosed section [{}] ({})", name, self.part),
            TagIssueKind::Mismatched { opened, closed } => write!(
                f,
                "section [{}] closed by [{}] ({})",
                opened, closed, self.part
            ),
            TagIssueKind::UnopenedClose { name } => {
                write!(f, "closing tag [{}] without opening tag ({})", name, self.part)
            }
        }
    }
}

/// A tag whose name resolved to nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTag {
    /// Package part the tag was found in
    pub part: String,
    /// The tag name as written in the template
    pub tag: String,
}

impl fmt::Display for UnresolvedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolved tag [{}] ({})", self.tag, self.part)
    }
}

fn join_issues<T: fmt::Display>(issues: &[T]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
