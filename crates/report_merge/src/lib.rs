//! Report Merge
//!
//! Turns inspection form data into template data and renders it into the XML
//! parts of a report template.
//!
//! # Features
//!
//! - Typed views of the electrical installation (RZ) and lightning
//!   protection (LPS) reports with the defaulting and labelling rules applied
//! - Sectioned template data for loop-aware `{{…}}` templates
//! - Flat key catalogue data for literal `[[KEY]]` templates
//! - Section pairing validation that reports every offending tag
//! - Board component lines built from flattened component trees
//!
//! # Example
//!
//! ```ignore
//! use inspection_model::FormData;
//! use report_merge::{RzInput, RzReport, SectionRenderer};
//!
//! let form = FormData::from_json_str(r#"{"evidencni": "RZ-1"}"#)?;
//! let report = RzReport::build(&RzInput::from_form(form));
//! let xml = SectionRenderer::default().render(
//!     "word/document.xml",
//!     "<w:t>{{EVIDENCNI}}</w:t>",
//!     &report.to_template_scope(),
//! )?;
//! ```

pub mod board;
pub mod catalogue;
pub mod classify;
mod error;
pub mod model;
pub mod render;
pub mod report;
pub mod text;

pub use board::{BoardView, ComponentLine};
pub use catalogue::{SectionKeys, LPS_KEYS, LPS_SKETCH_TOKEN, RZ_SCALAR_KEYS, RZ_SECTIONS};
pub use classify::{SafetyVerdict, VerdictSubject};
pub use error::{MergeError, Result, TagIssue, TagIssueKind, UnresolvedTag};
pub use model::{FlatData, TemplateScope, TemplateValue};
pub use render::{substitute_tokens, Delimiters, RenderOptions, SectionRenderer};
pub use report::{LpsReport, ReportKind, RzInput, RzReport};
