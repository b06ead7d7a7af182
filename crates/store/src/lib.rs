//! Store - DOCX package I/O and report document export
//!
//! This crate reads and writes DOCX packages, patches report templates in
//! place, lays out reports without a template, fetches template packages and
//! persists the exporter settings.

pub mod api;
pub mod docx;
pub mod export;
mod settings;
mod source;

pub use api::{generate_lps, generate_rz, GeneratedReport, ReportExporter};
pub use settings::*;
pub use source::TemplateSource;

// Re-export DOCX functionality
pub use docx::{
    DocxError, DocxPackage, DocxResult, EmbedOutcome, PackagePatcher, PlaceholderTarget,
    SketchImage, SketchSizing, TextualPatcher,
};

pub use export::{
    build_lps_document, build_rz_document, fill_lps_template, fill_rz_template, SketchOutcome,
};
