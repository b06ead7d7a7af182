//! DOCX package handling
//!
//! A DOCX file is a ZIP archive containing XML files:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `word/document.xml` - Main document content
//! - `word/styles.xml` - Style definitions
//! - `word/header1.xml`, `word/footer1.xml` - Page header and footer
//! - `word/_rels/document.xml.rels` - Document relationships
//! - `word/media/` - Embedded images
//!
//! Templates are read into a [`DocxPackage`], patched through
//! [`PackagePatcher`] and written back. Documents built from scratch go
//! through [`DocxWriter`].

mod content_types;
mod document_writer;
mod drawing;
mod elements;
mod error;
mod package;
mod patcher;
mod reader;
mod relationships;
mod sketch;
mod styles_writer;
mod tables_writer;
mod writer;

pub use content_types::{ensure_default, image_content_type, ContentTypes};
pub use document_writer::{DocumentWriter, SectionLayout};
pub use drawing::{next_drawing_id, DrawingSize, InlineDrawing, PixelSize, SketchSizing, EMU_PER_PIXEL};
pub use elements::{
    Alignment, Block, Border, Cell, FieldCode, Margins, Paragraph, Row, Run, RunContent, RunProps,
    Table, Width,
};
pub use error::{DocxError, DocxResult};
pub use sketch::SketchImage;
pub use package::{DocxPackage, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
pub use patcher::{EmbedOutcome, PackagePatcher, PlaceholderTarget, TextualPatcher};
pub use reader::XmlParser;
pub use relationships::{append_relationship, Relationship, Relationships, TargetMode};
pub use styles_writer::{ParagraphStyle, StylesWriter};
pub use tables_writer::TableWriter;
pub use writer::DocxWriter;

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Relationships namespace
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// DrawingML namespace
    pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    /// WordprocessingML Drawing namespace
    pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
    /// Picture namespace
    pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const SETTINGS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
}

/// Content types for DOCX parts
pub mod content_type_values {
    pub const DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    pub const SETTINGS: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
    pub const FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
}
