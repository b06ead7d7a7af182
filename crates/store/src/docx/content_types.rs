//! [Content_Types].xml parsing, generation and patching
//!
//! Every part of a package needs a content type, either through a default
//! keyed by file extension or through an override for the exact part name.

use crate::docx::content_type_values;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use std::collections::BTreeMap;

/// The content types part of a package
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Default content types by extension (e.g., "xml" -> "application/xml")
    pub defaults: BTreeMap<String, String>,
    /// Override content types by part name (e.g., "/word/document.xml" -> "...")
    pub overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    /// Create a new ContentTypes with the rels and xml defaults
    pub fn new() -> Self {
        let mut ct = Self::default();
        ct.defaults.insert("rels".to_string(), content_type_values::RELATIONSHIPS.to_string());
        ct.defaults.insert("xml".to_string(), "application/xml".to_string());
        ct
    }

    /// Parse [Content_Types].xml from its content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::default();
        XmlParser::for_each_element(content, |e| {
            let name = e.name();
            if XmlParser::matches_element(name.as_ref(), "Default") {
                if let (Some(ext), Some(ct)) = (
                    XmlParser::get_attribute(e, b"Extension"),
                    XmlParser::get_attribute(e, b"ContentType"),
                ) {
                    result.defaults.insert(ext.to_lowercase(), ct);
                }
            } else if XmlParser::matches_element(name.as_ref(), "Override") {
                if let (Some(part), Some(ct)) = (
                    XmlParser::get_attribute(e, b"PartName"),
                    XmlParser::get_attribute(e, b"ContentType"),
                ) {
                    result.overrides.insert(part, ct);
                }
            }
        })?;
        Ok(result)
    }

    /// Whether a default is declared for the extension (case-insensitive)
    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.contains_key(&extension.to_lowercase())
    }

    /// Add a default for an extension
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults.insert(extension.to_lowercase(), content_type.to_string());
    }

    /// Add an override for a specific part
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        let normalized = if part_name.starts_with('/') {
            part_name.to_string()
        } else {
            format!("/{}", part_name)
        };
        self.overrides.insert(normalized, content_type.to_string());
    }

    /// Generate XML content for [Content_Types].xml
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(r#"<Default Extension="{}" ContentType="{}"/>"#, ext, ct));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, part, ct));
        }

        xml.push_str("</Types>");
        xml
    }
}

/// Content type of an image file extension
pub fn image_content_type(extension: &str) -> String {
    match extension.to_lowercase().as_str() {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "gif" => "image/gif".to_string(),
        "bmp" => "image/bmp".to_string(),
        other => format!("image/{}", other),
    }
}

/// Declare a default for `extension` in existing content types text.
///
/// Returns `None` when the extension is already declared; otherwise the new
/// text with one `Default` element added before the closing tag. The rest of
/// the part is left byte for byte.
pub fn ensure_default(content: &str, extension: &str, content_type: &str) -> DocxResult<Option<String>> {
    if ContentTypes::parse(content)?.has_default(extension) {
        return Ok(None);
    }
    let element = format!(
        r#"<Default Extension="{}" ContentType="{}"/>"#,
        extension.to_lowercase(),
        content_type
    );
    let pos = content.rfind("</Types>").ok_or_else(|| {
        DocxError::CorruptPackage("[Content_Types].xml has no closing Types element".to_string())
    })?;
    Ok(Some(format!("{}{}{}", &content[..pos], element, &content[pos..])))
}

/// Content types of a package written from scratch
pub fn create_report_content_types(has_header: bool, has_footer: bool, image_extensions: &[&str]) -> ContentTypes {
    let mut ct = ContentTypes::new();
    ct.add_override("/word/document.xml", content_type_values::DOCUMENT);
    ct.add_override("/word/styles.xml", content_type_values::STYLES);
    ct.add_override("/word/settings.xml", content_type_values::SETTINGS);
    if has_header {
        ct.add_override("/word/header1.xml", content_type_values::HEADER);
    }
    if has_footer {
        ct.add_override("/word/footer1.xml", content_type_values::FOOTER);
    }
    for ext in image_extensions {
        ct.add_default(ext, &image_content_type(ext));
    }
    ct
}
