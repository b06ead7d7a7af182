//! In-memory DOCX package
//!
//! The package is read once from bytes, handed through the patch and render
//! steps by exclusive reference, and serialized once at the end.

use crate::docx::error::{DocxError, DocxResult};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Relationships of the main document part
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
/// Content types part
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// One member of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// A DOCX package held in memory, parts kept in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxPackage {
    parts: Vec<Part>,
}

impl DocxPackage {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package from archive bytes.
    ///
    /// Fails with [`DocxError::CorruptPackage`] when the bytes are not a zip
    /// archive or lack the content types or main document part.
    pub fn from_bytes(bytes: &[u8]) -> DocxResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocxError::CorruptPackage(format!("not a zip archive: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| DocxError::CorruptPackage(format!("unreadable entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        let package = Self { parts };
        if !package.is_valid_docx() {
            return Err(DocxError::CorruptPackage(format!(
                "archive lacks {} or {}",
                CONTENT_TYPES_PART, DOCUMENT_PART
            )));
        }
        tracing::debug!(parts = package.parts.len(), "read package");
        Ok(package)
    }

    /// Check if this is a valid DOCX file
    pub fn is_valid_docx(&self) -> bool {
        self.contains(CONTENT_TYPES_PART) && self.contains(DOCUMENT_PART)
    }

    /// Check if a part exists
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Names of all parts in archive order
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    /// Names of the XML parts (`.xml` and `.rels`)
    pub fn xml_part_names(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter(|p| is_xml_part(&p.name))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Raw bytes of a part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.iter().find(|p| p.name == name).map(|p| p.data.as_slice())
    }

    /// Read a part as text
    pub fn part_text(&self, name: &str) -> DocxResult<String> {
        let data = self
            .part(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        Ok(String::from_utf8(data.to_vec())?)
    }

    /// Read a part as text if it exists
    pub fn optional_part_text(&self, name: &str) -> DocxResult<Option<String>> {
        match self.part(name) {
            Some(data) => Ok(Some(String::from_utf8(data.to_vec())?)),
            None => Ok(None),
        }
    }

    /// Replace or append a part
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Replace or append a text part
    pub fn set_part_text(&mut self, name: &str, text: impl Into<String>) {
        self.set_part(name, text.into().into_bytes());
    }

    /// Serialize the package; XML parts are deflated, binary parts stored
    pub fn to_bytes(&self) -> DocxResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            let method = if is_xml_part(&part.name) {
                zip::CompressionMethod::Deflated
            } else {
                zip::CompressionMethod::Stored
            };
            let options = SimpleFileOptions::default().compression_method(method);
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

fn is_xml_part(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".rels")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> DocxPackage {
        let mut package = DocxPackage::new();
        package.set_part_text(CONTENT_TYPES_PART, "<Types/>");
        package.set_part_text(DOCUMENT_PART, "<w:document/>");
        package.set_part("word/media/a.png", vec![0x89, b'P', b'N', b'G']);
        package
    }

    #[test]
    fn test_roundtrip_keeps_parts_and_order() {
        let package = minimal();
        let bytes = package.to_bytes().unwrap();
        let read = DocxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(read, package);
        assert_eq!(
            read.part_names(),
            vec![CONTENT_TYPES_PART, DOCUMENT_PART, "word/media/a.png"]
        );
    }

    #[test]
    fn test_not_a_zip_is_corrupt() {
        let err = DocxPackage::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, DocxError::CorruptPackage(_)));
    }

    #[test]
    fn test_zip_without_document_is_corrupt() {
        let mut package = DocxPackage::new();
        package.set_part_text(CONTENT_TYPES_PART, "<Types/>");
        let bytes = package.to_bytes().unwrap();
        assert!(matches!(
            DocxPackage::from_bytes(&bytes),
            Err(DocxError::CorruptPackage(_))
        ));
    }

    #[test]
    fn test_missing_part() {
        let package = minimal();
        assert!(matches!(
            package.part_text("word/header1.xml"),
            Err(DocxError::MissingPart(_))
        ));
        assert_eq!(package.optional_part_text("word/header1.xml").unwrap(), None);
    }

    #[test]
    fn test_set_part_replaces_in_place() {
        let mut package = minimal();
        package.set_part_text(DOCUMENT_PART, "<w:document><w:body/></w:document>");
        assert_eq!(package.part_names().len(), 3);
        assert_eq!(package.part_text(DOCUMENT_PART).unwrap(), "<w:document><w:body/></w:document>");
        assert_eq!(package.xml_part_names(), vec![CONTENT_TYPES_PART, DOCUMENT_PART]);
    }
}
