//! Relationships (.rels) parsing, generation and id allocation
//!
//! A part refers to images, headers and other parts through relationship ids
//! declared in its `.rels` companion.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use crate::docx::relationship_types;

/// A single relationship in a .rels file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Collection of relationships from a .rels file, in document order
#[derive(Debug, Clone)]
pub struct Relationships {
    relationships: Vec<Relationship>,
    /// One past the highest numeric `rIdN` seen or issued
    next_id: u64,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationships {
    /// Create a new empty relationships collection
    pub fn new() -> Self {
        Self {
            relationships: Vec::new(),
            next_id: 1,
        }
    }

    /// Parse a .rels file from its XML content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::new();
        let mut max_id = 0u64;
        let mut missing = None;

        XmlParser::for_each_element(content, |e| {
            if !XmlParser::matches_element(e.name().as_ref(), "Relationship") {
                return;
            }
            let id = XmlParser::get_attribute(e, b"Id");
            let rel_type = XmlParser::get_attribute(e, b"Type");
            let target = XmlParser::get_attribute(e, b"Target");
            let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) else {
                missing.get_or_insert("Relationship missing Id, Type or Target");
                return;
            };
            let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                .map(|m| if m == "External" { TargetMode::External } else { TargetMode::Internal })
                .unwrap_or_default();

            match numeric_id(&id) {
                Ok(Some(num)) => max_id = max_id.max(num),
                Ok(None) => {}
                Err(()) => {
                    missing.get_or_insert("Relationship id out of range");
                }
            }
            result.relationships.push(Relationship {
                id,
                rel_type,
                target,
                target_mode,
            });
        })?;

        if let Some(message) = missing {
            return Err(DocxError::CorruptPackage(message.to_string()));
        }
        result.next_id = max_id
            .checked_add(1)
            .ok_or_else(|| DocxError::CorruptPackage("no relationship id left above the highest one".to_string()))?;
        Ok(result)
    }

    /// The id the next [`add`](Self::add) will issue
    pub fn next_id(&self) -> String {
        format!("rId{}", self.next_id)
    }

    /// Add a relationship and return its ID
    pub fn add(&mut self, rel_type: &str, target: &str, target_mode: TargetMode) -> String {
        let id = self.next_id();
        self.next_id = self.next_id.saturating_add(1);
        self.relationships.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode,
        });
        id
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Get a relationship by type
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    /// Get all relationships
    pub fn all(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Generate XML content for the .rels file
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        for rel in &self.relationships {
            xml.push_str(&relationship_element(rel));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Numeric part of an `rIdN` id; `Err` when the digits do not fit a `u64`
fn numeric_id(id: &str) -> Result<Option<u64>, ()> {
    let Some(digits) = id.strip_prefix("rId") else {
        return Ok(None);
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    digits.parse::<u64>().map(Some).map_err(|_| ())
}

/// Position of the `/>` closing a childless `<Relationships .../>`
fn empty_root_end(content: &str) -> Option<usize> {
    let start = content.find("<Relationships")?;
    let close = start + content[start..].find('>')?;
    (content.as_bytes()[close - 1] == b'/').then_some(close - 1)
}

fn relationship_element(rel: &Relationship) -> String {
    let mut xml = format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}""#,
        rel.id, rel.rel_type, rel.target
    );
    if rel.target_mode == TargetMode::External {
        xml.push_str(r#" TargetMode="External""#);
    }
    xml.push_str("/>");
    xml
}

/// Append an internal relationship to existing .rels text.
///
/// The id is allocated from the ids present in `content` itself. When
/// `content` is `None` a fresh relationships part is produced. Returns the new
/// id and the patched text; existing entries are left byte for byte.
pub fn append_relationship(
    content: Option<&str>,
    rel_type: &str,
    target: &str,
) -> DocxResult<(String, String)> {
    let Some(content) = content else {
        let mut rels = Relationships::new();
        let id = rels.add(rel_type, target, TargetMode::Internal);
        return Ok((id, rels.to_xml()));
    };

    let rels = Relationships::parse(content)?;
    let rel = Relationship {
        id: rels.next_id(),
        rel_type: rel_type.to_string(),
        target: target.to_string(),
        target_mode: TargetMode::Internal,
    };
    let element = relationship_element(&rel);

    let patched = if let Some(pos) = content.rfind("</Relationships>") {
        format!("{}{}{}", &content[..pos], element, &content[pos..])
    } else if let Some(end) = empty_root_end(content) {
        format!("{}>{}</Relationships>{}", &content[..end], element, &content[end + 2..])
    } else {
        return Err(DocxError::CorruptPackage(
            "relationships part has no Relationships element".to_string(),
        ));
    };
    Ok((rel.id, patched))
}

/// Create the root .rels file for a new DOCX
pub fn create_root_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_types::DOCUMENT, "word/document.xml", TargetMode::Internal);
    rels
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId12" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/><Relationship Id="custom" Type="x" Target="y"/></Relationships>"#;

    #[test]
    fn test_relationships_parsing() {
        let rels = Relationships::parse(RELS).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels.get("rId5").unwrap().target, "styles.xml");
        assert_eq!(rels.get("rId12").unwrap().target_mode, TargetMode::External);
    }

    #[test]
    fn test_next_id_is_above_highest() {
        let rels = Relationships::parse(RELS).unwrap();
        assert_eq!(rels.next_id(), "rId13");
    }

    #[test]
    fn test_add_relationship() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(relationship_types::DOCUMENT, "word/document.xml", TargetMode::Internal), "rId1");
        assert_eq!(rels.add(relationship_types::STYLES, "styles.xml", TargetMode::Internal), "rId2");
        assert!(rels.get("rId2").is_some());
    }

    #[test]
    fn test_append_relationship() {
        let (id, patched) = append_relationship(Some(RELS), relationship_types::IMAGE, "media/lps_sketch.png").unwrap();
        assert_eq!(id, "rId13");
        assert!(patched.starts_with(&RELS[..RELS.len() - "</Relationships>".len()]));
        let reparsed = Relationships::parse(&patched).unwrap();
        assert_eq!(reparsed.get("rId13").unwrap().target, "media/lps_sketch.png");
        assert_eq!(reparsed.next_id(), "rId14");
    }

    #[test]
    fn test_ids_past_u32_range() {
        let rels = r#"<Relationships><Relationship Id="rId4294967295" Type="x" Target="y"/></Relationships>"#;
        let (id, patched) = append_relationship(Some(rels), relationship_types::IMAGE, "media/a.png").unwrap();
        assert_eq!(id, "rId4294967296");
        assert_eq!(Relationships::parse(&patched).unwrap().next_id(), "rId4294967297");
    }

    #[test]
    fn test_exhausted_ids_are_rejected() {
        for id in ["rId18446744073709551615", "rId99999999999999999999999"] {
            let rels = format!(r#"<Relationships><Relationship Id="{}" Type="x" Target="y"/></Relationships>"#, id);
            let err = append_relationship(Some(&rels), relationship_types::IMAGE, "media/a.png").unwrap_err();
            assert!(matches!(err, DocxError::CorruptPackage(_)));
        }
    }

    #[test]
    fn test_append_to_missing_part() {
        let (id, xml) = append_relationship(None, relationship_types::IMAGE, "media/a.png").unwrap();
        assert_eq!(id, "rId1");
        assert_eq!(Relationships::parse(&xml).unwrap().len(), 1);
    }

    #[test]
    fn test_append_to_empty_element() {
        let empty = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#;
        let (id, xml) = append_relationship(Some(empty), relationship_types::IMAGE, "media/a.png").unwrap();
        assert_eq!(id, "rId1");
        assert!(xml.ends_with("</Relationships>"));
        assert_eq!(Relationships::parse(&xml).unwrap().len(), 1);
    }

    #[test]
    fn test_roundtrip_keeps_order() {
        let mut rels = create_root_rels();
        rels.add(relationship_types::STYLES, "word/styles.xml", TargetMode::Internal);
        let parsed = Relationships::parse(&rels.to_xml()).unwrap();
        let ids: Vec<_> = parsed.all().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId1", "rId2"]);
    }
}
