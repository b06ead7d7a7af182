//! XML parsing utilities for package parts

use crate::docx::error::{DocxError, DocxResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// XML reader utilities for parsing DOCX XML content
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader from a string
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Get an attribute value from an event
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected || name_str.ends_with(&format!(":{}", expected))
    }

    /// Visit every start or empty element of a part
    pub fn for_each_element<F>(content: &str, mut visit: F) -> DocxResult<()>
    where
        F: FnMut(&BytesStart),
    {
        let mut reader = Self::from_string(content);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => visit(e),
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::from(e)),
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    /// Read a part to the end, failing on malformed or unbalanced markup
    pub fn check_well_formed(part: &str, content: &str) -> DocxResult<()> {
        let mut reader = Self::from_string(content);
        reader.config_mut().check_end_names = true;
        let mut buf = Vec::new();
        let mut depth = 0usize;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(_)) => depth += 1,
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::XmlParse(format!("{}: {}", part, e))),
                _ => {}
            }
            buf.clear();
        }
        if depth != 0 {
            return Err(DocxError::XmlParse(format!("{}: {} unclosed element(s)", part, depth)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_element() {
        assert!(XmlParser::matches_element(b"p", "p"));
        assert!(XmlParser::matches_element(b"w:p", "p"));
        assert!(!XmlParser::matches_element(b"w:r", "p"));
    }

    #[test]
    fn test_for_each_element_reads_attributes() {
        let xml = r#"<Types><Default Extension="png" ContentType="image/png"/><Override PartName="/a"/></Types>"#;
        let mut extensions = Vec::new();
        XmlParser::for_each_element(xml, |e| {
            if let Some(ext) = XmlParser::get_attribute(e, b"Extension") {
                extensions.push(ext);
            }
        })
        .unwrap();
        assert_eq!(extensions, vec!["png"]);
    }

    #[test]
    fn test_check_well_formed() {
        assert!(XmlParser::check_well_formed("a.xml", "<w:p><w:r><w:t>x</w:t></w:r></w:p>").is_ok());
        assert!(XmlParser::check_well_formed("a.xml", "<w:p><w:r></w:p>").is_err());
        assert!(XmlParser::check_well_formed("a.xml", "<w:p><w:r>").is_err());
    }
}
