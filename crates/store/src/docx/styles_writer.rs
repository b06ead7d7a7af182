//! Styles.xml writer
//!
//! Generates styles.xml from a fixed set of paragraph styles.

use crate::docx::namespaces;
use report_merge::text::escape_xml;

/// A named paragraph style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphStyle {
    pub id: String,
    pub name: String,
    /// Font size in half-points
    pub size: Option<u32>,
    pub bold: bool,
    /// Hex color without `#`
    pub color: Option<String>,
    /// Space before and after, in twips
    pub spacing: Option<(u32, u32)>,
    pub keep_next: bool,
}

impl ParagraphStyle {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            size: None,
            bold: false,
            color: None,
            spacing: None,
            keep_next: false,
        }
    }

    pub fn size(mut self, half_points: u32) -> Self { self.size = Some(half_points); self }
    pub fn bold(mut self) -> Self { self.bold = true; self }
    pub fn color(mut self, color: &str) -> Self { self.color = Some(color.to_string()); self }
    pub fn spacing(mut self, before: u32, after: u32) -> Self { self.spacing = Some((before, after)); self }
    pub fn keep_next(mut self) -> Self { self.keep_next = true; self }
}

/// Writer for styles.xml
#[derive(Debug, Clone)]
pub struct StylesWriter {
    font: String,
    /// Default size in half-points
    size: u32,
    /// Default space after paragraphs, in twips
    after: u32,
    /// Default text color
    color: Option<String>,
    styles: Vec<ParagraphStyle>,
}

impl StylesWriter {
    /// Create a styles writer with the document defaults
    pub fn new(font: &str, size: u32, after: u32) -> Self {
        Self {
            font: font.to_string(),
            size,
            after,
            color: None,
            styles: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: &str) -> Self { self.color = Some(color.to_string()); self }
    pub fn with_style(mut self, style: ParagraphStyle) -> Self { self.styles.push(style); self }

    /// Check if a style id is declared
    pub fn has_style(&self, id: &str) -> bool {
        self.styles.iter().any(|s| s.id == id)
    }

    /// Generate styles.xml content
    pub fn write(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<w:styles xmlns:w="{}" xmlns:r="{}">"#,
            namespaces::W,
            namespaces::R,
        ));
        self.write_doc_defaults(&mut xml);

        xml.push_str(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#);
        xml.push_str(r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/></w:tblPr></w:style>"#);
        for style in &self.styles {
            self.write_style(&mut xml, style);
        }

        xml.push_str("</w:styles>");
        xml
    }

    fn write_doc_defaults(&self, xml: &mut String) {
        let font = escape_xml(&self.font);
        xml.push_str("<w:docDefaults>");
        xml.push_str("<w:rPrDefault><w:rPr>");
        xml.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}" w:eastAsia="{0}"/>"#,
            font
        ));
        if let Some(color) = &self.color {
            xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
        }
        xml.push_str(&format!(r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, self.size));
        xml.push_str(r#"<w:lang w:val="cs-CZ"/>"#);
        xml.push_str("</w:rPr></w:rPrDefault>");
        xml.push_str("<w:pPrDefault><w:pPr>");
        xml.push_str(&format!(r#"<w:spacing w:after="{}"/>"#, self.after));
        xml.push_str("</w:pPr></w:pPrDefault>");
        xml.push_str("</w:docDefaults>");
    }

    fn write_style(&self, xml: &mut String, style: &ParagraphStyle) {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="{}">"#,
            escape_xml(&style.id)
        ));
        xml.push_str(&format!(r#"<w:name w:val="{}"/>"#, escape_xml(&style.name)));
        xml.push_str(r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#);

        if style.keep_next || style.spacing.is_some() {
            xml.push_str("<w:pPr>");
            if style.keep_next {
                xml.push_str("<w:keepNext/>");
            }
            if let Some((before, after)) = style.spacing {
                xml.push_str(&format!(r#"<w:spacing w:before="{}" w:after="{}"/>"#, before, after));
            }
            xml.push_str("</w:pPr>");
        }

        if style.bold || style.color.is_some() || style.size.is_some() {
            xml.push_str("<w:rPr>");
            if style.bold {
                xml.push_str("<w:b/><w:bCs/>");
            }
            if let Some(color) = &style.color {
                xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
            }
            if let Some(size) = style.size {
                xml.push_str(&format!(r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size));
            }
            xml.push_str("</w:rPr>");
        }

        xml.push_str("</w:style>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::XmlParser;

    #[test]
    fn test_styles_xml() {
        let writer = StylesWriter::new("Calibri", 22, 120)
            .with_color("0F172A")
            .with_style(ParagraphStyle::new("Title", "Title").size(40).bold())
            .with_style(ParagraphStyle::new("SectionHeading", "Section Heading").size(28).bold().spacing(220, 120).keep_next());
        let xml = writer.write();

        assert!(xml.contains(r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri" w:eastAsia="Calibri"/>"#));
        assert!(xml.contains(r#"<w:spacing w:after="120"/>"#));
        assert!(xml.contains(r#"w:styleId="SectionHeading"><w:name w:val="Section Heading"/>"#));
        assert!(xml.contains(r#"<w:pPr><w:keepNext/><w:spacing w:before="220" w:after="120"/></w:pPr>"#));
        assert!(writer.has_style("Title"));
        assert!(!writer.has_style("Muted"));
        XmlParser::check_well_formed("word/styles.xml", &xml).unwrap();
    }
}
