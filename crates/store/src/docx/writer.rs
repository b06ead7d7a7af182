//! DOCX writer
//!
//! Assembles a complete package from written blocks: document, styles,
//! settings, optional header and footer, media and the relationship and
//! content type parts that tie them together.

use crate::docx::content_types::create_report_content_types;
use crate::docx::document_writer::{DocumentWriter, SectionLayout};
use crate::docx::drawing::{DrawingSize, InlineDrawing};
use crate::docx::elements::Block;
use crate::docx::error::DocxResult;
use crate::docx::sketch::SketchImage;
use crate::docx::package::{DocxPackage, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::docx::reader::XmlParser;
use crate::docx::relationship_types;
use crate::docx::relationships::{create_root_rels, Relationships, TargetMode};
use crate::docx::styles_writer::StylesWriter;

const HEADER_PART: &str = "word/header1.xml";
const FOOTER_PART: &str = "word/footer1.xml";

/// Main DOCX writer
#[derive(Debug)]
pub struct DocxWriter {
    styles: StylesWriter,
    section: SectionLayout,
    doc_rels: Relationships,
    header: Option<Vec<Block>>,
    footer: Option<Vec<Block>>,
    media: Vec<(String, Vec<u8>)>,
    next_drawing_id: u32,
}

impl DocxWriter {
    /// Create a new DOCX writer
    pub fn new(styles: StylesWriter) -> Self {
        let mut doc_rels = Relationships::new();
        doc_rels.add(relationship_types::STYLES, "styles.xml", TargetMode::Internal);
        doc_rels.add(relationship_types::SETTINGS, "settings.xml", TargetMode::Internal);
        Self {
            styles,
            section: SectionLayout::default(),
            doc_rels,
            header: None,
            footer: None,
            media: Vec::new(),
            next_drawing_id: 1,
        }
    }

    pub fn section(&self) -> &SectionLayout {
        &self.section
    }

    pub fn set_header(&mut self, blocks: Vec<Block>) {
        self.header = Some(blocks);
    }

    pub fn set_footer(&mut self, blocks: Vec<Block>) {
        self.footer = Some(blocks);
    }

    /// Store an image in the package and return a drawing referencing it
    pub fn add_image(&mut self, image: &SketchImage, size: DrawingSize, name: &str) -> InlineDrawing {
        let file = format!("image{}.{}", self.media.len() + 1, image.extension());
        let rel_id = self.doc_rels.add(
            relationship_types::IMAGE,
            &format!("media/{}", file),
            TargetMode::Internal,
        );
        self.media.push((format!("word/media/{}", file), image.bytes().to_vec()));

        let doc_pr_id = self.next_drawing_id;
        self.next_drawing_id += 1;
        InlineDrawing {
            rel_id,
            doc_pr_id,
            size,
            name: name.to_string(),
            description: None,
        }
    }

    /// Write the package around `body`
    pub fn finish(mut self, body: &[Block]) -> DocxResult<DocxPackage> {
        let writer = DocumentWriter::new();

        let header = self.header.take().map(|blocks| writer.write_header(&blocks));
        if header.is_some() {
            self.section.header_rel =
                Some(self.doc_rels.add(relationship_types::HEADER, "header1.xml", TargetMode::Internal));
        }
        let footer = self.footer.take().map(|blocks| writer.write_footer(&blocks));
        if footer.is_some() {
            self.section.footer_rel =
                Some(self.doc_rels.add(relationship_types::FOOTER, "footer1.xml", TargetMode::Internal));
        }
        let document = writer.write(body, &self.section);
        XmlParser::check_well_formed(DOCUMENT_PART, &document)?;

        let extensions: Vec<String> = self
            .media
            .iter()
            .filter_map(|(part, _)| part.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
            .collect();
        let extension_refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
        let content_types = create_report_content_types(header.is_some(), footer.is_some(), &extension_refs);

        let mut package = DocxPackage::new();
        package.set_part_text(CONTENT_TYPES_PART, content_types.to_xml());
        package.set_part_text("_rels/.rels", create_root_rels().to_xml());
        package.set_part_text(DOCUMENT_PART, document);
        package.set_part_text("word/styles.xml", self.styles.write());
        package.set_part_text("word/settings.xml", generate_settings_xml());
        if let Some(header) = header {
            package.set_part_text(HEADER_PART, header);
        }
        if let Some(footer) = footer {
            package.set_part_text(FOOTER_PART, footer);
        }
        package.set_part_text(DOCUMENT_RELS_PART, self.doc_rels.to_xml());
        for (part, data) in self.media {
            package.set_part(&part, data);
        }

        tracing::debug!(parts = package.part_names().len(), "assembled package");
        Ok(package)
    }
}

/// Generate a minimal settings.xml
pub fn generate_settings_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:updateFields w:val="true"/><w:defaultTabStop w:val="708"/><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat></w:settings>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::content_types::ContentTypes;
    use crate::docx::elements::{Paragraph, Run};

    #[test]
    fn test_minimal_package() {
        let writer = DocxWriter::new(StylesWriter::new("Calibri", 22, 120));
        let package = writer.finish(&[Paragraph::text("Hello").into()]).unwrap();
        assert!(package.is_valid_docx());
        assert_eq!(
            package.part_names(),
            vec![
                CONTENT_TYPES_PART,
                "_rels/.rels",
                DOCUMENT_PART,
                "word/styles.xml",
                "word/settings.xml",
                DOCUMENT_RELS_PART,
            ]
        );
        let rels = Relationships::parse(&package.part_text(DOCUMENT_RELS_PART).unwrap()).unwrap();
        assert!(rels.get_by_type(relationship_types::STYLES).is_some());
        assert!(rels.get_by_type(relationship_types::HEADER).is_none());
    }

    #[test]
    fn test_header_footer_and_image() {
        let mut writer = DocxWriter::new(StylesWriter::new("Calibri", 22, 120));
        writer.set_header(vec![Paragraph::text("Evidenční číslo: 1").into()]);
        writer.set_footer(vec![Paragraph::text("Strana").into()]);
        let image = SketchImage::new("jpeg", vec![1, 2]);
        let drawing = writer.add_image(&image, DrawingSize { cx: 10, cy: 10 }, "Nákres");
        assert_eq!(drawing.rel_id, "rId3");
        assert_eq!(drawing.doc_pr_id, 1);

        let package = writer.finish(&[Paragraph::new().run(Run::drawing(drawing)).into()]).unwrap();
        assert_eq!(package.part("word/media/image1.jpg"), Some(&[1u8, 2][..]));

        let rels = Relationships::parse(&package.part_text(DOCUMENT_RELS_PART).unwrap()).unwrap();
        assert_eq!(rels.get("rId3").unwrap().target, "media/image1.jpg");
        assert_eq!(rels.get_by_type(relationship_types::HEADER).unwrap().id, "rId4");
        assert_eq!(rels.get_by_type(relationship_types::FOOTER).unwrap().id, "rId5");

        let document = package.part_text(DOCUMENT_PART).unwrap();
        assert!(document.contains(r#"<w:headerReference w:type="default" r:id="rId4"/>"#));
        assert!(document.contains(r#"<w:footerReference w:type="default" r:id="rId5"/>"#));

        let types = ContentTypes::parse(&package.part_text(CONTENT_TYPES_PART).unwrap()).unwrap();
        assert_eq!(types.defaults.get("jpg").map(String::as_str), Some("image/jpeg"));
        assert!(types.overrides.contains_key("/word/footer1.xml"));
    }
}
