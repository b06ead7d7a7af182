//! Document.xml, header and footer writer
//!
//! Serializes [`Block`]s into WordprocessingML.

use crate::docx::elements::{Block, Paragraph, Run, RunContent, RunProps};
use crate::docx::namespaces;
use crate::docx::tables_writer::TableWriter;
use report_merge::text::escape_xml;

/// A4 portrait page with its margins, all in twips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    pub page_width: u32,
    pub page_height: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub header_distance: u32,
    pub footer_distance: u32,
    /// Relationship id of the default header
    pub header_rel: Option<String>,
    /// Relationship id of the default footer
    pub footer_rel: Option<String>,
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self {
            page_width: 11906,
            page_height: 16838,
            margin_top: 1134,
            margin_bottom: 1134,
            margin_left: 850,
            margin_right: 850,
            header_distance: 567,
            footer_distance: 567,
            header_rel: None,
            footer_rel: None,
        }
    }
}

impl SectionLayout {
    /// Width between the side margins
    pub fn text_width(&self) -> u32 {
        self.page_width.saturating_sub(self.margin_left + self.margin_right)
    }
}

/// Writer for document.xml and header/footer parts
#[derive(Debug, Default)]
pub struct DocumentWriter;

impl DocumentWriter {
    /// Create a new document writer
    pub fn new() -> Self {
        Self
    }

    /// Generate document.xml content
    pub fn write(&self, body: &[Block], section: &SectionLayout) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:wp="{}" xmlns:a="{}" xmlns:pic="{}">"#,
            namespaces::W,
            namespaces::R,
            namespaces::WP,
            namespaces::A,
            namespaces::PIC,
        ));
        xml.push_str("<w:body>");
        self.write_blocks(&mut xml, body);
        self.write_section(&mut xml, section);
        xml.push_str("</w:body>");
        xml.push_str("</w:document>");
        xml
    }

    /// Generate a header part
    pub fn write_header(&self, blocks: &[Block]) -> String {
        self.write_story("w:hdr", blocks)
    }

    /// Generate a footer part
    pub fn write_footer(&self, blocks: &[Block]) -> String {
        self.write_story("w:ftr", blocks)
    }

    fn write_story(&self, root: &str, blocks: &[Block]) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<{} xmlns:w="{}" xmlns:r="{}">"#,
            root,
            namespaces::W,
            namespaces::R
        ));
        self.write_blocks(&mut xml, blocks);
        if blocks.is_empty() {
            xml.push_str("<w:p/>");
        }
        xml.push_str(&format!("</{}>", root));
        xml
    }

    pub(crate) fn write_blocks(&self, xml: &mut String, blocks: &[Block]) {
        for block in blocks {
            match block {
                Block::Paragraph(p) => self.write_paragraph(xml, p),
                Block::Table(t) => {
                    TableWriter::new().write_table(xml, t);
                    // adjacent tables would merge into one
                    xml.push_str("<w:p/>");
                }
            }
        }
    }

    fn write_section(&self, xml: &mut String, section: &SectionLayout) {
        xml.push_str("<w:sectPr>");
        if let Some(rel) = &section.header_rel {
            xml.push_str(&format!(r#"<w:headerReference w:type="default" r:id="{}"/>"#, rel));
        }
        if let Some(rel) = &section.footer_rel {
            xml.push_str(&format!(r#"<w:footerReference w:type="default" r:id="{}"/>"#, rel));
        }
        xml.push_str(&format!(
            r#"<w:pgSz w:w="{}" w:h="{}"/>"#,
            section.page_width, section.page_height
        ));
        xml.push_str(&format!(
            r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="0"/>"#,
            section.margin_top,
            section.margin_right,
            section.margin_bottom,
            section.margin_left,
            section.header_distance,
            section.footer_distance,
        ));
        xml.push_str("</w:sectPr>");
    }

    /// Write a paragraph element
    pub(crate) fn write_paragraph(&self, xml: &mut String, para: &Paragraph) {
        xml.push_str("<w:p>");
        self.write_paragraph_properties(xml, para);
        for run in &para.runs {
            self.write_run(xml, run);
        }
        xml.push_str("</w:p>");
    }

    fn write_paragraph_properties(&self, xml: &mut String, para: &Paragraph) {
        if para.style.is_none()
            && para.alignment.is_none()
            && para.spacing.is_none()
            && para.tabs.is_empty()
            && !para.keep_next
            && !para.page_break_before
        {
            return;
        }

        xml.push_str("<w:pPr>");
        if let Some(style) = &para.style {
            xml.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style)));
        }
        if para.keep_next {
            xml.push_str("<w:keepNext/>");
        }
        if para.page_break_before {
            xml.push_str("<w:pageBreakBefore/>");
        }
        if !para.tabs.is_empty() {
            xml.push_str("<w:tabs>");
            for stop in &para.tabs {
                xml.push_str(&format!(r#"<w:tab w:val="left" w:pos="{}"/>"#, stop));
            }
            xml.push_str("</w:tabs>");
        }
        if let Some((before, after)) = para.spacing {
            xml.push_str(&format!(r#"<w:spacing w:before="{}" w:after="{}"/>"#, before, after));
        }
        if let Some(alignment) = para.alignment {
            xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.as_val()));
        }
        xml.push_str("</w:pPr>");
    }

    /// Write a run element
    fn write_run(&self, xml: &mut String, run: &Run) {
        match &run.content {
            RunContent::Text(text) => {
                xml.push_str("<w:r>");
                write_run_properties(xml, &run.props);
                let lines: Vec<&str> = text.split('\n').collect();
                for (i, line) in lines.iter().enumerate() {
                    let segments: Vec<&str> = line.split('\t').collect();
                    for (j, segment) in segments.iter().enumerate() {
                        if !segment.is_empty() {
                            if segment.starts_with(' ') || segment.ends_with(' ') {
                                xml.push_str(r#"<w:t xml:space="preserve">"#);
                            } else {
                                xml.push_str("<w:t>");
                            }
                            xml.push_str(&escape_xml(segment));
                            xml.push_str("</w:t>");
                        }
                        if j + 1 < segments.len() {
                            xml.push_str("<w:tab/>");
                        }
                    }
                    if i + 1 < lines.len() {
                        xml.push_str("<w:br/>");
                    }
                }
                xml.push_str("</w:r>");
            }
            RunContent::Field(code) => {
                xml.push_str(&format!(r#"<w:fldSimple w:instr="{}"><w:r>"#, code.instruction()));
                write_run_properties(xml, &run.props);
                xml.push_str("<w:t>1</w:t></w:r></w:fldSimple>");
            }
            RunContent::Drawing(drawing) => xml.push_str(&drawing.run_xml()),
        }
    }
}

fn write_run_properties(xml: &mut String, props: &RunProps) {
    if props.is_empty() {
        return;
    }
    xml.push_str("<w:rPr>");
    if props.bold {
        xml.push_str("<w:b/><w:bCs/>");
    }
    if props.italic {
        xml.push_str("<w:i/><w:iCs/>");
    }
    if let Some(color) = &props.color {
        xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
    }
    if let Some(size) = props.size {
        xml.push_str(&format!(r#"<w:sz w:val="{}"/><w:szCs w:val="{}"/>"#, size, size));
    }
    if props.underline {
        xml.push_str(r#"<w:u w:val="single"/>"#);
    }
    xml.push_str("</w:rPr>");
}
