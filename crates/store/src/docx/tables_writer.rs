//! Table writer for DOCX files
//!
//! Generates w:tbl elements from [`Table`]s.

use crate::docx::document_writer::DocumentWriter;
use crate::docx::elements::{Border, Cell, Margins, Row, Table};

/// Writer for table elements
#[derive(Debug, Default)]
pub struct TableWriter;

impl TableWriter {
    /// Create a new table writer
    pub fn new() -> Self {
        Self
    }

    /// Write a table element
    pub fn write_table(&self, xml: &mut String, table: &Table) {
        xml.push_str("<w:tbl>");
        self.write_table_properties(xml, table);
        self.write_table_grid(xml, table);
        for row in &table.rows {
            self.write_table_row(xml, row);
        }
        xml.push_str("</w:tbl>");
    }

    fn write_table_properties(&self, xml: &mut String, table: &Table) {
        xml.push_str("<w:tblPr>");

        let (w, t) = table.width.attrs();
        xml.push_str(&format!(r#"<w:tblW w:w="{}" w:type="{}"/>"#, w, t));

        if let Some(border) = &table.borders {
            xml.push_str("<w:tblBorders>");
            for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                write_border(xml, side, border);
            }
            xml.push_str("</w:tblBorders>");
        }

        xml.push_str(r#"<w:tblLayout w:type="fixed"/>"#);

        if let Some(margins) = table.cell_margins {
            xml.push_str("<w:tblCellMar>");
            write_margins(xml, margins);
            xml.push_str("</w:tblCellMar>");
        }

        xml.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#);
        xml.push_str("</w:tblPr>");
    }

    fn write_table_grid(&self, xml: &mut String, table: &Table) {
        xml.push_str("<w:tblGrid>");
        for width in &table.columns {
            xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
        }
        xml.push_str("</w:tblGrid>");
    }

    fn write_table_row(&self, xml: &mut String, row: &Row) {
        xml.push_str("<w:tr>");
        if row.header || row.cant_split {
            xml.push_str("<w:trPr>");
            if row.cant_split {
                xml.push_str("<w:cantSplit/>");
            }
            if row.header {
                xml.push_str("<w:tblHeader/>");
            }
            xml.push_str("</w:trPr>");
        }
        for cell in &row.cells {
            self.write_table_cell(xml, cell);
        }
        xml.push_str("</w:tr>");
    }

    fn write_table_cell(&self, xml: &mut String, cell: &Cell) {
        xml.push_str("<w:tc>");
        self.write_cell_properties(xml, cell);

        let writer = DocumentWriter::new();
        for paragraph in &cell.paragraphs {
            writer.write_paragraph(xml, paragraph);
        }
        // A cell must end with a paragraph
        if cell.paragraphs.is_empty() {
            xml.push_str("<w:p/>");
        }

        xml.push_str("</w:tc>");
    }

    fn write_cell_properties(&self, xml: &mut String, cell: &Cell) {
        xml.push_str("<w:tcPr>");
        if let Some(width) = cell.width {
            let (w, t) = width.attrs();
            xml.push_str(&format!(r#"<w:tcW w:w="{}" w:type="{}"/>"#, w, t));
        }
        if cell.span > 1 {
            xml.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, cell.span));
        }
        if let Some(border) = &cell.border {
            xml.push_str("<w:tcBorders>");
            for side in ["top", "left", "bottom", "right"] {
                write_border(xml, side, border);
            }
            xml.push_str("</w:tcBorders>");
        }
        if let Some(fill) = &cell.shading {
            xml.push_str(&format!(r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, fill));
        }
        if let Some(margins) = cell.margins {
            xml.push_str("<w:tcMar>");
            write_margins(xml, margins);
            xml.push_str("</w:tcMar>");
        }
        xml.push_str("</w:tcPr>");
    }
}

fn write_border(xml: &mut String, side: &str, border: &Border) {
    if border.is_none() {
        xml.push_str(&format!(r#"<w:{} w:val="nil"/>"#, side));
        return;
    }
    xml.push_str(&format!(
        r#"<w:{} w:val="single" w:sz="{}" w:space="0" w:color="{}"/>"#,
        side, border.size, border.color
    ));
}

fn write_margins(xml: &mut String, margins: Margins) {
    xml.push_str(&format!(r#"<w:top w:w="{}" w:type="dxa"/>"#, margins.vertical));
    xml.push_str(&format!(r#"<w:left w:w="{}" w:type="dxa"/>"#, margins.horizontal));
    xml.push_str(&format!(r#"<w:bottom w:w="{}" w:type="dxa"/>"#, margins.vertical));
    xml.push_str(&format!(r#"<w:right w:w="{}" w:type="dxa"/>"#, margins.horizontal));
}
