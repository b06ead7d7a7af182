//! Building blocks shared by the report layouts
//!
//! Colors, sizes and the table shapes both reports are made of. Widths are
//! given in whole percent of the text width and converted to twips here.

use crate::docx::{
    Alignment, Block, Border, Cell, FieldCode, Margins, Paragraph, Row, Run, Table, Width,
};
use report_merge::text::DASH_ASCII;

pub const FONT: &str = "Calibri";

pub const COLOR_TEXT: &str = "0F172A";
pub const COLOR_MUTED: &str = "475569";
pub const COLOR_BORDER: &str = "E2E8F0";
pub const COLOR_HEADER: &str = "F8FAFC";
pub const COLOR_STRIPE: &str = "F1F5F9";
pub const COLOR_RESULT: &str = "CBD5E1";
pub const COLOR_DIVIDER: &str = "E5E7EB";

/// Sizes in half-points
pub const SIZE_BODY: u32 = 22;
pub const SIZE_SMALL: u32 = 20;
pub const SIZE_XS: u32 = 18;

/// Grid column widths in twips for the given percentages
pub fn columns(text_width: u32, percents: &[u32]) -> Vec<u32> {
    percents.iter().map(|p| text_width * p / 100).collect()
}

/// Trimmed value, or `-`
pub fn value_or_dash(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        DASH_ASCII.to_string()
    } else {
        value.to_string()
    }
}

/// Empty paragraph used as vertical space
pub fn spacer(after: u32) -> Paragraph {
    Paragraph::new().spacing(0, after)
}

/// Bold heading kept with the following block
pub fn heading(text: &str, size: u32) -> Paragraph {
    Paragraph::new()
        .run(Run::text(text).bold().size(size))
        .spacing(120, 80)
        .keep_next()
}

/// Bold muted `Label: ` run
pub fn label_run(label: &str) -> Run {
    Run::text(format!("{}: ", label)).bold().color(COLOR_MUTED)
}

/// A bordered data table with a shaded header row.
///
/// An empty table still renders: its body is one row spanning every column
/// with the no-records text.
#[derive(Debug, Clone)]
pub struct DataTable {
    headers: Vec<String>,
    widths: Vec<u32>,
    rows: Vec<Vec<String>>,
    empty_text: String,
    border: Border,
    padding: Margins,
    striped: bool,
}

impl DataTable {
    pub fn new(headers: &[&str], widths: &[u32]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            widths: widths.to_vec(),
            rows: Vec::new(),
            empty_text: "Žádné záznamy.".to_string(),
            border: Border::single(4, COLOR_BORDER),
            padding: Margins::uniform(120),
            striped: false,
        }
    }

    pub fn rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn empty_text(mut self, text: &str) -> Self {
        self.empty_text = text.to_string();
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn padding(mut self, padding: Margins) -> Self {
        self.padding = padding;
        self
    }

    /// Shade every second body row
    pub fn striped(mut self) -> Self {
        self.striped = true;
        self
    }

    pub fn build(&self, text_width: u32) -> Table {
        let cell = |paragraph: Paragraph, width: u32| {
            Cell::paragraph(paragraph)
                .width(Width::Pct(width))
                .margins(self.padding)
                .border(self.border.clone())
        };

        let mut table = Table::new(columns(text_width, &self.widths)).borders(self.border.clone());
        let header = self
            .headers
            .iter()
            .zip(&self.widths)
            .map(|(text, &width)| {
                let p = Paragraph::new()
                    .run(Run::text(text.as_str()).bold().color(COLOR_MUTED).size(SIZE_SMALL))
                    .spacing(0, 0);
                cell(p, width).shading(COLOR_HEADER)
            })
            .collect();
        table.push(Row::new(header).header().cant_split());

        if self.rows.is_empty() {
            let p = Paragraph::new().run(Run::text(self.empty_text.as_str()).color(COLOR_MUTED));
            let span = self.headers.len() as u32;
            table.push(Row::new(vec![cell(p, 100).span(span)]));
            return table;
        }

        for (index, values) in self.rows.iter().enumerate() {
            let cells = values
                .iter()
                .zip(&self.widths)
                .map(|(value, &width)| {
                    let c = cell(Paragraph::text(value_or_dash(value)).spacing(0, 30), width);
                    if self.striped && index % 2 == 1 {
                        c.shading(COLOR_STRIPE)
                    } else {
                        c
                    }
                })
                .collect();
            table.push(Row::new(cells).cant_split());
        }
        table
    }
}

/// Borderless two-column grid; each cell holds a muted label over its value
pub fn key_value_grid(pairs: &[(&str, &str)], text_width: u32) -> Table {
    let mut table = Table::new(columns(text_width, &[50, 50])).borders(Border::none());
    for chunk in pairs.chunks(2) {
        let cells = (0..2)
            .map(|i| {
                let paragraphs = match chunk.get(i) {
                    Some((label, value)) => vec![
                        Paragraph::new()
                            .run(Run::text(*label).bold().color(COLOR_MUTED).size(SIZE_SMALL))
                            .spacing(0, 10),
                        Paragraph::new()
                            .run(Run::text(value_or_dash(value)).size(SIZE_BODY))
                            .spacing(0, 30),
                    ],
                    None => vec![Paragraph::new()],
                };
                Cell::new(paragraphs)
                    .width(Width::Pct(50))
                    .margins(Margins { vertical: 20, horizontal: 40 })
                    .border(Border::none())
            })
            .collect();
        table.push(Row::new(cells));
    }
    table
}

/// Label column shaded, value column plain
pub fn info_grid(rows: &[(&str, String)], text_width: u32) -> Table {
    let mut table = Table::new(columns(text_width, &[35, 65])).borders(Border::none());
    for (label, value) in rows {
        table.push(Row::new(vec![
            Cell::paragraph(Paragraph::new().run(Run::text(*label).bold().color(COLOR_MUTED)))
                .width(Width::Pct(35))
                .shading(COLOR_HEADER)
                .margins(Margins::uniform(120))
                .border(Border::none()),
            Cell::text(value_or_dash(value))
                .width(Width::Pct(65))
                .margins(Margins::uniform(120))
                .border(Border::none()),
        ]));
    }
    table
}

/// Label/value pairs laid out two per line on tab stops
pub fn two_column_rows(pairs: &[(&str, String)]) -> Vec<Paragraph> {
    pairs
        .chunks(2)
        .map(|chunk| {
            let mut p = Paragraph::new().tabs(&[4500, 9000]).spacing(0, 60);
            for (i, (label, value)) in chunk.iter().enumerate() {
                if i > 0 {
                    p.push(Run::text("\t"));
                }
                p.push(label_run(label));
                p.push(Run::text(value_or_dash(value)));
            }
            p
        })
        .collect()
}

/// Padded single-cell box around one paragraph of text
pub fn card(text: &str, bordered: bool, text_width: u32) -> Table {
    let border = if bordered { Border::single(4, COLOR_BORDER) } else { Border::none() };
    Table::new(vec![text_width]).borders(Border::none()).row(Row::new(vec![Cell::text(
        value_or_dash(text),
    )
    .margins(Margins::uniform(180))
    .shading("FFFFFF")
    .border(border)]))
}

/// Heavy-bordered centered callout for the inspection result
pub fn result_box(text: &str, text_width: u32) -> Table {
    let p = Paragraph::new()
        .align(Alignment::Center)
        .spacing(60, 60)
        .run(Run::text(text).bold().size(28));
    Table::new(vec![text_width]).borders(Border::none()).row(
        Row::new(vec![Cell::paragraph(p)
            .margins(Margins { vertical: 120, horizontal: 140 })
            .border(Border::single(24, COLOR_RESULT))])
        .cant_split(),
    )
}

/// Place and date with signature lines for the operator and the technician
pub fn signature_block(city: &str, date: &str, text_width: u32) -> Table {
    let left = vec![
        Paragraph::text(format!("V {} dne {}", value_or_dash(city), value_or_dash(date))).spacing(0, 80),
        Paragraph::text("Podpis provozovatele:").spacing(0, 20),
        Paragraph::text("______________________________").spacing(0, 60),
    ];
    let right = vec![
        Paragraph::new().spacing(0, 80),
        Paragraph::text("Podpis revizního technika:").spacing(0, 20),
        Paragraph::text("______________________________").spacing(0, 60),
        Paragraph::text("Razítko:").spacing(0, 20),
        Paragraph::text("○").align(Alignment::Center).spacing(0, 60),
    ];
    Table::new(columns(text_width, &[50, 50])).borders(Border::none()).row(
        Row::new(vec![
            Cell::new(left).width(Width::Pct(50)).border(Border::none()),
            Cell::new(right).width(Width::Pct(50)).border(Border::none()),
        ])
        .cant_split(),
    )
}

/// Page header carrying the evidence number
pub fn evidence_header(number: &str, alignment: Alignment, with_pages: bool) -> Vec<Block> {
    let mut p = Paragraph::new().align(alignment).spacing(0, 0);
    if with_pages {
        p.push(Run::text(format!("Evidenční číslo: {}", number)).bold());
        p.push(Run::text("    Strana "));
        p.push(Run::field(FieldCode::Page));
        p.push(Run::text(" / "));
        p.push(Run::field(FieldCode::NumPages));
    } else {
        p.push(Run::text(format!("Evidenční číslo: {}", number)).size(SIZE_SMALL).color(COLOR_MUTED));
    }
    vec![p.into()]
}

/// Centered current page number
pub fn page_number_footer() -> Vec<Block> {
    let p = Paragraph::new()
        .align(Alignment::Center)
        .run(Run::field(FieldCode::Page).size(SIZE_SMALL).color(COLOR_MUTED));
    vec![p.into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_text(cell: &Cell) -> String {
        cell.paragraphs
            .iter()
            .flat_map(|p| &p.runs)
            .filter_map(|r| match &r.content {
                crate::docx::RunContent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_columns() {
        assert_eq!(columns(10000, &[60, 20, 20]), vec![6000, 2000, 2000]);
    }

    #[test]
    fn test_empty_table_has_one_spanning_row() {
        let table = DataTable::new(&["Popis", "Norma / čl.", "Doporučené opatření"], &[50, 20, 30])
            .empty_text("Nebyly zjištěny žádné závady.")
            .build(10000);
        assert_eq!(table.rows.len(), 2);
        let body = &table.rows[1];
        assert_eq!(body.cells.len(), 1);
        assert_eq!(body.span() as usize, table.column_count());
        assert_eq!(cell_text(&body.cells[0]), "Nebyly zjištěny žádné závady.");
    }

    #[test]
    fn test_rows_striped_and_dashed() {
        let table = DataTable::new(&["A", "B"], &[50, 50])
            .rows(vec![
                vec!["1".into(), "x".into()],
                vec!["2".into(), "  ".into()],
            ])
            .striped()
            .build(10000);
        assert!(table.rows[0].header);
        assert_eq!(table.rows[1].cells[0].shading, None);
        assert_eq!(table.rows[2].cells[0].shading.as_deref(), Some(COLOR_STRIPE));
        assert_eq!(cell_text(&table.rows[2].cells[1]), "-");
    }

    #[test]
    fn test_key_value_grid_pads_odd_pairs() {
        let table = key_value_grid(&[("Jméno", "Jan"), ("Firma", ""), ("IČO", "1")], 10000);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cells.len(), 2);
        assert_eq!(cell_text(&table.rows[0].cells[1]), "Firma-");
    }

    #[test]
    fn test_two_column_rows() {
        let rows = two_column_rows(&[("A", "1".into()), ("B", "".into()), ("C", "3".into())]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].runs.len(), 5);
        assert_eq!(rows[1].runs.len(), 2);
    }
}
