//! Building blocks of a programmatically written document

use crate::docx::drawing::InlineDrawing;

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub(crate) fn as_val(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// Simple fields evaluated by the word processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCode {
    Page,
    NumPages,
}

impl FieldCode {
    pub(crate) fn instruction(self) -> &'static str {
        match self {
            FieldCode::Page => " PAGE ",
            FieldCode::NumPages => " NUMPAGES ",
        }
    }
}

/// What a run holds
#[derive(Debug, Clone)]
pub enum RunContent {
    /// Text; `\n` becomes a line break and `\t` a tab
    Text(String),
    Field(FieldCode),
    Drawing(InlineDrawing),
}

/// Direct run formatting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProps {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Hex color without `#`
    pub color: Option<String>,
    /// Size in half-points
    pub size: Option<u32>,
}

impl RunProps {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct Run {
    pub content: RunContent,
    pub props: RunProps,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            props: RunProps::default(),
        }
    }

    pub fn field(code: FieldCode) -> Self {
        Self {
            content: RunContent::Field(code),
            props: RunProps::default(),
        }
    }

    pub fn drawing(drawing: InlineDrawing) -> Self {
        Self {
            content: RunContent::Drawing(drawing),
            props: RunProps::default(),
        }
    }

    pub fn bold(mut self) -> Self { self.props.bold = true; self }
    pub fn italic(mut self) -> Self { self.props.italic = true; self }
    pub fn underline(mut self) -> Self { self.props.underline = true; self }
    pub fn color(mut self, color: &str) -> Self { self.props.color = Some(color.trim_start_matches('#').to_string()); self }
    pub fn size(mut self, half_points: u32) -> Self { self.props.size = Some(half_points); self }
}

/// A paragraph with optional style and direct formatting
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    /// Space before and after, in twips
    pub spacing: Option<(u32, u32)>,
    /// Left tab stops, in twips
    pub tabs: Vec<u32>,
    pub keep_next: bool,
    pub page_break_before: bool,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph holding one plain text run
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().run(Run::text(text))
    }

    pub fn styled(style: &str, text: impl Into<String>) -> Self {
        Self::text(text).style(style)
    }

    pub fn style(mut self, style: &str) -> Self { self.style = Some(style.to_string()); self }
    pub fn align(mut self, alignment: Alignment) -> Self { self.alignment = Some(alignment); self }
    pub fn spacing(mut self, before: u32, after: u32) -> Self { self.spacing = Some((before, after)); self }
    pub fn tabs(mut self, stops: &[u32]) -> Self { self.tabs = stops.to_vec(); self }
    pub fn keep_next(mut self) -> Self { self.keep_next = true; self }
    pub fn page_break_before(mut self) -> Self { self.page_break_before = true; self }
    pub fn run(mut self, run: Run) -> Self { self.runs.push(run); self }

    pub fn push(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Table or cell border
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    /// Width in eighths of a point
    pub size: u32,
    /// Hex color without `#`
    pub color: String,
}

impl Border {
    pub fn single(size: u32, color: &str) -> Self {
        Self { size, color: color.trim_start_matches('#').to_string() }
    }

    /// No line; written as `w:val="nil"`
    pub fn none() -> Self {
        Self { size: 0, color: "auto".to_string() }
    }

    pub fn is_none(&self) -> bool {
        self.size == 0
    }
}

/// Table and cell widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Twips
    Dxa(u32),
    /// Whole percent of the available width
    Pct(u32),
    Auto,
}

impl Width {
    /// `(w:w, w:type)` attribute values
    pub(crate) fn attrs(self) -> (u32, &'static str) {
        match self {
            Width::Dxa(w) => (w, "dxa"),
            Width::Pct(p) => (p * 50, "pct"),
            Width::Auto => (0, "auto"),
        }
    }
}

/// Cell padding in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub vertical: u32,
    pub horizontal: u32,
}

impl Margins {
    pub fn new(vertical: u32, horizontal: u32) -> Self {
        Self { vertical, horizontal }
    }

    pub fn uniform(size: u32) -> Self {
        Self::new(size, size)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    /// Fill color without `#`
    pub shading: Option<String>,
    /// Number of grid columns spanned
    pub span: u32,
    pub width: Option<Width>,
    pub margins: Option<Margins>,
    pub border: Option<Border>,
}

impl Cell {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            span: 1,
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Paragraph::text(text)])
    }

    pub fn paragraph(paragraph: Paragraph) -> Self {
        Self::new(vec![paragraph])
    }

    pub fn shading(mut self, fill: &str) -> Self { self.shading = Some(fill.trim_start_matches('#').to_string()); self }
    pub fn span(mut self, columns: u32) -> Self { self.span = columns.max(1); self }
    pub fn width(mut self, width: Width) -> Self { self.width = Some(width); self }
    pub fn margins(mut self, margins: Margins) -> Self { self.margins = Some(margins); self }
    pub fn border(mut self, border: Border) -> Self { self.border = Some(border); self }
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Repeated on every page
    pub header: bool,
    pub cant_split: bool,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn header(mut self) -> Self { self.header = true; self }
    pub fn cant_split(mut self) -> Self { self.cant_split = true; self }

    /// Grid columns covered by this row
    pub fn span(&self) -> u32 {
        self.cells.iter().map(|c| c.span).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    /// Grid column widths in twips
    pub columns: Vec<u32>,
    pub width: Width,
    pub borders: Option<Border>,
    pub cell_margins: Option<Margins>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<u32>) -> Self {
        Self {
            columns,
            width: Width::Pct(100),
            borders: None,
            cell_margins: None,
            rows: Vec::new(),
        }
    }

    pub fn width(mut self, width: Width) -> Self { self.width = width; self }
    pub fn borders(mut self, border: Border) -> Self { self.borders = Some(border); self }
    pub fn cell_margins(mut self, margins: Margins) -> Self { self.cell_margins = Some(margins); self }
    pub fn row(mut self, row: Row) -> Self { self.rows.push(row); self }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Body-level content
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_attrs() {
        assert_eq!(Width::Pct(35).attrs(), (1750, "pct"));
        assert_eq!(Width::Dxa(4500).attrs(), (4500, "dxa"));
    }

    #[test]
    fn test_row_span() {
        let row = Row::new(vec![Cell::text("a").span(3), Cell::text("b")]);
        assert_eq!(row.span(), 4);
        assert_eq!(Cell::text("x").span(0).span, 1);
    }

    #[test]
    fn test_border_none() {
        assert!(Border::none().is_none());
        assert_eq!(Border::single(4, "#E2E8F0").color, "E2E8F0");
    }

    #[test]
    fn test_run_builders() {
        let run = Run::text("x").bold().color("#475569").size(20);
        assert!(run.props.bold);
        assert_eq!(run.props.color.as_deref(), Some("475569"));
        assert!(!run.props.is_empty());
        assert!(Run::text("y").props.is_empty());
    }
}
