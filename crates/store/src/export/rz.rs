//! Electrical installation report layout

use super::layout::{
    columns, evidence_header, heading, key_value_grid, label_run, page_number_footer,
    result_box, spacer, value_or_dash, DataTable, COLOR_BORDER, COLOR_DIVIDER, COLOR_MUTED,
    COLOR_TEXT, FONT, SIZE_BODY, SIZE_SMALL, SIZE_XS,
};
use crate::docx::{
    Alignment, Block, Border, Cell, DocxPackage, DocxResult, DocxWriter, Margins, Paragraph, Row,
    Run, StylesWriter, Table,
};
use report_merge::board::BoardView;
use report_merge::report::RoomView;
use report_merge::text::list_or_dash;
use report_merge::RzReport;

const CHAPTER: u32 = 26;
const BLOCK: u32 = 22;

/// Build the complete report without a template
pub fn build_rz_document(report: &RzReport) -> DocxResult<DocxPackage> {
    let styles = StylesWriter::new(FONT, SIZE_BODY, 60).with_color(COLOR_TEXT);
    let mut writer = DocxWriter::new(styles);
    let width = writer.section().text_width();

    writer.set_header(evidence_header(&report.evidence_number, Alignment::Right, false));
    writer.set_footer(page_number_footer());

    let mut body: Vec<Block> = Vec::new();
    cover(&mut body, report, width);
    identification(&mut body, report, width);
    inspection(&mut body, report);
    tests(&mut body, report, width);
    boards(&mut body, &report.boards, width);
    rooms(&mut body, &report.rooms, width);
    defects(&mut body, report, width);
    conclusion(&mut body, report);

    tracing::debug!(blocks = body.len(), boards = report.boards.len(), "laid out installation report");
    writer.finish(&body)
}

fn muted(text: impl Into<String>) -> Paragraph {
    Paragraph::new().run(Run::text(text).color(COLOR_MUTED))
}

fn bold(text: impl Into<String>) -> Paragraph {
    Paragraph::new().run(Run::text(text).bold())
}

fn cover(body: &mut Vec<Block>, report: &RzReport, width: u32) {
    body.push(muted(format!("Číslo revizní zprávy: {}", report.evidence_number)).spacing(0, 40).into());
    body.push(
        Paragraph::new()
            .align(Alignment::Center)
            .spacing(0, 120)
            .run(Run::text("Zpráva o elektrické instalaci").bold().size(32))
            .into(),
    );
    body.push(bold(report.revision_type.as_str()).align(Alignment::Center).spacing(0, 30).into());
    let norms = if report.norms.is_empty() {
        "V souladu s Chybí informace".to_string()
    } else {
        format!("V souladu s {}", list_or_dash(&report.norms))
    };
    body.push(muted(norms).align(Alignment::Center).into());

    body.push(heading("Revizní technik", BLOCK).into());
    body.push(key_value_grid(&report.technician.rows(), width).into());
    body.push(heading("Revidovaný objekt", BLOCK).into());
    body.push(key_value_grid(&report.object.rows(), width).into());

    body.push(heading("Výsledek revize", BLOCK).into());
    body.push(result_box(&report.verdict_label, width).into());
    body.push(
        muted("Doporučený termín příští revize dle ČSN 332000-6 ed.2 čl. 6.5.2:")
            .align(Alignment::Center)
            .into(),
    );
    body.push(bold(report.next_revision.as_str()).align(Alignment::Center).into());

    body.push(heading("Použité měřicí přístroje", BLOCK).into());
    let instruments = report
        .instruments
        .iter()
        .map(|i| vec![i.name.clone(), i.serial.clone(), i.calibration.clone()])
        .collect();
    body.push(
        DataTable::new(&["Přístroj", "Výrobní číslo", "Kalibrační list"], &[50, 25, 25])
            .rows(instruments)
            .border(Border::single(1, COLOR_BORDER))
            .padding(Margins::uniform(60))
            .empty_text("Nejsou uvedeny žádné přístroje.")
            .build(width)
            .into(),
    );

    body.push(heading("Rozdělovník", BLOCK).into());
    for line in [
        "Provozovatel – 1×",
        "Revizní technik – 1×",
        "....................................................",
        "....................................................",
        "V ........................................ dne ........................................",
        "Podpis provozovatele: ______________________________",
        "Podpis revizního technika: _________________________",
    ] {
        body.push(Paragraph::text(line).into());
    }
}

fn kv_line(label: &str, value: &str) -> Paragraph {
    Paragraph::new()
        .run(label_run(label).size(SIZE_SMALL))
        .run(Run::text(value_or_dash(value)))
        .spacing(0, 40)
}

fn identification(body: &mut Vec<Block>, report: &RzReport, width: u32) {
    let id = &report.identification;
    body.push(heading("1. Identifikace", CHAPTER).page_break_before().into());
    body.push(heading("Montážní firma", BLOCK).into());
    body.push(
        key_value_grid(
            &[
                ("Firma", id.assembly_company.as_str()),
                ("Oprávnění firmy", id.assembly_authorization.as_str()),
            ],
            width,
        )
        .into(),
    );

    body.push(heading("Ochranná opatření", BLOCK).into());
    let protection = Cell::new(vec![
        kv_line("Základní ochrana", &id.protection_basic),
        kv_line("Ochrana při poruše", &id.protection_fault),
        kv_line("Doplňková ochrana", &id.protection_additional),
    ])
    .margins(Margins { vertical: 20, horizontal: 40 })
    .border(Border::none());
    body.push(Table::new(vec![width]).borders(Border::none()).row(Row::new(vec![protection])).into());

    body.push(bold("Popis a rozsah revidovaného objektu").into());
    body.push(Paragraph::text(id.description.as_str()).into());
    body.push(Paragraph::text(format!("Jmenovité napětí: {}", id.voltage)).into());
    body.push(Paragraph::text(format!("Druh sítě: {}", id.network)).into());
    body.push(Paragraph::text(format!("Předložená dokumentace: {}", id.documentation)).into());
    body.push(bold("Vnější vlivy").into());
    body.push(Paragraph::text(id.environment.as_str()).into());
    body.push(bold("Přílohy").into());
    body.push(Paragraph::text(id.attachments.as_str()).into());
}

fn inspection(body: &mut Vec<Block>, report: &RzReport) {
    body.push(heading("2. Prohlídka", CHAPTER).into());
    body.push(muted("Soupis provedených úkonů dle ČSN 33 2000-6 čl. 6.4.2.3").into());
    if report.tasks.is_empty() {
        body.push(Paragraph::text("—").into());
    }
    for task in &report.tasks {
        body.push(Paragraph::text(format!("• {}", task)).spacing(0, 30).into());
    }
}

fn tests(body: &mut Vec<Block>, report: &RzReport, width: u32) {
    body.push(heading("3. Zkoušení", CHAPTER).into());
    let rows = report.tests.iter().map(|t| vec![t.name.clone(), t.note.clone()]).collect();
    body.push(
        DataTable::new(&["Název zkoušky", "Poznámka / výsledek"], &[40, 60])
            .rows(rows)
            .border(Border::single(1, COLOR_BORDER))
            .padding(Margins::new(30, 60))
            .empty_text("Nebyly provedeny žádné zkoušky.")
            .build(width)
            .into(),
    );
}

/// One row per component: tree title over the muted measurement line
fn board_table(board: &BoardView, width: u32) -> Table {
    let mut table = Table::new(vec![width]).borders(Border::single(1, COLOR_DIVIDER));
    for line in &board.components {
        let title = Paragraph::new()
            .run(Run::text(line.tree_title()).bold().size(SIZE_XS))
            .spacing(0, 20);
        let detail = Paragraph::new().run(Run::text(line.detail()).size(SIZE_XS).color(COLOR_MUTED));
        table.push(
            Row::new(vec![Cell::new(vec![title, detail]).margins(Margins::new(40, 70))]).cant_split(),
        );
    }
    table
}

fn boards(body: &mut Vec<Block>, boards: &[BoardView], width: u32) {
    body.push(heading("4. Měření – rozvaděče", CHAPTER).into());
    if boards.is_empty() {
        body.push(Paragraph::text("—").into());
    }
    for board in boards {
        body.push(spacer(300).into());
        body.push(
            Paragraph::new()
                .run(Run::text(format!("Rozvaděč: {}", board.title)).bold().size(SIZE_XS))
                .spacing(0, 20)
                .keep_next()
                .into(),
        );
        body.push(
            Paragraph::new()
                .run(Run::text(board.details.as_str()).size(SIZE_XS).color(COLOR_MUTED))
                .spacing(0, 60)
                .keep_next()
                .into(),
        );
        body.push(board_table(board, width).into());
    }
}

fn rooms(body: &mut Vec<Block>, rooms: &[RoomView], width: u32) {
    body.push(heading("4. Měření – místnosti", CHAPTER).into());
    if rooms.is_empty() {
        body.push(Paragraph::text("—").into());
    }
    for room in rooms {
        body.push(spacer(300).into());
        body.push(bold(format!("Místnost: {}", room.name)).spacing(0, 10).keep_next().into());
        body.push(muted(format!("Poznámka: {}", room.note)).spacing(0, 20).keep_next().into());
        body.push(
            DataTable::new(
                &["Typ", "Počet", "Dimenze", "Riso [MΩ]", "Ochrana [Ω]", "Poznámka"],
                &[18, 10, 18, 14, 14, 26],
            )
            .rows(room.devices.iter().map(|d| d.cells()).collect())
            .border(Border::single(1, COLOR_BORDER))
            .padding(Margins::uniform(60))
            .empty_text("Bez měřených zařízení.")
            .build(width)
            .into(),
        );
    }
}

fn defects(body: &mut Vec<Block>, report: &RzReport, width: u32) {
    body.push(heading("5. Závady", CHAPTER).page_break_before().into());
    let rows = report
        .defects
        .iter()
        .map(|d| vec![d.description.clone(), d.standard.clone(), d.article.clone()])
        .collect();
    body.push(
        DataTable::new(&["Popis závady", "ČSN", "Článek"], &[60, 20, 20])
            .rows(rows)
            .border(Border::single(1, COLOR_BORDER))
            .padding(Margins::uniform(60))
            .empty_text("Nebyly zjištěny žádné závady.")
            .build(width)
            .into(),
    );
}

fn conclusion(body: &mut Vec<Block>, report: &RzReport) {
    body.push(spacer(300).into());
    body.push(heading("6. Závěr", CHAPTER).into());
    body.push(Paragraph::text(report.conclusion_text.as_str()).into());
    body.push(Paragraph::text(format!("Další revize: {}", report.next_revision)).into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::DOCUMENT_PART;
    use inspection_model::FormData;
    use report_merge::RzInput;
    use serde_json::json;

    fn report(form: serde_json::Value) -> RzReport {
        let mut input = RzInput::from_form(FormData::new(form));
        input.technician = FormData::new(json!({"jmeno": "Jan Novák", "firma": "Elektro s.r.o."}));
        RzReport::build(&input)
    }

    fn document(report: &RzReport) -> String {
        build_rz_document(report).unwrap().part_text(DOCUMENT_PART).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let xml = document(&report(json!({"evidencni": "RZ-9", "typRevize": "Výchozí"})));
        let order = [
            "Zpráva o elektrické instalaci",
            "Revizní technik",
            "Výsledek revize",
            "1. Identifikace",
            "2. Prohlídka",
            "3. Zkoušení",
            "4. Měření – rozvaděče",
            "4. Měření – místnosti",
            "5. Závady",
            "6. Závěr",
        ];
        let positions: Vec<usize> = order.iter().map(|s| xml.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(xml.contains("Jan Novák"));
    }

    #[test]
    fn test_header_and_footer() {
        let package = build_rz_document(&report(json!({"evidencni": "RZ-9"}))).unwrap();
        let header = package.part_text("word/header1.xml").unwrap();
        assert!(header.contains("Evidenční číslo: RZ-9"));
        let footer = package.part_text("word/footer1.xml").unwrap();
        assert!(footer.contains(" PAGE "));
    }

    #[test]
    fn test_board_components_listed() {
        let xml = document(&report(json!({
            "boards": [{
                "name": "RH1",
                "komponenty": [
                    {"id": "a", "nazev": "Hlavní vypínač", "children": [
                        {"id": "b", "nazev": "Jistič B16", "riso": "250"}
                    ]}
                ]
            }]
        })));
        assert!(xml.contains("Rozvaděč: RH1"));
        assert!(xml.contains("Hlavní vypínač"));
        assert!(xml.contains("└─ Jistič B16"));
        assert!(xml.contains("Riso: 250 MΩ"));
    }

    #[test]
    fn test_empty_defects_single_row() {
        let xml = document(&report(json!({})));
        let start = xml.find("Popis závady").unwrap();
        let table = &xml[start..];
        let table = &table[..table.find("</w:tbl>").unwrap()];
        assert_eq!(table.matches("<w:tr>").count(), 1);
        assert!(table.contains(r#"<w:gridSpan w:val="3"/>"#));
        assert!(table.contains("Nebyly zjištěny žádné závady."));
    }
}
