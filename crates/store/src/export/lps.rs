//! Lightning protection report layout

use super::layout::{
    card, evidence_header, info_grid, label_run, signature_block, spacer, two_column_rows,
    DataTable, COLOR_MUTED, COLOR_TEXT, FONT, SIZE_BODY,
};
use crate::docx::{
    Alignment, Block, Border, Cell, DocxPackage, DocxResult, DocxWriter, DrawingSize, Margins,
    Paragraph, ParagraphStyle, PixelSize, Row, Run, SketchImage, StylesWriter, Table,
};
use report_merge::text::dash_ascii;
use report_merge::LpsReport;

/// Largest sketch drawn by the builder, in pixels
pub const MAX_SKETCH_PX: PixelSize = PixelSize { width: 750, height: 520 };

const SMALL_PADDING: Margins = Margins { vertical: 80, horizontal: 90 };
const EARTH_PADDING: Margins = Margins { vertical: 60, horizontal: 80 };

/// Sketch size in pixels: natural size capped at [`MAX_SKETCH_PX`], or a
/// full-width 0.6 aspect box when the size is unknown
pub fn sketch_pixels(natural: Option<PixelSize>) -> PixelSize {
    match natural {
        Some(px) if px.width > 0 && px.height > 0 => {
            let width = px.width.min(MAX_SKETCH_PX.width);
            let height = (f64::from(width) * f64::from(px.height) / f64::from(px.width)).round() as u32;
            PixelSize { width, height: height.min(MAX_SKETCH_PX.height) }
        }
        _ => PixelSize {
            width: MAX_SKETCH_PX.width,
            height: (MAX_SKETCH_PX.width * 6 / 10).min(MAX_SKETCH_PX.height),
        },
    }
}

fn styles() -> StylesWriter {
    StylesWriter::new(FONT, SIZE_BODY, 120)
        .with_color(COLOR_TEXT)
        .with_style(ParagraphStyle::new("Title", "Title").size(40).bold().color(COLOR_TEXT).spacing(0, 120))
        .with_style(ParagraphStyle::new("Subtitle", "Subtitle").size(20).color(COLOR_MUTED).spacing(0, 80))
        .with_style(
            ParagraphStyle::new("SectionHeading", "Section Heading")
                .size(28)
                .bold()
                .color(COLOR_TEXT)
                .spacing(220, 120)
                .keep_next(),
        )
        .with_style(ParagraphStyle::new("Muted", "Muted").color(COLOR_MUTED))
}

/// Build the complete report without a template.
///
/// `sketch` is the decoded drawing with its natural size, if any.
pub fn build_lps_document(
    report: &LpsReport,
    sketch: Option<(&SketchImage, Option<PixelSize>)>,
    max_width_emu: i64,
) -> DocxResult<DocxPackage> {
    let mut writer = DocxWriter::new(styles());
    let width = writer.section().text_width();
    writer.set_header(evidence_header(&report.header_number, Alignment::Center, true));

    let section = |title: &str| -> Block { Paragraph::styled("SectionHeading", title).into() };
    let mut body: Vec<Block> = vec![title_block(report, width).into(), spacer(60).into()];

    body.push(section("Identifikace objektu"));
    body.extend(
        two_column_rows(&[
            ("Revidovaný objekt", report.object_name.clone()),
            ("Adresa objektu", report.object_address.clone()),
            ("Objednatel revize", report.client_name.clone()),
            ("Majitel / provozovatel", report.operator_name.clone()),
            ("Projekt zpracoval", report.project_by.clone()),
            ("Číslo projektu", report.project_no.clone()),
        ])
        .into_iter()
        .map(Block::from),
    );

    let t = &report.technician;
    body.push(spacer(60).into());
    body.push(section("Identifikace revizního technika"));
    body.extend(
        two_column_rows(&[
            ("Revizní technik", t.name.clone()),
            ("Firma", t.company.clone()),
            ("Ev. č. osvědčení", t.certificate.clone()),
            ("Ev. č. oprávnění", t.authorization.clone()),
            ("IČO / DIČ", format!("{} / {}", t.ico, t.dic)),
            ("Kontakt", t.contact.clone()),
            ("Adresa", t.address.clone()),
        ])
        .into_iter()
        .map(Block::from),
    );

    body.push(spacer(120).into());
    body.push(section("Použité měřicí přístroje"));
    let instruments = report
        .instruments
        .iter()
        .map(|i| {
            vec![
                dash_ascii(i.name.as_deref()),
                dash_ascii(i.serial.as_deref()),
                dash_ascii(i.calibration.as_deref()),
            ]
        })
        .collect();
    body.push(
        DataTable::new(&["Přístroj", "Výrobní číslo", "Kalibrační list"], &[50, 25, 25])
            .rows(instruments)
            .padding(SMALL_PADDING)
            .striped()
            .empty_text("Nejsou uvedeny žádné přístroje.")
            .build(width)
            .into(),
    );

    body.push(spacer(120).into());
    body.push(section("Celkový posudek"));
    body.push(card(&report.assessment(), true, width).into());
    body.push(spacer(80).into());
    body.push(section("Rozdělovník a podpisy"));
    body.push(card(&format!("Rozdělovník: {}", report.distribution()), true, width).into());
    body.push(spacer(40).into());
    body.push(signature_block(&report.signature_city, &report.date_created, width).into());

    body.push(spacer(120).into());
    body.push(section("Normy, rozsah a základní údaje"));
    body.push(
        info_grid(
            &[
                ("Primární norma", report.primary_standard.clone()),
                ("Třída LPS", report.lps_class.clone()),
                ("SPD ochrana", report.spd_protection.clone()),
                ("Typ střechy", report.roof_type.clone()),
                ("Střešní krytina", report.roof_cover.clone()),
                ("Počet svodů", report.down_conductors.clone()),
            ],
            width,
        )
        .into(),
    );
    body.push(
        Paragraph::new()
            .style("Muted")
            .run(label_run("Rozsah revize"))
            .run(Run::text(report.scope_text(" | ").unwrap_or_else(|| "Neuvedeno".to_string())))
            .spacing(60, 160)
            .into(),
    );

    body.push(section("Popis objektu a poznámky"));
    body.push(card(&report.object_description, false, width).into());

    measurements(&mut body, report, width);

    body.push(spacer(140).into());
    body.push(section("Nákres LPS"));
    match sketch {
        Some((image, natural)) => {
            let size = DrawingSize::from_pixels(sketch_pixels(natural)).clamp_width(max_width_emu);
            let drawing = writer.add_image(image, size, "LPS Sketch");
            body.push(Paragraph::new().run(Run::drawing(drawing)).spacing(0, 200).into());
        }
        None => body.push(card("Skica LPS není k dispozici.", false, width).into()),
    }

    body.push(spacer(120).into());
    body.push(section("Zjištěné závady"));
    let defects = report
        .defects
        .iter()
        .map(|d| {
            vec![
                dash_ascii(d.description.as_deref()),
                dash_ascii(d.standard.as_deref()),
                dash_ascii(d.recommendation.as_deref()),
            ]
        })
        .collect();
    body.push(
        DataTable::new(&["Popis", "Norma / čl.", "Doporučené opatření"], &[50, 20, 30])
            .rows(defects)
            .padding(SMALL_PADDING)
            .striped()
            .empty_text("Nebyly zjištěny žádné závady.")
            .build(width)
            .into(),
    );

    body.push(spacer(120).into());
    body.push(section("Závěr"));
    body.push(card(&report.closing_text, false, width).into());

    tracing::debug!(
        blocks = body.len(),
        sketch = sketch.is_some(),
        "laid out lightning protection report"
    );
    writer.finish(&body)
}

fn title_block(report: &LpsReport, width: u32) -> Table {
    let dates = format!(
        "Zahájení: {}   Dokončení: {}   Vyhotoveno: {}",
        report.date_start, report.date_end, report.date_created
    );
    let cell = Cell::new(vec![
        Paragraph::styled("Title", "Zpráva o revizi LPS").align(Alignment::Center),
        Paragraph::new()
            .style("Subtitle")
            .align(Alignment::Center)
            .run(Run::text(format!("Typ revize: {}", report.revision_type)).italic()),
        Paragraph::styled("Muted", dates).align(Alignment::Center),
    ])
    .border(Border::none());
    Table::new(vec![width]).borders(Border::none()).row(Row::new(vec![cell]))
}

/// Earth resistance always; continuity, SPD and visual checks only when recorded
fn measurements(body: &mut Vec<Block>, report: &LpsReport, width: u32) {
    let section = |title: &str| -> Block { Paragraph::styled("SectionHeading", title).into() };

    body.push(spacer(120).into());
    body.push(section("Měření zemních odporů"));
    let earth = report
        .earth
        .iter()
        .enumerate()
        .map(|(i, row)| {
            vec![
                row.label.clone().unwrap_or_else(|| format!("Zemnič {}", i + 1)),
                row.value_text(),
                dash_ascii(row.note.as_deref()),
            ]
        })
        .collect();
    body.push(
        DataTable::new(&["Zemnič", "Odpor [Ω]", "Poznámka"], &[40, 20, 40])
            .rows(earth)
            .padding(EARTH_PADDING)
            .striped()
            .empty_text("Záznam o měření není k dispozici.")
            .build(width)
            .into(),
    );

    if !report.continuity.is_empty() {
        body.push(spacer(120).into());
        body.push(section("Kontinuita svodů"));
        let rows = report
            .continuity
            .iter()
            .enumerate()
            .map(|(i, row)| {
                vec![
                    row.label.clone().unwrap_or_else(|| format!("Svod {}", i + 1)),
                    dash_ascii(row.value.as_deref()),
                    dash_ascii(row.note.as_deref()),
                ]
            })
            .collect();
        body.push(
            DataTable::new(&["Svod", "Hodnota [mΩ]", "Poznámka"], &[40, 20, 40])
                .rows(rows)
                .border(Border::none())
                .striped()
                .build(width)
                .into(),
        );
    }

    if !report.spd.is_empty() {
        body.push(spacer(120).into());
        body.push(section("SPD / přepěťová ochrana"));
        let rows = report
            .spd
            .iter()
            .enumerate()
            .map(|(i, row)| {
                vec![
                    row.location.clone().unwrap_or_else(|| format!("Stanoviště {}", i + 1)),
                    dash_ascii(row.kind.as_deref()),
                    dash_ascii(row.result.as_deref()),
                    dash_ascii(row.note.as_deref()),
                ]
            })
            .collect();
        body.push(
            DataTable::new(&["Místo", "Typ", "Výsledek", "Poznámka"], &[30, 20, 20, 30])
                .rows(rows)
                .border(Border::none())
                .striped()
                .build(width)
                .into(),
        );
    }

    if !report.visual.is_empty() {
        body.push(spacer(120).into());
        body.push(section("Vizuální kontrola"));
        let rows = report
            .visual
            .iter()
            .enumerate()
            .map(|(i, row)| {
                vec![
                    row.item.clone().unwrap_or_else(|| format!("Kontrola {}", i + 1)),
                    row.state().to_string(),
                    dash_ascii(row.note.as_deref()),
                ]
            })
            .collect();
        body.push(
            DataTable::new(&["Položka", "Stav", "Poznámka"], &[50, 15, 35])
                .rows(rows)
                .border(Border::none())
                .striped()
                .build(width)
                .into(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::{SketchSizing, DOCUMENT_PART, DOCUMENT_RELS_PART};
    use inspection_model::FormData;
    use serde_json::json;

    fn report(form: serde_json::Value) -> LpsReport {
        LpsReport::build(&FormData::new(form))
    }

    fn max_width() -> i64 {
        SketchSizing::default().max_width_emu
    }

    #[test]
    fn test_sketch_pixels() {
        assert_eq!(sketch_pixels(None), PixelSize { width: 750, height: 450 });
        assert_eq!(
            sketch_pixels(Some(PixelSize { width: 1500, height: 1000 })),
            PixelSize { width: 750, height: 500 }
        );
        assert_eq!(
            sketch_pixels(Some(PixelSize { width: 600, height: 900 })),
            PixelSize { width: 600, height: 520 }
        );
    }

    #[test]
    fn test_document_without_sketch() {
        let package = build_lps_document(&report(json!({"evidencni": "L-1"})), None, max_width()).unwrap();
        let xml = package.part_text(DOCUMENT_PART).unwrap();
        assert!(xml.contains("Zpráva o revizi LPS"));
        assert!(xml.contains("Skica LPS není k dispozici."));
        assert!(xml.contains("Nebyly zjištěny žádné závady."));
        assert!(!xml.contains("Kontinuita svodů"));
        let header = package.part_text("word/header1.xml").unwrap();
        assert!(header.contains("Evidenční číslo: L-1"));
        assert!(header.contains(" NUMPAGES "));
    }

    #[test]
    fn test_document_with_sketch() {
        let image = SketchImage::new("png", vec![0x89, b'P', b'N', b'G']);
        let package = build_lps_document(
            &report(json!({})),
            Some((&image, Some(PixelSize { width: 1000, height: 500 }))),
            max_width(),
        )
        .unwrap();
        assert!(package.contains("word/media/image1.png"));
        let xml = package.part_text(DOCUMENT_PART).unwrap();
        assert!(xml.contains(r#"<wp:extent cx="6480000" cy="3240000"/>"#));
        let rels = package.part_text(DOCUMENT_RELS_PART).unwrap();
        assert!(rels.contains("media/image1.png"));
    }

    #[test]
    fn test_optional_tables_and_defects() {
        let xml = build_lps_document(
            &report(json!({
                "lps": {
                    "continuity": [{"conductor": "S1", "valueMilliOhm": "120"}],
                    "visualChecks": [{"text": "Jímací soustava", "ok": true}]
                },
                "defects": [{"description": "Uvolněná svorka"}]
            })),
            None,
            max_width(),
        )
        .unwrap()
        .part_text(DOCUMENT_PART)
        .unwrap();
        assert!(xml.contains("Kontinuita svodů"));
        assert!(xml.contains("120 mΩ"));
        assert!(xml.contains("Vizuální kontrola"));
        assert!(!xml.contains("SPD / přepěťová ochrana"));
        assert!(xml.contains("Uvolněná svorka"));
    }
}
