//! Electrical installation report view

use crate::board::BoardView;
use crate::classify::{SafetyVerdict, VerdictSubject};
use crate::catalogue::RZ_SCALAR_KEYS;
use crate::model::{TemplateScope, TemplateValue};
use crate::text::{dash, list_or_dash, strip_html};
use inspection_model::{first_non_blank, lookup, non_blank_at, value_text, FieldResolver, FormData};
use serde_json::Value;

/// Everything the electrical report is generated from
#[derive(Debug, Clone, Default)]
pub struct RzInput {
    pub form: FormData,
    pub technician: FormData,
    pub norms: Vec<String>,
    pub instruments: Vec<Instrument>,
    pub revision_id: Option<String>,
}

impl RzInput {
    /// Read technician, norms, instruments and revision id from the form itself
    pub fn from_form(form: FormData) -> Self {
        let technician = form.section("technician");
        let norms = match form.str_list("normsAll") {
            norms if norms.is_empty() => form.str_list("norms"),
            norms => norms,
        };
        let instruments = form
            .list("usedInstruments")
            .iter()
            .map(Instrument::from_record)
            .collect();
        let revision_id = form.first_non_blank(&["revId", "revisionId"]);

        Self {
            form,
            technician,
            norms,
            instruments,
            revision_id,
        }
    }
}

/// A measuring instrument row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instrument {
    pub name: String,
    pub serial: String,
    pub calibration: String,
}

impl Instrument {
    pub fn from_record(record: &Value) -> Self {
        Self {
            name: dash(first_non_blank(record, &["name", "measurement_text"])),
            serial: dash(first_non_blank(record, &["serial", "serial_no", "sn"])),
            calibration: dash(first_non_blank(
                record,
                &["calibration", "calibration_code", "calibration_list"],
            )),
        }
    }
}

/// Inspecting technician
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicianBlock {
    pub name: String,
    pub company: String,
    pub certificate: String,
    pub authorization: String,
    pub ico: String,
    pub dic: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl TechnicianBlock {
    fn from_form(tech: &FormData) -> Self {
        Self {
            name: dash(tech.non_blank("jmeno")),
            company: dash(tech.non_blank("firma")),
            certificate: dash(tech.non_blank("cislo_osvedceni")),
            authorization: dash(tech.non_blank("cislo_opravneni")),
            ico: dash(tech.non_blank("ico")),
            dic: dash(tech.non_blank("dic")),
            address: dash(tech.non_blank("adresa")),
            phone: dash(tech.non_blank("phone")),
            email: dash(tech.non_blank("email")),
        }
    }

    /// Labelled rows in display order
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Jméno", &self.name),
            ("Firma", &self.company),
            ("Ev. č. osvědčení", &self.certificate),
            ("Ev. č. oprávnění", &self.authorization),
            ("IČO", &self.ico),
            ("DIČ", &self.dic),
            ("Adresa", &self.address),
            ("Telefon", &self.phone),
            ("E-mail", &self.email),
        ]
    }
}

/// Inspected object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBlock {
    pub address: String,
    pub subject: String,
    pub client: String,
}

impl ObjectBlock {
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Adresa stavby", &self.address),
            ("Předmět revize", &self.subject),
            ("Objednatel revize", &self.client),
        ]
    }
}

/// Identification chapter
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub assembly_company: String,
    pub assembly_authorization: String,
    pub protection_basic: String,
    pub protection_fault: String,
    pub protection_additional: String,
    pub description: String,
    pub voltage: String,
    pub network: String,
    pub documentation: String,
    pub environment: String,
    pub attachments: String,
}

/// One performed test
#[derive(Debug, Clone, PartialEq)]
pub struct TestEntry {
    pub name: String,
    /// Note or result text, possibly empty
    pub note: String,
}

/// One device measured in a room
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRow {
    pub kind: String,
    pub count: String,
    pub dimension: String,
    pub insulation: String,
    pub protection: String,
    pub note: String,
}

impl DeviceRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.count.clone(),
            self.dimension.clone(),
            self.insulation.clone(),
            self.protection.clone(),
            self.note.clone(),
        ]
    }
}

/// A room with its devices
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    pub name: String,
    pub note: String,
    pub devices: Vec<DeviceRow>,
}

/// One defect
#[derive(Debug, Clone, PartialEq)]
pub struct DefectRow {
    pub description: String,
    pub standard: String,
    pub article: String,
}

/// Display-ready electrical installation report
#[derive(Debug, Clone, PartialEq)]
pub struct RzReport {
    pub evidence_number: String,
    /// Raw identifier used for the file name, if any
    pub record_id: Option<String>,
    pub revision_type: String,
    pub norms: Vec<String>,
    pub technician: TechnicianBlock,
    pub object: ObjectBlock,
    pub verdict: SafetyVerdict,
    pub verdict_label: String,
    pub next_revision: String,
    pub instruments: Vec<Instrument>,
    pub identification: Identification,
    pub tasks: Vec<String>,
    pub tests: Vec<TestEntry>,
    pub boards: Vec<BoardView>,
    pub rooms: Vec<RoomView>,
    pub defects: Vec<DefectRow>,
    pub conclusion_text: String,
}

impl RzReport {
    pub fn build(input: &RzInput) -> Self {
        Self::build_with(input, &FieldResolver::new())
    }

    pub fn build_with(input: &RzInput, resolver: &FieldResolver) -> Self {
        let form = &input.form;
        let record_id = form.non_blank("evidencni").or_else(|| input.revision_id.clone());
        let verdict = SafetyVerdict::from_code(form.non_blank("conclusion.safety").as_deref());

        let boards = form
            .list("boards")
            .iter()
            .enumerate()
            .map(|(i, b)| BoardView::from_record(b, i, resolver))
            .collect::<Vec<_>>();

        tracing::debug!(
            boards = boards.len(),
            rooms = form.list("rooms").len(),
            defects = form.list("defects").len(),
            "built electrical report view"
        );

        Self {
            evidence_number: dash(record_id.as_deref()),
            record_id,
            revision_type: dash(form.non_blank("typRevize")),
            norms: input.norms.clone(),
            technician: TechnicianBlock::from_form(&input.technician),
            object: ObjectBlock {
                address: dash(form.non_blank("adresa")),
                subject: dash(form.non_blank("objekt")),
                client: dash(form.non_blank("objednatel")),
            },
            verdict_label: verdict.label(VerdictSubject::Installation),
            verdict,
            next_revision: dash(form.non_blank("conclusion.validUntil")),
            instruments: input.instruments.clone(),
            identification: Identification {
                assembly_company: dash(form.non_blank("montFirma")),
                assembly_authorization: dash(form.non_blank("montFirmaAuthorization")),
                protection_basic: list_or_dash(&form.str_list("protection_basic")),
                protection_fault: list_or_dash(&form.str_list("protection_fault")),
                protection_additional: list_or_dash(&form.str_list("protection_additional")),
                description: dash(
                    form.non_blank("inspectionDescription").map(|html| strip_html(&html)),
                ),
                voltage: dash(form.non_blank("voltage")),
                network: dash(form.non_blank("sit")),
                documentation: dash(form.non_blank("documentation")),
                environment: dash(form.non_blank("environment")),
                attachments: dash(form.non_blank("extraNotes")),
            },
            tasks: form.str_list("performedTasks"),
            tests: tests_from(form.get("tests")),
            boards,
            rooms: form.list("rooms").iter().map(room_from).collect(),
            defects: form
                .list("defects")
                .iter()
                .map(|d| DefectRow {
                    description: dash(non_blank_at(d, "description")),
                    standard: dash(non_blank_at(d, "standard")),
                    article: dash(non_blank_at(d, "article")),
                })
                .collect(),
            conclusion_text: dash(form.non_blank("conclusion.text")),
        }
    }

    /// Norms joined with commas, or `—`
    pub fn norms_text(&self) -> String {
        list_or_dash(&self.norms)
    }

    /// Sectioned data model for loop-aware templates
    pub fn to_template_scope(&self) -> TemplateScope {
        let t = &self.technician;
        let scope = TemplateScope::new()
            .with("EVIDENCNI", self.evidence_number.as_str())
            .with("TYP_REVIZE", self.revision_type.as_str())
            .with("NORMY", self.norms_text())
            .with("TECH_JMENO", t.name.as_str())
            .with("TECH_FIRMA", t.company.as_str())
            .with("TECH_OSV", t.certificate.as_str())
            .with("TECH_OPR", t.authorization.as_str())
            .with("TECH_ICO", t.ico.as_str())
            .with("TECH_DIC", t.dic.as_str())
            .with("TECH_ADRESA", t.address.as_str())
            .with("TECH_TEL", t.phone.as_str())
            .with("TECH_EMAIL", t.email.as_str())
            .with("OBJ_ADRESA", self.object.address.as_str())
            .with("OBJ_PREDMET", self.object.subject.as_str())
            .with("OBJ_OBJEDNATEL", self.object.client.as_str())
            .with("VYSLEDEK_TEXT", self.verdict_label.as_str())
            .with("DALSIREVIZE", self.next_revision.as_str())
            .with(
                "PROHLIDKA",
                self.tasks
                    .iter()
                    .map(|task| TemplateScope::new().with("TEXT", dash(Some(task))))
                    .collect::<Vec<_>>(),
            )
            .with(
                "ZKOUSKY",
                self.tests
                    .iter()
                    .map(|test| {
                        TemplateScope::new()
                            .with("NAME", dash(Some(&test.name)))
                            .with("NOTE", dash(Some(&test.note)))
                    })
                    .collect::<Vec<_>>(),
            )
            .with(
                "INSTRUMENTS",
                self.instruments
                    .iter()
                    .map(|i| {
                        TemplateScope::new()
                            .with("NAME", i.name.as_str())
                            .with("SERIAL", i.serial.as_str())
                            .with("CAL", i.calibration.as_str())
                    })
                    .collect::<Vec<_>>(),
            )
            .with(
                "BOARDS",
                self.boards.iter().map(board_scope).collect::<Vec<_>>(),
            )
            .with(
                "ROOMS",
                self.rooms.iter().map(room_scope).collect::<Vec<_>>(),
            )
            .with(
                "ZAVADY",
                self.defects
                    .iter()
                    .map(|d| {
                        TemplateScope::new()
                            .with("POPIS", d.description.as_str())
                            .with("CSN", d.standard.as_str())
                            .with("CLANEK", d.article.as_str())
                    })
                    .collect::<Vec<_>>(),
            );

        debug_assert!(RZ_SCALAR_KEYS.iter().all(|k| scope.lookup(k).is_some()));
        scope
    }
}

fn board_scope(board: &BoardView) -> TemplateScope {
    let components: Vec<TemplateScope> = board
        .components
        .iter()
        .map(|c| {
            let detail = c.detail();
            TemplateScope::new()
                .with("LINE_LEFT", c.bullet_title())
                .with("LINE_RIGHT", if detail.is_empty() { " ".to_string() } else { detail })
        })
        .collect();

    TemplateScope::new()
        .with("TITLE", board.title.as_str())
        .with("DESC", board.meta.as_str())
        .with("COMPONENTS", TemplateValue::List(components))
}

fn room_scope(room: &RoomView) -> TemplateScope {
    let devices: Vec<TemplateScope> = room
        .devices
        .iter()
        .map(|d| {
            TemplateScope::new()
                .with("TYP", d.kind.as_str())
                .with("POCET", d.count.as_str())
                .with("DIM", d.dimension.as_str())
                .with("RISO", d.insulation.as_str())
                .with("OCHR", d.protection.as_str())
                .with("POZN", d.note.as_str())
        })
        .collect();

    TemplateScope::new()
        .with("NAME", room.name.as_str())
        .with("NOTE", room.note.as_str())
        .with("DEVICES", devices)
}

fn room_from(room: &Value) -> RoomView {
    RoomView {
        name: dash(non_blank_at(room, "name")),
        note: dash(non_blank_at(room, "details")),
        devices: inspection_model::list_at(room, "devices")
            .iter()
            .map(|d| DeviceRow {
                kind: dash(non_blank_at(d, "typ")),
                count: dash(non_blank_at(d, "pocet")),
                dimension: dash(non_blank_at(d, "dimenze")),
                insulation: dash(non_blank_at(d, "riso")),
                protection: dash(non_blank_at(d, "ochrana")),
                note: dash(first_non_blank(d, &["podrobnosti", "note"])),
            })
            .collect(),
    }
}

/// Tests are stored as an object keyed by test name
fn tests_from(tests: Option<&Value>) -> Vec<TestEntry> {
    let Some(Value::Object(map)) = tests else {
        return Vec::new();
    };
    map.iter()
        .map(|(name, value)| TestEntry {
            name: name.clone(),
            note: test_note(value),
        })
        .collect()
}

fn test_note(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Object(_) => ["note", "result.note", "result"]
            .iter()
            .filter_map(|path| lookup(value, path))
            .find(|v| !v.is_null())
            .filter(|v| !v.is_object() && !v.is_array())
            .and_then(value_text)
            .unwrap_or_default(),
        other => value_text(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_input() -> RzInput {
        RzInput::from_form(FormData::new(json!({
            "evidencni": "RZ-2024-015",
            "typRevize": "Výchozí",
            "adresa": "Hlavní 12, Brno",
            "objekt": "Rodinný dům",
            "conclusion": { "safety": "able", "validUntil": "2028-05-01", "text": "Bez závad." },
            "normsAll": ["ČSN 33 2000-6 ed.2", "ČSN 33 1500"],
            "technician": { "jmeno": "Jan Novák", "firma": "Elektro s.r.o." },
            "usedInstruments": [{ "name": "MI 3152", "serial": "19370123", "calibration": "K-15/24" }],
            "performedTasks": ["Kontrola krytů", "  "],
            "tests": {
                "Impedance smyčky": { "note": "vyhovuje" },
                "Izolační odpor": "OK",
                "Funkce RCD": { "result": { "note": "30 mA" } },
                "Prázdná": null
            },
            "boards": [{
                "name": "RH1",
                "komponenty": [
                    { "id": "a", "nazev": "Hlavní vypínač", "typ": "3P 40A" },
                    { "id": "b", "nazev": "B16", "parentId": "a", "riso": ">200" }
                ]
            }],
            "rooms": [{ "name": "Kuchyň", "devices": [{ "typ": "Zásuvka", "pocet": 4, "riso": "250" }] }],
            "defects": [{ "description": "Chybí kryt", "standard": "33 2000-4-41", "article": "411.3" }],
            "inspectionDescription": "<p>Novostavba</p>"
        })))
    }

    #[test]
    fn test_input_from_form() {
        let input = sample_input();
        assert_eq!(input.norms.len(), 2);
        assert_eq!(input.instruments[0].name, "MI 3152");
        assert_eq!(input.technician.text("jmeno").as_deref(), Some("Jan Novák"));
    }

    #[test]
    fn test_report_fields() {
        let report = RzReport::build(&sample_input());
        assert_eq!(report.evidence_number, "RZ-2024-015");
        assert_eq!(report.verdict, SafetyVerdict::Compliant);
        assert_eq!(
            report.verdict_label,
            "Elektrická instalace je z hlediska bezpečnosti schopna provozu"
        );
        assert_eq!(report.object.client, "—");
        assert_eq!(report.technician.email, "—");
        assert_eq!(report.tasks, vec!["Kontrola krytů"]);
        assert_eq!(report.identification.description, "Novostavba");
        assert_eq!(report.norms_text(), "ČSN 33 2000-6 ed.2, ČSN 33 1500");
    }

    #[test]
    fn test_tests_keep_form_order_and_notes() {
        let report = RzReport::build(&sample_input());
        let notes: Vec<(&str, &str)> = report
            .tests
            .iter()
            .map(|t| (t.name.as_str(), t.note.as_str()))
            .collect();
        assert_eq!(
            notes,
            vec![
                ("Impedance smyčky", "vyhovuje"),
                ("Izolační odpor", "OK"),
                ("Funkce RCD", "30 mA"),
                ("Prázdná", ""),
            ]
        );
    }

    #[test]
    fn test_template_scope_sections() {
        let scope = RzReport::build(&sample_input()).to_template_scope();
        for key in RZ_SCALAR_KEYS {
            assert!(scope.text(key).is_some(), "missing {}", key);
        }
        assert_eq!(scope.text("OBJ_OBJEDNATEL"), Some("—"));

        let Some(TemplateValue::List(boards)) = scope.lookup("BOARDS") else {
            panic!("BOARDS is not a list");
        };
        let Some(TemplateValue::List(components)) = boards[0].lookup("COMPONENTS") else {
            panic!("COMPONENTS is not a list");
        };
        assert_eq!(components[0].text("LINE_LEFT"), Some("• Hlavní vypínač"));
        assert_eq!(components[0].text("LINE_RIGHT"), Some("typ: 3P 40A"));
        assert_eq!(components[1].text("LINE_LEFT"), Some("\u{00A0}\u{00A0}▸ B16"));
        assert_eq!(components[1].text("LINE_RIGHT"), Some("Riso: >200 MΩ"));

        let Some(TemplateValue::List(tests)) = scope.lookup("ZKOUSKY") else {
            panic!("ZKOUSKY is not a list");
        };
        assert_eq!(tests[3].text("NOTE"), Some("—"));
    }

    fn assert_section_keys(scope: &TemplateScope, sections: &[crate::catalogue::SectionKeys]) {
        for section in sections {
            let Some(TemplateValue::List(items)) = scope.lookup(section.name) else {
                panic!("{} is not a list", section.name);
            };
            for item in items {
                for key in section.item_keys {
                    assert!(item.text(key).is_some(), "{}.{} missing", section.name, key);
                }
                assert_section_keys(item, section.nested);
            }
        }
    }

    #[test]
    fn test_scope_matches_section_catalogue() {
        let scope = RzReport::build(&sample_input()).to_template_scope();
        assert_section_keys(&scope, crate::catalogue::RZ_SECTIONS);
    }

    #[test]
    fn test_revision_id_fallback() {
        let input = RzInput::from_form(FormData::new(json!({ "revId": "42" })));
        let report = RzReport::build(&input);
        assert_eq!(report.evidence_number, "42");
        assert_eq!(report.record_id.as_deref(), Some("42"));

        let empty = RzReport::build(&RzInput::default());
        assert_eq!(empty.evidence_number, "—");
        assert_eq!(empty.record_id, None);
        assert_eq!(empty.verdict_label, "Chybí informace");
        assert!(empty.boards.is_empty());
    }
}
