//! Lightning protection system report view

use crate::catalogue::LPS_KEYS;
use crate::classify::{
    scope_text, spd_protection_label, standard_display_name, visual_state_label, SafetyVerdict,
    VerdictSubject,
};
use crate::model::FlatData;
use crate::text::{dash_ascii, format_date, numbered_list};
use inspection_model::{first_non_blank, lookup, non_blank_at, normalize_number, FormData};
use serde_json::Value;

const DEFAULT_DISTRIBUTION: &str = "Provozovatel 2x, Revizní technik 1x";

/// A measuring instrument used during the inspection
#[derive(Debug, Clone, PartialEq)]
pub struct LpsInstrument {
    pub id: Option<String>,
    pub name: Option<String>,
    pub serial: Option<String>,
    pub calibration: Option<String>,
    pub note: Option<String>,
}

impl LpsInstrument {
    fn from_record(record: &Value) -> Self {
        Self {
            id: non_blank_at(record, "id"),
            name: first_non_blank(record, &["name", "measurement_text"]),
            serial: first_non_blank(record, &["serial", "measurement_text", "serial_no", "sn"]),
            calibration: first_non_blank(
                record,
                &["calibration_code", "calibration_list", "calibration"],
            ),
            note: non_blank_at(record, "note"),
        }
    }
}

/// Earth electrode resistance measurement
#[derive(Debug, Clone, PartialEq)]
pub struct EarthRow {
    pub label: Option<String>,
    pub value_ohm: Option<String>,
    /// Instrument name, taken from the row or from the referenced instrument
    pub instrument: Option<String>,
    pub note: Option<String>,
}

impl EarthRow {
    /// `15.5 Ω`, or `-`
    pub fn value_text(&self) -> String {
        match &self.value_ohm {
            Some(v) => format!("{} Ω", v),
            None => dash_ascii::<&str>(None),
        }
    }
}

/// Down conductor continuity measurement
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityRow {
    pub label: Option<String>,
    pub value: Option<String>,
    pub note: Option<String>,
}

/// Surge protection device test
#[derive(Debug, Clone, PartialEq)]
pub struct SpdRow {
    pub location: Option<String>,
    pub kind: Option<String>,
    pub result: Option<String>,
    pub note: Option<String>,
}

/// Visual check item
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRow {
    pub item: Option<String>,
    pub ok: bool,
    pub note: Option<String>,
}

impl VisualRow {
    pub fn state(&self) -> &'static str {
        visual_state_label(self.ok)
    }
}

/// A found defect
#[derive(Debug, Clone, PartialEq)]
pub struct DefectEntry {
    pub description: Option<String>,
    /// `standard / article`, or whichever of the two is present
    pub standard: Option<String>,
    pub recommendation: Option<String>,
}

/// Technician identification as stored on the LPS form
#[derive(Debug, Clone, PartialEq)]
pub struct LpsTechnician {
    pub name: String,
    pub company: String,
    pub ico: String,
    pub dic: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub certificate: String,
    pub authorization: String,
    /// First of phone, e-mail or address
    pub contact: String,
}

/// Display-ready lightning protection report
#[derive(Debug, Clone, PartialEq)]
pub struct LpsReport {
    pub record_id: Option<String>,
    pub revision_type: String,
    pub evidence_number: String,
    /// Evidence number for the page header, falling back to the project number
    pub header_number: String,
    pub project_id: String,
    pub object_name: String,
    pub object_address: String,
    pub object_description: String,
    pub client_name: String,
    pub client_address: String,
    pub client_ic: String,
    pub client_dic: String,
    pub object_type: String,
    pub order_description: String,
    pub operator_name: String,
    pub project_by: String,
    pub project_no: String,
    pub technician: LpsTechnician,
    pub date_start: String,
    pub date_end: String,
    pub date_created: String,
    pub next_revision: String,
    pub primary_standard: String,
    pub lps_class: String,
    pub spd_protection: String,
    pub scope: Vec<String>,
    pub measurement_method: String,
    pub verdict: SafetyVerdict,
    safety_text: Option<String>,
    pub conclusion_text: String,
    pub conclusion_note: String,
    /// Closing paragraph: conclusion text, else the report text
    pub closing_text: String,
    pub sketch_note: String,
    pub down_conductors: String,
    pub earthing_type: String,
    pub ground_material: String,
    pub roof_type: String,
    pub roof_cover: String,
    pub soil_type: String,
    pub weather: String,
    distribution_list: Option<String>,
    pub signature_city: String,
    pub instruments: Vec<LpsInstrument>,
    pub earth: Vec<EarthRow>,
    pub continuity: Vec<ContinuityRow>,
    pub spd: Vec<SpdRow>,
    pub visual: Vec<VisualRow>,
    pub defects: Vec<DefectEntry>,
    sketch_data_url: Option<String>,
}

impl LpsReport {
    pub fn build(form: &FormData) -> Self {
        Self::build_with_id(form, None)
    }

    /// Build the view; `revision_id` names the file when the form carries no
    /// evidence number
    pub fn build_with_id(form: &FormData, revision_id: Option<&str>) -> Self {
        let lps = form.section("lps");
        let d = |value: Option<String>| dash_ascii(value);

        let instruments: Vec<LpsInstrument> = form
            .list("measuringInstruments")
            .iter()
            .map(LpsInstrument::from_record)
            .collect();
        let earth = lps
            .list("earthResistance")
            .iter()
            .map(|row| earth_row(row, &instruments))
            .collect::<Vec<_>>();

        let tech = |flat: &str, nested: &str| form.first_non_blank(&[flat, nested]);
        let phone = tech("technicianPhone", "technician.phone");
        let email = tech("technicianEmail", "technician.email");
        let address = tech("technicianCompanyAddress", "technician.adresa");
        let technician = LpsTechnician {
            name: d(tech("technicianName", "technician.jmeno")),
            company: d(tech("technicianCompanyName", "technician.firma")),
            ico: d(tech("technicianCompanyIco", "technician.ico")),
            dic: d(tech("technicianCompanyDic", "technician.dic")),
            certificate: d(tech("technicianCertificateNumber", "technician.cislo_osvedceni")),
            authorization: d(tech("technicianAuthorizationNumber", "technician.cislo_opravneni")),
            contact: d(phone.clone().or_else(|| email.clone()).or_else(|| address.clone())),
            phone: d(phone),
            email: d(email),
            address: d(address),
        };

        let record_id = form
            .non_blank("evidencni")
            .or_else(|| revision_id.map(str::trim).filter(|s| !s.is_empty()).map(String::from));
        let report_text = lps.non_blank("reportText");

        let report = Self {
            revision_type: d(form.non_blank("typRevize")),
            evidence_number: d(form.non_blank("evidencni")),
            header_number: d(form.non_blank("evidencni").or_else(|| lps.non_blank("projectNo"))),
            record_id,
            project_id: d(lps.non_blank("projectNo").or_else(|| form.non_blank("projectId"))),
            object_name: d(form.non_blank("objekt")),
            object_address: d(form.non_blank("adresa")),
            object_description: d(report_text.clone().or_else(|| form.non_blank("extraNotes"))),
            client_name: d(form.non_blank("objednatel")),
            client_address: d(form.non_blank("clientAddress")),
            client_ic: d(form.non_blank("clientIco")),
            client_dic: d(form.non_blank("clientDic")),
            object_type: d(lps.first_non_blank(&["objectTypeOther", "objectType"])),
            order_description: d(lps
                .non_blank("orderDescription")
                .or_else(|| form.non_blank("orderDescription"))),
            operator_name: d(lps.non_blank("owner")),
            project_by: d(lps.non_blank("projectBy")),
            project_no: d(lps.non_blank("projectNo")),
            technician,
            date_start: format_date(form.non_blank("date_start")),
            date_end: format_date(form.non_blank("date_end")),
            date_created: format_date(form.non_blank("date_created")),
            next_revision: format_date(
                form.non_blank("conclusion.validUntil")
                    .or_else(|| lps.non_blank("nextRevision")),
            ),
            primary_standard: standard_display_name(lps.non_blank("standard").as_deref()),
            lps_class: d(lps.non_blank("class")),
            spd_protection: spd_protection_label(lps.non_blank("spdProtectionUsed").as_deref()),
            scope: lps.str_list("scopeChecks"),
            measurement_method: d(lps.non_blank("measurementMethod")),
            verdict: SafetyVerdict::from_code(form.non_blank("conclusion.safety").as_deref()),
            safety_text: form.non_blank("conclusion.safetyText"),
            conclusion_text: d(form.non_blank("conclusion.text")),
            conclusion_note: d(form
                .non_blank("conclusion.note")
                .or_else(|| lps.non_blank("conclusionNote"))),
            closing_text: d(form.non_blank("conclusion.text").or(report_text)),
            sketch_note: d(lps.non_blank("sketchNote")),
            down_conductors: d(lps.first_non_blank(&[
                "downConductorsCountOther",
                "downConductorsCount",
            ])),
            earthing_type: d(lps.non_blank("earthingType")),
            ground_material: d(lps.first_non_blank(&["conductorMaterial", "earthingType"])),
            roof_type: d(lps.first_non_blank(&["roofTypeOther", "roofType"])),
            roof_cover: d(lps.first_non_blank(&["roofCoverOther", "roofCover"])),
            soil_type: d(lps.non_blank("soilType")),
            weather: d(lps.first_non_blank(&["weather", "weatherConditions"])),
            distribution_list: lps.non_blank("distributionList"),
            signature_city: d(lps
                .non_blank("signatureCity")
                .or_else(|| form.non_blank("signatureCity"))),
            instruments,
            earth,
            continuity: lps
                .list("continuity")
                .iter()
                .map(|row| ContinuityRow {
                    label: first_non_blank(row, &["conductor", "label"]),
                    value: non_blank_at(row, "valueMilliOhm")
                        .map(|v| format!("{} mΩ", v))
                        .or_else(|| non_blank_at(row, "value")),
                    note: non_blank_at(row, "note"),
                })
                .collect(),
            spd: lps
                .list("spdTests")
                .iter()
                .map(|row| SpdRow {
                    location: non_blank_at(row, "location"),
                    kind: non_blank_at(row, "type"),
                    result: non_blank_at(row, "result"),
                    note: non_blank_at(row, "note"),
                })
                .collect(),
            visual: lps
                .list("visualChecks")
                .iter()
                .map(|row| VisualRow {
                    item: non_blank_at(row, "text"),
                    ok: lookup(row, "ok").is_some_and(truthy),
                    note: non_blank_at(row, "note"),
                })
                .collect(),
            defects: form.list("defects").iter().map(defect_entry).collect(),
            sketch_data_url: lps.non_blank("sketchPng").or_else(|| form.non_blank("sketchPng")),
        };

        tracing::debug!(
            instruments = report.instruments.len(),
            earth = report.earth.len(),
            defects = report.defects.len(),
            sketch = report.sketch_data_url.is_some(),
            "built lightning protection report view"
        );
        report
    }

    /// Overall assessment sentence for the report body
    pub fn assessment(&self) -> String {
        self.verdict_text(VerdictSubject::Installation)
    }

    /// Safety status sentence for template data
    pub fn safety_status(&self) -> String {
        self.verdict_text(VerdictSubject::Device)
    }

    fn verdict_text(&self, subject: VerdictSubject) -> String {
        match &self.verdict {
            SafetyVerdict::Unspecified => dash_ascii(self.safety_text.as_deref()),
            verdict => verdict.label(subject),
        }
    }

    /// Distribution list, defaulting to the usual recipients
    pub fn distribution(&self) -> &str {
        self.distribution_list.as_deref().unwrap_or(DEFAULT_DISTRIBUTION)
    }

    /// Scope labels joined by `separator`, or `None` when no scope was ticked
    pub fn scope_text(&self, separator: &str) -> Option<String> {
        Some(scope_text(&self.scope, separator)).filter(|s| !s.is_empty())
    }

    /// Base64 data URL of the hand-drawn sketch
    pub fn sketch_data_url(&self) -> Option<&str> {
        self.sketch_data_url.as_deref()
    }

    /// Flat key → text map covering every lightning protection key
    pub fn to_flat_data(&self) -> FlatData {
        let mut data = FlatData::new();
        let t = &self.technician;
        let column = |values: Vec<String>| numbered_list(&values);
        let dashed = |value: &Option<String>| dash_ascii(value.as_deref());

        for (key, value) in [
            ("REVISION_TYPE", &self.revision_type),
            ("EVIDENCE_NUMBER", &self.evidence_number),
            ("PROJECT_ID", &self.project_id),
            ("OBJECT_NAME", &self.object_name),
            ("OBJECT_ADDRESS", &self.object_address),
            ("OBJECT_DESCRIPTION", &self.object_description),
            ("CLIENT_NAME", &self.client_name),
            ("CLIENT_ADDRESS", &self.client_address),
            ("CLIENT_IC", &self.client_ic),
            ("CLIENT_DIC", &self.client_dic),
            ("OBJECT_TYPE", &self.object_type),
            ("ORDER_DESCRIPTION", &self.order_description),
            ("OPERATOR_NAME", &self.operator_name),
            ("PROJECT_BY", &self.project_by),
            ("PROJECT_NO", &self.project_no),
            ("TECH_NAME", &t.name),
            ("TECH_COMPANY", &t.company),
            ("TECH_ICO", &t.ico),
            ("TECH_DIC", &t.dic),
            ("TECH_PHONE", &t.phone),
            ("TECH_EMAIL", &t.email),
            ("TECH_ADDRESS", &t.address),
            ("TECH_CERTIFICATE", &t.certificate),
            ("TECH_AUTHORIZATION", &t.authorization),
            ("DATE_START", &self.date_start),
            ("DATE_END", &self.date_end),
            ("DATE_CREATED", &self.date_created),
            ("NEXT_REVISION", &self.next_revision),
            ("PRIMARY_STANDARD", &self.primary_standard),
            ("LPS_CLASS", &self.lps_class),
            ("SPD_PROTECTION_INFO", &self.spd_protection),
            ("MEASUREMENT_METHOD", &self.measurement_method),
            ("CONCLUSION_TEXT", &self.conclusion_text),
            ("CONCLUSION_NOTE", &self.conclusion_note),
            ("SKETCH_NOTE", &self.sketch_note),
            ("DOWN_CONDUCTORS_COUNT", &self.down_conductors),
            ("EARTHING_TYPE", &self.earthing_type),
            ("GROUND_MATERIAL", &self.ground_material),
            ("ROOF_TYPE", &self.roof_type),
            ("ROOF_COVER", &self.roof_cover),
            ("SOIL_TYPE", &self.soil_type),
            ("WEATHER_CONDITIONS", &self.weather),
            ("SIGNATURE_CITY", &self.signature_city),
            ("SIGNATURE_DATE", &self.date_created),
        ] {
            data.insert(key, value.as_str());
        }

        data.insert("REVISION_SCOPE_TEXT", dash_ascii(self.scope_text(", ")));
        data.insert("SAFETY_STATUS", self.safety_status());
        data.insert("DISTRIBUTION_LIST", dash_ascii(self.distribution_list.as_deref()));

        let instruments = &self.instruments;
        data.insert(
            "MEASURING_INSTRUMENTS",
            if instruments.is_empty() { "Bez záznamu." } else { "Seznam použitých přístrojů:" },
        );
        data.insert("INSTRUMENT_NAME", column(instruments.iter().map(|i| dashed(&i.name)).collect()));
        data.insert(
            "INSTRUMENT_MEASUREMENT",
            column(instruments.iter().map(|i| dashed(&i.serial)).collect()),
        );
        data.insert(
            "INSTRUMENT_CAL_LIST",
            column(instruments.iter().map(|i| dashed(&i.calibration)).collect()),
        );
        data.insert("INSTRUMENT_NOTE", column(instruments.iter().map(|i| dashed(&i.note)).collect()));

        let earth = &self.earth;
        data.insert(
            "EARTH_MEASUREMENTS",
            if earth.is_empty() {
                "Měření zemních odporů nebylo zadáno."
            } else {
                "Měření zemních odporů bylo provedeno."
            },
        );
        data.insert("GROUND_LABEL", column(earth.iter().map(|r| dashed(&r.label)).collect()));
        data.insert("GROUND_VALUE", column(earth.iter().map(EarthRow::value_text).collect()));
        data.insert("GROUND_INSTRUMENT", column(earth.iter().map(|r| dashed(&r.instrument)).collect()));
        data.insert("GROUND_NOTE", column(earth.iter().map(|r| dashed(&r.note)).collect()));

        let continuity = &self.continuity;
        data.insert("CONTINUITY_LABEL", column(continuity.iter().map(|r| dashed(&r.label)).collect()));
        data.insert("CONTINUITY_VALUE", column(continuity.iter().map(|r| dashed(&r.value)).collect()));
        data.insert("CONTINUITY_NOTE", column(continuity.iter().map(|r| dashed(&r.note)).collect()));

        let spd = &self.spd;
        data.insert("SPD_LOCATION", column(spd.iter().map(|r| dashed(&r.location)).collect()));
        data.insert("SPD_TYPE", column(spd.iter().map(|r| dashed(&r.kind)).collect()));
        data.insert("SPD_RESULT", column(spd.iter().map(|r| dashed(&r.result)).collect()));
        data.insert("SPD_NOTE", column(spd.iter().map(|r| dashed(&r.note)).collect()));

        let visual = &self.visual;
        data.insert(
            "VISUAL_CHECKS",
            if visual.is_empty() { "Bez záznamu." } else { "Byla provedena vizuální kontrola." },
        );
        data.insert("VISUAL_ITEM", column(visual.iter().map(|r| dashed(&r.item)).collect()));
        data.insert("VISUAL_STATE", column(visual.iter().map(|r| r.state().to_string()).collect()));
        data.insert("VISUAL_NOTE", column(visual.iter().map(|r| dashed(&r.note)).collect()));

        let defects = &self.defects;
        data.insert("DEFECTS", if defects.is_empty() { "Bez závad." } else { "Byly zjištěny závady." });
        data.insert(
            "DEFECT_DESCRIPTION",
            column(defects.iter().map(|r| dashed(&r.description)).collect()),
        );
        data.insert("DEFECT_STANDARD", column(defects.iter().map(|r| dashed(&r.standard)).collect()));
        data.insert(
            "DEFECT_RECOMMENDATION",
            column(defects.iter().map(|r| dashed(&r.recommendation)).collect()),
        );

        data.complete(LPS_KEYS);
        data
    }
}

fn earth_row(row: &Value, instruments: &[LpsInstrument]) -> EarthRow {
    let instrument = non_blank_at(row, "instrumentName").or_else(|| {
        let id = non_blank_at(row, "instrumentId")?;
        instruments
            .iter()
            .find(|i| i.id.as_deref() == Some(id.as_str()))
            .and_then(|i| i.name.clone())
    });
    EarthRow {
        label: non_blank_at(row, "label"),
        value_ohm: non_blank_at(row, "valueOhm")
            .filter(|v| v != "0")
            .map(|v| normalize_number(&v)),
        instrument,
        note: non_blank_at(row, "note"),
    }
}

fn defect_entry(row: &Value) -> DefectEntry {
    let standard = match (non_blank_at(row, "standard"), non_blank_at(row, "article")) {
        (Some(s), Some(a)) => Some(format!("{} / {}", s, a)),
        (s, a) => s.or(a),
    };
    DefectEntry {
        description: non_blank_at(row, "description"),
        standard,
        recommendation: first_non_blank(row, &["recommendation", "remedy"]),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}
