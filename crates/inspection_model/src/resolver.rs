//! Field resolution across nested measurement records
//!
//! Measured values of a component may sit on the record itself or inside one
//! of several nested containers, and each field is known under many names.
//! Both the probe locations and the synonym lists are static tables.

use crate::form::{format_number, lookup, non_blank_text};
use serde_json::Value;

/// A location probed for a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePath {
    /// The record itself
    Record,
    /// A nested object at a dotted path below the record
    Nested(&'static str),
}

impl ProbePath {
    fn container<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        match self {
            ProbePath::Record => Some(record),
            ProbePath::Nested(path) => lookup(record, path).filter(|v| v.is_object()),
        }
    }
}

/// Default probe order: the record, its result, the result value, then the
/// test and measurement containers.
pub const DEFAULT_PROBES: &[ProbePath] = &[
    ProbePath::Record,
    ProbePath::Nested("result"),
    ProbePath::Nested("result.value"),
    ProbePath::Nested("zkouska"),
    ProbePath::Nested("mereni"),
];

/// Resolves a field by synonyms over a fixed list of probe locations
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver {
    probes: &'static [ProbePath],
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver {
    /// Create a resolver with the default probe order
    pub fn new() -> Self {
        Self { probes: DEFAULT_PROBES }
    }

    /// Create a resolver with a custom probe order
    pub fn with_probes(probes: &'static [ProbePath]) -> Self {
        Self { probes }
    }

    /// Return the first non-blank value for any synonym.
    ///
    /// Synonyms are tried in order; for each synonym every probe location is
    /// tried in order. The returned text is trimmed.
    pub fn resolve(&self, record: &Value, synonyms: &[&str]) -> Option<String> {
        synonyms.iter().find_map(|key| {
            self.probes.iter().find_map(|probe| {
                probe
                    .container(record)
                    .and_then(|container| container.as_object())
                    .and_then(|map| map.get(*key))
                    .and_then(non_blank_text)
            })
        })
    }

    /// Resolve a catalogued component field, applying numeric normalization
    /// where the field is numeric
    pub fn resolve_field(&self, record: &Value, field: ComponentField) -> Option<String> {
        let raw = self.resolve(record, field.synonyms())?;
        Some(if field.is_numeric() {
            normalize_number(&raw)
        } else {
            raw
        })
    }
}

/// Normalize a numeric-looking value.
///
/// A decimal comma is accepted. When the text parses as a finite number it
/// is re-emitted with a dot separator, otherwise the original text is
/// returned unchanged.
pub fn normalize_number(raw: &str) -> String {
    let candidate = raw.replacen(',', ".", 1);
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return raw.to_string();
    }
    match candidate.parse::<f64>() {
        Ok(n) if n.is_finite() => format_number(n),
        _ => raw.to_string(),
    }
}

/// Technical fields of an electrical component record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentField {
    Name,
    Description,
    Manufacturer,
    Type,
    Poles,
    Dimension,
    InsulationResistance,
    LoopImpedance,
    TripTime,
    TripCurrent,
    TouchVoltage,
    Note,
}

impl ComponentField {
    /// Measurement fields in display order
    pub const MEASUREMENTS: [ComponentField; 9] = [
        ComponentField::Type,
        ComponentField::Poles,
        ComponentField::Dimension,
        ComponentField::InsulationResistance,
        ComponentField::LoopImpedance,
        ComponentField::TripTime,
        ComponentField::TripCurrent,
        ComponentField::TouchVoltage,
        ComponentField::Note,
    ];

    /// Field names under which this field has been stored
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Name => &["nazev", "name"],
            Self::Description => &["popis", "description"],
            Self::Manufacturer => &["vyrobce", "manufacturer", "maker"],
            Self::Type => &["typ", "type", "druh"],
            Self::Poles => &["poles", "poly", "pocet_polu", "pocetPolu"],
            Self::Dimension => &["dimenze", "dim", "prurez"],
            Self::InsulationResistance => &["riso", "Riso", "izolace", "insulation"],
            Self::LoopImpedance => &["ochrana", "zs", "Zs", "smycka", "loop_impedance"],
            Self::TripTime => &[
                "vybavovaciCasMs",
                "vybavovaci_cas_ms",
                "t",
                "time",
                "trip_time",
                "rcd_time",
                "vybavovaci_cas",
                "vybavovaciCas",
                "cas_vybaveni",
                "cas",
            ],
            Self::TripCurrent => &[
                "vybavovaciProudmA",
                "vybavovaci_proud_ma",
                "ifi",
                "i_fi",
                "iDelta",
                "i_delta",
                "i_delta_n",
                "idn",
                "IΔn",
                "IΔ",
                "rcd_trip_current",
                "vybavovaci_proud",
                "vybavovaciProud",
                "trip_current",
            ],
            Self::TouchVoltage => &["ui", "u_i", "ut", "u_touch", "dotykove_napeti"],
            Self::Note => &["poznamka", "pozn", "note", "poznámka"],
        }
    }

    /// Label used in component display lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "název",
            Self::Description => "popis",
            Self::Manufacturer => "výrobce",
            Self::Type => "typ",
            Self::Poles => "póly",
            Self::Dimension => "dim.",
            Self::InsulationResistance => "Riso",
            Self::LoopImpedance => "Zs",
            Self::TripTime => "t",
            Self::TripCurrent => "IΔ",
            Self::TouchVoltage => "Uᵢ",
            Self::Note => "Pozn.",
        }
    }

    /// Physical unit appended to the value, if any
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::InsulationResistance => Some("MΩ"),
            Self::LoopImpedance => Some("Ω"),
            Self::TripTime => Some("ms"),
            Self::TripCurrent => Some("mA"),
            Self::TouchVoltage => Some("V"),
            _ => None,
        }
    }

    /// Whether values are normalized as numbers
    pub fn is_numeric(&self) -> bool {
        self.unit().is_some()
    }
}
