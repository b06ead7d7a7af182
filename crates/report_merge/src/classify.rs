//! Classification of coded form values into display labels

use crate::text::dash_ascii;

/// Overall safety verdict of an inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// `able`
    Compliant,
    /// `not_able`
    NonCompliant,
    /// Missing or blank
    Unspecified,
    /// Any other code, echoed verbatim
    Other(String),
}

/// What the verdict is about; selects the label set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSubject {
    /// Electrical installation report
    Installation,
    /// Lightning protection device report
    Device,
}

impl SafetyVerdict {
    /// Classify a verdict code.
    ///
    /// Unknown codes are kept as [`SafetyVerdict::Other`] and logged as a
    /// data-quality warning.
    pub fn from_code(code: Option<&str>) -> Self {
        let code = code.map(str::trim).unwrap_or_default();
        match code {
            "" => Self::Unspecified,
            "able" => Self::Compliant,
            "not_able" => Self::NonCompliant,
            other => {
                tracing::warn!(code = other, "unrecognized safety verdict code, echoing it verbatim");
                Self::Other(other.to_string())
            }
        }
    }

    /// Display label for the given subject
    pub fn label(&self, subject: VerdictSubject) -> String {
        match (self, subject) {
            (Self::Compliant, VerdictSubject::Installation) => {
                "Elektrická instalace je z hlediska bezpečnosti schopna provozu".to_string()
            }
            (Self::NonCompliant, VerdictSubject::Installation) => {
                "Elektrická instalace není z hlediska bezpečnosti schopna provozu".to_string()
            }
            (Self::Compliant, VerdictSubject::Device) => {
                "Zařízení je schopno bezpečného provozu".to_string()
            }
            (Self::NonCompliant, VerdictSubject::Device) => {
                "Zařízení není schopno bezpečného provozu".to_string()
            }
            (Self::Unspecified, VerdictSubject::Installation) => "Chybí informace".to_string(),
            (Self::Unspecified, VerdictSubject::Device) => dash_ascii::<&str>(None),
            (Self::Other(code), _) => code.clone(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Canonical display name of a normative standard code
pub fn standard_display_name(code: Option<&str>) -> String {
    let raw = code.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return dash_ascii::<&str>(None);
    }
    let normalized: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if normalized.contains("62305") {
        "ČSN EN 62305-3 ed.2".to_string()
    } else if normalized.contains("341390") {
        "ČSN 34 1390".to_string()
    } else {
        raw.to_string()
    }
}

/// Label for the surge protection usage flag
pub fn spd_protection_label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some("yes") => "Je použita".to_string(),
        Some("no") => "Není použita".to_string(),
        other => dash_ascii(other),
    }
}

/// Label of a lightning protection inspection scope key
pub fn scope_label(key: &str) -> &str {
    match key {
        "vnejsi" => "Vnější ochrana před bleskem",
        "vnitrni" => "Vnitřní ochrana před bleskem",
        "uzemneni" => "Uzemnění",
        "pospojovani" => "Ekvipotenciální pospojování",
        "spd" => "SPD / přepěťová ochrana",
        other => other,
    }
}

/// Scope keys mapped to labels and joined with a separator
pub fn scope_text<S: AsRef<str>>(keys: &[S], separator: &str) -> String {
    keys.iter()
        .map(|k| scope_label(k.as_ref()))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Visual check state label
pub fn visual_state_label(ok: bool) -> &'static str {
    if ok {
        "Vyhovuje"
    } else {
        "Nevyhovuje"
    }
}
