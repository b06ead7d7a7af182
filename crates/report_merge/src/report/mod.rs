//! Typed report views
//!
//! Each view reads a loosely-typed form once, applies the defaulting and
//! classification rules, and then feeds both the template data model and the
//! programmatic document layouts.

mod lps;
mod rz;

pub use lps::{
    ContinuityRow, DefectEntry, EarthRow, LpsInstrument, LpsReport, LpsTechnician, SpdRow, VisualRow,
};
pub use rz::{
    DefectRow, DeviceRow, Identification, Instrument, ObjectBlock, RoomView, RzInput, RzReport,
    TechnicianBlock, TestEntry,
};

use crate::text::sanitize_file_id;
use serde::{Deserialize, Serialize};

/// The two report kinds the exporter knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Electrical installation inspection report
    Rz,
    /// Lightning protection system inspection report
    Lps,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rz => "rz",
            Self::Lps => "lps",
        }
    }

    /// Identifier used in the file name when the form has none
    pub fn fallback_id(&self) -> &'static str {
        match self {
            Self::Rz => "vystup",
            Self::Lps => "lps",
        }
    }

    /// Output file name for a record identifier
    pub fn file_name(&self, id: Option<&str>) -> String {
        let id = id
            .map(sanitize_file_id)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.fallback_id().to_string());
        match self {
            Self::Rz => format!("revizni_zprava_{}.docx", id),
            Self::Lps => format!("lps_revizni_zprava_{}.docx", id),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rz" => Ok(Self::Rz),
            "lps" => Ok(Self::Lps),
            other => Err(format!("unknown report kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(ReportKind::Rz.file_name(Some("RZ-7")), "revizni_zprava_RZ-7.docx");
        assert_eq!(ReportKind::Rz.file_name(None), "revizni_zprava_vystup.docx");
        assert_eq!(ReportKind::Lps.file_name(Some("  ")), "lps_revizni_zprava_lps.docx");
        assert_eq!(ReportKind::Lps.file_name(Some("12/2024")), "lps_revizni_zprava_12_2024.docx");
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("LPS".parse::<ReportKind>(), Ok(ReportKind::Lps));
        assert!("pdf".parse::<ReportKind>().is_err());
    }
}
