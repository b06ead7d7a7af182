//! Fixed key catalogues of the two report templates
//!
//! The data builders guarantee a value for every key listed here. Tokens in a
//! template that are not in the catalogue are left alone by the literal token
//! renderer.

/// Scalar keys of the electrical installation report
pub const RZ_SCALAR_KEYS: &[&str] = &[
    "EVIDENCNI",
    "TYP_REVIZE",
    "NORMY",
    "TECH_JMENO",
    "TECH_FIRMA",
    "TECH_OSV",
    "TECH_OPR",
    "TECH_ICO",
    "TECH_DIC",
    "TECH_ADRESA",
    "TECH_TEL",
    "TECH_EMAIL",
    "OBJ_ADRESA",
    "OBJ_PREDMET",
    "OBJ_OBJEDNATEL",
    "VYSLEDEK_TEXT",
    "DALSIREVIZE",
];

/// A repeated section and the keys of each of its items
#[derive(Debug, Clone, Copy)]
pub struct SectionKeys {
    pub name: &'static str,
    pub item_keys: &'static [&'static str],
    pub nested: &'static [SectionKeys],
}

/// Repeated sections of the electrical installation report
pub const RZ_SECTIONS: &[SectionKeys] = &[
    SectionKeys { name: "PROHLIDKA", item_keys: &["TEXT"], nested: &[] },
    SectionKeys { name: "ZKOUSKY", item_keys: &["NAME", "NOTE"], nested: &[] },
    SectionKeys { name: "INSTRUMENTS", item_keys: &["NAME", "SERIAL", "CAL"], nested: &[] },
    SectionKeys {
        name: "BOARDS",
        item_keys: &["TITLE", "DESC"],
        nested: &[SectionKeys {
            name: "COMPONENTS",
            item_keys: &["LINE_LEFT", "LINE_RIGHT"],
            nested: &[],
        }],
    },
    SectionKeys {
        name: "ROOMS",
        item_keys: &["NAME", "NOTE"],
        nested: &[SectionKeys {
            name: "DEVICES",
            item_keys: &["TYP", "POCET", "DIM", "RISO", "OCHR", "POZN"],
            nested: &[],
        }],
    },
    SectionKeys { name: "ZAVADY", item_keys: &["POPIS", "CSN", "CLANEK"], nested: &[] },
];

/// Keys of the lightning protection report
pub const LPS_KEYS: &[&str] = &[
    "REVISION_TYPE",
    "EVIDENCE_NUMBER",
    "PROJECT_ID",
    "OBJECT_NAME",
    "OBJECT_ADDRESS",
    "OBJECT_DESCRIPTION",
    "CLIENT_NAME",
    "CLIENT_ADDRESS",
    "CLIENT_IC",
    "CLIENT_DIC",
    "OBJECT_TYPE",
    "ORDER_DESCRIPTION",
    "OPERATOR_NAME",
    "PROJECT_BY",
    "PROJECT_NO",
    "TECH_NAME",
    "TECH_COMPANY",
    "TECH_ICO",
    "TECH_DIC",
    "TECH_PHONE",
    "TECH_EMAIL",
    "TECH_ADDRESS",
    "TECH_CERTIFICATE",
    "TECH_AUTHORIZATION",
    "DATE_START",
    "DATE_END",
    "DATE_CREATED",
    "NEXT_REVISION",
    "PRIMARY_STANDARD",
    "LPS_CLASS",
    "SPD_PROTECTION_INFO",
    "REVISION_SCOPE_TEXT",
    "MEASUREMENT_METHOD",
    "SAFETY_STATUS",
    "CONCLUSION_TEXT",
    "CONCLUSION_NOTE",
    "SKETCH_NOTE",
    "DOWN_CONDUCTORS_COUNT",
    "EARTHING_TYPE",
    "GROUND_MATERIAL",
    "ROOF_TYPE",
    "ROOF_COVER",
    "SOIL_TYPE",
    "WEATHER_CONDITIONS",
    "MEASURING_INSTRUMENTS",
    "INSTRUMENT_NAME",
    "INSTRUMENT_MEASUREMENT",
    "INSTRUMENT_CAL_LIST",
    "INSTRUMENT_NOTE",
    "EARTH_MEASUREMENTS",
    "GROUND_LABEL",
    "GROUND_VALUE",
    "GROUND_INSTRUMENT",
    "GROUND_NOTE",
    "CONTINUITY_LABEL",
    "CONTINUITY_VALUE",
    "CONTINUITY_NOTE",
    "SPD_LOCATION",
    "SPD_TYPE",
    "SPD_RESULT",
    "SPD_NOTE",
    "VISUAL_CHECKS",
    "VISUAL_ITEM",
    "VISUAL_STATE",
    "VISUAL_NOTE",
    "DEFECTS",
    "DEFECT_DESCRIPTION",
    "DEFECT_STANDARD",
    "DEFECT_RECOMMENDATION",
    "DISTRIBUTION_LIST",
    "SIGNATURE_CITY",
    "SIGNATURE_DATE",
];

/// Token replaced by the sketch drawing; deliberately outside [`LPS_KEYS`]
pub const LPS_SKETCH_TOKEN: &str = "[[LPS_SKETCH_IMAGE]]";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let lps: HashSet<_> = LPS_KEYS.iter().collect();
        assert_eq!(lps.len(), LPS_KEYS.len());
        let rz: HashSet<_> = RZ_SCALAR_KEYS.iter().collect();
        assert_eq!(rz.len(), RZ_SCALAR_KEYS.len());
    }

    #[test]
    fn test_sketch_token_not_in_catalogue() {
        assert!(!LPS_KEYS.iter().any(|k| format!("[[{}]]", k) == LPS_SKETCH_TOKEN));
    }
}
