//! Built-in catalog for gas detector data sheets.

use super::{AttributeCatalog, AttributeTemplate, PatternSet};

fn templates(rows: &[(&str, &str, &str, &str)]) -> Vec<AttributeTemplate> {
    rows.iter()
        .map(|(name, value, description, unit)| {
            AttributeTemplate::new(name, value, description, unit)
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self {
            class_number: "FG-FGAS".to_string(),
            class_type: "003".to_string(),
            default_functional_location: "11-18-XTGD-5403".to_string(),
            default_document_reference: "P11569-11-99-40-2619-1".to_string(),
            templates: templates(&[
                ("NACC01", "±10", "Accuracy", "%"),
                ("HSE-HAZ_AREA", "Hazardous Area", "Area Classification", ""),
                ("CALR01", "0–50", "Calibrated Range", "ppm"),
                ("DETCOMM", "4–20 mA (HART)", "Detector Communication", ""),
                ("ENVIRONT", "", "Environment", ""),
                ("ACFS01", "Warning, Alarm", "Fail Safe State", ""),
                ("POWREQ", "24 VDC", "Power Requirement", "V"),
                ("TEMP01", "-40 to +75", "Operating Temperature", "°C"),
                ("CERTIF", "ATEX, IECEx", "Certification", ""),
                ("MFGR", "TYCO", "Manufacturer", ""),
                ("MODEL", "H2S Gas Detector", "Model/Type", ""),
                ("CONN01", "M20 x 1.5", "Connection", ""),
                ("HOUSING", "Explosion Proof", "Housing Type", ""),
                ("DISPLAY", "LCD", "Display Type", ""),
                ("ALARM", "Visual & Audible", "Alarm Type", ""),
            ]),
            sample_functional_location: "11-18-XTGD-5404".to_string(),
            sample_templates: templates(&[
                ("NACC01", "±5", "Accuracy", "%"),
                ("HSE-HAZ_AREA", "Zone 1", "Area Classification", ""),
                ("CALR01", "0–100", "Calibrated Range", "ppm"),
                ("DETCOMM", "Modbus RTU", "Detector Communication", ""),
                ("ENVIRONT", "IP65", "Environment Rating", ""),
                ("ACFS01", "Fail to Safe", "Fail Safe State", ""),
                ("POWREQ", "12-30 VDC", "Power Requirement", "V"),
                ("TEMP01", "-20 to +60", "Operating Temperature", "°C"),
                ("CERTIF", "ATEX Zone 1", "Certification", ""),
                ("MFGR", "Honeywell", "Manufacturer", ""),
                ("MODEL", "Gas Monitor", "Model/Type", ""),
                ("CONN01", "1/2 NPT", "Connection", ""),
                ("HOUSING", "Weatherproof", "Housing Type", ""),
                ("DISPLAY", "LED Indicators", "Display Type", ""),
                ("ALARM", "Relay Output", "Alarm Type", ""),
            ]),
            patterns: PatternSet::default(),
        }
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self {
            document_reference: r"P?(?:\d+[-.]){3,}\d+".to_string(),
            functional_location: strings(&[
                r"\d{2}-\d{2}-[A-Z]{4}-\d{4}",
                r"[A-Z]{2,}-\d+",
                r"\d+-\d+-[A-Z]+",
            ]),
            min_location_chars: 8,
            reference_search_lines: 20,
            skip_substrings: strings(&[
                "Sheet",
                "PETROLEUM",
                "CONTRACT",
                "TRANS",
                "Previous",
                "List of Attachments",
                "Project Manager",
                "file://",
                "Terms:",
                "F.O.B.",
                "Prices subject",
                "CONFIDENTIAL",
            ]),
            keywords: strings(&[
                "PPM", "MA", "VDC", "TEMP", "PRESSURE", "RANGE", "ALARM", "ACCURACY", "DETECTOR",
                "GAS", "H2S", "ATEX", "IECEX",
            ]),
            units: strings(&["ppm", "mA", "VDC", "°C", "%", "bar", "psi"]),
            value_token: r"\d".to_string(),
            description_window: 2,
            max_description_chars: 50,
            scanned_name_prefix: "SPEC".to_string(),
        }
    }
}
