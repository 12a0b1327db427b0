use std::sync::LazyLock;

use regex::Regex;

use super::types::{VitalKind, VitalMap};

/// A compiled vital-sign pattern. Capture group 1 holds the reading.
struct VitalPattern {
    kind: VitalKind,
    regex: Regex,
    /// Appended to the captured reading.
    unit_suffix: &'static str,
}

/// Label, then any run of whitespace/colons, then the reading.
/// ASCII digit classes: OCR output sometimes carries non-ASCII numerals we must not read as values.
static VITAL_PATTERNS: LazyLock<Vec<VitalPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            VitalKind::BloodPressure,
            r"(?i)(?:blood pressure|bp)[\s:]*([0-9]{2,3}/[0-9]{2,3})",
            "",
        ),
        pattern(
            VitalKind::BloodGlucose,
            r"(?i)(?:glucose|blood sugar)[\s:]*([0-9]{1,3})\s*(?:mg/dl|mmol/l)?",
            " mg/dL",
        ),
        pattern(
            VitalKind::Temperature,
            r"(?i)(?:temperature|temp)[\s:]*([0-9]{2,3}(?:\.[0-9])?)\s*(?:°f|°c|f|c)?",
            "°F",
        ),
        pattern(
            VitalKind::Hemoglobin,
            r"(?i)(?:hemoglobin|hb)[\s:]*([0-9]{1,2}(?:\.[0-9])?)\s*(?:g/dl|gm/dl)?",
            " g/dL",
        ),
        pattern(
            VitalKind::HeartRate,
            r"(?i)(?:heart rate|pulse)[\s:]*([0-9]{2,3})\s*(?:bpm|/min)?",
            " BPM",
        ),
    ]
});

fn pattern(kind: VitalKind, regex_str: &str, unit_suffix: &'static str) -> VitalPattern {
    VitalPattern {
        kind,
        regex: Regex::new(regex_str).expect("Invalid vital regex pattern"),
        unit_suffix,
    }
}

/// Pull vital-sign readings out of free report text.
///
/// Each vital is searched once, case-insensitively; the first occurrence wins.
/// Text with no recognizable readings yields an empty map.
pub fn extract_vitals(text: &str) -> VitalMap {
    let mut vitals = VitalMap::new();

    for vp in VITAL_PATTERNS.iter() {
        if let Some(reading) = vp.regex.captures(text).and_then(|caps| caps.get(1)) {
            vitals.insert(vp.kind, format!("{}{}", reading.as_str(), vp.unit_suffix));
        }
    }

    vitals
}
