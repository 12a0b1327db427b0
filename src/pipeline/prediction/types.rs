use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Vital signs the extractor knows how to read.
///
/// Variant order is the extraction order, so a `BTreeMap` keyed by this
/// enum iterates in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VitalKind {
    #[serde(rename = "Blood Pressure")]
    BloodPressure,
    #[serde(rename = "Blood Glucose")]
    BloodGlucose,
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "Hemoglobin")]
    Hemoglobin,
    #[serde(rename = "Heart Rate")]
    HeartRate,
}

impl VitalKind {
    pub const ALL: [VitalKind; 5] = [
        VitalKind::BloodPressure,
        VitalKind::BloodGlucose,
        VitalKind::Temperature,
        VitalKind::Hemoglobin,
        VitalKind::HeartRate,
    ];

    /// Human-readable label, also the serialized map key.
    pub fn label(self) -> &'static str {
        match self {
            VitalKind::BloodPressure => "Blood Pressure",
            VitalKind::BloodGlucose => "Blood Glucose",
            VitalKind::Temperature => "Temperature",
            VitalKind::Hemoglobin => "Hemoglobin",
            VitalKind::HeartRate => "Heart Rate",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

impl fmt::Display for VitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extracted vital readings: vital → formatted value with unit ("140/90", "210 mg/dL").
pub type VitalMap = BTreeMap<VitalKind, String>;

/// A condition the engine can flag, with its trigger keywords and suggested drugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionProfile {
    pub name: &'static str,
    /// Lowercase substrings; any occurrence in the report counts as a hit.
    pub keywords: &'static [&'static str],
    /// Vitals usually reported alongside this condition. Informational only.
    pub vital_names: &'static [&'static str],
    pub medications: &'static [&'static str],
}

impl ConditionProfile {
    /// Number of distinct keywords contained in already-lowercased text.
    pub fn match_count(&self, lower_text: &str) -> usize {
        self.keywords
            .iter()
            .filter(|kw| lower_text.contains(*kw))
            .count()
    }

    /// Condition name with the first letter uppercased ("diabetes" → "Diabetes").
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Output of a single analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub diseases: Vec<String>,
    pub vitals: VitalMap,
    pub suggested_meds: Vec<String>,
    pub confidence: f64,
}

impl PredictionResult {
    /// True when no condition matched. Vitals may still be present.
    pub fn has_findings(&self) -> bool {
        !self.diseases.is_empty()
    }

    /// Vital value by its display label.
    pub fn vital(&self, label: &str) -> Option<&str> {
        VitalKind::from_label(label)
            .and_then(|kind| self.vitals.get(&kind))
            .map(String::as_str)
    }
}
