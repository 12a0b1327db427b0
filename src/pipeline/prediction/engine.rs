use std::collections::HashSet;

use super::conditions::CONDITION_PROFILES;
use super::types::PredictionResult;
use super::vitals::extract_vitals;

/// Classify report text against the condition table and extract vitals.
///
/// Pure and infallible: any input, including empty or binary text, produces
/// a well-formed result. Keyword tests are substring matches on the
/// lowercased text; vitals are read from the original text.
pub fn predict(text: &str) -> PredictionResult {
    let lower = text.to_lowercase();

    let mut diseases = Vec::new();
    let mut all_meds: Vec<&'static str> = Vec::new();
    let mut total_matches = 0usize;

    for profile in &CONDITION_PROFILES {
        let match_count = profile.match_count(&lower);
        if match_count == 0 {
            continue;
        }
        diseases.push(profile.display_name());
        all_meds.extend_from_slice(profile.medications);
        total_matches += match_count;
    }

    let suggested_meds = dedup_preserving_order(&all_meds);
    let vitals = extract_vitals(text);
    let confidence = compute_confidence(total_matches, diseases.len());

    tracing::debug!(
        diseases = diseases.len(),
        vitals = vitals.len(),
        suggested_meds = suggested_meds.len(),
        confidence,
        "Prediction complete"
    );

    PredictionResult {
        diseases,
        vitals,
        suggested_meds,
        confidence,
    }
}

/// Keyword hits averaged over detected conditions, capped at 1.0.
/// Zero detected conditions means zero confidence.
pub fn compute_confidence(total_matches: usize, detected: usize) -> f64 {
    if detected == 0 {
        return 0.0;
    }
    (total_matches as f64 / detected as f64).min(1.0)
}

fn dedup_preserving_order(items: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(**item))
        .map(|item| item.to_string())
        .collect()
}
