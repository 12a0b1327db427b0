use super::types::ConditionProfile;

/// All conditions the engine recognizes.
///
/// Order is significant: it is the order detected conditions are reported in.
pub static CONDITION_PROFILES: [ConditionProfile; 6] = [
    ConditionProfile {
        name: "diabetes",
        keywords: &[
            "diabetes",
            "diabetic",
            "glucose",
            "blood sugar",
            "insulin",
            "hba1c",
            "hyperglycemia",
        ],
        vital_names: &["glucose", "blood sugar", "hba1c"],
        medications: &["Metformin", "Glimepiride", "Insulin", "Gliclazide"],
    },
    ConditionProfile {
        name: "hypertension",
        keywords: &[
            "hypertension",
            "high blood pressure",
            "bp",
            "systolic",
            "diastolic",
        ],
        vital_names: &["blood pressure", "bp", "systolic", "diastolic"],
        medications: &["Amlodipine", "Telmisartan", "Lisinopril", "Metoprolol"],
    },
    ConditionProfile {
        name: "asthma",
        keywords: &["asthma", "wheezing", "bronchial", "respiratory", "inhaler"],
        vital_names: &["peak flow", "fev1", "oxygen saturation"],
        medications: &["Salbutamol", "Budesonide", "Montelukast", "Prednisolone"],
    },
    ConditionProfile {
        name: "covid",
        keywords: &["covid", "coronavirus", "sars-cov-2", "fever", "cough", "pneumonia"],
        vital_names: &["temperature", "oxygen saturation", "spo2"],
        medications: &["Paracetamol", "Zinc", "Vitamin C", "Dexamethasone"],
    },
    ConditionProfile {
        name: "anemia",
        keywords: &["anemia", "anaemia", "hemoglobin", "iron deficiency", "fatigue"],
        vital_names: &["hemoglobin", "hb", "iron", "ferritin"],
        medications: &["Iron Sulphate", "Folic Acid", "Vitamin B12", "Ferrous Fumarate"],
    },
    ConditionProfile {
        name: "thyroid",
        keywords: &["thyroid", "hyperthyroid", "hypothyroid", "tsh", "t3", "t4"],
        vital_names: &["tsh", "t3", "t4", "thyroid hormone"],
        medications: &["Levothyroxine", "Methimazole", "Propylthiouracil", "Carbimazole"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_is_stable() {
        let names: Vec<&str> = CONDITION_PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["diabetes", "hypertension", "asthma", "covid", "anemia", "thyroid"]
        );
    }

    #[test]
    fn keywords_are_lowercase() {
        for profile in &CONDITION_PROFILES {
            for kw in profile.keywords {
                assert_eq!(*kw, kw.to_lowercase(), "{} keyword {kw} not lowercase", profile.name);
            }
        }
    }

    #[test]
    fn every_profile_suggests_medications() {
        for profile in &CONDITION_PROFILES {
            assert!(!profile.keywords.is_empty());
            assert!(!profile.medications.is_empty());
        }
    }
}
