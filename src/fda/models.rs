//! openFDA response models
//!
//! Only the fields the service reads are modeled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenFdaResponse<T> {
    #[serde(default)]
    pub meta: OpenFdaMeta,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFdaMeta {
    #[serde(default)]
    pub results: OpenFdaMetaResults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFdaMetaResults {
    #[serde(default)]
    pub total: u64,
}

// == Adverse Events ==
/// One FAERS adverse event report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdverseEventReport {
    #[serde(default)]
    pub safetyreportid: Option<String>,
    #[serde(default)]
    pub patient: Option<Patient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patient {
    /// Reported as a string by openFDA, occasionally as a number
    #[serde(default)]
    pub patientonsetage: Option<Value>,
    #[serde(default)]
    pub reaction: Vec<Reaction>,
}

impl Patient {
    /// Onset age truncated to whole years, if it parses.
    pub fn onset_age_years(&self) -> Option<i64> {
        let age = match self.patientonsetage.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        age.is_finite().then_some(age.trunc() as i64)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default)]
    pub reactionmeddrapt: Option<String>,
}

/// Adverse events for one drug plus the total match count reported upstream.
#[derive(Debug, Clone, Default)]
pub struct AdverseEvents {
    pub reports: Vec<AdverseEventReport>,
    pub total_count: u64,
}

// == Recalls ==
/// One enforcement (recall) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    #[serde(default)]
    pub recall_number: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub reason_for_recall: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recall_initiation_date: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,
}

/// Recalls for one drug plus the total match count reported upstream.
#[derive(Debug, Clone, Default)]
pub struct Recalls {
    pub records: Vec<RecallRecord>,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_response_deserialize() {
        let resp: OpenFdaResponse<AdverseEventReport> = serde_json::from_value(json!({
            "meta": {"results": {"skip": 0, "limit": 1, "total": 4521}},
            "results": [{
                "safetyreportid": "1001",
                "patient": {
                    "patientonsetage": "67",
                    "reaction": [{"reactionmeddrapt": "Nausea"}, {"reactionoutcome": "1"}]
                }
            }]
        }))
        .unwrap();

        assert_eq!(resp.meta.results.total, 4521);
        let patient = resp.results[0].patient.as_ref().unwrap();
        assert_eq!(patient.onset_age_years(), Some(67));
        assert_eq!(patient.reaction[0].reactionmeddrapt.as_deref(), Some("Nausea"));
        assert!(patient.reaction[1].reactionmeddrapt.is_none());
    }

    #[test]
    fn test_onset_age_variants() {
        let patient = |v: Value| Patient {
            patientonsetage: Some(v),
            reaction: vec![],
        };
        assert_eq!(patient(json!(45.9)).onset_age_years(), Some(45));
        assert_eq!(patient(json!("70.2")).onset_age_years(), Some(70));
        assert_eq!(patient(json!("unknown")).onset_age_years(), None);
        assert_eq!(patient(json!(null)).onset_age_years(), None);
    }

    #[test]
    fn test_recall_response_deserialize() {
        let resp: OpenFdaResponse<RecallRecord> = serde_json::from_value(json!({
            "meta": {"results": {"total": 1}},
            "results": [{
                "recall_number": "D-0001-2024",
                "classification": "Class II",
                "reason_for_recall": "Failed dissolution",
                "status": "Ongoing",
                "recall_initiation_date": "20240105"
            }]
        }))
        .unwrap();
        assert_eq!(resp.results[0].classification.as_deref(), Some("Class II"));
        assert!(resp.results[0].product_description.is_none());
    }
}
