//! Safety metrics derived from raw adverse event reports.

use std::collections::HashMap;

use crate::fda::AdverseEventReport;

/// Reports inspected when deriving side effects and demographics.
pub const ANALYSIS_SAMPLE: usize = 50;
/// Side effects kept per drug.
pub const TOP_EFFECTS: usize = 5;

const UNKNOWN_REACTION: &str = "Unknown";
const DEFAULT_CONCERN: &str = "Monitor for side effects";

/// Most frequent reaction terms across the first `sample` reports.
///
/// Ties keep the order in which terms were first seen.
pub fn top_side_effects(reports: &[AdverseEventReport], sample: usize, top: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    let reactions = reports
        .iter()
        .take(sample)
        .filter_map(|report| report.patient.as_ref())
        .flat_map(|patient| patient.reaction.iter());
    for reaction in reactions {
        let term = reaction
            .reactionmeddrapt
            .as_deref()
            .unwrap_or(UNKNOWN_REACTION);
        let count = counts.entry(term).or_insert(0);
        if *count == 0 {
            order.push(term);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(top).map(str::to_string).collect()
}

/// Age groups over-represented in the sampled reports.
///
/// Onset age above 65 marks the elderly group, above 40 the middle-aged
/// group. Middle-aged is listed first.
pub fn high_risk_demographics(reports: &[AdverseEventReport], sample: usize) -> Vec<String> {
    let mut middle_aged = false;
    let mut elderly = false;

    for age in reports
        .iter()
        .take(sample)
        .filter_map(|report| report.patient.as_ref()?.onset_age_years())
    {
        if age > 65 {
            elderly = true;
        } else if age > 40 {
            middle_aged = true;
        }
    }

    let mut groups = Vec::new();
    if middle_aged {
        groups.push("Middle-aged (40-65)".to_string());
    }
    if elderly {
        groups.push("Elderly (65+)".to_string());
    }
    groups
}

/// Heuristic 0-100 score: one point off per thousand reported events.
pub fn safety_score(total_events: u64) -> f64 {
    (100.0 - total_events as f64 / 1000.0).clamp(0.0, 100.0)
}

/// One-line headline concern for comparisons.
pub fn top_concern(side_effects: &[String], demographics: &[String]) -> String {
    if let Some(group) = demographics.first() {
        format!("Risky for {group}")
    } else if let Some(effect) = side_effects.first() {
        format!("Watch for {effect}")
    } else {
        DEFAULT_CONCERN.to_string()
    }
}
