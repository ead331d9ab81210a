//! Markdown rendering for chat-style answers
//!
//! Structured results and errors become display text only here, at the
//! edge. Nothing in this module performs I/O.

use std::fmt::Write;

use crate::error::AppError;
use crate::models::{DrugComparison, QueryAnswer, RecallReport, SafetyProfile};

const DISCLAIMER: &str =
    "> *This information is for educational purposes only. Always consult your healthcare provider.*";

/// Renders any answer the service produces.
pub fn answer(answer: &QueryAnswer) -> String {
    match answer {
        QueryAnswer::Safety { profile, .. } => safety_profile(profile),
        QueryAnswer::Recall { report, .. } => recall_report(report),
        QueryAnswer::Compare { comparison, .. } => comparison_report(comparison),
        QueryAnswer::Unknown { examples } => unknown_intent(examples),
    }
}

/// Renders an error as user-facing text.
pub fn error(err: &AppError) -> String {
    match err {
        AppError::NotFound { name, suggestions } if !suggestions.is_empty() => format!(
            "❌ Drug '{}' not found. Did you mean: {}?",
            name,
            suggestions.join(", ")
        ),
        other => format!("❌ Error: {other}"),
    }
}

/// Help text listing queries the classifier understands.
pub fn unknown_intent(examples: &[String]) -> String {
    let mut out = String::from("❌ I couldn't understand your query. Try questions like:\n\n");
    for example in examples {
        let _ = writeln!(out, "- *{example}*");
    }
    out
}

pub fn safety_profile(profile: &SafetyProfile) -> String {
    let m = &profile.metrics;
    let mut out = String::new();

    let _ = writeln!(out, "## Safety Profile: {}\n", profile.drug_name);
    let _ = writeln!(out, "{}\n", m.summary);
    let _ = writeln!(out, "| Metric | Value | Status |");
    let _ = writeln!(out, "|--------|------:|--------|");
    let _ = writeln!(
        out,
        "| **Safety Score** | {:.1} | {} |",
        m.safety_score,
        score_level(m.safety_score)
    );
    let _ = writeln!(
        out,
        "| **Adverse Event Reports** | {} | {} |",
        thousands(m.adverse_events_count),
        event_level(m.adverse_events_count)
    );
    let recall_status = match m.active_recalls {
        0 => "✅ None".to_string(),
        n => format!("⚠️ {n} Active"),
    };
    let _ = writeln!(
        out,
        "| **Active Recalls** | {} | {} |\n",
        m.active_recalls, recall_status
    );

    out.push_str("### Common Side Effects\n\n");
    if m.top_side_effects.is_empty() {
        out.push_str("No significant side effects data available\n");
    } else {
        for (i, effect) in m.top_side_effects.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, effect);
        }
    }

    if !m.high_risk_demographics.is_empty() {
        out.push_str("\n### Higher-Risk Groups\n\n");
        for group in &m.high_risk_demographics {
            let _ = writeln!(out, "- {group}");
        }
    }

    let _ = write!(out, "\n*Data: {}*\n\n---\n\n{}", profile.data_freshness, DISCLAIMER);
    out
}

pub fn recall_report(report: &RecallReport) -> String {
    if report.recalls.is_empty() {
        return format!(
            "## ✅ {}\n\n**{}**: {}.\n\n---\n\n> *Data sourced from the FDA public API*",
            report.status, report.drug_name, report.status
        );
    }

    let mut out = format!(
        "## 🚨 Recalls for {} ({})\n\n",
        report.drug_name, report.status
    );
    for (i, recall) in report.recalls.iter().enumerate() {
        let classification = recall.classification.as_deref().unwrap_or("N/A");
        let _ = writeln!(
            out,
            "### {} Recall #{}",
            class_marker(classification),
            i + 1
        );
        let _ = writeln!(
            out,
            "- **Reason:** {}",
            recall.reason_for_recall.as_deref().unwrap_or("Unknown reason")
        );
        let _ = writeln!(out, "- **Classification:** {classification}");
        let _ = writeln!(
            out,
            "- **Date:** {}\n",
            recall.recall_initiation_date.as_deref().unwrap_or("N/A")
        );
    }
    out.push_str("---\n\n");
    out.push_str(DISCLAIMER);
    out
}

pub fn comparison_report(comparison: &DrugComparison) -> String {
    let mut out = String::from("## Drug Safety Comparison\n\n");
    for item in &comparison.comparison {
        let _ = writeln!(out, "### {}", item.drug_name);
        let _ = writeln!(out, "- **Safety Score:** {:.1}", item.safety_score);
        let _ = writeln!(out, "- **Primary Concern:** {}\n", item.top_concern);
    }
    let _ = write!(
        out,
        "### Recommendation\n\n{}\n\n---\n\n{}",
        comparison.recommendation, DISCLAIMER
    );
    out
}

fn class_marker(classification: &str) -> &'static str {
    match classification {
        "Class I" => "🔴",
        "Class II" => "🟡",
        _ => "🟢",
    }
}

fn event_level(count: u64) -> &'static str {
    match count {
        0..=999 => "🟢 Low",
        1_000..=9_999 => "🟡 Moderate",
        _ => "🔴 High",
    }
}

fn score_level(score: f64) -> &'static str {
    if score >= 90.0 {
        "🟢 Good"
    } else if score >= 50.0 {
        "🟡 Fair"
    } else {
        "🔴 Poor"
    }
}

/// `1234567` -> `"1,234,567"`
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fda::RecallRecord;
    use crate::models::{ComparisonItem, SafetyMetrics};

    fn profile() -> SafetyProfile {
        SafetyProfile {
            drug_name: "Advil".to_string(),
            metrics: SafetyMetrics {
                safety_score: 80.0,
                summary: "Advil summary.".to_string(),
                adverse_events_count: 20_000,
                top_side_effects: vec!["Nausea".to_string(), "Rash".to_string()],
                high_risk_demographics: vec!["Elderly (65+)".to_string()],
                active_recalls: 2,
            },
            data_freshness: "3 hours old (cached)".to_string(),
            cached: true,
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_safety_profile_markdown() {
        let text = safety_profile(&profile());
        assert!(text.starts_with("## Safety Profile: Advil"));
        assert!(text.contains("| **Adverse Event Reports** | 20,000 | 🔴 High |"));
        assert!(text.contains("⚠️ 2 Active"));
        assert!(text.contains("1. Nausea\n2. Rash"));
        assert!(text.contains("- Elderly (65+)"));
        assert!(text.contains("*Data: 3 hours old (cached)*"));
    }

    #[test]
    fn test_recall_report_markers() {
        let report = RecallReport {
            drug_name: "Losartan".to_string(),
            recalls: vec![RecallRecord {
                classification: Some("Class I".to_string()),
                reason_for_recall: Some("Impurity".to_string()),
                ..RecallRecord::default()
            }],
            status: "1 recall(s) found".to_string(),
        };
        let text = recall_report(&report);
        assert!(text.contains("### 🔴 Recall #1"));
        assert!(text.contains("- **Reason:** Impurity"));
        assert!(text.contains("- **Date:** N/A"));
    }

    #[test]
    fn test_empty_recall_report() {
        let report = RecallReport {
            drug_name: "Aspirin".to_string(),
            recalls: vec![],
            status: "No active recalls".to_string(),
        };
        assert!(recall_report(&report).contains("**Aspirin**: No active recalls."));
    }

    #[test]
    fn test_comparison_lists_items_and_recommendation() {
        let comparison = DrugComparison {
            comparison: vec![ComparisonItem {
                drug_name: "Tylenol".to_string(),
                safety_score: 95.0,
                top_concern: "Watch for Headache".to_string(),
            }],
            recommendation: "Tylenol has the best safety profile.".to_string(),
        };
        let text = comparison_report(&comparison);
        assert!(text.contains("### Tylenol\n- **Safety Score:** 95.0"));
        assert!(text.contains("### Recommendation\n\nTylenol has the best safety profile."));
    }

    #[test]
    fn test_unknown_intent_lists_examples() {
        let text = answer(&QueryAnswer::Unknown {
            examples: vec!["Is Metformin safe?".to_string()],
        });
        assert!(text.contains("couldn't understand"));
        assert!(text.contains("- *Is Metformin safe?*"));
    }

    #[test]
    fn test_error_rendering() {
        let err = AppError::NotFound {
            name: "Adv".to_string(),
            suggestions: vec!["Advil".to_string()],
        };
        assert_eq!(error(&err), "❌ Drug 'Adv' not found. Did you mean: Advil?");

        let err = AppError::NoData("Aleve".to_string());
        assert_eq!(error(&err), "❌ Error: No FDA data found for 'Aleve'");
    }
}
