//! Response DTOs for the drug safety API
//!
//! Defines the structure of outgoing HTTP response bodies and the
//! structured results the service layer produces.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::fda::RecallRecord;

/// Derived safety metrics for one drug; this is what gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub safety_score: f64,
    pub summary: String,
    pub adverse_events_count: u64,
    #[serde(default)]
    pub top_side_effects: Vec<String>,
    #[serde(default)]
    pub high_risk_demographics: Vec<String>,
    #[serde(default)]
    pub active_recalls: u64,
}

/// Response body for GET /safety/:name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyProfile {
    /// Drug name as requested
    pub drug_name: String,
    #[serde(flatten)]
    pub metrics: SafetyMetrics,
    /// Human-readable age of the data
    pub data_freshness: String,
    /// True when served from the cache
    pub cached: bool,
}

/// Response body for GET /recalls/:name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallReport {
    pub drug_name: String,
    /// At most five recall records
    pub recalls: Vec<RecallRecord>,
    pub status: String,
}

/// One row of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonItem {
    pub drug_name: String,
    pub safety_score: f64,
    pub top_concern: String,
}

/// Response body for POST /compare
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugComparison {
    pub comparison: Vec<ComparisonItem>,
    pub recommendation: String,
}

/// Response body for POST /query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", rename_all = "lowercase")]
pub enum QueryAnswer {
    Safety {
        drugs: Vec<String>,
        profile: SafetyProfile,
    },
    Recall {
        drugs: Vec<String>,
        report: RecallReport,
    },
    Compare {
        drugs: Vec<String>,
        comparison: DrugComparison,
    },
    Unknown {
        examples: Vec<String>,
    },
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub writes: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
    pub ttl_seconds: i64,
}

impl CacheStatsResponse {
    /// Creates a new CacheStatsResponse from cache statistics
    pub fn new(stats: &CacheStats, ttl_seconds: i64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            writes: stats.writes,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            ttl_seconds,
        }
    }
}

/// Response body for DELETE /cache and DELETE /cache/:name
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
}

impl DeleteResponse {
    pub fn entry(name: &str) -> Self {
        Self {
            message: format!("Cache entry '{}' removed", name),
        }
    }

    pub fn all() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Number of reference drugs loaded
    pub drugs_loaded: usize,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(drugs_loaded: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            drugs_loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metrics() -> SafetyMetrics {
        SafetyMetrics {
            safety_score: 95.5,
            summary: "Aspirin has 4500 reported adverse events.".to_string(),
            adverse_events_count: 4500,
            top_side_effects: vec!["Nausea".to_string()],
            high_risk_demographics: vec![],
            active_recalls: 0,
        }
    }

    #[test]
    fn test_safety_profile_flattens_metrics() {
        let profile = SafetyProfile {
            drug_name: "Aspirin".to_string(),
            metrics: metrics(),
            data_freshness: "Just fetched from FDA".to_string(),
            cached: false,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["drug_name"], "Aspirin");
        assert_eq!(value["safety_score"], 95.5);
        assert_eq!(value["top_side_effects"], json!(["Nausea"]));
        assert_eq!(value["cached"], false);
    }

    #[test]
    fn test_metrics_payload_roundtrip_tolerates_missing_lists() {
        let parsed: SafetyMetrics = serde_json::from_value(json!({
            "safety_score": 80.0,
            "summary": "s",
            "adverse_events_count": 20000
        }))
        .unwrap();
        assert!(parsed.top_side_effects.is_empty());
        assert_eq!(parsed.active_recalls, 0);
    }

    #[test]
    fn test_query_answer_tagged_by_intent() {
        let answer = QueryAnswer::Unknown {
            examples: vec!["Is Metformin safe?".to_string()],
        };
        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["intent"], "unknown");
        assert_eq!(value["examples"][0], "Is Metformin safe?");
    }

    #[test]
    fn test_cache_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        let resp = CacheStatsResponse::new(&stats, 86_400);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
        assert_eq!(resp.ttl_seconds, 86_400);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy(12)).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains("\"drugs_loaded\":12"));
    }
}
