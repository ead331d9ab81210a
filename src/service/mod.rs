//! Drug Safety Service
//!
//! Orchestrates the catalog, the expiring cache, the regulatory data source
//! and the optional summarizer. Every collaborator is passed in explicitly.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analysis::{
    high_risk_demographics, safety_score, top_concern, top_side_effects, ANALYSIS_SAMPLE,
    TOP_EFFECTS,
};
use crate::cache::ExpiringCache;
use crate::catalog::{Catalog, DrugRecord};
use crate::classifier::{self, Intent};
use crate::error::{AppError, Result};
use crate::fda::{AdverseEvents, SafetyDataSource};
use crate::models::{
    ComparisonItem, DrugComparison, QueryAnswer, RecallReport, SafetyMetrics, SafetyProfile,
    MAX_COMPARE, MIN_COMPARE,
};
use crate::summarizer::Summarizer;

/// Suggestions offered for an unknown drug name.
pub const MAX_SUGGESTIONS: usize = 5;
/// Recall records included in a report.
pub const MAX_RECALLS_SHOWN: usize = 5;

const FRESH_LABEL: &str = "Just fetched from FDA";

#[derive(Clone)]
pub struct DrugSafetyService {
    catalog: Arc<Catalog>,
    cache: Arc<ExpiringCache>,
    source: Arc<dyn SafetyDataSource>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl DrugSafetyService {
    pub fn new(
        catalog: Arc<Catalog>,
        cache: Arc<ExpiringCache>,
        source: Arc<dyn SafetyDataSource>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        Self {
            catalog,
            cache,
            source,
            summarizer,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ExpiringCache {
        &self.cache
    }

    /// Resolves `name` or fails with "did you mean" suggestions.
    fn resolve(&self, name: &str) -> Result<&DrugRecord> {
        self.catalog.resolve(name).ok_or_else(|| AppError::NotFound {
            name: name.trim().to_string(),
            suggestions: self.catalog.suggestions(name, MAX_SUGGESTIONS),
        })
    }

    // == Safety Profile ==
    /// Safety profile for `name`, served from the cache when fresh.
    pub async fn safety_profile(&self, name: &str) -> Result<SafetyProfile> {
        let record = self.resolve(name)?;
        let drug_name = name.trim().to_string();

        if let Some((metrics, hours)) = self.cached_metrics(&drug_name) {
            info!("Returning cached profile for {}", drug_name);
            return Ok(SafetyProfile {
                drug_name,
                metrics,
                data_freshness: format!("{hours} hours old (cached)"),
                cached: true,
            });
        }

        info!(
            "Fetching FDA data for {} (generic name {})",
            drug_name, record.generic_name
        );
        let events = self
            .source
            .adverse_events(&record.generic_name)
            .await?
            .ok_or_else(|| AppError::NoData(drug_name.clone()))?;

        let active_recalls = match self.source.recalls(&record.generic_name).await {
            Ok(recalls) => recalls.total_count,
            Err(e) => {
                warn!("Recall lookup failed for {}: {}", drug_name, e);
                0
            }
        };

        let metrics = SafetyMetrics {
            safety_score: safety_score(events.total_count),
            summary: self.summary(&drug_name, &events).await,
            adverse_events_count: events.total_count,
            top_side_effects: top_side_effects(&events.reports, ANALYSIS_SAMPLE, TOP_EFFECTS),
            high_risk_demographics: high_risk_demographics(&events.reports, ANALYSIS_SAMPLE),
            active_recalls,
        };
        self.store_metrics(&drug_name, &metrics);

        info!("Generated profile for {}", drug_name);
        Ok(SafetyProfile {
            drug_name,
            metrics,
            data_freshness: FRESH_LABEL.to_string(),
            cached: false,
        })
    }

    /// Live cached metrics and their age in whole hours.
    ///
    /// Storage or decoding failures are logged and treated as a miss.
    fn cached_metrics(&self, drug_name: &str) -> Option<(SafetyMetrics, i64)> {
        let payload = match self.cache.get(drug_name) {
            Ok(payload) => payload?,
            Err(e) => {
                warn!("Cache read failed for {}: {}", drug_name, e);
                return None;
            }
        };
        let metrics: SafetyMetrics = match serde_json::from_value(payload) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Discarding unreadable cache entry for {}: {}", drug_name, e);
                return None;
            }
        };
        let hours = self
            .cache
            .age_of(drug_name)
            .ok()
            .flatten()
            .map(|age| age.num_hours())
            .unwrap_or(0);
        Some((metrics, hours))
    }

    fn store_metrics(&self, drug_name: &str, metrics: &SafetyMetrics) {
        let stored = serde_json::to_value(metrics)
            .map_err(AppError::from)
            .and_then(|payload| self.cache.set(drug_name, payload));
        if let Err(e) = stored {
            warn!("Cache write failed for {}: {}", drug_name, e);
        }
    }

    async fn summary(&self, drug_name: &str, events: &AdverseEvents) -> String {
        if let Some(summarizer) = &self.summarizer {
            match summarizer.safety_summary(drug_name, events).await {
                Ok(text) => return text,
                Err(e) => warn!("Summary generation failed for {}: {}", drug_name, e),
            }
        }
        format!(
            "{} has {} reported adverse events. Consult healthcare provider for personalized advice.",
            drug_name, events.total_count
        )
    }

    // == Recalls ==
    /// Recall status for `name`; never cached.
    pub async fn check_recalls(&self, name: &str) -> Result<RecallReport> {
        let record = self.resolve(name)?;
        let drug_name = name.trim().to_string();

        let recalls = match self.source.recalls(&record.generic_name).await {
            Ok(recalls) => recalls,
            Err(e) => {
                warn!("Recall lookup failed for {}: {}", drug_name, e);
                return Ok(RecallReport {
                    drug_name,
                    recalls: Vec::new(),
                    status: "No recall data available".to_string(),
                });
            }
        };

        let status = match recalls.records.len() {
            0 => "No active recalls".to_string(),
            n => format!("{n} recall(s) found"),
        };
        Ok(RecallReport {
            drug_name,
            recalls: recalls.records.into_iter().take(MAX_RECALLS_SHOWN).collect(),
            status,
        })
    }

    // == Compare ==
    /// Side-by-side comparison of two or three drugs.
    pub async fn compare(&self, names: &[String]) -> Result<DrugComparison> {
        if names.len() < MIN_COMPARE {
            return Err(AppError::InvalidRequest(
                "Please provide at least 2 drugs to compare".to_string(),
            ));
        }
        if names.len() > MAX_COMPARE {
            return Err(AppError::InvalidRequest(
                "Maximum 3 drugs can be compared at once".to_string(),
            ));
        }

        let mut comparison = Vec::with_capacity(names.len());
        for name in names {
            let profile = self.safety_profile(name).await?;
            comparison.push(ComparisonItem {
                top_concern: top_concern(
                    &profile.metrics.top_side_effects,
                    &profile.metrics.high_risk_demographics,
                ),
                safety_score: profile.metrics.safety_score,
                drug_name: profile.drug_name,
            });
        }

        let recommendation = self.recommendation(&comparison).await;
        Ok(DrugComparison {
            comparison,
            recommendation,
        })
    }

    async fn recommendation(&self, items: &[ComparisonItem]) -> String {
        if let Some(summarizer) = &self.summarizer {
            match summarizer.comparison_recommendation(items).await {
                Ok(text) => return text,
                Err(e) => warn!("Recommendation generation failed: {}", e),
            }
        }
        // Earliest item wins ties.
        let safest = items.iter().fold(None::<&ComparisonItem>, |best, item| match best {
            Some(best) if best.safety_score >= item.safety_score => Some(best),
            _ => Some(item),
        });
        match safest {
            Some(item) => format!(
                "{} has the best safety profile. Consult healthcare provider for personalized advice.",
                item.drug_name
            ),
            None => "Consult healthcare provider for personalized advice.".to_string(),
        }
    }

    // == Answer ==
    /// Classifies free text and dispatches to the matching operation.
    pub async fn answer(&self, text: &str) -> Result<QueryAnswer> {
        let parsed = classifier::classify(text);
        debug!(
            "Classified query as {} with drugs {:?}",
            parsed.intent, parsed.drug_names
        );

        let drugs = parsed.drug_names;
        let first = drugs.first().cloned();
        match (parsed.intent, first) {
            (Intent::Safety, Some(first)) => {
                let profile = self.safety_profile(&first).await?;
                Ok(QueryAnswer::Safety { drugs, profile })
            }
            (Intent::Recall, Some(first)) => {
                let report = self.check_recalls(&first).await?;
                Ok(QueryAnswer::Recall { drugs, report })
            }
            (Intent::Compare, Some(_)) => {
                let names: Vec<String> = drugs.iter().take(MAX_COMPARE).cloned().collect();
                let comparison = self.compare(&names).await?;
                Ok(QueryAnswer::Compare { drugs, comparison })
            }
            _ => Ok(QueryAnswer::Unknown {
                examples: Self::example_queries(),
            }),
        }
    }

    /// Sample questions the classifier understands.
    pub fn example_queries() -> Vec<String> {
        classifier::example_queries()
            .iter()
            .map(|q| q.to_string())
            .collect()
    }
}
