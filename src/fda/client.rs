//! openFDA HTTP client
//!
//! Fetches adverse event reports and enforcement (recall) records for a
//! drug's generic name.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fda::models::{AdverseEventReport, OpenFdaResponse, RecallRecord};
use crate::fda::{AdverseEvents, RateLimiter, Recalls, SafetyDataSource};

const OPENFDA_SERVICE: &str = "openfda";
const EVENT_PATH: &str = "drug/event.json";
const ENFORCEMENT_PATH: &str = "drug/enforcement.json";
const RESULT_LIMIT: usize = 100;

/// Fields tried in order when searching adverse events.
const EVENT_SEARCH_FIELDS: &[&str] = &[
    "openfda.brand_name",
    "openfda.generic_name",
    "patient.drug.medicinalproduct",
];

pub struct OpenFdaClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    limiter: RateLimiter,
}

impl OpenFdaClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        requests_per_minute: usize,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            limiter: RateLimiter::per_minute(requests_per_minute),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.openfda_base_url.clone(),
            config.openfda_api_key.clone(),
            config.fda_timeout(),
            config.fda_rate_limit_per_minute,
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Builds `field:"VALUE"` with the value upper-cased and quotes escaped.
    pub(crate) fn field_query(field: &str, value: &str) -> String {
        let escaped = value
            .trim()
            .to_uppercase()
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        format!("{field}:\"{escaped}\"")
    }

    /// Runs one search. A 404 means openFDA found no matches.
    async fn search<T: DeserializeOwned>(
        &self,
        path: &str,
        search: &str,
    ) -> Result<Option<OpenFdaResponse<T>>> {
        if !self.limiter.try_acquire().await {
            return Err(AppError::RateLimited(OPENFDA_SERVICE.to_string()));
        }

        let limit = RESULT_LIMIT.to_string();
        let mut req = self
            .http
            .get(self.endpoint(path))
            .query(&[("search", search), ("limit", limit.as_str())]);
        if let Some(key) = self.api_key.as_deref() {
            req = req.query(&[("api_key", key)]);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Upstream {
                service: OPENFDA_SERVICE.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let bytes = resp.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl SafetyDataSource for OpenFdaClient {
    async fn adverse_events(&self, generic_name: &str) -> Result<Option<AdverseEvents>> {
        for field in EVENT_SEARCH_FIELDS {
            let query = Self::field_query(field, generic_name);
            match self.search::<AdverseEventReport>(EVENT_PATH, &query).await {
                Ok(Some(resp)) if !resp.results.is_empty() => {
                    info!("Fetched adverse events using query: {}", query);
                    return Ok(Some(AdverseEvents {
                        total_count: resp.meta.results.total,
                        reports: resp.results,
                    }));
                }
                Ok(_) => debug!("No adverse events for query {}", query),
                Err(e @ AppError::RateLimited(_)) => return Err(e),
                Err(e) => debug!("Query {} failed: {}", query, e),
            }
        }

        warn!("No adverse events found for {} with any search query", generic_name);
        Ok(None)
    }

    async fn recalls(&self, generic_name: &str) -> Result<Recalls> {
        let query = Self::field_query("openfda.generic_name", generic_name);
        let resp = self
            .search::<RecallRecord>(ENFORCEMENT_PATH, &query)
            .await?;

        Ok(resp
            .map(|resp| Recalls {
                total_count: resp.meta.results.total,
                records: resp.results,
            })
            .unwrap_or_default())
    }
}
