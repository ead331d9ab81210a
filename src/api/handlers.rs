//! API Handlers
//!
//! HTTP request handlers for each drug safety endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::cache::{ExpiringCache, SqliteBackend};
use crate::catalog::{Catalog, DrugRecord};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fda::OpenFdaClient;
use crate::models::{
    CacheStatsResponse, CompareRequest, DeleteResponse, DrugComparison, HealthResponse,
    QueryAnswer, QueryRequest, RecallReport, SafetyProfile, SearchParams,
};
use crate::render;
use crate::service::{DrugSafetyService, MAX_SUGGESTIONS};
use crate::summarizer::{OpenAiSummarizer, Summarizer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: DrugSafetyService,
}

impl AppState {
    pub fn new(service: DrugSafetyService) -> Self {
        Self { service }
    }

    /// Wires every collaborator from configuration.
    ///
    /// A missing reference dataset degrades to an empty catalog; a cache
    /// database that cannot be opened is fatal.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(Catalog::load(&config.data_path));

        let backend = SqliteBackend::open(&config.cache_db_path)?;
        let cache = Arc::new(ExpiringCache::new(backend, config.cache_ttl()));
        info!(
            "Cache opened at {} (ttl {}h)",
            config.cache_db_path.display(),
            config.cache_ttl_hours
        );

        let source = Arc::new(OpenFdaClient::from_config(config)?);

        let summarizer = OpenAiSummarizer::from_config(config)?
            .map(|s| Arc::new(s) as Arc<dyn Summarizer>);
        if summarizer.is_none() {
            warn!("OPENAI_API_KEY not set; summaries will use templated text");
        }

        Ok(Self::new(DrugSafetyService::new(
            catalog, cache, source, summarizer,
        )))
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service.catalog().len()))
}

/// Handler for GET /drugs?q=
///
/// Lists every reference drug when `q` is absent or blank.
pub async fn search_drugs_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<DrugRecord>> {
    let catalog = state.service.catalog();
    let records = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => catalog.search(q).into_iter().cloned().collect(),
        _ => catalog.records().to_vec(),
    };
    Json(records)
}

/// Handler for GET /drugs/:name
pub async fn get_drug_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DrugRecord>> {
    let catalog = state.service.catalog();
    catalog
        .resolve(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            suggestions: catalog.suggestions(&name, MAX_SUGGESTIONS),
            name,
        })
}

/// Handler for GET /safety/:name
pub async fn safety_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SafetyProfile>> {
    Ok(Json(state.service.safety_profile(&name).await?))
}

/// Handler for GET /recalls/:name
pub async fn recalls_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RecallReport>> {
    Ok(Json(state.service.check_recalls(&name).await?))
}

/// Handler for POST /compare
pub async fn compare_handler(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<DrugComparison>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }
    Ok(Json(state.service.compare(&req.names()).await?))
}

/// Handler for POST /query
///
/// Classifies the question and returns the structured answer.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryAnswer>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }
    Ok(Json(state.service.answer(&req.query).await?))
}

/// Handler for POST /ask
///
/// Same as `/query` but answers with markdown; errors are rendered as text
/// under their usual status code.
pub async fn ask_handler(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> (StatusCode, String) {
    let result = match req.validate() {
        Some(error_msg) => Err(AppError::InvalidRequest(error_msg)),
        None => state.service.answer(&req.query).await,
    };
    match result {
        Ok(answer) => (StatusCode::OK, render::answer(&answer)),
        Err(e) => (e.status_code(), render::error(&e)),
    }
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheStatsResponse>> {
    let cache = state.service.cache();
    let stats = cache.stats()?;
    Ok(Json(CacheStatsResponse::new(&stats, cache.ttl().num_seconds())))
}

/// Handler for DELETE /cache/:name
pub async fn delete_cache_entry_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.service.cache().delete(&name)?;
    Ok(Json(DeleteResponse::entry(&name)))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Result<Json<DeleteResponse>> {
    state.service.cache().clear()?;
    info!("Cache cleared");
    Ok(Json(DeleteResponse::all()))
}
