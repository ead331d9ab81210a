//! API Routes
//!
//! Configures the Axum router with all drug safety endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    ask_handler, cache_stats_handler, clear_cache_handler, compare_handler,
    delete_cache_entry_handler, get_drug_handler, health_handler, query_handler,
    recalls_handler, safety_handler, search_drugs_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/drugs", get(search_drugs_handler))
        .route("/drugs/:name", get(get_drug_handler))
        .route("/safety/:name", get(safety_handler))
        .route("/recalls/:name", get(recalls_handler))
        .route("/compare", post(compare_handler))
        .route("/query", post(query_handler))
        .route("/ask", post(ask_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/:name", delete(delete_cache_entry_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
