//! Error types for the drug safety service
//!
//! Provides unified error handling using thiserror. Expected conditions
//! (cache miss, unknown intent, absent record) are not errors and never
//! appear here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Reference dataset missing or unparseable
    #[error("Reference data unavailable: {0}")]
    DataUnavailable(String),

    /// Drug name absent from the reference catalog
    #[error("Drug '{name}' not found{}", format_suggestions(.suggestions))]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    /// No safety data could be retrieved for a known drug
    #[error("No FDA data found for '{0}'")]
    NoData(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An upstream collaborator (openFDA, summarizer) failed
    #[error("Upstream error from {service}: {message}")]
    Upstream { service: String, message: String },

    /// Client-side request budget exhausted
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Cache storage engine failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Payload (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        " in reference database".to_string()
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}

impl AppError {
    /// HTTP status the error maps to at the API edge.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } | AppError::NoData(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream { .. } | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::DataUnavailable(_)
            | AppError::Storage(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::NotFound { suggestions, .. } => json!({
                "error": self.to_string(),
                "suggestions": suggestions,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, AppError>;
