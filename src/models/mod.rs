//! Request and Response models for the drug safety API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CompareRequest, QueryRequest, SearchParams, MAX_COMPARE, MIN_COMPARE};
pub use responses::{
    CacheStatsResponse, ComparisonItem, DeleteResponse, DrugComparison, HealthResponse,
    QueryAnswer, RecallReport, SafetyMetrics, SafetyProfile,
};
