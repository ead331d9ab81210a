//! Regulatory Data Module
//!
//! Access to openFDA adverse event and recall data behind the
//! `SafetyDataSource` seam, so the service can run against fakes in tests.

mod client;
pub mod models;
mod rate_limit;

use async_trait::async_trait;

use crate::error::Result;

pub use client::OpenFdaClient;
pub use models::{AdverseEventReport, AdverseEvents, Patient, Reaction, RecallRecord, Recalls};
pub use rate_limit::RateLimiter;

/// Source of per-drug safety data, keyed by generic name.
#[async_trait]
pub trait SafetyDataSource: Send + Sync {
    /// Adverse event reports; `None` when no search strategy found anything.
    async fn adverse_events(&self, generic_name: &str) -> Result<Option<AdverseEvents>>;

    /// Recall records; an empty list when there are none.
    async fn recalls(&self, generic_name: &str) -> Result<Recalls>;
}
