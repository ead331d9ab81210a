//! Drug Safety - drug safety lookups over openFDA data
//!
//! Combines a static reference catalog, an expiring cache, a free-text
//! query classifier and an optional summarizer behind an HTTP API.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fda;
pub mod models;
pub mod render;
pub mod service;
pub mod summarizer;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use service::DrugSafetyService;
