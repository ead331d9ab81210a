//! API Module
//!
//! HTTP handlers and routing for the drug safety REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /drugs?q=` - Search the reference catalog
//! - `GET /drugs/:name` - Resolve one drug
//! - `GET /safety/:name` - Safety profile
//! - `GET /recalls/:name` - Recall report
//! - `POST /compare` - Compare two or three drugs
//! - `POST /query` - Free-text question, JSON answer
//! - `POST /ask` - Free-text question, markdown answer
//! - `GET /cache/stats` - Cache statistics
//! - `DELETE /cache/:name` - Drop one cache entry
//! - `DELETE /cache` - Clear the cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
