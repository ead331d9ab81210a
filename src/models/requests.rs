//! Request DTOs for the drug safety API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Most drugs a single comparison accepts
pub const MAX_COMPARE: usize = 3;
/// Fewest drugs a comparison needs
pub const MIN_COMPARE: usize = 2;

/// Request body for POST /compare
#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    /// Drug names to compare
    pub drugs: Vec<String>,
}

impl CompareRequest {
    /// Non-blank names, trimmed, in request order.
    pub fn names(&self) -> Vec<String> {
        self.drugs
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let count = self.names().len();
        if count < MIN_COMPARE {
            return Some("Please provide at least 2 drugs to compare".to_string());
        }
        if count > MAX_COMPARE {
            return Some("Maximum 3 drugs can be compared at once".to_string());
        }
        None
    }
}

/// Request body for POST /query and POST /ask
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Free-text question
    pub query: String,
}

impl QueryRequest {
    pub fn validate(&self) -> Option<String> {
        if self.query.trim().is_empty() {
            return Some("Query cannot be empty".to_string());
        }
        None
    }
}

/// Query string for GET /drugs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Substring to search for; all drugs when absent
    #[serde(default)]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_request_deserialize() {
        let req: CompareRequest = serde_json::from_str(r#"{"drugs": ["Aspirin", "Advil"]}"#).unwrap();
        assert_eq!(req.names(), vec!["Aspirin", "Advil"]);
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_compare_request_ignores_blank_names() {
        let req = CompareRequest {
            drugs: vec!["Aspirin".into(), "  ".into(), "".into()],
        };
        assert_eq!(req.names(), vec!["Aspirin"]);
        assert!(req.validate().unwrap().contains("at least 2"));
    }

    #[test]
    fn test_compare_request_too_many() {
        let req = CompareRequest {
            drugs: vec!["a1".into(), "b2".into(), "c3".into(), "d4".into()],
        };
        assert!(req.validate().unwrap().contains("Maximum 3"));
    }

    #[test]
    fn test_query_request_validate() {
        let req: QueryRequest = serde_json::from_str(r#"{"query": "  "}"#).unwrap();
        assert!(req.validate().is_some());
        let req = QueryRequest {
            query: "Is Metformin safe?".into(),
        };
        assert!(req.validate().is_none());
    }
}
