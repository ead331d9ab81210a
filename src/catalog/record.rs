//! Drug Record Module
//!
//! Defines the canonical reference record for a single drug.

use serde::{Deserialize, Serialize};

// == Drug Record ==
/// A drug from the static reference dataset. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRecord {
    /// Dataset identifier
    pub id: u32,
    /// Common (brand or everyday) name
    #[serde(rename = "name")]
    pub common_name: String,
    /// Therapeutic category
    pub category: String,
    /// Typical uses, in dataset order
    #[serde(default)]
    pub common_uses: Vec<String>,
    /// Regulator-recognized generic name used for openFDA lookups
    #[serde(rename = "fda_generic_name")]
    pub generic_name: String,
}

impl DrugRecord {
    /// True if either name field contains `needle` (already lowercased).
    pub(crate) fn name_contains(&self, needle: &str) -> bool {
        self.common_name.to_lowercase().contains(needle)
            || self.generic_name.to_lowercase().contains(needle)
    }
}
