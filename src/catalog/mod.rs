//! Reference Catalog Module
//!
//! Static, read-only lookup from a drug's common or generic name to its
//! canonical record. Loaded once at startup and shared behind an `Arc`.

mod record;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};

pub use record::DrugRecord;

/// Accepted dataset layouts: `{"drugs": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Dataset {
    Wrapped { drugs: Vec<DrugRecord> },
    Bare(Vec<DrugRecord>),
}

// == Catalog ==
/// In-memory drug reference catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Records in dataset order
    records: Vec<DrugRecord>,
    /// Lowercased common and generic names to record position
    index: HashMap<String, usize>,
}

impl Catalog {
    // == Constructors ==
    /// Builds a catalog from records, indexing both name fields.
    ///
    /// Names are indexed record by record, common name first. On collision
    /// the later insertion wins.
    pub fn from_records(records: Vec<DrugRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len() * 2);
        for (pos, record) in records.iter().enumerate() {
            for name in [&record.common_name, &record.generic_name] {
                let key = name.trim().to_lowercase();
                if !key.is_empty() {
                    index.insert(key, pos);
                }
            }
        }
        Self { records, index }
    }

    /// Reads and parses the dataset at `path`.
    ///
    /// Fails with `DataUnavailable` when the file is missing or malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::DataUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let dataset: Dataset = serde_json::from_str(&raw).map_err(|e| {
            AppError::DataUnavailable(format!("cannot parse {}: {}", path.display(), e))
        })?;
        let records = match dataset {
            Dataset::Wrapped { drugs } => drugs,
            Dataset::Bare(drugs) => drugs,
        };
        Ok(Self::from_records(records))
    }

    /// Loads the dataset, degrading to an empty catalog on failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(catalog) => {
                info!("Reference catalog loaded: {} drugs", catalog.len());
                catalog
            }
            Err(e) => {
                warn!("{}; continuing with an empty catalog", e);
                Self::default()
            }
        }
    }

    // == Lookups ==
    /// Case-insensitive exact lookup against common and generic names.
    pub fn resolve(&self, name: &str) -> Option<&DrugRecord> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&pos| &self.records[pos])
    }

    /// True iff `resolve` would succeed.
    pub fn is_known(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Substring search over both name fields, in dataset order.
    pub fn search(&self, query: &str) -> Vec<&DrugRecord> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|record| record.name_contains(&needle))
            .collect()
    }

    /// Generic name of the record `name` resolves to.
    pub fn generic_name_of(&self, name: &str) -> Option<&str> {
        self.resolve(name).map(|record| record.generic_name.as_str())
    }

    /// Common names of up to `limit` search matches, for "did you mean" hints.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        self.search(query)
            .into_iter()
            .take(limit)
            .map(|record| record.common_name.clone())
            .collect()
    }

    // == Accessors ==
    /// All records in dataset order.
    pub fn records(&self) -> &[DrugRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records are loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(id: u32, name: &str, generic: &str) -> DrugRecord {
        DrugRecord {
            id,
            common_name: name.to_string(),
            category: "Test".to_string(),
            common_uses: vec!["Testing".to_string()],
            generic_name: generic.to_string(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_records(vec![
            record(1, "Advil", "IBUPROFEN"),
            record(2, "Aleve", "NAPROXEN SODIUM"),
            record(3, "Tylenol", "ACETAMINOPHEN"),
            record(4, "Prozac", "FLUOXETINE"),
        ])
    }

    #[test]
    fn test_resolve_is_case_insensitive_on_both_names() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve("advil").unwrap().id, 1);
        assert_eq!(catalog.resolve("ADVIL").unwrap().id, 1);
        assert_eq!(catalog.resolve("Ibuprofen").unwrap().id, 1);
        assert_eq!(catalog.resolve("naproxen sodium").unwrap().id, 2);
        assert!(catalog.resolve("naproxen").is_none());
    }

    #[test]
    fn test_is_known_matches_resolve() {
        let catalog = sample_catalog();
        assert!(catalog.is_known("Tylenol"));
        assert!(catalog.is_known("acetaminophen"));
        assert!(!catalog.is_known("unobtainium"));
    }

    #[test]
    fn test_search_is_substring_and_order_preserving() {
        let catalog = sample_catalog();
        let hits: Vec<u32> = catalog.search("pro").iter().map(|r| r.id).collect();
        assert_eq!(hits, vec![1, 2, 4]);

        let hits: Vec<u32> = catalog.search("PRO").iter().map(|r| r.id).collect();
        assert_eq!(hits, vec![1, 2, 4]);

        assert!(catalog.search("zzz").is_empty());
    }

    #[test]
    fn test_generic_name_of() {
        let catalog = sample_catalog();
        assert_eq!(catalog.generic_name_of("aleve"), Some("NAPROXEN SODIUM"));
        assert_eq!(catalog.generic_name_of("unknown"), None);
    }

    #[test]
    fn test_suggestions_limit() {
        let catalog = sample_catalog();
        assert_eq!(catalog.suggestions("pro", 2), vec!["Advil", "Aleve"]);
    }

    #[test]
    fn test_collision_last_write_wins() {
        let catalog = Catalog::from_records(vec![
            record(1, "Panadol", "ACETAMINOPHEN"),
            record(2, "Acetaminophen", "PARACETAMOL"),
        ]);
        assert_eq!(catalog.resolve("acetaminophen").unwrap().id, 2);
        assert_eq!(catalog.resolve("panadol").unwrap().id, 1);
    }

    #[test]
    fn test_load_missing_file_yields_empty_catalog() {
        let catalog = Catalog::load("/nonexistent/path/drugs.json");
        assert!(catalog.is_empty());
        assert!(catalog.resolve("advil").is_none());
        assert!(catalog.search("a").is_empty());
    }

    #[test]
    fn test_from_path_missing_file_is_data_unavailable() {
        let result = Catalog::from_path("/nonexistent/path/drugs.json");
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
    }

    #[test]
    fn test_load_wrapped_and_bare_layouts() {
        let mut wrapped = tempfile::NamedTempFile::new().unwrap();
        write!(
            wrapped,
            r#"{{"drugs": [{{"id": 1, "name": "Advil", "category": "NSAID",
                "common_uses": ["Pain"], "fda_generic_name": "IBUPROFEN"}}]}}"#
        )
        .unwrap();
        let catalog = Catalog::load(wrapped.path());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.is_known("ibuprofen"));

        let mut bare = tempfile::NamedTempFile::new().unwrap();
        write!(
            bare,
            r#"[{{"id": 7, "name": "Zoloft", "category": "SSRI",
                "common_uses": [], "fda_generic_name": "SERTRALINE"}}]"#
        )
        .unwrap();
        let catalog = Catalog::load(bare.path());
        assert_eq!(catalog.resolve("sertraline").unwrap().id, 7);
    }

    #[test]
    fn test_load_malformed_file_yields_empty_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Catalog::load(file.path()).is_empty());
    }
}
