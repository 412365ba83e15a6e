//! Reference achievement catalog.
//!
//! The catalog is loaded once before a scan from the published JSON data set:
//! an object keyed by decimal id strings, each value carrying the display
//! title and description. Records are held sorted by id so matcher iteration
//! order is stable.

mod matcher;

pub use matcher::{MatchResult, similarity};

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One known achievement.
#[derive(Debug, Clone)]
pub struct AchievementRecord {
    pub id: u32,
    pub title: Arc<str>,
    pub description: Arc<str>,
}

impl AchievementRecord {
    pub fn new(id: u32, title: &str, description: &str) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Wire form of one catalog entry.
#[derive(Debug, Deserialize)]
struct RawEntry {
    title: String,
    #[serde(rename = "desc")]
    description: String,
}

/// The reference set of known achievements.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<AchievementRecord>,
}

impl Catalog {
    /// Build a catalog from records, sorting by id and rejecting duplicates.
    pub fn from_records(mut records: Vec<AchievementRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::CatalogUnavailable(
                "catalog contains no records".to_string(),
            ));
        }
        records.sort_by_key(|r| r.id);
        for pair in records.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(Error::CatalogUnavailable(format!(
                    "duplicate achievement id {}",
                    pair[0].id
                )));
            }
        }
        Ok(Self { records })
    }

    /// Parse the published JSON data set.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let raw: HashMap<String, RawEntry> = serde_json::from_str(data)
            .map_err(|e| Error::CatalogUnavailable(format!("malformed catalog JSON: {e}")))?;

        let mut records = Vec::with_capacity(raw.len());
        for (key, entry) in raw {
            let id: u32 = key.parse().map_err(|_| {
                Error::CatalogUnavailable(format!("non-numeric achievement id \"{key}\""))
            })?;
            records.push(AchievementRecord {
                id,
                title: entry.title.into(),
                description: entry.description.into(),
            });
        }
        Self::from_records(records)
    }

    /// Records in ascending id order.
    pub fn records(&self) -> &[AchievementRecord] {
        &self.records
    }

    pub fn get(&self, id: u32) -> Option<&AchievementRecord> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_published_wire_format() {
        let data = r#"{
            "2": {"title": "Iron Wall", "desc": "Block 100 attacks"},
            "1": {"title": "Iron Will", "desc": "Survive with 1 HP"}
        }"#;
        let catalog = Catalog::from_json_str(data).unwrap();
        assert_eq!(catalog.len(), 2);
        // Records are sorted by id regardless of JSON key order.
        assert_eq!(catalog.records()[0].id, 1);
        assert_eq!(&*catalog.records()[0].title, "Iron Will");
        assert_eq!(catalog.get(2).unwrap().description.as_ref(), "Block 100 attacks");
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let data = r#"{"version": {"title": "x", "desc": "y"}}"#;
        assert!(matches!(
            Catalog::from_json_str(data),
            Err(Error::CatalogUnavailable(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Catalog::from_json_str("not json").is_err());
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(Catalog::from_json_str("{}").is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let records = vec![
            AchievementRecord::new(7, "A", "a"),
            AchievementRecord::new(7, "B", "b"),
        ];
        assert!(Catalog::from_records(records).is_err());
    }
}
