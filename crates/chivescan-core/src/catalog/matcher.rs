//! Fuzzy resolution of OCR'd row text against the catalog.
//!
//! OCR output is noisy, so rows are identified by the highest normalized
//! Levenshtein ratio between the observed name and every catalog title. Two
//! catalog entries may share a display title; those are disambiguated by
//! comparing the observed description instead, which is fetched lazily
//! because it costs another capture and OCR round-trip.

use std::sync::Arc;

use tracing::debug;

use super::Catalog;
use crate::error::Result;

/// A confident match against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub id: u32,
    pub title: Arc<str>,
    /// Name similarity that produced the match, in [0, 1].
    pub similarity: f64,
}

/// Similarity ratio in [0, 1] between two strings.
///
/// 1.0 means identical; 0.0 means nothing in common.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

impl Catalog {
    /// Resolve an observed row name to the best-matching record.
    ///
    /// `fetch_description` is invoked at most once per call, and only when
    /// two candidate records share a display title; the result is cached for
    /// the rest of the resolution. Returns `Ok(None)` when no candidate
    /// reaches `floor`; the caller treats that row as unidentified.
    ///
    /// Records are visited in ascending id order, so an exact score tie
    /// between distinct titles keeps the lower id.
    pub fn resolve<F>(
        &self,
        observed_name: &str,
        mut fetch_description: F,
        floor: f64,
    ) -> Result<Option<MatchResult>>
    where
        F: FnMut() -> Result<String>,
    {
        let records = self.records();
        if records.is_empty() {
            return Ok(None);
        }

        let mut observed_desc: Option<String> = None;
        let mut best_idx = 0;
        let mut best_score = similarity(observed_name, &records[0].title);

        for (idx, record) in records.iter().enumerate().skip(1) {
            let score = similarity(observed_name, &record.title);
            let held = &records[best_idx];

            if record.title == held.title {
                // Duplicate display names: the name score cannot separate
                // them, so the observed description decides.
                if observed_desc.is_none() {
                    observed_desc = Some(fetch_description()?);
                }
                let desc = observed_desc.as_deref().unwrap_or_default();
                let candidate = similarity(desc, &record.description);
                let current = similarity(desc, &held.description);
                if candidate > current {
                    best_idx = idx;
                    best_score = score;
                }
                continue;
            }

            if score > best_score {
                best_idx = idx;
                best_score = score;
            }
        }

        if best_score < floor {
            debug!(
                "No close match for \"{}\" (best {:.3} < floor {:.3})",
                observed_name, best_score, floor
            );
            return Ok(None);
        }

        let record = &records[best_idx];
        Ok(Some(MatchResult {
            id: record.id,
            title: record.title.clone(),
            similarity: best_score,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AchievementRecord;
    use crate::config::ScanConfig;

    fn catalog(entries: &[(u32, &str, &str)]) -> Catalog {
        Catalog::from_records(
            entries
                .iter()
                .map(|(id, title, desc)| AchievementRecord::new(*id, title, desc))
                .collect(),
        )
        .unwrap()
    }

    fn floor() -> f64 {
        ScanConfig::default().match_floor
    }

    /// A description fetcher that panics if invoked.
    fn no_desc() -> Result<String> {
        panic!("description fetch was not expected");
    }

    #[test]
    fn exact_title_matches_with_full_confidence() {
        let catalog = catalog(&[(1, "Iron Will", "desc1"), (2, "Iron Wall", "desc2")]);
        let result = catalog.resolve("Iron Will", no_desc, floor()).unwrap();
        let result = result.unwrap();
        assert_eq!(result.id, 1);
        assert_eq!(result.similarity, 1.0);
    }

    #[test]
    fn near_miss_prefers_the_closer_title() {
        let catalog = catalog(&[(1, "Iron Will", "desc1"), (2, "Iron Wall", "desc2")]);
        // One substituted character relative to both, plus one deletion
        // relative to "Iron Wall" only.
        let result = catalog.resolve("Iron Wil", no_desc, floor()).unwrap().unwrap();
        assert_eq!(result.id, 1);
    }

    #[test]
    fn unrelated_text_yields_no_match() {
        let catalog = catalog(&[(1, "Iron Will", "desc1"), (2, "Iron Wall", "desc2")]);
        let result = catalog.resolve("Xyzzyx", no_desc, floor()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn empty_observed_name_yields_no_match() {
        let catalog = catalog(&[(1, "Iron Will", "desc1")]);
        assert!(catalog.resolve("", no_desc, floor()).unwrap().is_none());
    }

    #[test]
    fn duplicate_titles_resolved_by_description() {
        let catalog = catalog(&[(10, "Foo", "A"), (20, "Foo", "B")]);
        let result = catalog
            .resolve("Foo", || Ok("B".to_string()), floor())
            .unwrap()
            .unwrap();
        assert_eq!(result.id, 20);

        let result = catalog
            .resolve("Foo", || Ok("A".to_string()), floor())
            .unwrap()
            .unwrap();
        assert_eq!(result.id, 10);
    }

    #[test]
    fn description_fetched_at_most_once() {
        let catalog = catalog(&[(10, "Foo", "A"), (20, "Foo", "B"), (30, "Foo", "C")]);
        let mut fetches = 0;
        let result = catalog
            .resolve(
                "Foo",
                || {
                    fetches += 1;
                    Ok("C".to_string())
                },
                floor(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(result.id, 30);
        assert_eq!(fetches, 1);
    }

    #[test]
    fn description_not_fetched_without_duplicates() {
        let catalog = catalog(&[(1, "Iron Will", "desc1"), (2, "Iron Wall", "desc2")]);
        let mut fetches = 0;
        catalog
            .resolve(
                "Iron Will",
                || {
                    fetches += 1;
                    Ok(String::new())
                },
                floor(),
            )
            .unwrap();
        assert_eq!(fetches, 0);
    }

    #[test]
    fn exact_score_tie_keeps_the_lower_id() {
        // "aa" is one substitution from both titles, so the scores tie and
        // ascending id order decides. Records are inserted out of order to
        // exercise the sort at load.
        let catalog = catalog(&[(6, "ba", "x"), (5, "ab", "y")]);
        let result = catalog.resolve("aa", no_desc, floor()).unwrap().unwrap();
        assert_eq!(result.id, 5);
    }

    #[test]
    fn resolve_is_idempotent() {
        let catalog = catalog(&[(10, "Foo", "A"), (20, "Foo", "B")]);
        let first = catalog
            .resolve("Foo", || Ok("B".to_string()), floor())
            .unwrap();
        let second = catalog
            .resolve("Foo", || Ok("B".to_string()), floor())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn description_fetch_failure_propagates() {
        let catalog = catalog(&[(10, "Foo", "A"), (20, "Foo", "B")]);
        let result = catalog.resolve(
            "Foo",
            || {
                Err(crate::error::Error::Extraction(
                    "ocr went away".to_string(),
                ))
            },
            floor(),
        );
        assert!(result.is_err());
    }
}
