//! Fuzzy matching over the terminology store.
//!
//! Scores a query against each concept's display name, definition, and
//! native code. Whole-field case-insensitive equality is an exact match at
//! confidence 100; everything else is scored with the partial-alignment
//! InDel ratio, so a query contained in a longer field can legitimately
//! reach 100 while still being reported as fuzzy.

use namaste_types::{MatchResult, NamasteConcept};
use rapidfuzz::fuzz;

use crate::config::MatchConfig;
use crate::error::{TermError, TermResult};
use crate::store::TerminologyStore;

/// Scores queries against stored concepts.
///
/// Searching is a pure function of the store snapshot and the inputs;
/// repeated calls with an unchanged store return identical results.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: MatchConfig,
}

impl FuzzyMatcher {
    /// Creates a matcher with the given defaults.
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Returns the configured defaults.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Searches with the configured default limit and threshold.
    pub fn search_default(
        &self,
        store: &TerminologyStore,
        query: &str,
    ) -> TermResult<Vec<MatchResult>> {
        self.search(store, query, self.config.limit, self.config.threshold)
    }

    /// Searches the store for concepts matching `query`.
    ///
    /// Results are sorted by descending confidence, tie-broken by ascending
    /// native code, and truncated to `limit`. Each concept appears at most
    /// once, scored on its best field. An empty result set is not an error.
    ///
    /// # Errors
    /// Returns `TermError::Validation` for an empty query, a zero limit,
    /// or a threshold above 100.
    pub fn search(
        &self,
        store: &TerminologyStore,
        query: &str,
        limit: usize,
        threshold: u8,
    ) -> TermResult<Vec<MatchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TermError::validation("search query must not be empty"));
        }
        if limit == 0 {
            return Err(TermError::validation("search limit must be at least 1"));
        }
        if threshold > 100 {
            return Err(TermError::validation("threshold must be within 0-100"));
        }

        let needle = query.to_lowercase();

        let mut results: Vec<MatchResult> = store
            .all()
            .map(|concept| score_concept(concept, &needle))
            .filter(|result| result.confidence >= threshold)
            .collect();

        results.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.concept.code.cmp(&b.concept.code))
        });
        results.truncate(limit);

        tracing::debug!(
            query,
            hits = results.len(),
            threshold,
            "terminology search completed"
        );

        Ok(results)
    }
}

/// Scores one concept against a lowercased query.
///
/// A zero score is a legal result; only the caller's threshold decides
/// whether a concept is kept.
fn score_concept(concept: &NamasteConcept, needle: &str) -> MatchResult {
    let fields = [
        concept.display.as_str(),
        concept.definition.as_str(),
        concept.code.as_str(),
    ];

    // Whole-field equality is the only thing reported as Exact
    if fields
        .iter()
        .any(|field| field.to_lowercase() == needle)
    {
        return MatchResult::exact(concept.clone());
    }

    let best = fields
        .iter()
        .filter(|field| !field.is_empty())
        .map(|field| fuzz::partial_ratio(needle.chars(), field.to_lowercase().chars()))
        .fold(0.0_f64, f64::max);

    MatchResult::fuzzy(concept.clone(), best.round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use namaste_types::MatchType;

    fn diabetes_store() -> TerminologyStore {
        let mut store = TerminologyStore::new();
        store
            .load([
                NamasteConcept {
                    code: "EF-2.4.4".to_string(),
                    display: "Madhumeha/Kshaudrameha".to_string(),
                    definition: "Diabetes Mellitus".to_string(),
                    tm2_code: "SJ00".to_string(),
                    biomed_code: "5A11".to_string(),
                    region: None,
                    observed_count: None,
                },
                NamasteConcept::new("EA-3", "Kasa", "Cough"),
                NamasteConcept::new("EE-3", "Arsha", "Hemorrhoids"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_exact_match_on_display_name() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        let hits = matcher
            .search(&store, "Madhumeha/Kshaudrameha", 5, 60)
            .unwrap();

        assert_eq!(hits[0].concept.code, "EF-2.4.4");
        assert_eq!(hits[0].match_type, MatchType::Exact);
        assert_eq!(hits[0].confidence, 100);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        let hits = matcher.search(&store, "kasa", 5, 60).unwrap();

        assert_eq!(hits[0].concept.code, "EA-3");
        assert_eq!(hits[0].match_type, MatchType::Exact);
        assert_eq!(hits[0].confidence, 100);
    }

    #[test]
    fn test_substring_of_definition_is_fuzzy_not_exact() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        // "Diabetes" is contained in the definition but equals no whole field
        let hits = matcher.search(&store, "Diabetes", 5, 60).unwrap();

        assert_eq!(hits[0].concept.code, "EF-2.4.4");
        assert_eq!(hits[0].match_type, MatchType::Fuzzy);
        assert!(hits[0].confidence >= 60);
    }

    #[test]
    fn test_near_synonym_scores_between_threshold_and_exact() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        let hits = matcher.search(&store, "Prameha", 5, 60).unwrap();

        assert_eq!(hits[0].concept.code, "EF-2.4.4");
        assert_eq!(hits[0].match_type, MatchType::Fuzzy);
        assert!(hits[0].confidence >= 60);
        assert!(hits[0].confidence < 100);
    }

    #[test]
    fn test_no_match_above_threshold_returns_empty() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        let hits = matcher.search(&store, "Xylophone", 5, 90).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_threshold_is_monotonic() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        let low: Vec<String> = matcher
            .search(&store, "Prameha", 10, 30)
            .unwrap()
            .into_iter()
            .map(|m| m.concept.code)
            .collect();
        let high: Vec<String> = matcher
            .search(&store, "Prameha", 10, 70)
            .unwrap()
            .into_iter()
            .map(|m| m.concept.code)
            .collect();

        for code in &high {
            assert!(low.contains(code), "raising threshold added {code}");
        }
    }

    #[test]
    fn test_each_concept_appears_at_most_once() {
        let mut store = TerminologyStore::new();
        store
            .load([NamasteConcept::new("AA", "Vata", "Vata")])
            .unwrap();
        let matcher = FuzzyMatcher::default();

        // Query matches display and definition equally; one result expected
        let hits = matcher.search(&store, "Vata", 10, 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_ties_break_by_ascending_code() {
        let mut store = TerminologyStore::new();
        store
            .load([
                NamasteConcept::new("B-2", "Jvara", "Fever"),
                NamasteConcept::new("A-1", "Jvara", "Fever"),
            ])
            .unwrap();
        let matcher = FuzzyMatcher::default();

        let hits = matcher.search(&store, "Jvara", 10, 60).unwrap();
        assert_eq!(hits[0].concept.code, "A-1");
        assert_eq!(hits[1].concept.code, "B-2");
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        assert!(matches!(
            matcher.search(&store, "   ", 5, 60),
            Err(TermError::Validation { .. })
        ));
        assert!(matches!(
            matcher.search(&store, "Kasa", 0, 60),
            Err(TermError::Validation { .. })
        ));
        assert!(matches!(
            matcher.search(&store, "Kasa", 5, 101),
            Err(TermError::Validation { .. })
        ));
    }

    #[test]
    fn test_threshold_zero_keeps_zero_scoring_concepts() {
        let mut store = TerminologyStore::new();
        store
            .load([
                NamasteConcept::new("EA-3", "Kasa", "Cough"),
                // No character overlap with the query at all
                NamasteConcept::new("ZZ-9", "Bbbb", "Bbbb"),
            ])
            .unwrap();
        let matcher = FuzzyMatcher::default();

        let hits = matcher.search(&store, "Kasa", 10, 0).unwrap();
        assert_eq!(hits.len(), 2);
        let zero = hits.iter().find(|h| h.concept.code == "ZZ-9").unwrap();
        assert_eq!(zero.confidence, 0);

        // Any positive threshold drops it again
        let hits = matcher.search(&store, "Kasa", 10, 1).unwrap();
        assert!(hits.iter().all(|h| h.concept.code != "ZZ-9"));
    }

    #[test]
    fn test_limit_truncates_results() {
        let store = diabetes_store();
        let matcher = FuzzyMatcher::default();

        let hits = matcher.search(&store, "a", 2, 0).unwrap();
        assert!(hits.len() <= 2);
    }
}
