//! Match result types for terminology search.

use crate::NamasteConcept;

/// How a search query matched a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchType {
    /// Whole-field case-insensitive equality with a searchable field.
    Exact,
    /// Similarity-scored match below whole-field equality.
    Fuzzy,
}

/// A scored search hit against a stored concept.
///
/// Invariant: `match_type == Exact` implies `confidence == 100`. Fuzzy
/// matches normally score below 100, but a fuzzy score of 100 is legal when
/// the similarity function returns a perfect score on a non-identical
/// string (e.g., the query is a substring of the field).
///
/// # Examples
///
/// ```
/// use namaste_types::{MatchResult, MatchType, NamasteConcept};
///
/// let concept = NamasteConcept::new("EA-3", "Kasa", "Cough");
/// let hit = MatchResult::exact(concept);
///
/// assert_eq!(hit.match_type, MatchType::Exact);
/// assert_eq!(hit.confidence, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    /// The matched concept, cloned from the store snapshot.
    pub concept: NamasteConcept,
    /// Whether this was an exact or fuzzy match.
    pub match_type: MatchType,
    /// Match strength, 0-100.
    pub confidence: u8,
}

impl MatchResult {
    /// Creates an exact match result (confidence fixed at 100).
    pub fn exact(concept: NamasteConcept) -> Self {
        Self {
            concept,
            match_type: MatchType::Exact,
            confidence: 100,
        }
    }

    /// Creates a fuzzy match result with the given confidence.
    pub fn fuzzy(concept: NamasteConcept, confidence: u8) -> Self {
        Self {
            concept,
            match_type: MatchType::Fuzzy,
            confidence,
        }
    }

    /// Returns true if this is an exact match.
    pub fn is_exact(&self) -> bool {
        self.match_type == MatchType::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_100() {
        let concept = NamasteConcept::new("AA", "Vatavyadhi", "Vata disorders");
        let hit = MatchResult::exact(concept);

        assert!(hit.is_exact());
        assert_eq!(hit.confidence, 100);
    }

    #[test]
    fn test_fuzzy_match_keeps_score() {
        let concept = NamasteConcept::new("AA", "Vatavyadhi", "Vata disorders");
        let hit = MatchResult::fuzzy(concept, 86);

        assert!(!hit.is_exact());
        assert_eq!(hit.confidence, 86);
    }
}
