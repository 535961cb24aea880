//! In-memory NAMASTE terminology store.
//!
//! Holds deduplicated concepts keyed by native code. Re-loading a code
//! replaces the prior value (last-write-wins) while keeping its original
//! position, so enumeration order is stable across re-ingestion.

use std::collections::{HashMap, HashSet};

use namaste_types::{NamasteCode, NamasteConcept};

use crate::error::{TermError, TermResult};

/// In-memory store for NAMASTE terminology concepts.
///
/// Provides point lookup by native code and insertion-order enumeration
/// after loading from a CSV export or direct record batches.
///
/// # Example
///
/// ```
/// use namaste_engine::TerminologyStore;
/// use namaste_types::NamasteConcept;
///
/// let mut store = TerminologyStore::new();
/// store.load([NamasteConcept::new("EA-3", "Kasa", "Cough")]).unwrap();
///
/// assert!(store.contains("EA-3"));
/// assert_eq!(store.summary().total_records, 1);
/// ```
#[derive(Debug, Default)]
pub struct TerminologyStore {
    /// Concepts indexed by native code.
    concepts: HashMap<NamasteCode, NamasteConcept>,
    /// Codes in first-insertion order.
    order: Vec<NamasteCode>,
}

/// Counts computed over the current store snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreSummary {
    /// Total number of stored records.
    pub total_records: usize,
    /// Number of distinct native codes (equals `total_records` after dedup).
    pub unique_codes: usize,
    /// Number of distinct display names.
    pub unique_displays: usize,
}

impl TerminologyStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-allocated capacity.
    pub fn with_capacity(concept_count: usize) -> Self {
        Self {
            concepts: HashMap::with_capacity(concept_count),
            order: Vec::with_capacity(concept_count),
        }
    }

    /// Merges a batch of concepts into the store.
    ///
    /// Deduplicates by native code, keeping the last occurrence in input
    /// order. A replaced concept keeps its original enumeration position.
    ///
    /// # Errors
    /// Returns `TermError::Validation` if any concept lacks a code or a
    /// display name; the store is not modified in that case.
    pub fn load(
        &mut self,
        concepts: impl IntoIterator<Item = NamasteConcept>,
    ) -> TermResult<usize> {
        let batch: Vec<NamasteConcept> = concepts.into_iter().collect();

        for concept in &batch {
            if concept.code.is_empty() {
                return Err(TermError::validation("concept has empty code"));
            }
            if concept.display.is_empty() {
                return Err(TermError::validation(format!(
                    "concept {} has empty display name",
                    concept.code
                )));
            }
        }

        let count = batch.len();
        for concept in batch {
            self.insert(concept);
        }

        Ok(count)
    }

    /// Inserts or replaces a single concept.
    pub fn insert(&mut self, concept: NamasteConcept) {
        if !self.concepts.contains_key(&concept.code) {
            self.order.push(concept.code.clone());
        }
        self.concepts.insert(concept.code.clone(), concept);
    }

    /// Gets a concept by its native code.
    pub fn get(&self, code: &str) -> Option<&NamasteConcept> {
        self.concepts.get(code)
    }

    /// Gets a concept by its native code, failing with `NotFound`.
    pub fn require(&self, code: &str) -> TermResult<&NamasteConcept> {
        self.get(code).ok_or_else(|| TermError::NotFound {
            code: code.to_string(),
        })
    }

    /// Returns true if a concept exists in the store.
    pub fn contains(&self, code: &str) -> bool {
        self.concepts.contains_key(code)
    }

    /// Returns an iterator over all concepts in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &NamasteConcept> {
        self.order.iter().filter_map(|code| self.concepts.get(code))
    }

    /// Returns the number of concepts in the store.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if the store holds no concepts.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Computes record counts over the current snapshot in O(n).
    pub fn summary(&self) -> StoreSummary {
        let unique_displays: HashSet<&str> = self
            .concepts
            .values()
            .map(|c| c.display.as_str())
            .collect();

        StoreSummary {
            total_records: self.concepts.len(),
            unique_codes: self.concepts.len(),
            unique_displays: unique_displays.len(),
        }
    }
}
