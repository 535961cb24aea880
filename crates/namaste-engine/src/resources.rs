//! Resource generation over the terminology store.
//!
//! Projects the store into the three output document shapes: a complete
//! code listing, the source → target code links, and a filtered,
//! paginated expansion. Listing and map generation read only stored
//! data; expansion additionally enriches filtered hits through the
//! mapping resolver.

use std::sync::{Arc, RwLock};

use namaste_types::{
    well_known, CodeSystem, CodeSystemConcept, ConceptMap, ConceptMapElement, ConceptMapGroup,
    ConceptMapTarget, Expansion, ExpansionEntry, ValueSetExpansion,
};

use crate::error::{TermError, TermResult};
use crate::matcher::FuzzyMatcher;
use crate::resolver::MappingResolver;
use crate::store::TerminologyStore;

/// Builds output resources from the shared store.
pub struct ResourceBuilder {
    store: Arc<RwLock<TerminologyStore>>,
}

impl ResourceBuilder {
    /// Creates a builder over a shared store.
    pub fn new(store: Arc<RwLock<TerminologyStore>>) -> Self {
        Self { store }
    }

    /// Builds the complete code listing, in store insertion order.
    pub fn code_system(&self) -> CodeSystem {
        let store = self.store.read().expect("store lock poisoned");

        let concept: Vec<CodeSystemConcept> = store
            .all()
            .map(|c| CodeSystemConcept {
                code: c.code.clone(),
                display: c.display.clone(),
                definition: c.definition.clone(),
            })
            .collect();

        CodeSystem {
            resource_type: "CodeSystem".to_string(),
            url: well_known::NAMASTE_SYSTEM.to_string(),
            version: well_known::TERMINOLOGY_VERSION.to_string(),
            name: "NAMASTE".to_string(),
            status: "active".to_string(),
            content: "complete".to_string(),
            publisher: well_known::PUBLISHER.to_string(),
            count: concept.len(),
            concept,
        }
    }

    /// Builds the NAMASTE → ICD-11 code links.
    ///
    /// Only concepts carrying at least one stored external code appear;
    /// no external lookups are performed. Every link is reported as
    /// "equivalent", with the target branch named in the comment.
    pub fn concept_map(&self) -> ConceptMap {
        let store = self.store.read().expect("store lock poisoned");

        let element: Vec<ConceptMapElement> = store
            .all()
            .filter(|c| c.has_tm2_mapping() || c.has_biomed_mapping())
            .map(|c| {
                let mut target = Vec::new();
                if c.has_tm2_mapping() {
                    target.push(ConceptMapTarget {
                        code: c.tm2_code.clone(),
                        equivalence: "equivalent".to_string(),
                        comment: "TM2".to_string(),
                    });
                }
                if c.has_biomed_mapping() {
                    target.push(ConceptMapTarget {
                        code: c.biomed_code.clone(),
                        equivalence: "equivalent".to_string(),
                        comment: "Biomedicine".to_string(),
                    });
                }
                ConceptMapElement {
                    code: c.code.clone(),
                    display: c.display.clone(),
                    target,
                }
            })
            .collect();

        ConceptMap {
            resource_type: "ConceptMap".to_string(),
            url: well_known::CONCEPT_MAP_URL.to_string(),
            version: well_known::TERMINOLOGY_VERSION.to_string(),
            name: "NAMASTEtoICD11".to_string(),
            status: "active".to_string(),
            source_uri: well_known::NAMASTE_SYSTEM.to_string(),
            target_uri: well_known::ICD11_SYSTEM.to_string(),
            group: vec![ConceptMapGroup {
                source: well_known::NAMASTE_SYSTEM.to_string(),
                target: well_known::ICD11_SYSTEM.to_string(),
                element,
            }],
        }
    }

    /// Expands the terminology against an optional text filter.
    ///
    /// With an empty filter, the full listing is returned truncated to
    /// `count`, codes served as stored and confidence fixed at 100;
    /// `total` is the store size. With a filter, hits are gathered with
    /// the matcher's default threshold, `total` counts all hits before
    /// truncation, and the returned page is enriched through the
    /// resolver. Enrichment warnings are dropped here; the expansion
    /// shape has no warning channel.
    ///
    /// # Errors
    /// Returns `TermError::Validation` when `count` is zero.
    pub async fn expand(
        &self,
        matcher: &FuzzyMatcher,
        resolver: &MappingResolver,
        filter: &str,
        count: usize,
    ) -> TermResult<ValueSetExpansion> {
        if count == 0 {
            return Err(TermError::validation("expansion count must be at least 1"));
        }

        let filter = filter.trim();
        if filter.is_empty() {
            return Ok(self.expand_unfiltered(count));
        }

        let hits = {
            let store = self.store.read().expect("store lock poisoned");
            // Every stored concept is a candidate; `total` must count all
            // hits, so the search itself is never the truncation point
            let candidate_limit = store.len().max(1);
            matcher.search(&store, filter, candidate_limit, matcher.config().threshold)?
        };

        let total = hits.len();
        let page: Vec<_> = hits.into_iter().take(count).collect();
        let enriched = resolver.enrich(page).await;

        let contains = enriched
            .into_iter()
            .map(|e| {
                let concept = e.result.concept;
                ExpansionEntry {
                    system: well_known::NAMASTE_SYSTEM.to_string(),
                    code: concept.code,
                    display: concept.display,
                    tm2_code: concept.tm2_code,
                    biomed_code: concept.biomed_code,
                    confidence: e.result.confidence,
                }
            })
            .collect();

        Ok(ValueSetExpansion {
            resource_type: "ValueSet".to_string(),
            expansion: Expansion { total, contains },
        })
    }

    /// Full-store expansion: no filter, no external lookups.
    fn expand_unfiltered(&self, count: usize) -> ValueSetExpansion {
        let store = self.store.read().expect("store lock poisoned");

        let contains: Vec<ExpansionEntry> = store
            .all()
            .take(count)
            .map(|c| ExpansionEntry {
                system: well_known::NAMASTE_SYSTEM.to_string(),
                code: c.code.clone(),
                display: c.display.clone(),
                tm2_code: c.tm2_code.clone(),
                biomed_code: c.biomed_code.clone(),
                confidence: 100,
            })
            .collect();

        ValueSetExpansion {
            resource_type: "ValueSet".to_string(),
            expansion: Expansion {
                total: store.len(),
                contains,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::IcdCodeCache;
    use crate::config::{CacheConfig, MatchConfig};
    use crate::icd_api::OfflineClient;
    use namaste_types::NamasteConcept;

    fn seeded_store() -> Arc<RwLock<TerminologyStore>> {
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
                NamasteConcept {
                    code: "EA-3".to_string(),
                    display: "Kasa".to_string(),
                    definition: "Cough".to_string(),
                    tm2_code: "SB00".to_string(),
                    biomed_code: String::new(),
                    region: None,
                    observed_count: None,
                },
                NamasteConcept::new("XX-1", "Unmapped disorder", "No stored codes"),
            ])
            .unwrap();
        Arc::new(RwLock::new(store))
    }

    fn offline_resolver(store: Arc<RwLock<TerminologyStore>>) -> MappingResolver {
        let cache = IcdCodeCache::new(Box::new(OfflineClient), CacheConfig::default());
        MappingResolver::new(store, cache)
    }

    #[test]
    fn test_code_system_lists_all_concepts_in_order() {
        let builder = ResourceBuilder::new(seeded_store());

        let cs = builder.code_system();
        assert_eq!(cs.resource_type, "CodeSystem");
        assert_eq!(cs.url, well_known::NAMASTE_SYSTEM);
        assert_eq!(cs.count, 3);
        let codes: Vec<&str> = cs.concept.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["EF-2.4.4", "EA-3", "XX-1"]);
    }

    #[test]
    fn test_concept_map_skips_unmapped_concepts() {
        let builder = ResourceBuilder::new(seeded_store());

        let map = builder.concept_map();
        assert_eq!(map.group.len(), 1);

        let elements = &map.group[0].element;
        assert_eq!(elements.len(), 2);

        // Fully mapped concept links both branches
        assert_eq!(elements[0].code, "EF-2.4.4");
        assert_eq!(elements[0].target.len(), 2);
        assert_eq!(elements[0].target[0].comment, "TM2");
        assert_eq!(elements[0].target[1].comment, "Biomedicine");
        assert!(elements[0]
            .target
            .iter()
            .all(|t| t.equivalence == "equivalent"));

        // Partially mapped concept links only its stored branch
        assert_eq!(elements[1].code, "EA-3");
        assert_eq!(elements[1].target.len(), 1);
        assert_eq!(elements[1].target[0].code, "SB00");
    }

    #[tokio::test]
    async fn test_expand_without_filter_lists_everything() {
        let store = seeded_store();
        let builder = ResourceBuilder::new(Arc::clone(&store));
        let resolver = offline_resolver(store);
        let matcher = FuzzyMatcher::default();

        let vs = builder.expand(&matcher, &resolver, "", 10).await.unwrap();
        assert_eq!(vs.expansion.total, 3);
        assert_eq!(vs.expansion.contains.len(), 3);
        assert!(vs.expansion.contains.iter().all(|e| e.confidence == 100));
        // Stored codes are served as-is; the unmapped concept stays empty
        assert_eq!(vs.expansion.contains[2].code, "XX-1");
        assert_eq!(vs.expansion.contains[2].tm2_code, "");
    }

    #[tokio::test]
    async fn test_expand_total_counts_hits_before_truncation() {
        let store = seeded_store();
        let builder = ResourceBuilder::new(Arc::clone(&store));
        let resolver = offline_resolver(store);
        let matcher = FuzzyMatcher::default();

        let vs = builder.expand(&matcher, &resolver, "", 2).await.unwrap();
        assert_eq!(vs.expansion.total, 3);
        assert_eq!(vs.expansion.contains.len(), 2);
    }

    #[tokio::test]
    async fn test_expand_with_filter_scores_and_enriches() {
        let store = seeded_store();
        let builder = ResourceBuilder::new(Arc::clone(&store));
        let resolver = offline_resolver(store);
        let matcher = FuzzyMatcher::default();

        let vs = builder
            .expand(&matcher, &resolver, "Diabetes", 10)
            .await
            .unwrap();

        assert_eq!(vs.expansion.total, 1);
        let entry = &vs.expansion.contains[0];
        assert_eq!(entry.code, "EF-2.4.4");
        assert_eq!(entry.tm2_code, "SJ00");
        assert_eq!(entry.biomed_code, "5A11");
        assert!(entry.confidence >= 60);
    }

    #[tokio::test]
    async fn test_expand_total_not_capped_by_count() {
        let store = seeded_store();
        let builder = ResourceBuilder::new(Arc::clone(&store));
        let resolver = offline_resolver(Arc::clone(&store));
        // Threshold 0 makes every stored concept a hit
        let matcher = FuzzyMatcher::new(MatchConfig {
            threshold: 0,
            limit: 10,
        });

        let vs = builder
            .expand(&matcher, &resolver, "disorder", 1)
            .await
            .unwrap();

        assert_eq!(vs.expansion.total, store.read().unwrap().len());
        assert_eq!(vs.expansion.contains.len(), 1);
    }

    #[tokio::test]
    async fn test_expand_rejects_zero_count() {
        let store = seeded_store();
        let builder = ResourceBuilder::new(Arc::clone(&store));
        let resolver = offline_resolver(store);
        let matcher = FuzzyMatcher::default();

        let result = builder.expand(&matcher, &resolver, "Kasa", 0).await;
        assert!(matches!(result, Err(TermError::Validation { .. })));
    }
}
