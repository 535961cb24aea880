//! Native-to-ICD-11 code translation.
//!
//! Combines stored curated codes with on-demand external resolution.
//! A curated code on the record always wins; the external cache is only
//! consulted for fields the ingested data left empty. External failures
//! degrade to warnings on the affected field, never to a failed
//! translation.

use std::sync::{Arc, RwLock};

use namaste_types::{
    well_known, CodeTranslation, EnrichedMatch, MatchResult, NamasteConcept, TargetSystem,
    TranslationWarning,
};

use crate::cache::IcdCodeCache;
use crate::error::{TermError, TermResult};
use crate::store::TerminologyStore;

/// Short name of the native source system accepted by `translate`.
pub const NATIVE_SYSTEM: &str = "namaste";

/// Translates native codes into their ICD-11 counterparts.
pub struct MappingResolver {
    store: Arc<RwLock<TerminologyStore>>,
    cache: IcdCodeCache,
}

impl MappingResolver {
    /// Creates a resolver over a shared store and a code cache.
    pub fn new(store: Arc<RwLock<TerminologyStore>>, cache: IcdCodeCache) -> Self {
        Self { store, cache }
    }

    /// Returns the underlying code cache.
    pub fn cache(&self) -> &IcdCodeCache {
        &self.cache
    }

    /// Translates one native code to its TM2 and biomedicine codes.
    ///
    /// Only the native NAMASTE system is a valid source; `source_system`
    /// accepts the short name `"namaste"` or the canonical system URI,
    /// case-insensitively. Curated codes already on the record are
    /// returned as-is; empty fields are resolved through the external
    /// cache using the concept's display name as the search term.
    /// Resolution failures are reported as per-field warnings on an
    /// otherwise successful translation.
    ///
    /// # Errors
    /// Returns `TermError::Validation` for an unrecognized source system
    /// and `TermError::NotFound` if the code is not in the store.
    pub async fn translate(&self, code: &str, source_system: &str) -> TermResult<CodeTranslation> {
        let source_system = source_system.trim();
        if !source_system.eq_ignore_ascii_case(NATIVE_SYSTEM)
            && !source_system.eq_ignore_ascii_case(well_known::NAMASTE_SYSTEM)
        {
            return Err(TermError::validation(format!(
                "unsupported source system: {source_system}"
            )));
        }

        let concept = {
            let store = self.store.read().expect("store lock poisoned");
            store.require(code)?.clone()
        };

        let (translation, _) = self.translate_concept(concept).await;
        Ok(translation)
    }

    /// Fills in external codes for a batch of search results.
    ///
    /// Output order matches input order. Each result's concept is updated
    /// in place where resolution succeeds; failed fields stay empty and
    /// carry a warning.
    pub async fn enrich(&self, results: Vec<MatchResult>) -> Vec<EnrichedMatch> {
        let mut enriched = Vec::with_capacity(results.len());

        for mut result in results {
            let (translation, warnings) = self.translate_concept(result.concept.clone()).await;
            result.concept.tm2_code = translation.tm2_code;
            result.concept.biomed_code = translation.biomed_code;
            enriched.push(EnrichedMatch { result, warnings });
        }

        enriched
    }

    /// Resolves both target systems for a concept.
    ///
    /// Returns the translation together with its warnings (the warnings
    /// are also embedded in the translation).
    async fn translate_concept(
        &self,
        concept: NamasteConcept,
    ) -> (CodeTranslation, Vec<TranslationWarning>) {
        let mut warnings = Vec::new();

        let tm2_code = self
            .resolve_field(&concept, concept.tm2_code.clone(), TargetSystem::Tm2, &mut warnings)
            .await;
        let biomed_code = self
            .resolve_field(
                &concept,
                concept.biomed_code.clone(),
                TargetSystem::Biomedicine,
                &mut warnings,
            )
            .await;

        let translation = CodeTranslation {
            code: concept.code,
            display: concept.display,
            tm2_code,
            biomed_code,
            warnings: warnings.clone(),
        };
        (translation, warnings)
    }

    /// Resolves one code field, preferring the curated value.
    async fn resolve_field(
        &self,
        concept: &NamasteConcept,
        curated: String,
        system: TargetSystem,
        warnings: &mut Vec<TranslationWarning>,
    ) -> String {
        if !curated.is_empty() {
            return curated;
        }

        match self.cache.resolve(&concept.display, system).await {
            Ok(resolved) => resolved.code,
            Err(err) => {
                tracing::debug!(
                    code = %concept.code,
                    system = system.as_str(),
                    error = %err,
                    "external code unresolved"
                );
                warnings.push(TranslationWarning {
                    system,
                    reason: err.to_string(),
                });
                String::new()
            }
        }
    }
}
