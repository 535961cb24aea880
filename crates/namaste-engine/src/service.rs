//! Terminology service facade.
//!
//! Wires the store, matcher, resolver, and resource builder into one
//! entry point exposing the five operations: ingest, search, translate,
//! expand, and summary. Every operation returns a typed result; a bad
//! request or a missing code never takes the process down.

use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};

use namaste_types::{
    CodeSystem, CodeTranslation, ConceptMap, MatchResult, NamasteConcept, ValueSetExpansion,
};

use crate::cache::IcdCodeCache;
use crate::config::{CacheConfig, MatchConfig};
use crate::error::TermResult;
use crate::icd_api::ClassificationClient;
use crate::ingest::{CsvRowParser, IngestReport};
use crate::matcher::FuzzyMatcher;
use crate::resolver::MappingResolver;
use crate::resources::ResourceBuilder;
use crate::store::{StoreSummary, TerminologyStore};

/// The terminology resolution engine.
///
/// Owns the shared store and the component pipeline. Cheap to share
/// behind an `Arc`; all operations take `&self`.
pub struct TerminologyService {
    store: Arc<RwLock<TerminologyStore>>,
    matcher: FuzzyMatcher,
    resolver: MappingResolver,
    builder: ResourceBuilder,
}

impl TerminologyService {
    /// Creates a service over the given classification client.
    pub fn new(
        client: Box<dyn ClassificationClient>,
        match_config: MatchConfig,
        cache_config: CacheConfig,
    ) -> Self {
        let store = Arc::new(RwLock::new(TerminologyStore::new()));
        let cache = IcdCodeCache::new(client, cache_config);

        Self {
            matcher: FuzzyMatcher::new(match_config),
            resolver: MappingResolver::new(Arc::clone(&store), cache),
            builder: ResourceBuilder::new(Arc::clone(&store)),
            store,
        }
    }

    /// Ingests a NAMASTE CSV export from a file path.
    ///
    /// Partial-success: malformed rows are rejected individually and
    /// counted; valid rows are merged into the store with native-code
    /// deduplication. `accepted` counts valid rows before deduplication.
    ///
    /// # Errors
    /// Fails only when the file cannot be opened or its header lacks the
    /// mandatory columns.
    pub fn ingest_path<P: AsRef<Path>>(&self, path: P) -> TermResult<IngestReport> {
        let parser = CsvRowParser::from_path(path.as_ref())?;
        let report = self.ingest_parser(parser)?;
        tracing::info!(
            path = %path.as_ref().display(),
            accepted = report.accepted,
            rejected = report.rejected,
            "ingestion completed"
        );
        Ok(report)
    }

    /// Ingests a NAMASTE CSV export from any reader.
    pub fn ingest_reader<R: Read>(&self, reader: R) -> TermResult<IngestReport> {
        self.ingest_parser(CsvRowParser::from_reader(reader)?)
    }

    fn ingest_parser<R: Read>(&self, parser: CsvRowParser<R>) -> TermResult<IngestReport> {
        let (concepts, rejected) = parser.collect_rows();
        let accepted = concepts.len();

        let mut store = self.store.write().expect("store lock poisoned");
        store.load(concepts)?;

        Ok(IngestReport { accepted, rejected })
    }

    /// Searches the stored terminology.
    ///
    /// See [`FuzzyMatcher::search`] for parameter validation and ordering.
    pub fn search(&self, query: &str, limit: usize, threshold: u8) -> TermResult<Vec<MatchResult>> {
        let store = self.store.read().expect("store lock poisoned");
        self.matcher.search(&store, query, limit, threshold)
    }

    /// Searches with the configured default limit and threshold.
    pub fn search_default(&self, query: &str) -> TermResult<Vec<MatchResult>> {
        let store = self.store.read().expect("store lock poisoned");
        self.matcher.search_default(&store, query)
    }

    /// Translates a native code to its ICD-11 codes.
    ///
    /// `source_system` must name the native NAMASTE system; see
    /// [`MappingResolver::translate`].
    pub async fn translate(
        &self,
        code: &str,
        source_system: &str,
    ) -> TermResult<CodeTranslation> {
        self.resolver.translate(code, source_system).await
    }

    /// Expands the terminology against an optional text filter.
    pub async fn expand(&self, filter: &str, count: usize) -> TermResult<ValueSetExpansion> {
        self.builder
            .expand(&self.matcher, &self.resolver, filter, count)
            .await
    }

    /// Returns record counts over the current store snapshot.
    pub fn summary(&self) -> StoreSummary {
        self.store.read().expect("store lock poisoned").summary()
    }

    /// Builds the complete code listing.
    pub fn code_system(&self) -> CodeSystem {
        self.builder.code_system()
    }

    /// Builds the NAMASTE → ICD-11 code links.
    pub fn concept_map(&self) -> ConceptMap {
        self.builder.concept_map()
    }

    /// Gets one concept by native code.
    pub fn concept(&self, code: &str) -> Option<NamasteConcept> {
        self.store
            .read()
            .expect("store lock poisoned")
            .get(code)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermError;
    use crate::icd_api::OfflineClient;
    use namaste_types::MatchType;

    const SAMPLE: &str = "\
Code,Disease,Short_Definition,icd11_tm2_code,icd11_biomed_code
EF-2.4.4,Madhumeha/Kshaudrameha,Diabetes Mellitus,SJ00,5A11
EA-3,Kasa,Cough,,
,Missing code,Bad row,,
EE-3,Arsha,Hemorrhoids,SL01,
";

    fn offline_service() -> TerminologyService {
        TerminologyService::new(
            Box::new(OfflineClient),
            MatchConfig::default(),
            CacheConfig::default(),
        )
    }

    fn loaded_service() -> TerminologyService {
        let service = offline_service();
        service.ingest_reader(SAMPLE.as_bytes()).unwrap();
        service
    }

    #[test]
    fn test_ingest_reports_partial_success() {
        let service = offline_service();
        let report = service.ingest_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(report, IngestReport { accepted: 3, rejected: 1 });
        assert_eq!(service.summary().total_records, 3);
    }

    #[test]
    fn test_reingestion_is_idempotent() {
        let service = loaded_service();
        let before = service.summary();

        service.ingest_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(service.summary(), before);
    }

    #[test]
    fn test_search_end_to_end() {
        let service = loaded_service();

        let hits = service.search("Diabetes", 5, 60).unwrap();
        assert_eq!(hits[0].concept.code, "EF-2.4.4");
        assert_eq!(hits[0].match_type, MatchType::Fuzzy);

        let exact = service.search_default("Kasa").unwrap();
        assert_eq!(exact[0].match_type, MatchType::Exact);
    }

    #[tokio::test]
    async fn test_translate_uses_stored_and_fallback_codes() {
        let service = loaded_service();

        // Fully curated record: no lookup needed
        let full = service.translate("EF-2.4.4", "namaste").await.unwrap();
        assert_eq!(full.tm2_code, "SJ00");
        assert_eq!(full.biomed_code, "5A11");
        assert!(full.warnings.is_empty());

        // Uncurated record whose display is in the fallback table
        let kasa = service.translate("EA-3", "namaste").await.unwrap();
        assert_eq!(kasa.tm2_code, "SB00");
        assert_eq!(kasa.biomed_code, "CA22");

        let missing = service.translate("ZZ-99", "namaste").await;
        assert!(matches!(missing, Err(TermError::NotFound { .. })));

        let wrong_system = service.translate("EA-3", "icd11").await;
        assert!(matches!(wrong_system, Err(TermError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_expand_end_to_end() {
        let service = loaded_service();

        let all = service.expand("", 10).await.unwrap();
        assert_eq!(all.expansion.total, 3);

        let filtered = service.expand("Madhumeha", 10).await.unwrap();
        assert_eq!(filtered.expansion.contains[0].code, "EF-2.4.4");
        assert!(matches!(
            service.expand("Kasa", 0).await,
            Err(TermError::Validation { .. })
        ));
    }

    #[test]
    fn test_resources_reflect_store() {
        let service = loaded_service();

        let cs = service.code_system();
        assert_eq!(cs.count, 3);

        // Kasa has no stored codes and is excluded from the map
        let map = service.concept_map();
        let codes: Vec<&str> = map.group[0]
            .element
            .iter()
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(codes, vec!["EF-2.4.4", "EE-3"]);
    }

    #[test]
    fn test_empty_service_is_well_behaved() {
        let service = offline_service();

        assert_eq!(service.summary().total_records, 0);
        assert!(service.search("anything", 5, 60).unwrap().is_empty());
        assert_eq!(service.code_system().count, 0);
        assert!(service.concept("EA-3").is_none());
    }
}
