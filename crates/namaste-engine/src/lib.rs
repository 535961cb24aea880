//! # namaste-engine
//!
//! Terminology resolution engine mapping NAMASTE traditional medicine
//! codes to ICD-11.
//!
//! The engine ingests NAMASTE CSV exports into an in-memory store,
//! offers fuzzy search over the stored concepts, translates native codes
//! to their ICD-11 TM2 and biomedicine counterparts through a cached WHO
//! API client with a static fallback table, and projects the store into
//! code listing, concept map, and value set expansion documents.
//!
//! ## Architecture
//!
//! - [`ingest`]: streaming CSV row parser with per-row rejection
//! - [`store`]: deduplicated in-memory concept store
//! - [`matcher`]: fuzzy search scoring
//! - [`icd_api`]: WHO ICD-11 API client behind the
//!   [`ClassificationClient`] trait
//! - [`cache`]: TTL'd code cache with fallback degradation
//! - [`resolver`]: native → ICD-11 code translation
//! - [`resources`]: output document generation
//! - [`service`]: facade wiring the pipeline together
//!
//! ## Features
//!
//! - `parallel` (default): Enables parallel CSV row conversion via rayon.
//!
//! ## Usage
//!
//! ```ignore
//! use namaste_engine::{CacheConfig, MatchConfig, OfflineClient, TerminologyService};
//!
//! let service = TerminologyService::new(
//!     Box::new(OfflineClient),
//!     MatchConfig::default(),
//!     CacheConfig::default(),
//! );
//!
//! let report = service.ingest_path("namaste_export.csv")?;
//! println!("accepted {} rejected {}", report.accepted, report.rejected);
//!
//! for hit in service.search("Madhumeha", 5, 60)? {
//!     println!("{} ({})", hit.concept.display, hit.confidence);
//! }
//! # Ok::<(), namaste_engine::TermError>(())
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod icd_api;
pub mod ingest;
pub mod matcher;
pub mod resolver;
pub mod resources;
pub mod service;
pub mod store;

pub use cache::{CacheEntry, IcdCodeCache};
pub use config::{CacheConfig, IcdApiConfig, MatchConfig};
pub use error::{ExternalServiceError, TermError, TermResult};
pub use icd_api::{ClassificationClient, IcdApiClient, OfflineClient};
pub use ingest::{CsvRowParser, IngestReport};
pub use matcher::FuzzyMatcher;
pub use resolver::{MappingResolver, NATIVE_SYSTEM};
pub use resources::ResourceBuilder;
pub use service::TerminologyService;
pub use store::{StoreSummary, TerminologyStore};
