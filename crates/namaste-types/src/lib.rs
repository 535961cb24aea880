//! # namaste-types
//!
//! Type definitions for NAMASTE traditional medicine terminology.
//!
//! This crate provides Rust type definitions for working with NAMASTE
//! (National AYUSH Morbidity and Standardized Terminologies Electronic)
//! concepts and their ICD-11 mappings, including search match results and
//! the generated resource document shapes.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use namaste_types::{MatchResult, NamasteCode, NamasteConcept, TargetSystem};
//! use namaste_types::well_known;
//!
//! let concept = NamasteConcept {
//!     code: "EF-2.4.4".to_string(),
//!     display: "Madhumeha/Kshaudrameha".to_string(),
//!     definition: "Diabetes Mellitus".to_string(),
//!     tm2_code: "SJ00".to_string(),
//!     biomed_code: "5A11".to_string(),
//!     region: None,
//!     observed_count: None,
//! };
//!
//! assert!(concept.is_fully_mapped());
//! assert_eq!(well_known::NAMASTE_SYSTEM, "http://ayush.gov.in/namaste");
//! ```

#![warn(missing_docs)]

mod code;
mod concept;
mod mapping;
mod matching;
mod resources;
pub mod well_known;

// Re-export all public types at crate root
pub use code::NamasteCode;
pub use concept::NamasteConcept;
pub use mapping::{
    CodeHit, CodeTranslation, EnrichedMatch, MappingSource, ResolvedCode, TargetSystem,
    TranslationWarning,
};
pub use matching::{MatchResult, MatchType};
pub use resources::{
    CodeSystem, CodeSystemConcept, ConceptMap, ConceptMapElement, ConceptMapGroup,
    ConceptMapTarget, Expansion, ExpansionEntry, ValueSetExpansion,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _code: NamasteCode = "EA-3".to_string();
        let _system = TargetSystem::Tm2;
        let _source = MappingSource::StaticFallback;
        let _match_type = MatchType::Fuzzy;
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_concept_serde_round_trip() {
        let concept = NamasteConcept::new("EE-3", "Arsha", "Hemorrhoids");
        let json = serde_json::to_string(&concept).unwrap();
        let back: NamasteConcept = serde_json::from_str(&json).unwrap();
        assert_eq!(concept, back);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_resource_type_field_name() {
        let listing = CodeSystem {
            resource_type: "CodeSystem".to_string(),
            url: well_known::NAMASTE_SYSTEM.to_string(),
            version: well_known::TERMINOLOGY_VERSION.to_string(),
            name: "NAMASTE".to_string(),
            status: "active".to_string(),
            content: "complete".to_string(),
            publisher: well_known::PUBLISHER.to_string(),
            count: 0,
            concept: vec![],
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["resourceType"], "CodeSystem");
    }
}
