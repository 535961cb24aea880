//! Code mapping types.
//!
//! Types shared between the external code cache, the mapping resolver,
//! and the ICD-11 API client.

use crate::{MatchResult, NamasteCode};

/// ICD-11 target classification system for a code lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSystem {
    /// Traditional Medicine Module 2 (chapter X02).
    Tm2,
    /// Biomedicine (the main MMS linearization).
    Biomedicine,
}

impl TargetSystem {
    /// Returns the stable short name used in cache keys and CLI flags.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tm2 => "tm2",
            Self::Biomedicine => "biomed",
        }
    }

    /// Parses a short name back into a target system.
    ///
    /// Returns `None` if the name is not recognized.
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "tm2" => Some(Self::Tm2),
            "biomed" | "biomedicine" => Some(Self::Biomedicine),
            _ => None,
        }
    }
}

/// Where a resolved code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingSource {
    /// Fetched live from the WHO ICD-11 API (or a fresh cache of it).
    ExternalService,
    /// Served from the bundled static fallback table.
    StaticFallback,
}

/// A single code returned by an ICD-11 search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeHit {
    /// The ICD-11 code (e.g., "SJ00" or "5A11").
    pub code: String,
    /// Which classification branch the code belongs to.
    pub system: TargetSystem,
}

/// A resolved code together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedCode {
    /// The resolved ICD-11 code.
    pub code: String,
    /// Where the code came from.
    pub source: MappingSource,
}

/// A non-fatal problem encountered while resolving one external code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationWarning {
    /// The system whose resolution failed.
    pub system: TargetSystem,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of translating a native code to its ICD-11 codes.
///
/// `warnings` is non-empty when an external lookup failed and the
/// corresponding code field was left empty; the translation as a whole
/// still succeeds in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeTranslation {
    /// The native NAMASTE code that was translated.
    pub code: NamasteCode,
    /// Display name of the translated concept.
    pub display: String,
    /// ICD-11 TM2 code, empty if unresolved.
    pub tm2_code: String,
    /// ICD-11 biomedicine code, empty if unresolved.
    pub biomed_code: String,
    /// Field-level warnings for codes that could not be resolved.
    pub warnings: Vec<TranslationWarning>,
}

/// A search hit with its external codes filled in where possible.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnrichedMatch {
    /// The underlying match, with `concept` code fields updated in place.
    pub result: MatchResult,
    /// Field-level warnings for codes that could not be resolved.
    pub warnings: Vec<TranslationWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_system_round_trip() {
        assert_eq!(TargetSystem::from_str_opt("tm2"), Some(TargetSystem::Tm2));
        assert_eq!(
            TargetSystem::from_str_opt("biomed"),
            Some(TargetSystem::Biomedicine)
        );
        assert_eq!(
            TargetSystem::from_str_opt(TargetSystem::Tm2.as_str()),
            Some(TargetSystem::Tm2)
        );
        assert_eq!(TargetSystem::from_str_opt("icd10"), None);
    }
}
