//! Typed output resource shapes.
//!
//! The resource builder projects the terminology store into these three
//! document shapes: a complete code listing (`CodeSystem`), the set of
//! source → target code links (`ConceptMap`), and a filtered, paginated
//! expansion view (`ValueSetExpansion`). They are serialized only at the
//! boundary; nothing inside the engine assembles ad-hoc JSON.

/// A complete catalog of stored concepts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeSystem {
    /// Always "CodeSystem".
    #[cfg_attr(feature = "serde", serde(rename = "resourceType"))]
    pub resource_type: String,
    /// Canonical URL of the code system.
    pub url: String,
    /// Release version.
    pub version: String,
    /// Machine-readable name.
    pub name: String,
    /// Publication status ("active").
    pub status: String,
    /// Content completeness ("complete").
    pub content: String,
    /// Publisher of the terminology.
    pub publisher: String,
    /// Number of concepts in the listing.
    pub count: usize,
    /// The concepts, in store insertion order.
    pub concept: Vec<CodeSystemConcept>,
}

/// One concept in a [`CodeSystem`] listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeSystemConcept {
    /// The NAMASTE code.
    pub code: String,
    /// Display name.
    pub display: String,
    /// Short definition.
    pub definition: String,
}

/// The set of source → target code links.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptMap {
    /// Always "ConceptMap".
    #[cfg_attr(feature = "serde", serde(rename = "resourceType"))]
    pub resource_type: String,
    /// Canonical URL of the map.
    pub url: String,
    /// Release version.
    pub version: String,
    /// Machine-readable name.
    pub name: String,
    /// Publication status ("active").
    pub status: String,
    /// URI of the source code system.
    #[cfg_attr(feature = "serde", serde(rename = "sourceUri"))]
    pub source_uri: String,
    /// URI of the target code system.
    #[cfg_attr(feature = "serde", serde(rename = "targetUri"))]
    pub target_uri: String,
    /// Mapping groups (always exactly one: NAMASTE → ICD-11).
    pub group: Vec<ConceptMapGroup>,
}

/// A group of mappings sharing source and target systems.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptMapGroup {
    /// Source system URI.
    pub source: String,
    /// Target system URI.
    pub target: String,
    /// One element per mapped source concept.
    pub element: Vec<ConceptMapElement>,
}

/// The targets of one source concept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptMapElement {
    /// Source NAMASTE code.
    pub code: String,
    /// Source display name.
    pub display: String,
    /// Target codes, one per resolved system.
    pub target: Vec<ConceptMapTarget>,
}

/// One target code link.
///
/// Equivalence is always reported as "equivalent"; the engine computes no
/// partial-equivalence classification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptMapTarget {
    /// Target ICD-11 code.
    pub code: String,
    /// Equivalence relation, always "equivalent".
    pub equivalence: String,
    /// Which ICD-11 branch the target belongs to ("TM2" / "Biomedicine").
    pub comment: String,
}

/// A filtered, paginated expansion of the terminology.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueSetExpansion {
    /// Always "ValueSet".
    #[cfg_attr(feature = "serde", serde(rename = "resourceType"))]
    pub resource_type: String,
    /// The expansion payload.
    pub expansion: Expansion,
}

/// Expansion contents with the pre-truncation hit count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expansion {
    /// Number of hits before truncation to the requested count.
    pub total: usize,
    /// The returned entries, highest confidence first.
    pub contains: Vec<ExpansionEntry>,
}

/// One entry of a [`ValueSetExpansion`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpansionEntry {
    /// Source system URI.
    pub system: String,
    /// NAMASTE code.
    pub code: String,
    /// Display name.
    pub display: String,
    /// ICD-11 TM2 code, empty if unresolved.
    pub tm2_code: String,
    /// ICD-11 biomedicine code, empty if unresolved.
    pub biomed_code: String,
    /// Match confidence, 0-100 (100 for unfiltered listings).
    pub confidence: u8,
}
