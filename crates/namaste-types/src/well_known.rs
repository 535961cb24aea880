//! Well-known system URIs and the bundled fallback mapping table.
//!
//! This module provides constants for the canonical system URIs used in
//! generated resources, plus the static NAMASTE → ICD-11 mapping table that
//! the code cache falls back to when the WHO API cannot be reached.
//!
//! # Examples
//!
//! ```
//! use namaste_types::well_known;
//!
//! assert_eq!(well_known::NAMASTE_SYSTEM, "http://ayush.gov.in/namaste");
//!
//! let (tm2, biomed) = well_known::fallback_codes("Madhumeha/Kshaudrameha").unwrap();
//! assert_eq!(tm2, "SJ00");
//! assert_eq!(biomed, "5A11");
//! ```

// =============================================================================
// System URIs
// =============================================================================

/// Canonical URI of the NAMASTE code system.
pub const NAMASTE_SYSTEM: &str = "http://ayush.gov.in/namaste";

/// Canonical URI of the ICD-11 code system.
pub const ICD11_SYSTEM: &str = "http://hl7.org/fhir/sid/icd-11";

/// URL of the generated NAMASTE → ICD-11 concept map.
pub const CONCEPT_MAP_URL: &str = "http://example.com/namaste-to-icd11";

/// Publisher recorded in generated resources.
pub const PUBLISHER: &str = "Ministry of AYUSH, Government of India";

/// Version recorded in generated resources.
pub const TERMINOLOGY_VERSION: &str = "1.0.0";

// =============================================================================
// Static fallback mappings
// =============================================================================

/// Bundled NAMASTE → ICD-11 mappings, keyed by display name.
///
/// Entries are `(display, tm2_code, biomed_code)`. This table is consulted
/// when the WHO ICD-11 API is unreachable or denies authentication.
pub const FALLBACK_MAPPINGS: &[(&str, &str, &str)] = &[
    ("Sandhigatvata", "SP00", "FA01"),
    ("Vatavyadhi", "SP10", "FA20"),
    ("Arsha", "SL01", "ME83"),
    ("Madhumeha/Kshaudrameha", "SJ00", "5A11"),
    ("Kasa", "SB00", "CA22"),
];

/// Looks up the fallback TM2 and biomedicine codes for a term.
///
/// Matching is case-insensitive on the display name. Returns `None` when
/// the term is not in the bundled table.
pub fn fallback_codes(term: &str) -> Option<(&'static str, &'static str)> {
    FALLBACK_MAPPINGS
        .iter()
        .find(|(display, _, _)| display.eq_ignore_ascii_case(term))
        .map(|(_, tm2, biomed)| (*tm2, *biomed))
}
