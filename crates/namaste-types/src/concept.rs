//! NAMASTE terminology concept type.
//!
//! This module provides the `NamasteConcept` struct representing one row
//! of a NAMASTE terminology export after ingestion.

use crate::NamasteCode;

/// A NAMASTE terminology concept.
///
/// Represents a deduplicated row from a NAMASTE CSV export, together with
/// its ICD-11 mappings once resolved. The two ICD-11 code fields may be
/// empty until the mapping resolver has filled them in.
///
/// # Examples
///
/// ```
/// use namaste_types::NamasteConcept;
///
/// let concept = NamasteConcept {
///     code: "EF-2.4.4".to_string(),
///     display: "Madhumeha/Kshaudrameha".to_string(),
///     definition: "Diabetes Mellitus".to_string(),
///     tm2_code: "SJ00".to_string(),
///     biomed_code: "5A11".to_string(),
///     region: None,
///     observed_count: None,
/// };
///
/// assert!(concept.is_fully_mapped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamasteConcept {
    /// Unique NAMASTE code for this concept (primary key of the store).
    pub code: NamasteCode,
    /// Primary human-readable disease name (searchable).
    pub display: String,
    /// Short descriptive definition (searchable).
    pub definition: String,
    /// ICD-11 Traditional Medicine 2 (TM2) code, empty until resolved.
    pub tm2_code: String,
    /// ICD-11 biomedicine code, empty until resolved.
    pub biomed_code: String,
    /// Reporting region (e.g., state) from the source export, if present.
    pub region: Option<String>,
    /// Observed patient count from the source export, if present.
    pub observed_count: Option<u64>,
}

impl NamasteConcept {
    /// Creates a concept with only the mandatory fields populated.
    pub fn new(
        code: impl Into<NamasteCode>,
        display: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            definition: definition.into(),
            tm2_code: String::new(),
            biomed_code: String::new(),
            region: None,
            observed_count: None,
        }
    }

    /// Returns true if the TM2 mapping is present.
    pub fn has_tm2_mapping(&self) -> bool {
        !self.tm2_code.is_empty()
    }

    /// Returns true if the biomedicine mapping is present.
    pub fn has_biomed_mapping(&self) -> bool {
        !self.biomed_code.is_empty()
    }

    /// Returns true if both ICD-11 mappings are present.
    pub fn is_fully_mapped(&self) -> bool {
        self.has_tm2_mapping() && self.has_biomed_mapping()
    }
}
