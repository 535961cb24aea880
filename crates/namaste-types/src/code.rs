//! NAMASTE code type.
//!
//! This module provides a type alias for NAMASTE terminology codes.
//! NAMASTE codes are dotted alphanumeric strings assigned by the
//! Ministry of AYUSH terminology release.

/// A NAMASTE terminology code.
///
/// NAMASTE codes are short alphanumeric identifiers with optional dotted
/// sub-levels that uniquely identify a diagnosis concept within the
/// NAMASTE code system.
///
/// # Examples
///
/// ```
/// use namaste_types::NamasteCode;
///
/// let diabetes: NamasteCode = "EF-2.4.4".to_string(); // Madhumeha
/// let cough: NamasteCode = "EA-3".to_string(); // Kasa
/// ```
pub type NamasteCode = String;
