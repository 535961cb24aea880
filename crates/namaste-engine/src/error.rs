//! Engine error types.

use thiserror::Error;

/// Errors that can occur inside the terminology engine.
#[derive(Error, Debug)]
pub enum TermError {
    /// I/O error reading a source file or cache file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed ingestion row or malformed query parameters.
    #[error("Validation error: {reason}")]
    Validation {
        /// What was wrong with the input.
        reason: String,
    },

    /// A requested native code does not exist in the store.
    #[error("Code not found in store: {code}")]
    NotFound {
        /// The code that was requested.
        code: String,
    },

    /// The external classification service failed and no fallback applied.
    #[error("External service error: {0}")]
    ExternalService(#[from] ExternalServiceError),
}

/// Failures of the external classification lookup path.
///
/// These are absorbed via the static fallback table whenever possible and
/// only reach the caller when neither cache, service, nor fallback yields
/// a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalServiceError {
    /// The service denied authentication.
    #[error("authentication with classification service failed")]
    AuthFailed,

    /// The service was unreachable or timed out.
    #[error("classification service unavailable: {reason}")]
    Unavailable {
        /// Network-level reason.
        reason: String,
    },

    /// The service answered but had no mapping for the term.
    #[error("no mapping found for term: {term}")]
    NoMapping {
        /// The term that was searched.
        term: String,
    },
}

/// Result type for engine operations.
pub type TermResult<T> = Result<T, TermError>;

impl TermError {
    /// Creates a validation error with the given reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}
