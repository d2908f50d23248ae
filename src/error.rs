//! The error taxonomy shared by normalisation, comparison and generation.
//!
//! Every variant is deterministic given identical input: nothing here is
//! transient, so callers should never retry.

use thiserror::Error;

/// Errors returned by the core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Nothing but blank lines (or just a header) in the input.
    #[error("The file is empty or contains no records")]
    InputEmpty,

    /// Every candidate line failed the identifier shape check.
    #[error("No valid email addresses found ({invalid} line(s) rejected)")]
    NoValidRecords {
        /// Number of lines rejected by validation
        invalid: usize,
    },

    /// Candidate line count is over the configured ceiling. Checked before
    /// any per-record allocation.
    #[error("File contains {count} records, which exceeds the maximum of {max}")]
    InputTooLarge {
        /// Candidate records found
        count: usize,
        /// Configured ceiling
        max: usize,
    },

    /// The comparison method is reserved or unknown.
    #[error("Comparison method '{method}' is not implemented")]
    MethodNotImplemented {
        /// The method name as requested
        method: String,
    },

    /// A generation request outside the accepted bounds.
    #[error("Invalid generation parameters: {reason}")]
    InvalidParameters {
        /// What was wrong with the request
        reason: String,
    },

    /// Anything that isn't the caller's fault.
    #[error("Internal failure: {reason}")]
    InternalFailure {
        /// Description of the failure
        reason: String,
    },
}

/// Result type alias for the core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Whether a failure is the caller's to fix (400-class) or ours (500-class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed, oversized or unsupported input
    Client,
    /// Unexpected failure
    Internal,
}

impl Error {
    /// Classify the error for a boundary layer.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::InputEmpty
            | Error::NoValidRecords { .. }
            | Error::InputTooLarge { .. }
            | Error::MethodNotImplemented { .. }
            | Error::InvalidParameters { .. } => ErrorClass::Client,
            Error::InternalFailure { .. } => ErrorClass::Internal,
        }
    }

    /// The HTTP status a request/response boundary should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.class() {
            ErrorClass::Client => 400,
            ErrorClass::Internal => 500,
        }
    }

    pub(crate) fn invalid_parameters(reason: impl Into<String>) -> Self {
        Error::InvalidParameters { reason: reason.into() }
    }
}
