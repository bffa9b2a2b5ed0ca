//! The five-kind error taxonomy surfaced at the grouping pipeline boundary.

use std::path::PathBuf;

/// Result type alias for grouping pipeline operations.
pub type Result<T> = std::result::Result<T, GroupingError>;

/// Errors that can occur while validating, grouping, or emitting an artifact.
///
/// Nothing outside these five kinds is visible to a caller: every public
/// entry point in this crate returns `Result<_, GroupingError>`.
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    /// The OCR artifact path does not exist or could not be read.
    #[error("input OCR artifact missing or unreadable at {path}: {reason}")]
    InputMissing { path: PathBuf, reason: String },

    /// The OCR artifact failed schema or cross-reference validation.
    #[error("input OCR artifact malformed: {reason}")]
    InputMalformed { reason: String },

    /// A configuration value was out of range or mutually inconsistent.
    #[error("invalid grouping configuration: {reason}")]
    ConfigInvalid { reason: String },

    /// The output artifact path could not be written.
    #[error("could not write output artifact to {path}: {reason}")]
    OutputUnwritable { path: PathBuf, reason: String },

    /// A data-model invariant failed after the artifact was built. This is a bug.
    #[error("internal invariant violated: {invariant} ({detail})")]
    InternalInvariantViolated { invariant: String, detail: String },
}

impl GroupingError {
    pub(crate) fn invariant(invariant: impl Into<String>, detail: impl Into<String>) -> Self {
        GroupingError::InternalInvariantViolated {
            invariant: invariant.into(),
            detail: detail.into(),
        }
    }
}
