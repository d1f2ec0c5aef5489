//! Error types for ancestry path encoding and structural operations.

use thiserror::Error;

/// Errors raised while encoding, decoding, or rewriting an ancestry path.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A persisted path string could not be parsed.
    #[error("Malformed ancestry path '{raw}': {reason}")]
    Malformed {
        /// The raw persisted value
        raw: String,
        /// What was wrong with it
        reason: String,
    },

    /// An identifier cannot be represented inside a path.
    #[error("Identifier '{id}' cannot appear in an ancestry path: {reason}")]
    InvalidId {
        /// The offending identifier
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// A prefix replacement was requested for a path that does not start with it.
    #[error("Ancestry path '{path}' does not start with '{prefix}'")]
    PrefixMismatch {
        /// The path being rewritten
        path: String,
        /// The expected prefix
        prefix: String,
    },
}

impl PathError {
    /// Check if this error comes from malformed input (a FormatError).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PathError::Malformed { .. } | PathError::InvalidId { .. }
        )
    }

    /// Check if this error is a failed structural prefix rewrite.
    pub fn is_prefix_mismatch(&self) -> bool {
        matches!(self, PathError::PrefixMismatch { .. })
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}
