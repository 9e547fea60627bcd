//! Error types for identity resolution.

use metadelta_types::TypesError;

/// Errors that can occur while extracting identity keys.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The entry lacks the field its section keys on.
    #[error("entry in section {section:?} has no {field:?} field")]
    MissingField { section: String, field: String },

    /// Computing a canonical body failed.
    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Convenience alias for identity results.
pub type IdentityResult<T> = Result<T, IdentityError>;
