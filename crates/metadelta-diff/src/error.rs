//! Error types for the diff crate.

use metadelta_identity::IdentityError;

/// Errors that can occur while flattening or diffing documents.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Two entries of one section share an identity key.
    #[error("duplicate identity key {key:?} in section {section:?}")]
    IdentityCollision { section: String, key: String },

    /// An entry's identity key could not be extracted.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Computing a canonical body failed.
    #[error(transparent)]
    Types(#[from] metadelta_types::TypesError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
