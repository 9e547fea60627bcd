//! Error types for the compose crate.

use std::path::PathBuf;

use metadelta_codec::CodecError;
use metadelta_diff::DiffError;

/// Errors that can occur during composition and decomposition.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Two records share a section and identity key.
    #[error("duplicate identity key {key:?} in section {section:?}")]
    IdentityCollision { section: String, key: String },

    /// Input files disagree on the document root tag.
    #[error("{path}: root tag {actual:?} does not match {expected:?}")]
    RootMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The input directory holds no documents.
    #[error("no documents found in {0}")]
    EmptyInput(PathBuf),

    /// A file could not be decoded.
    #[error("{path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Flattening a document failed.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Directory traversal failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for compose results.
pub type ComposeResult<T> = Result<T, ComposeError>;
