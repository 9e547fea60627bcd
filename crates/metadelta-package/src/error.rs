//! Error types for delta orchestration.

use thiserror::Error;

use metadelta_codec::CodecError;
use metadelta_compose::ComposeError;
use metadelta_diff::DiffError;
use metadelta_vcs::VcsError;

/// Errors that can occur while building packages.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Version-control lookup failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// A document could not be decoded.
    #[error("parse error: {0}")]
    Codec(#[from] CodecError),

    /// Flattening a document failed.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Recomposing a document failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// A compound document has an unexpected root tag.
    #[error("{path}: root tag {actual:?} does not match {expected:?}")]
    RootMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// An output path would land outside the package directory.
    #[error("refusing to write outside the package: {0}")]
    UnsafePath(String),

    /// The configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// I/O error writing a package.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for package operations.
pub type PackageResult<T> = Result<T, PackageError>;
