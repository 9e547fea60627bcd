//! Error types for version-control lookups.

use thiserror::Error;

/// Errors that can occur while querying a snapshot provider.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The path does not exist at the revision.
    #[error("{path} not found at {revision}")]
    NotFound { revision: String, path: String },

    /// The `git` executable could not be started.
    #[error("git is not available on PATH")]
    GitUnavailable,

    /// A `git` invocation exited unsuccessfully.
    #[error("`git {command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    /// A status line could not be understood.
    #[error("unrecognized status line: {line:?}")]
    Status { line: String },

    /// An in-memory backend lock was poisoned.
    #[error("lock poisoned: {0}")]
    Lock(String),

    /// I/O error reading the working tree.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal of the working tree failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Convenience type alias for version-control results.
pub type VcsResult<T> = Result<T, VcsError>;
