//! The [`SnapshotProvider`] trait and [`Revision`] selector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{VcsError, VcsResult};
use crate::status::StatusEntry;

/// One side of a comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Revision {
    /// Anything the backend can resolve as a commit (hash, branch, tag, `HEAD~1`).
    Commit(String),
    /// The current checkout, including uncommitted edits to tracked files.
    WorkingTree,
}

impl Revision {
    /// Shorthand for [`Revision::Commit`].
    pub fn commit(rev: impl Into<String>) -> Self {
        Revision::Commit(rev.into())
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Commit(rev) => f.write_str(rev),
            Revision::WorkingTree => f.write_str("working tree"),
        }
    }
}

/// Read-only access to a repository's history.
///
/// Paths are repository-relative and use `/` as separator. Implementations
/// must be thread-safe (`Send + Sync`) so path work items can be processed
/// in parallel.
pub trait SnapshotProvider: Send + Sync {
    /// Changed paths between `from` and `to`, in the backend's order.
    fn status_list(&self, from: &Revision, to: &Revision) -> VcsResult<Vec<StatusEntry>>;

    /// Raw content of `path` at `revision`.
    ///
    /// Returns `Ok(None)` if the path does not exist there. The content is
    /// fully read before this returns.
    fn file_at(&self, revision: &Revision, path: &str) -> VcsResult<Option<Vec<u8>>>;

    /// Every file under directory `dir` at `revision`, sorted.
    fn list_files(&self, revision: &Revision, dir: &str) -> VcsResult<Vec<String>>;

    /// Like [`file_at`](Self::file_at), but a missing path is an error.
    fn require_file_at(&self, revision: &Revision, path: &str) -> VcsResult<Vec<u8>> {
        self.file_at(revision, path)?
            .ok_or_else(|| VcsError::NotFound {
                revision: revision.to_string(),
                path: path.to_string(),
            })
    }

    /// Returns `true` if `path` exists at `revision`.
    fn exists_at(&self, revision: &Revision, path: &str) -> VcsResult<bool> {
        Ok(self.file_at(revision, path)?.is_some())
    }
}
