//! Version-control snapshot providers for metadelta.
//!
//! The delta orchestrator treats version control as a black box that can
//! list changed paths between two revisions and return a file's content at
//! a revision. This crate defines that interface and two backends.
//!
//! # Key Types
//!
//! - [`SnapshotProvider`] — Trait for status lists and historical content
//! - [`Revision`] — A commit-ish or the working tree
//! - [`StatusEntry`] / [`FileStatus`] — One changed path
//! - [`GitCli`] — Backend that shells out to `git`
//! - [`InMemorySnapshots`] — Backend for tests and dry runs

pub mod error;
pub mod git;
pub mod memory;
pub mod status;
pub mod traits;

pub use error::{VcsError, VcsResult};
pub use git::GitCli;
pub use memory::InMemorySnapshots;
pub use status::{parse_name_status, FileStatus, StatusEntry};
pub use traits::{Revision, SnapshotProvider};
