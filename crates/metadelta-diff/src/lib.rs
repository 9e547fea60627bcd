//! Diff engine for metadelta.
//!
//! Flattens parsed documents into identity-keyed records and compares two
//! revisions of the same document as sets, producing changed and removed
//! entries. Pure: no I/O and no logging.
//!
//! # Key Types
//!
//! - [`flatten`] -- Document to `(section, key, body)` records
//! - [`EntryDiff`] / [`EntryChange`] -- Set-level diff (changed/removed entries)
//! - [`LineDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level diff of one entry's text

pub mod error;
pub mod flatten;
pub mod line_diff;
pub mod set_diff;

pub use error::{DiffError, DiffResult};
pub use flatten::flatten;
pub use line_diff::{diff_lines, DiffHunk, DiffLine, LineDiff};
pub use set_diff::{diff_records, EntryChange, EntryDiff};
