//! Status list types and `git diff --name-status` parsing.

use serde::{Deserialize, Serialize};

use crate::error::{VcsError, VcsResult};

/// A single changed path between two revisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The path at the `to` revision (or the removed path for deletions).
    pub path: String,
    /// The kind of change.
    pub status: FileStatus,
}

impl StatusEntry {
    /// Create a new status entry.
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }

    /// The path this entry had at the `from` revision, if it existed there.
    pub fn old_path(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Added | FileStatus::Copied { .. } => None,
            FileStatus::Renamed { from, .. } => Some(from),
            FileStatus::Modified | FileStatus::Deleted | FileStatus::TypeChanged => {
                Some(&self.path)
            }
        }
    }
}

/// The kind of file change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    /// File type changed (e.g. regular file to symlink).
    TypeChanged,
    /// Moved from another path.
    Renamed {
        from: String,
        /// Similarity index reported by rename detection, 0-100.
        similarity: u8,
    },
    /// Copied from another path, which is itself unchanged.
    Copied { from: String, similarity: u8 },
}

impl FileStatus {
    /// Single-letter code as used by `git diff --name-status`.
    pub fn code(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::TypeChanged => 'T',
            FileStatus::Renamed { .. } => 'R',
            FileStatus::Copied { .. } => 'C',
        }
    }
}

/// Parse the output of `git diff --name-status`.
///
/// Blank lines are skipped. Any other line that is not a recognized status
/// fails the whole parse with [`VcsError::Status`].
pub fn parse_name_status(text: &str) -> VcsResult<Vec<StatusEntry>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> VcsResult<StatusEntry> {
    let invalid = || VcsError::Status {
        line: line.to_string(),
    };
    let mut columns = line.split('\t');
    let code = columns.next().ok_or_else(invalid)?;
    let first = columns.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
    let second = columns.next();
    if columns.next().is_some() {
        return Err(invalid());
    }

    let mut chars = code.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let score = chars.as_str();

    let entry = match (letter, second) {
        ('A', None) => StatusEntry::new(first, FileStatus::Added),
        ('M', None) => StatusEntry::new(first, FileStatus::Modified),
        ('D', None) => StatusEntry::new(first, FileStatus::Deleted),
        ('T', None) => StatusEntry::new(first, FileStatus::TypeChanged),
        ('R', Some(to)) if !to.is_empty() => StatusEntry::new(
            to,
            FileStatus::Renamed {
                from: first.to_string(),
                similarity: similarity(score).ok_or_else(invalid)?,
            },
        ),
        ('C', Some(to)) if !to.is_empty() => StatusEntry::new(
            to,
            FileStatus::Copied {
                from: first.to_string(),
                similarity: similarity(score).ok_or_else(invalid)?,
            },
        ),
        _ => return Err(invalid()),
    };

    if matches!(letter, 'A' | 'M' | 'D' | 'T') && !score.is_empty() {
        return Err(invalid());
    }
    Ok(entry)
}

fn similarity(score: &str) -> Option<u8> {
    if score.is_empty() {
        return Some(100);
    }
    score.parse::<u8>().ok().filter(|s| *s <= 100)
}
