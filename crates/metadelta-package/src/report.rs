//! The result of a delta run.

use serde::Serialize;

use crate::manifest::ManifestMember;

/// What happened to one planned work item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Copied as-is into the change package.
    Copied,
    /// A whole bundle copied into the change package.
    Bundle { files: usize },
    /// Compound diff of one document.
    Compound {
        added: usize,
        modified: usize,
        retained: usize,
        removed: usize,
    },
    /// Compound document whose entries did not change.
    Unchanged,
    /// Deleted path; old content goes to the destructive package if requested.
    Deleted,
}

/// The outcome of one successfully processed work item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathOutcome {
    pub path: String,
    pub outcome: OutcomeKind,
    /// Repository-relative paths written into the change package.
    pub written: Vec<String>,
    /// Repository-relative paths written into the destructive package.
    pub destructive: Vec<String>,
    /// Manifest members for the change package.
    pub members: Vec<ManifestMember>,
    /// Manifest members for the destructive package.
    pub destructive_members: Vec<ManifestMember>,
}

impl PathOutcome {
    pub fn new(path: impl Into<String>, outcome: OutcomeKind) -> Self {
        Self {
            path: path.into(),
            outcome,
            written: Vec::new(),
            destructive: Vec::new(),
            members: Vec::new(),
            destructive_members: Vec::new(),
        }
    }
}

/// A work item that failed; the run continued without it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathFailure {
    pub path: String,
    pub error: String,
}

/// Per-path outcomes and failures, in status-list order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub outcomes: Vec<PathOutcome>,
    pub failures: Vec<PathFailure>,
}

impl ChangeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no work item failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of files written into the change package.
    pub fn written_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.written.len()).sum()
    }

    /// Number of files written into the destructive package.
    pub fn destructive_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.destructive.len()).sum()
    }

    /// All change-package manifest members.
    pub fn members(&self) -> impl Iterator<Item = &ManifestMember> {
        self.outcomes.iter().flat_map(|o| &o.members)
    }

    /// All destructive-package manifest members.
    pub fn destructive_members(&self) -> impl Iterator<Item = &ManifestMember> {
        self.outcomes.iter().flat_map(|o| &o.destructive_members)
    }
}
