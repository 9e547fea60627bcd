//! Set-level diff: compare two flattened revisions of one document.
//!
//! Records are matched on `(section, identity key)`. Matched records whose
//! canonical bodies differ are modifications. Sections listed as always
//! included are reported as changed even when equal, and never as removed.

use std::collections::{BTreeSet, HashMap};

use metadelta_types::{FlatRecord, IdentityKey};
use serde::Serialize;

/// The result of comparing two flattened revisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntryDiff {
    /// Entries to carry in the change package, in new-revision order.
    pub changed: Vec<EntryChange>,
    /// Entries present only in the old revision, in old-revision order.
    pub removed: Vec<FlatRecord>,
}

impl EntryDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is changed, retained, or removed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }

    /// Returns `true` if any entry was added, modified, or removed.
    ///
    /// Retained always-included entries alone do not count.
    pub fn has_changes(&self) -> bool {
        !self.removed.is_empty() || self.changed.iter().any(|c| !c.is_retained())
    }

    /// New-revision records of every changed entry.
    pub fn changed_records(&self) -> impl Iterator<Item = &FlatRecord> {
        self.changed.iter().map(EntryChange::record)
    }

    /// Number of added entries.
    pub fn additions(&self) -> usize {
        self.changed
            .iter()
            .filter(|c| matches!(c, EntryChange::Added(_)))
            .count()
    }

    /// Number of modified entries.
    pub fn modifications(&self) -> usize {
        self.changed
            .iter()
            .filter(|c| matches!(c, EntryChange::Modified { .. }))
            .count()
    }

    /// Number of removed entries.
    pub fn removals(&self) -> usize {
        self.removed.len()
    }
}

/// Why an entry is part of the change set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EntryChange {
    /// The entry does not exist in the old revision.
    Added(FlatRecord),
    /// The entry exists in both revisions with different bodies.
    Modified { old: FlatRecord, new: FlatRecord },
    /// The entry is unchanged but its section is always included.
    Retained(FlatRecord),
}

impl EntryChange {
    /// The new-revision record.
    pub fn record(&self) -> &FlatRecord {
        match self {
            EntryChange::Added(record) | EntryChange::Retained(record) => record,
            EntryChange::Modified { new, .. } => new,
        }
    }

    /// Returns `true` for unchanged always-included entries.
    pub fn is_retained(&self) -> bool {
        matches!(self, EntryChange::Retained(_))
    }
}

/// Compare the flattened `old` and `new` revisions of one document.
///
/// Runs in O(n) over the total entry count, using `(section, key)` as the
/// hash key. No slot ends up in both `changed` and `removed`.
pub fn diff_records(
    old: &[FlatRecord],
    new: &[FlatRecord],
    always_included: &BTreeSet<String>,
) -> EntryDiff {
    let old_slots = index(old);
    let new_slots = index(new);
    let mut diff = EntryDiff::new();

    for record in new {
        let previous = old_slots.get(&(record.section.as_str(), &record.key));
        let change = match previous {
            None => EntryChange::Added(record.clone()),
            Some(previous) if previous.body != record.body => EntryChange::Modified {
                old: (*previous).clone(),
                new: record.clone(),
            },
            Some(_) if always_included.contains(&record.section) => {
                EntryChange::Retained(record.clone())
            }
            Some(_) => continue,
        };
        diff.changed.push(change);
    }

    for record in old {
        if always_included.contains(&record.section) {
            continue;
        }
        if !new_slots.contains_key(&(record.section.as_str(), &record.key)) {
            diff.removed.push(record.clone());
        }
    }

    diff
}

fn index(records: &[FlatRecord]) -> HashMap<(&str, &IdentityKey), &FlatRecord> {
    records
        .iter()
        .map(|r| ((r.section.as_str(), &r.key), r))
        .collect()
}
