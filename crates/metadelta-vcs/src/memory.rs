//! In-memory snapshot provider for testing and dry runs.
//!
//! [`InMemorySnapshots`] keeps one `path → content` map per revision. The
//! status list is computed by comparing two snapshots, unless an explicit
//! list has been set (needed to exercise renames and copies).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use crate::error::{VcsError, VcsResult};
use crate::status::{FileStatus, StatusEntry};
use crate::traits::{Revision, SnapshotProvider};

type Snapshot = BTreeMap<String, Vec<u8>>;

/// An in-memory implementation of [`SnapshotProvider`].
#[derive(Debug, Default)]
pub struct InMemorySnapshots {
    snapshots: RwLock<HashMap<Revision, Snapshot>>,
    status: RwLock<Option<Vec<StatusEntry>>>,
}

impl InMemorySnapshots {
    /// Create a provider with no revisions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` at `path` in `revision`, creating the revision if needed.
    pub fn insert_file(
        &self,
        revision: &Revision,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> VcsResult<()> {
        let mut snapshots = self.snapshots.write().map_err(|e| VcsError::Lock(e.to_string()))?;
        snapshots
            .entry(revision.clone())
            .or_default()
            .insert(path.into(), content.into());
        Ok(())
    }

    /// Remove `path` from `revision`. Returns `true` if it existed.
    pub fn remove_file(&self, revision: &Revision, path: &str) -> VcsResult<bool> {
        let mut snapshots = self.snapshots.write().map_err(|e| VcsError::Lock(e.to_string()))?;
        Ok(snapshots
            .get_mut(revision)
            .is_some_and(|files| files.remove(path).is_some()))
    }

    /// Copy every file of `from` into a new revision `to`.
    pub fn fork(&self, from: &Revision, to: &Revision) -> VcsResult<()> {
        let mut snapshots = self.snapshots.write().map_err(|e| VcsError::Lock(e.to_string()))?;
        let files = snapshots.get(from).cloned().unwrap_or_default();
        snapshots.insert(to.clone(), files);
        Ok(())
    }

    /// Use `entries` as the status list instead of computing it.
    pub fn set_status(&self, entries: Vec<StatusEntry>) -> VcsResult<()> {
        let mut status = self.status.write().map_err(|e| VcsError::Lock(e.to_string()))?;
        *status = Some(entries);
        Ok(())
    }
}

impl SnapshotProvider for InMemorySnapshots {
    fn status_list(&self, from: &Revision, to: &Revision) -> VcsResult<Vec<StatusEntry>> {
        if let Some(entries) = self
            .status
            .read()
            .map_err(|e| VcsError::Lock(e.to_string()))?
            .as_ref()
        {
            return Ok(entries.clone());
        }

        let snapshots = self.snapshots.read().map_err(|e| VcsError::Lock(e.to_string()))?;
        let empty = Snapshot::new();
        let old = snapshots.get(from).unwrap_or(&empty);
        let new = snapshots.get(to).unwrap_or(&empty);

        let paths: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
        let entries = paths
            .into_iter()
            .filter_map(|path| {
                let status = match (old.get(path), new.get(path)) {
                    (None, Some(_)) => FileStatus::Added,
                    (Some(_), None) => FileStatus::Deleted,
                    (Some(a), Some(b)) if a != b => FileStatus::Modified,
                    _ => return None,
                };
                Some(StatusEntry::new(path.clone(), status))
            })
            .collect();
        Ok(entries)
    }

    fn file_at(&self, revision: &Revision, path: &str) -> VcsResult<Option<Vec<u8>>> {
        let snapshots = self.snapshots.read().map_err(|e| VcsError::Lock(e.to_string()))?;
        Ok(snapshots
            .get(revision)
            .and_then(|files| files.get(path))
            .cloned())
    }

    fn list_files(&self, revision: &Revision, dir: &str) -> VcsResult<Vec<String>> {
        let snapshots = self.snapshots.read().map_err(|e| VcsError::Lock(e.to_string()))?;
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        Ok(snapshots
            .get(revision)
            .map(|files| {
                files
                    .keys()
                    .filter(|path| path.starts_with(&prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Revision {
        Revision::commit("base")
    }

    fn seeded() -> InMemorySnapshots {
        let vcs = InMemorySnapshots::new();
        vcs.insert_file(&base(), "src/classes/A.cls", "a").unwrap();
        vcs.insert_file(&base(), "src/classes/B.cls", "b").unwrap();
        vcs.insert_file(&base(), "src/pages/P.page", "p").unwrap();
        vcs.fork(&base(), &Revision::WorkingTree).unwrap();
        vcs
    }

    #[test]
    fn computes_status_between_snapshots() {
        let vcs = seeded();
        let head = Revision::WorkingTree;
        vcs.insert_file(&head, "src/classes/A.cls", "a2").unwrap();
        vcs.insert_file(&head, "src/classes/C.cls", "c").unwrap();
        vcs.remove_file(&head, "src/pages/P.page").unwrap();

        let status = vcs.status_list(&base(), &head).unwrap();
        assert_eq!(
            status,
            vec![
                StatusEntry::new("src/classes/A.cls", FileStatus::Modified),
                StatusEntry::new("src/classes/C.cls", FileStatus::Added),
                StatusEntry::new("src/pages/P.page", FileStatus::Deleted),
            ]
        );
    }

    #[test]
    fn explicit_status_wins() {
        let vcs = seeded();
        let rename = StatusEntry::new(
            "src/classes/D.cls",
            FileStatus::Renamed {
                from: "src/classes/B.cls".into(),
                similarity: 100,
            },
        );
        vcs.set_status(vec![rename.clone()]).unwrap();
        assert_eq!(
            vcs.status_list(&base(), &Revision::WorkingTree).unwrap(),
            vec![rename]
        );
    }

    #[test]
    fn file_lookup() {
        let vcs = seeded();
        assert_eq!(
            vcs.file_at(&base(), "src/classes/A.cls").unwrap(),
            Some(b"a".to_vec())
        );
        assert_eq!(vcs.file_at(&base(), "missing").unwrap(), None);
        assert!(matches!(
            vcs.require_file_at(&Revision::commit("other"), "src/classes/A.cls"),
            Err(VcsError::NotFound { .. })
        ));
        assert!(vcs.exists_at(&base(), "src/pages/P.page").unwrap());
    }

    #[test]
    fn list_files_is_scoped_to_directory() {
        let vcs = seeded();
        vcs.insert_file(&base(), "src/classesExtra/X.cls", "x").unwrap();
        assert_eq!(
            vcs.list_files(&base(), "src/classes").unwrap(),
            vec!["src/classes/A.cls".to_string(), "src/classes/B.cls".to_string()]
        );
        assert!(vcs.list_files(&base(), "nowhere").unwrap().is_empty());
    }
}
