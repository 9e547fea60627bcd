//! Classification of status entries into deduplicated work items.

use std::collections::HashSet;

use metadelta_vcs::{FileStatus, Revision, SnapshotProvider, StatusEntry};
use serde::Serialize;
use tracing::debug;

use crate::config::DeltaConfig;
use crate::error::PackageResult;
use crate::strategy::{DispatchTable, StrategyKind};

/// One unit of work, independent of every other item in a plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkItem {
    /// Copy the file at the `to` revision.
    Copy { path: String },
    /// Diff a compound document. `old_path` is `None` when it is new.
    Compound {
        path: String,
        old_path: Option<String>,
    },
    /// Copy or delete a whole bundle; `origin` is the path that triggered it.
    Bundle { dir: String, origin: String },
    /// The path no longer exists at the `to` revision.
    Delete { path: String },
}

impl WorkItem {
    /// The path reported for this item.
    pub fn path(&self) -> &str {
        match self {
            WorkItem::Copy { path } | WorkItem::Compound { path, .. } | WorkItem::Delete { path } => {
                path
            }
            WorkItem::Bundle { dir, .. } => dir,
        }
    }
}

enum Side<'s> {
    Change { path: &'s str, existed: bool },
    Delete { path: &'s str },
}

/// Turns a status list into work items for one pair of revisions.
pub(crate) struct Planner<'a> {
    pub table: &'a DispatchTable,
    pub config: &'a DeltaConfig,
    pub vcs: &'a dyn SnapshotProvider,
    pub from: &'a Revision,
    pub to: &'a Revision,
}

impl Planner<'_> {
    /// Classify every entry, keeping status-list order and dropping items
    /// that repeat an earlier item's action and path.
    ///
    /// Renames become a deletion of the old path followed by a change of the
    /// new one. Descriptor files are folded into their primary file, and all
    /// paths of one bundle collapse into a single item.
    pub fn plan(&self, status: &[StatusEntry]) -> PackageResult<Vec<WorkItem>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        for entry in status {
            for side in sides(entry) {
                let path = match &side {
                    Side::Change { path, .. } | Side::Delete { path } => *path,
                };
                if !self.config.in_source_root(path) {
                    debug!(path, "outside source root, skipping");
                    continue;
                }
                let item = match side {
                    Side::Change { path, existed } => self.classify_change(path, existed)?,
                    Side::Delete { path } => self.classify_delete(path)?,
                };
                if seen.insert((std::mem::discriminant(&item), item.path().to_string())) {
                    items.push(item);
                }
            }
        }

        Ok(items)
    }

    fn classify_change(&self, path: &str, existed: bool) -> PackageResult<WorkItem> {
        if let Some(primary) = self.primary_of(path) {
            if self.vcs.exists_at(self.to, primary)? {
                let existed = self.vcs.exists_at(self.from, primary)?;
                return Ok(self.dispatch_change(primary, existed));
            }
        }
        Ok(self.dispatch_change(path, existed))
    }

    fn classify_delete(&self, path: &str) -> PackageResult<WorkItem> {
        if let Some(primary) = self.primary_of(path) {
            if self.vcs.exists_at(self.to, primary)? {
                return self.classify_change(primary, true);
            }
            if self.vcs.exists_at(self.from, primary)? {
                return Ok(self.dispatch_delete(primary));
            }
        }
        Ok(self.dispatch_delete(path))
    }

    fn dispatch_change(&self, path: &str, existed: bool) -> WorkItem {
        let Some(descriptor) = self.table.resolve(path) else {
            return WorkItem::Copy { path: path.into() };
        };
        match descriptor.kind {
            StrategyKind::Verbatim => WorkItem::Copy { path: path.into() },
            StrategyKind::BundleCopy => match descriptor.bundle_dir(path) {
                Some(dir) => WorkItem::Bundle {
                    dir,
                    origin: path.into(),
                },
                None => WorkItem::Copy { path: path.into() },
            },
            StrategyKind::CompoundDiff => WorkItem::Compound {
                path: path.into(),
                old_path: existed.then(|| path.to_string()),
            },
        }
    }

    fn dispatch_delete(&self, path: &str) -> WorkItem {
        match self.table.resolve(path).and_then(|d| d.bundle_dir(path)) {
            Some(dir) => WorkItem::Bundle {
                dir,
                origin: path.into(),
            },
            None => WorkItem::Delete { path: path.into() },
        }
    }

    fn primary_of<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_suffix(self.config.meta_suffix.as_str())
            .filter(|primary| !primary.is_empty() && !primary.ends_with('/'))
    }
}

fn sides(entry: &StatusEntry) -> Vec<Side<'_>> {
    let path = entry.path.as_str();
    match &entry.status {
        FileStatus::Added | FileStatus::Copied { .. } => vec![Side::Change {
            path,
            existed: false,
        }],
        FileStatus::Modified | FileStatus::TypeChanged => vec![Side::Change {
            path,
            existed: true,
        }],
        FileStatus::Deleted => vec![Side::Delete { path }],
        FileStatus::Renamed { from, .. } => vec![
            Side::Delete { path: from },
            Side::Change {
                path,
                existed: false,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadelta_vcs::InMemorySnapshots;

    fn base() -> Revision {
        Revision::commit("base")
    }

    fn head() -> Revision {
        Revision::WorkingTree
    }

    fn plan_with(vcs: &InMemorySnapshots, status: Vec<StatusEntry>) -> Vec<WorkItem> {
        let config = DeltaConfig::default();
        let table = DispatchTable::builtin(&config.source_root);
        let from = base();
        let to = head();
        let planner = Planner {
            table: &table,
            config: &config,
            vcs,
            from: &from,
            to: &to,
        };
        planner.plan(&status).unwrap()
    }

    #[test]
    fn dispatches_by_directory() {
        let vcs = InMemorySnapshots::new();
        let items = plan_with(
            &vcs,
            vec![
                StatusEntry::new("src/classes/A.cls", FileStatus::Modified),
                StatusEntry::new("src/labels/CustomLabels.labels", FileStatus::Modified),
                StatusEntry::new("src/profiles/New.profile", FileStatus::Added),
                StatusEntry::new("src/pages/Old.page", FileStatus::Deleted),
            ],
        );
        assert_eq!(
            items,
            vec![
                WorkItem::Copy {
                    path: "src/classes/A.cls".into()
                },
                WorkItem::Compound {
                    path: "src/labels/CustomLabels.labels".into(),
                    old_path: Some("src/labels/CustomLabels.labels".into()),
                },
                WorkItem::Compound {
                    path: "src/profiles/New.profile".into(),
                    old_path: None,
                },
                WorkItem::Delete {
                    path: "src/pages/Old.page".into()
                },
            ]
        );
    }

    #[test]
    fn rename_is_delete_then_change() {
        let vcs = InMemorySnapshots::new();
        let items = plan_with(
            &vcs,
            vec![StatusEntry::new(
                "src/classes/New.cls",
                FileStatus::Renamed {
                    from: "src/classes/Old.cls".into(),
                    similarity: 100,
                },
            )],
        );
        assert_eq!(
            items,
            vec![
                WorkItem::Delete {
                    path: "src/classes/Old.cls".into()
                },
                WorkItem::Copy {
                    path: "src/classes/New.cls".into()
                },
            ]
        );
    }

    #[test]
    fn descriptor_change_folds_into_primary() {
        let vcs = InMemorySnapshots::new();
        vcs.insert_file(&head(), "src/classes/A.cls", "class A {}").unwrap();
        vcs.insert_file(&head(), "src/classes/A.cls-meta.xml", "<meta/>").unwrap();
        let items = plan_with(
            &vcs,
            vec![
                StatusEntry::new("src/classes/A.cls-meta.xml", FileStatus::Modified),
                StatusEntry::new("src/classes/A.cls", FileStatus::Modified),
            ],
        );
        assert_eq!(
            items,
            vec![WorkItem::Copy {
                path: "src/classes/A.cls".into()
            }]
        );
    }

    #[test]
    fn orphan_descriptor_is_its_own_item() {
        let vcs = InMemorySnapshots::new();
        let items = plan_with(
            &vcs,
            vec![StatusEntry::new("src/classes/Gone.cls-meta.xml", FileStatus::Added)],
        );
        assert_eq!(
            items,
            vec![WorkItem::Copy {
                path: "src/classes/Gone.cls-meta.xml".into()
            }]
        );
    }

    #[test]
    fn deleted_descriptor_with_surviving_primary_is_a_change() {
        let vcs = InMemorySnapshots::new();
        vcs.insert_file(&base(), "src/classes/A.cls", "class A {}").unwrap();
        vcs.insert_file(&head(), "src/classes/A.cls", "class A {}").unwrap();
        let items = plan_with(
            &vcs,
            vec![StatusEntry::new("src/classes/A.cls-meta.xml", FileStatus::Deleted)],
        );
        assert_eq!(
            items,
            vec![WorkItem::Copy {
                path: "src/classes/A.cls".into()
            }]
        );
    }

    #[test]
    fn bundle_paths_collapse() {
        let vcs = InMemorySnapshots::new();
        let items = plan_with(
            &vcs,
            vec![
                StatusEntry::new("src/lwc/card/card.js", FileStatus::Modified),
                StatusEntry::new("src/lwc/card/card.html", FileStatus::Modified),
                StatusEntry::new("src/lwc/card/card.css", FileStatus::Deleted),
            ],
        );
        assert_eq!(
            items,
            vec![WorkItem::Bundle {
                dir: "src/lwc/card".into(),
                origin: "src/lwc/card/card.js".into(),
            }]
        );
    }

    #[test]
    fn paths_outside_source_root_are_skipped() {
        let vcs = InMemorySnapshots::new();
        let items = plan_with(
            &vcs,
            vec![
                StatusEntry::new("README.md", FileStatus::Modified),
                StatusEntry::new(
                    "src/classes/In.cls",
                    FileStatus::Renamed {
                        from: "scripts/In.cls".into(),
                        similarity: 90,
                    },
                ),
            ],
        );
        assert_eq!(
            items,
            vec![WorkItem::Copy {
                path: "src/classes/In.cls".into()
            }]
        );
    }
}
