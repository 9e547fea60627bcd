//! The delta orchestrator: status list in, change and destructive packages out.

use std::path::PathBuf;

use metadelta_codec::parse_bytes;
use metadelta_compose::compose_to_string;
use metadelta_diff::{diff_records, flatten};
use metadelta_identity::{IdentityResolver, MetadataKind};
use metadelta_types::Document;
use metadelta_vcs::{Revision, SnapshotProvider};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::DeltaConfig;
use crate::error::{PackageError, PackageResult};
use crate::manifest::{ManifestMember, PackageManifest, DESTRUCTIVE_MANIFEST, PACKAGE_MANIFEST};
use crate::plan::{Planner, WorkItem};
use crate::report::{ChangeReport, OutcomeKind, PathFailure, PathOutcome};
use crate::strategy::{DispatchTable, StrategyDescriptor};
use crate::writer::PackageWriter;

/// Parameters of one delta run.
#[derive(Clone, Debug)]
pub struct DeltaRequest {
    pub from: Revision,
    pub to: Revision,
    /// Change package directory.
    pub output: PathBuf,
    /// Destructive package directory; removals are only counted when `None`.
    pub destructive: Option<PathBuf>,
}

impl DeltaRequest {
    /// Compare `from` against the working tree, writing into `output`.
    pub fn new(from: Revision, output: impl Into<PathBuf>) -> Self {
        Self {
            from,
            to: Revision::WorkingTree,
            output: output.into(),
            destructive: None,
        }
    }

    /// Compare against `to` instead of the working tree.
    pub fn with_to(mut self, to: Revision) -> Self {
        self.to = to;
        self
    }

    /// Also write a destructive package into `dir`.
    pub fn with_destructive(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destructive = Some(dir.into());
        self
    }
}

struct Packages {
    change: PackageWriter,
    destructive: Option<PackageWriter>,
}

/// Plans and executes delta runs against a snapshot provider.
pub struct DeltaOrchestrator<'a> {
    vcs: &'a dyn SnapshotProvider,
    config: DeltaConfig,
    table: DispatchTable,
}

impl<'a> DeltaOrchestrator<'a> {
    /// Validate `config` and build the dispatch table from it.
    pub fn new(vcs: &'a dyn SnapshotProvider, config: DeltaConfig) -> PackageResult<Self> {
        config.validate()?;
        let table =
            DispatchTable::builtin(&config.source_root).with_overrides(config.strategies.iter().cloned());
        Ok(Self { vcs, config, table })
    }

    /// The dispatch table in use.
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// The configuration in use.
    pub fn config(&self) -> &DeltaConfig {
        &self.config
    }

    /// Work items for the changes between `from` and `to`, in status-list order.
    pub fn plan(&self, from: &Revision, to: &Revision) -> PackageResult<Vec<WorkItem>> {
        let status = self.vcs.status_list(from, to)?;
        debug!(entries = status.len(), %from, %to, "status list");
        Planner {
            table: &self.table,
            config: &self.config,
            vcs: self.vcs,
            from,
            to,
        }
        .plan(&status)
    }

    /// Run a delta and write the packages.
    ///
    /// Per-path failures are logged and collected in the report; only
    /// failures that affect the whole run (status list, manifests, worker
    /// pool) return `Err`.
    pub fn run(&self, request: &DeltaRequest) -> PackageResult<ChangeReport> {
        let items = self.plan(&request.from, &request.to)?;
        let packages = Packages {
            change: PackageWriter::new(&request.output),
            destructive: request.destructive.as_deref().map(PackageWriter::new),
        };
        packages.change.ensure_root()?;
        if let Some(destructive) = &packages.destructive {
            destructive.ensure_root()?;
        }

        let process = |item: &WorkItem| self.process(item, request, &packages);
        let results: Vec<PackageResult<PathOutcome>> = if self.config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
                .map_err(|e| PackageError::ThreadPool(e.to_string()))?;
            pool.install(|| items.par_iter().map(process).collect())
        } else {
            items.iter().map(process).collect()
        };

        let mut report = ChangeReport::new();
        for (item, result) in items.iter().zip(results) {
            match result {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!(path = item.path(), error = %e, "failed to process path");
                    report.failures.push(PathFailure {
                        path: item.path().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if self.config.write_manifest {
            self.write_manifests(&report, &packages)?;
        }

        info!(
            output = %request.output.display(),
            files = report.written_count(),
            "change package written"
        );
        if let Some(dir) = &request.destructive {
            info!(
                output = %dir.display(),
                files = report.destructive_count(),
                "destructive package written"
            );
        }
        Ok(report)
    }

    fn write_manifests(&self, report: &ChangeReport, packages: &Packages) -> PackageResult<()> {
        let mut manifest = PackageManifest::new(self.config.api_version.as_str());
        manifest.extend(report.members());
        packages.change.write(PACKAGE_MANIFEST, manifest.to_xml().as_bytes())?;

        if let Some(destructive) = &packages.destructive {
            let mut removals = PackageManifest::new(self.config.api_version.as_str());
            removals.extend(report.destructive_members());
            destructive.write(DESTRUCTIVE_MANIFEST, removals.to_xml().as_bytes())?;
            let empty = PackageManifest::new(self.config.api_version.as_str());
            destructive.write(PACKAGE_MANIFEST, empty.to_xml().as_bytes())?;
        }
        Ok(())
    }

    fn process(
        &self,
        item: &WorkItem,
        request: &DeltaRequest,
        packages: &Packages,
    ) -> PackageResult<PathOutcome> {
        debug!(path = item.path(), "processing");
        match item {
            WorkItem::Copy { path } => self.copy(path, request, packages),
            WorkItem::Compound { path, old_path } => {
                self.compound(path, old_path.as_deref(), request, packages)
            }
            WorkItem::Bundle { dir, origin } => self.bundle(dir, origin, request, packages),
            WorkItem::Delete { path } => self.delete(path, request, packages),
        }
    }

    fn copy(&self, path: &str, request: &DeltaRequest, packages: &Packages) -> PackageResult<PathOutcome> {
        let content = self.vcs.require_file_at(&request.to, path)?;
        packages.change.write(path, &content)?;

        let mut outcome = PathOutcome::new(path, OutcomeKind::Copied);
        outcome.written.push(path.to_string());
        outcome.members.extend(self.member(path));
        self.copy_descriptor(path, &request.to, &packages.change, &mut outcome.written)?;
        Ok(outcome)
    }

    fn delete(&self, path: &str, request: &DeltaRequest, packages: &Packages) -> PackageResult<PathOutcome> {
        let mut outcome = PathOutcome::new(path, OutcomeKind::Deleted);

        if let Some(destructive) = &packages.destructive {
            let content = self.vcs.require_file_at(&request.from, path)?;
            destructive.write(path, &content)?;
            outcome.destructive.push(path.to_string());
            outcome.destructive_members.extend(self.member(path));
            self.copy_descriptor(path, &request.from, destructive, &mut outcome.destructive)?;
        }
        Ok(outcome)
    }

    fn bundle(
        &self,
        dir: &str,
        origin: &str,
        request: &DeltaRequest,
        packages: &Packages,
    ) -> PackageResult<PathOutcome> {
        let descriptor = self.descriptor(origin)?;
        let bundle_descriptor = descriptor.bundle_descriptor(dir);
        let member = self.member(origin);

        let files = self.vcs.list_files(&request.to, dir)?;
        if !files.is_empty() {
            let mut outcome = PathOutcome::new(dir, OutcomeKind::Bundle { files: files.len() });
            for file in files.iter().chain(bundle_descriptor.iter()) {
                match self.vcs.file_at(&request.to, file)? {
                    Some(content) => {
                        packages.change.write(file, &content)?;
                        outcome.written.push(file.clone());
                    }
                    None => warn!(path = %file, bundle = dir, "bundle descriptor missing, skipping"),
                }
            }
            outcome.members.extend(member);
            return Ok(outcome);
        }

        let old_files = self.vcs.list_files(&request.from, dir)?;
        if old_files.is_empty() {
            // Not a bundle directory at either revision: handle the path itself.
            return if self.vcs.exists_at(&request.to, origin)? {
                self.copy(origin, request, packages)
            } else {
                self.delete(origin, request, packages)
            };
        }

        let mut outcome = PathOutcome::new(dir, OutcomeKind::Deleted);
        if let Some(destructive) = &packages.destructive {
            for file in old_files.iter().chain(bundle_descriptor.iter()) {
                if let Some(content) = self.vcs.file_at(&request.from, file)? {
                    destructive.write(file, &content)?;
                    outcome.destructive.push(file.clone());
                }
            }
            outcome.destructive_members.extend(member);
        }
        Ok(outcome)
    }

    fn compound(
        &self,
        path: &str,
        old_path: Option<&str>,
        request: &DeltaRequest,
        packages: &Packages,
    ) -> PackageResult<PathOutcome> {
        let descriptor = self.descriptor(path)?;

        let new_doc = parse_bytes(&self.vcs.require_file_at(&request.to, path)?)?;
        if let Some(expected) = &descriptor.root_tag {
            check_root(path, expected, &new_doc)?;
        }
        let old_doc = match old_path {
            Some(old_path) => {
                let doc = parse_bytes(&self.vcs.require_file_at(&request.from, old_path)?)?;
                check_root(old_path, new_doc.root_tag(), &doc)?;
                doc
            }
            None => Document::new(new_doc.root.clone()),
        };

        let resolver = IdentityResolver::for_root_tag(new_doc.root_tag());
        let old_records = flatten(&old_doc, &resolver)?;
        let new_records = flatten(&new_doc, &resolver)?;
        let diff = diff_records(&old_records, &new_records, &descriptor.always_included);

        let added = diff.additions();
        let modified = diff.modifications();
        let kind = if diff.has_changes() {
            OutcomeKind::Compound {
                added,
                modified,
                retained: diff.changed.len() - added - modified,
                removed: diff.removals(),
            }
        } else {
            OutcomeKind::Unchanged
        };
        let mut outcome = PathOutcome::new(path, kind);

        if added + modified > 0 {
            let changed: Vec<_> = diff.changed_records().cloned().collect();
            let text = compose_to_string(&changed, &new_doc.root, &resolver)?;
            packages.change.write(path, text.as_bytes())?;
            outcome.written.push(path.to_string());
            outcome.members.extend(self.member(path));
            self.copy_descriptor(path, &request.to, &packages.change, &mut outcome.written)?;
        }

        let destructive = packages.destructive.as_ref().filter(|_| !diff.removed.is_empty());
        if let Some(destructive) = destructive {
            let text = compose_to_string(&diff.removed, &old_doc.root, &resolver)?;
            destructive.write(path, text.as_bytes())?;
            outcome.destructive.push(path.to_string());

            let parent = descriptor.member_name(path).unwrap_or_default();
            for record in &diff.removed {
                let Some(child_type) = resolver.child_type(&record.section) else {
                    warn!(path, section = %record.section, "removed entry has no manifest type");
                    continue;
                };
                let member = match resolver.kind() {
                    MetadataKind::CustomLabels => record.key.flatten(),
                    _ => format!("{parent}.{}", record.key.flatten()),
                };
                outcome
                    .destructive_members
                    .push(ManifestMember::new(child_type, member));
            }
        }

        Ok(outcome)
    }

    /// Copy the `-meta.xml` sibling of `path` at `revision`, if there is one.
    fn copy_descriptor(
        &self,
        path: &str,
        revision: &Revision,
        writer: &PackageWriter,
        written: &mut Vec<String>,
    ) -> PackageResult<()> {
        if path.ends_with(&self.config.meta_suffix) {
            return Ok(());
        }
        let sibling = format!("{path}{}", self.config.meta_suffix);
        match self.vcs.file_at(revision, &sibling)? {
            Some(content) => {
                writer.write(&sibling, &content)?;
                written.push(sibling);
            }
            None => debug!(path = %sibling, "no descriptor file"),
        }
        Ok(())
    }

    fn descriptor(&self, path: &str) -> PackageResult<&StrategyDescriptor> {
        self.table
            .resolve(path)
            .ok_or_else(|| PackageError::Config(format!("no strategy for {path}")))
    }

    fn member(&self, path: &str) -> Option<ManifestMember> {
        let descriptor = self.table.resolve(path)?;
        let type_name = descriptor.manifest_type.as_deref()?;
        let member = descriptor.member_name(path)?;
        Some(ManifestMember::new(type_name, member))
    }
}

fn check_root(path: &str, expected: &str, document: &Document) -> PackageResult<()> {
    if document.root_tag() == expected {
        Ok(())
    } else {
        Err(PackageError::RootMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: document.root_tag().to_string(),
        })
    }
}
