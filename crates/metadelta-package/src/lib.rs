//! Delta orchestration for metadelta.
//!
//! Given two revisions of a repository, the orchestrator walks the
//! version-control status list, dispatches each path to a strategy by its
//! directory, and materializes a change package plus an optional
//! destructive package.
//!
//! # Key Types
//!
//! - [`DeltaOrchestrator`] — Plans and executes a delta run
//! - [`DispatchTable`] / [`StrategyDescriptor`] — Directory-to-strategy table
//! - [`DeltaConfig`] — Configuration loaded from `metadelta.toml`
//! - [`ChangeReport`] — Per-path outcomes and failures of a run
//! - [`PackageManifest`] — `package.xml` / `destructiveChanges.xml` contents

pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod plan;
pub mod report;
pub mod strategy;
pub mod writer;

pub use config::{DeltaConfig, CONFIG_FILE_NAME};
pub use error::{PackageError, PackageResult};
pub use manifest::{ManifestMember, PackageManifest, DESTRUCTIVE_MANIFEST, PACKAGE_MANIFEST};
pub use orchestrator::{DeltaOrchestrator, DeltaRequest};
pub use plan::WorkItem;
pub use report::{ChangeReport, OutcomeKind, PathFailure, PathOutcome};
pub use strategy::{DispatchTable, StrategyDescriptor, StrategyKind};
pub use writer::PackageWriter;
