use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PackageError, PackageResult};
use crate::strategy::StrategyDescriptor;

/// File name looked up in the repository root by [`DeltaConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "metadelta.toml";

/// Configuration for a delta run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaConfig {
    /// Repository-relative directory holding the metadata tree. Paths outside
    /// it are ignored. `"."` means the whole repository.
    pub source_root: String,
    /// API version written into generated manifests.
    pub api_version: String,
    /// Maximum number of paths processed concurrently. `1` is sequential.
    pub jobs: usize,
    /// Suffix of metadata descriptor files that travel with their primary file.
    pub meta_suffix: String,
    /// Whether to write `package.xml` / `destructiveChanges.xml`.
    pub write_manifest: bool,
    /// Additional descriptors; one with a built-in pattern replaces it.
    pub strategies: Vec<StrategyDescriptor>,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            source_root: "src".into(),
            api_version: "58.0".into(),
            jobs: 1,
            meta_suffix: "-meta.xml".into(),
            write_manifest: true,
            strategies: Vec::new(),
        }
    }
}

impl DeltaConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> PackageResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file at `path`.
    pub fn load(path: &Path) -> PackageResult<Self> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// Load `metadelta.toml` from `repo_root`, or the defaults if absent.
    pub fn discover(repo_root: &Path) -> PackageResult<Self> {
        let path = repo_root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check the values that parsing alone cannot.
    pub fn validate(&self) -> PackageResult<()> {
        if self.jobs == 0 {
            return Err(PackageError::Config("jobs must be at least 1".into()));
        }
        if self.source_root.trim().is_empty() {
            return Err(PackageError::Config("source_root must not be empty".into()));
        }
        if self.meta_suffix.is_empty() {
            return Err(PackageError::Config("meta_suffix must not be empty".into()));
        }
        for descriptor in &self.strategies {
            descriptor.validate()?;
        }
        Ok(())
    }

    /// Returns `true` if `path` lies under [`source_root`](Self::source_root).
    pub fn in_source_root(&self, path: &str) -> bool {
        let root = self.source_root.trim_end_matches('/');
        root == "." || path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/'))
    }
}
