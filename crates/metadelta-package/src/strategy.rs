//! The type dispatch table: directory patterns to handling strategies.
//!
//! Descriptors form an ordered list evaluated by longest matching pattern,
//! so new metadata types are added by appending a descriptor.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PackageError, PackageResult};

/// How a changed path is materialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Copy the file as-is.
    Verbatim,
    /// Copy every file of the enclosing bundle directory.
    BundleCopy,
    /// Diff the two revisions entry by entry and write only the delta.
    CompoundDiff,
}

/// One row of the dispatch table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    /// Repository-relative directory this descriptor applies to.
    pub pattern: String,
    pub kind: StrategyKind,
    /// Expected document root tag, for compound kinds.
    #[serde(default)]
    pub root_tag: Option<String>,
    /// Sections emitted in every delta even when unchanged.
    #[serde(default)]
    pub always_included: BTreeSet<String>,
    /// Manifest type name (e.g. `ApexClass`).
    #[serde(default)]
    pub manifest_type: Option<String>,
    /// Suffix of a bundle-level descriptor file placed next to the bundle
    /// directory and named after it (e.g. `.resource-meta.xml`).
    #[serde(default)]
    pub descriptor_suffix: Option<String>,
}

impl StrategyDescriptor {
    fn new(pattern: impl Into<String>, kind: StrategyKind, manifest_type: &str) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            root_tag: None,
            always_included: BTreeSet::new(),
            manifest_type: Some(manifest_type.to_string()),
            descriptor_suffix: None,
        }
    }

    /// A verbatim-copy descriptor.
    pub fn verbatim(pattern: impl Into<String>, manifest_type: &str) -> Self {
        Self::new(pattern, StrategyKind::Verbatim, manifest_type)
    }

    /// A bundle-copy descriptor.
    pub fn bundle(pattern: impl Into<String>, manifest_type: &str) -> Self {
        Self::new(pattern, StrategyKind::BundleCopy, manifest_type)
    }

    /// A compound-diff descriptor whose documents have root `root_tag`.
    /// The root tag doubles as the manifest type.
    pub fn compound(pattern: impl Into<String>, root_tag: &str) -> Self {
        Self {
            root_tag: Some(root_tag.to_string()),
            ..Self::new(pattern, StrategyKind::CompoundDiff, root_tag)
        }
    }

    /// Set the always-included sections.
    pub fn with_always_included<'a>(mut self, sections: impl IntoIterator<Item = &'a str>) -> Self {
        self.always_included = sections.into_iter().map(str::to_string).collect();
        self
    }

    /// Set the bundle descriptor suffix.
    pub fn with_descriptor_suffix(mut self, suffix: &str) -> Self {
        self.descriptor_suffix = Some(suffix.to_string());
        self
    }

    /// Reject descriptors that could never match or would misbehave.
    pub fn validate(&self) -> PackageResult<()> {
        let pattern = self.pattern();
        if pattern.is_empty() || pattern.starts_with('/') {
            return Err(PackageError::Config(format!(
                "strategy pattern {:?} must be a relative directory",
                self.pattern
            )));
        }
        if self.kind != StrategyKind::CompoundDiff && !self.always_included.is_empty() {
            return Err(PackageError::Config(format!(
                "always_included only applies to compound_diff strategies ({})",
                self.pattern
            )));
        }
        Ok(())
    }

    fn pattern(&self) -> &str {
        self.pattern.trim_end_matches('/')
    }

    /// The part of `path` below this descriptor's directory.
    pub fn relative<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.pattern())?
            .strip_prefix('/')
            .filter(|rest| !rest.is_empty())
    }

    /// Returns `true` if `path` lies under this descriptor's directory.
    pub fn matches(&self, path: &str) -> bool {
        self.relative(path).is_some()
    }

    /// The bundle directory `path` belongs to.
    ///
    /// Files nested in a subdirectory belong to that subdirectory. A file
    /// directly under the pattern belongs to a bundle only if it is the
    /// bundle-level descriptor. Always `None` for non-bundle kinds.
    pub fn bundle_dir(&self, path: &str) -> Option<String> {
        if self.kind != StrategyKind::BundleCopy {
            return None;
        }
        let rest = self.relative(path)?;
        let name = match rest.split_once('/') {
            Some((name, _)) => name,
            None => rest.strip_suffix(self.descriptor_suffix.as_deref()?)?,
        };
        Some(format!("{}/{name}", self.pattern()))
    }

    /// Path of the bundle-level descriptor for `bundle_dir`, if this kind has one.
    pub fn bundle_descriptor(&self, bundle_dir: &str) -> Option<String> {
        self.descriptor_suffix
            .as_ref()
            .map(|suffix| format!("{bundle_dir}{suffix}"))
    }

    /// Manifest member name of `path`.
    ///
    /// The path relative to the pattern with everything from the first `.`
    /// of the file name dropped. Bundles use the bundle name.
    pub fn member_name(&self, path: &str) -> Option<String> {
        let rest = self.relative(path)?;
        if let Some(dir) = self.bundle_dir(path) {
            return dir.rsplit('/').next().map(str::to_string);
        }
        let (dir, file) = match rest.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, rest),
        };
        let stem = file.split('.').next().unwrap_or(file);
        Some(match dir {
            Some(dir) => format!("{dir}/{stem}"),
            None => stem.to_string(),
        })
    }
}

/// Ordered list of descriptors resolved by longest matching pattern.
#[derive(Clone, Debug, Default)]
pub struct DispatchTable {
    descriptors: Vec<StrategyDescriptor>,
}

impl DispatchTable {
    /// An empty table; every path falls back to verbatim copy.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in descriptors for the metadata directories under `source_root`.
    pub fn builtin(source_root: &str) -> Self {
        let root = source_root.trim_end_matches('/');
        let dir = |name: &str| {
            if root == "." {
                name.to_string()
            } else {
                format!("{root}/{name}")
            }
        };

        let descriptors = vec![
            StrategyDescriptor::verbatim(dir("applications"), "CustomApplication"),
            StrategyDescriptor::verbatim(dir("classes"), "ApexClass"),
            StrategyDescriptor::verbatim(dir("components"), "ApexComponent"),
            StrategyDescriptor::verbatim(dir("dashboards"), "Dashboard"),
            StrategyDescriptor::verbatim(dir("email"), "EmailTemplate"),
            StrategyDescriptor::verbatim(dir("flows"), "Flow"),
            StrategyDescriptor::verbatim(dir("layouts"), "Layout"),
            StrategyDescriptor::verbatim(dir("pages"), "ApexPage"),
            StrategyDescriptor::verbatim(dir("reports"), "Report"),
            StrategyDescriptor::verbatim(dir("tabs"), "CustomTab"),
            StrategyDescriptor::verbatim(dir("triggers"), "ApexTrigger"),
            StrategyDescriptor::bundle(dir("aura"), "AuraDefinitionBundle"),
            StrategyDescriptor::bundle(dir("lwc"), "LightningComponentBundle"),
            StrategyDescriptor::bundle(dir("staticresources"), "StaticResource")
                .with_descriptor_suffix(".resource-meta.xml"),
            StrategyDescriptor::compound(dir("labels"), "CustomLabels"),
            StrategyDescriptor::compound(dir("profiles"), "Profile")
                .with_always_included(["custom", "userLicense"]),
            StrategyDescriptor::compound(dir("permissionsets"), "PermissionSet")
                .with_always_included(["label"]),
            StrategyDescriptor::compound(dir("objects"), "CustomObject").with_always_included([
                "deploymentStatus",
                "label",
                "nameField",
                "pluralLabel",
                "sharingModel",
            ]),
            StrategyDescriptor::compound(dir("workflows"), "Workflow"),
            StrategyDescriptor::compound(dir("sharingRules"), "SharingRules"),
            StrategyDescriptor::compound(dir("assignmentRules"), "AssignmentRules"),
            StrategyDescriptor::compound(dir("autoResponseRules"), "AutoResponseRules"),
            StrategyDescriptor::compound(dir("escalationRules"), "EscalationRules"),
            StrategyDescriptor::compound(dir("matchingRules"), "MatchingRules"),
        ];
        Self { descriptors }
    }

    /// Append `overrides`; a descriptor with an existing pattern replaces it.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = StrategyDescriptor>) -> Self {
        for descriptor in overrides {
            self.insert(descriptor);
        }
        self
    }

    /// Add or replace one descriptor.
    pub fn insert(&mut self, descriptor: StrategyDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.pattern() == descriptor.pattern())
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// The most specific descriptor matching `path`, or `None` for verbatim fallback.
    pub fn resolve(&self, path: &str) -> Option<&StrategyDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.matches(path))
            .max_by_key(|d| d.pattern().len())
    }

    /// The strategy kind for `path`.
    pub fn kind_for(&self, path: &str) -> StrategyKind {
        self.resolve(path)
            .map(|d| d.kind)
            .unwrap_or(StrategyKind::Verbatim)
    }

    /// All descriptors in insertion order.
    pub fn descriptors(&self) -> &[StrategyDescriptor] {
        &self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dispatch() {
        let table = DispatchTable::builtin("src");
        assert_eq!(table.kind_for("src/classes/A.cls"), StrategyKind::Verbatim);
        assert_eq!(table.kind_for("src/lwc/card/card.js"), StrategyKind::BundleCopy);
        assert_eq!(
            table.kind_for("src/labels/CustomLabels.labels"),
            StrategyKind::CompoundDiff
        );
        assert!(table.resolve("src/unknownThing/x.xml").is_none());
        assert_eq!(table.kind_for("src/unknownThing/x.xml"), StrategyKind::Verbatim);
        assert!(table.resolve("src/classes").is_none());
    }

    #[test]
    fn prefix_must_end_at_a_directory_boundary() {
        let table = DispatchTable::builtin("src");
        assert!(table.resolve("src/classesExtra/A.cls").is_none());
    }

    #[test]
    fn longest_pattern_wins() {
        let table = DispatchTable::builtin("src").with_overrides([StrategyDescriptor::verbatim(
            "src/objects/legacy",
            "CustomObject",
        )]);
        assert_eq!(table.kind_for("src/objects/Account.object"), StrategyKind::CompoundDiff);
        assert_eq!(table.kind_for("src/objects/legacy/Old.object"), StrategyKind::Verbatim);
    }

    #[test]
    fn identical_pattern_replaces_builtin() {
        let builtin = DispatchTable::builtin("src");
        let count = builtin.descriptors().len();
        let table = builtin.with_overrides([StrategyDescriptor::verbatim("src/labels/", "CustomLabels")]);
        assert_eq!(table.descriptors().len(), count);
        assert_eq!(
            table.kind_for("src/labels/CustomLabels.labels"),
            StrategyKind::Verbatim
        );
    }

    #[test]
    fn dot_source_root() {
        let table = DispatchTable::builtin(".");
        assert_eq!(table.kind_for("profiles/Admin.profile"), StrategyKind::CompoundDiff);
    }

    #[test]
    fn bundle_directories() {
        let table = DispatchTable::builtin("src");
        let lwc = table.resolve("src/lwc/card/card.js").unwrap();
        assert_eq!(lwc.bundle_dir("src/lwc/card/card.js").as_deref(), Some("src/lwc/card"));
        assert_eq!(lwc.bundle_dir("src/lwc/card/sub/x.css").as_deref(), Some("src/lwc/card"));
        assert_eq!(lwc.bundle_descriptor("src/lwc/card"), None);

        let resources = table.resolve("src/staticresources/Lib/a.js").unwrap();
        assert_eq!(
            resources.bundle_dir("src/staticresources/Lib.resource-meta.xml").as_deref(),
            Some("src/staticresources/Lib")
        );
        assert_eq!(resources.bundle_dir("src/staticresources/logo.resource"), None);
        assert_eq!(
            resources.bundle_descriptor("src/staticresources/Lib").as_deref(),
            Some("src/staticresources/Lib.resource-meta.xml")
        );
    }

    #[test]
    fn member_names() {
        let table = DispatchTable::builtin("src");
        let member = |path: &str| table.resolve(path).and_then(|d| d.member_name(path));
        assert_eq!(member("src/classes/A.cls").as_deref(), Some("A"));
        assert_eq!(member("src/classes/A.cls-meta.xml").as_deref(), Some("A"));
        assert_eq!(
            member("src/layouts/Account-Account Layout.layout").as_deref(),
            Some("Account-Account Layout")
        );
        assert_eq!(member("src/email/Sales/Welcome.email").as_deref(), Some("Sales/Welcome"));
        assert_eq!(member("src/aura/Cmp/CmpController.js").as_deref(), Some("Cmp"));
        assert_eq!(member("src/staticresources/logo.resource").as_deref(), Some("logo"));
    }

    #[test]
    fn validation() {
        assert!(StrategyDescriptor::verbatim("", "X").validate().is_err());
        assert!(StrategyDescriptor::verbatim("/abs", "X").validate().is_err());
        let bad = StrategyDescriptor {
            always_included: ["label".to_string()].into(),
            ..StrategyDescriptor::verbatim("src/x", "X")
        };
        assert!(bad.validate().is_err());
        assert!(StrategyDescriptor::compound("src/x", "X")
            .with_always_included(["label"])
            .validate()
            .is_ok());
    }
}
