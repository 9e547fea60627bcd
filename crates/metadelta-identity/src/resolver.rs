//! Per-document identity resolver.

use std::cmp::Ordering;
use std::collections::HashMap;

use metadelta_types::{IdentityKey, Node};

use crate::error::IdentityResult;
use crate::kind::{MetadataKind, SectionSpec};
use crate::policy::SectionPolicy;

/// Section-name lookup for one metadata kind, built once per document.
#[derive(Clone, Debug)]
pub struct IdentityResolver {
    kind: MetadataKind,
    sections: HashMap<&'static str, SectionSpec>,
}

impl IdentityResolver {
    /// Build the resolver for `kind`.
    pub fn new(kind: MetadataKind) -> Self {
        let sections = kind.sections().iter().map(|spec| (spec.name, *spec)).collect();
        Self { kind, sections }
    }

    /// Build the resolver for the kind with the given root tag.
    pub fn for_root_tag(tag: &str) -> Self {
        Self::new(MetadataKind::from_root_tag(tag))
    }

    /// The kind this resolver was built for.
    pub fn kind(&self) -> MetadataKind {
        self.kind
    }

    /// The policy of `section`, falling back to [`SectionPolicy::Body`].
    pub fn policy(&self, section: &str) -> SectionPolicy {
        self.sections
            .get(section)
            .map(|spec| spec.policy)
            .unwrap_or(SectionPolicy::Body)
    }

    /// Manifest type of a single entry of `section`, if any.
    pub fn child_type(&self, section: &str) -> Option<&'static str> {
        self.sections.get(section).and_then(|spec| spec.child_type)
    }

    /// Extract the identity key of an entry of `section`.
    pub fn resolve(&self, section: &str, entry: &Node) -> IdentityResult<IdentityKey> {
        self.policy(section).extract(section, entry)
    }

    /// Order two keys of `section`.
    pub fn compare(&self, section: &str, a: &IdentityKey, b: &IdentityKey) -> Ordering {
        self.policy(section).compare(a, b)
    }
}
