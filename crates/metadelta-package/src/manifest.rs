//! Package manifests (`package.xml`, `destructiveChanges.xml`).

use std::collections::{BTreeMap, BTreeSet};

use metadelta_codec::serialize_document;
use metadelta_types::{Document, DocumentRoot, Field, Node};
use serde::Serialize;

/// File name of the manifest listing deployed members.
pub const PACKAGE_MANIFEST: &str = "package.xml";

/// File name of the manifest listing members to delete.
pub const DESTRUCTIVE_MANIFEST: &str = "destructiveChanges.xml";

const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// One `(type, member)` pair contributed by a processed path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ManifestMember {
    pub type_name: String,
    pub member: String,
}

impl ManifestMember {
    pub fn new(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

/// Members grouped by type, both in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageManifest {
    api_version: String,
    types: BTreeMap<String, BTreeSet<String>>,
}

impl PackageManifest {
    /// An empty manifest for `api_version`.
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            types: BTreeMap::new(),
        }
    }

    /// Add one member. Duplicates are ignored.
    pub fn add(&mut self, member: &ManifestMember) {
        self.types
            .entry(member.type_name.clone())
            .or_default()
            .insert(member.member.clone());
    }

    /// Returns `true` if no members were added.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Members of `type_name`, if any.
    pub fn members(&self, type_name: &str) -> Option<&BTreeSet<String>> {
        self.types.get(type_name)
    }

    /// The manifest as a document: one `types` entry per type, then `version`.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new(
            DocumentRoot::new("Package").with_attribute("xmlns", METADATA_NAMESPACE),
        );
        for (type_name, members) in &self.types {
            let mut fields: Vec<Field> = members
                .iter()
                .map(|member| Field::text("members", member.as_str()))
                .collect();
            fields.push(Field::text("name", type_name.as_str()));
            document.push_entry("types", Node::Element(fields));
        }
        document.push_entry("version", Node::text(self.api_version.as_str()));
        document
    }

    /// Serialize with the canonical declaration header.
    pub fn to_xml(&self) -> String {
        serialize_document(&self.to_document())
    }
}

impl<'a> Extend<&'a ManifestMember> for PackageManifest {
    fn extend<I: IntoIterator<Item = &'a ManifestMember>>(&mut self, iter: I) {
        for member in iter {
            self.add(member);
        }
    }
}
