//! Canonical composer: records back to a document.

use std::collections::{BTreeMap, HashSet};

use metadelta_codec::serialize_document;
use metadelta_identity::IdentityResolver;
use metadelta_types::{Document, DocumentRoot, FlatRecord, IdentityKey, Section};

use crate::error::{ComposeError, ComposeResult};

/// Rebuild a document from `records`.
///
/// Records are grouped by section and sections are emitted in ascending
/// ordinal order of their names. Entries within a section are sorted with
/// the section's comparator, except singleton sections which are emitted
/// as-is. The output does not depend on the order of `records`.
pub fn compose(
    records: &[FlatRecord],
    root: &DocumentRoot,
    resolver: &IdentityResolver,
) -> ComposeResult<Document> {
    let mut groups: BTreeMap<&str, Vec<&FlatRecord>> = BTreeMap::new();
    let mut slots: HashSet<(&str, &IdentityKey)> = HashSet::new();

    for record in records {
        if !slots.insert((record.section.as_str(), &record.key)) {
            return Err(ComposeError::IdentityCollision {
                section: record.section.clone(),
                key: record.key.to_string(),
            });
        }
        groups.entry(record.section.as_str()).or_default().push(record);
    }

    let mut document = Document::new(root.clone());
    for (name, mut entries) in groups {
        let policy = resolver.policy(name);
        if !policy.is_constant() {
            entries.sort_by(|a, b| policy.compare(&a.key, &b.key));
        }
        document.sections.push(Section {
            name: name.to_string(),
            entries: entries.into_iter().map(|r| r.entry.clone()).collect(),
        });
    }

    Ok(document)
}

/// [`compose`] and serialize with the canonical declaration header.
pub fn compose_to_string(
    records: &[FlatRecord],
    root: &DocumentRoot,
    resolver: &IdentityResolver,
) -> ComposeResult<String> {
    Ok(serialize_document(&compose(records, root, resolver)?))
}
