//! Entry flattening: document to identity-keyed records.

use std::collections::{HashMap, HashSet};

use metadelta_identity::IdentityResolver;
use metadelta_types::{Document, FlatRecord, IdentityKey};

use crate::error::{DiffError, DiffResult};

/// Flatten `document` into one record per entry, in section-then-entry order.
///
/// Fails with [`DiffError::IdentityCollision`] if two entries of one section
/// resolve to the same identity key.
pub fn flatten(document: &Document, resolver: &IdentityResolver) -> DiffResult<Vec<FlatRecord>> {
    let mut records = Vec::with_capacity(document.entry_count());
    let mut seen: HashMap<&str, HashSet<IdentityKey>> = HashMap::new();

    for section in &document.sections {
        let keys = seen.entry(section.name.as_str()).or_default();
        for entry in &section.entries {
            let key = resolver.resolve(&section.name, entry)?;
            if !keys.insert(key.clone()) {
                return Err(DiffError::IdentityCollision {
                    section: section.name.clone(),
                    key: key.to_string(),
                });
            }
            records.push(FlatRecord::new(section.name.clone(), key, entry.clone())?);
        }
    }

    Ok(records)
}
