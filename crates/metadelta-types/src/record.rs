use serde::{Deserialize, Serialize};

use crate::error::TypesResult;
use crate::key::IdentityKey;
use crate::node::Node;

/// One entry of a flattened document.
///
/// `body` is the canonical serialization of `entry`; two records with the same
/// section and key are unchanged iff their bodies are byte-equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub section: String,
    pub key: IdentityKey,
    pub body: String,
    pub entry: Node,
}

impl FlatRecord {
    /// Build a record, computing the canonical body of `entry`.
    pub fn new(section: impl Into<String>, key: IdentityKey, entry: Node) -> TypesResult<Self> {
        let body = entry.canonical_body()?;
        Ok(Self {
            section: section.into(),
            key,
            body,
            entry,
        })
    }

    /// Returns `true` if both records describe the same entry slot.
    pub fn same_slot(&self, other: &FlatRecord) -> bool {
        self.section == other.section && self.key == other.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_matches_canonical_form() {
        let entry = Node::from_pairs([("fullName", "label1"), ("value", "Hello")]);
        let record =
            FlatRecord::new("labels", IdentityKey::Single("label1".into()), entry.clone()).unwrap();
        assert_eq!(record.body, entry.canonical_body().unwrap());
    }

    #[test]
    fn same_slot_ignores_body() {
        let a = FlatRecord::new(
            "labels",
            IdentityKey::Single("x".into()),
            Node::from_pairs([("fullName", "x"), ("value", "1")]),
        )
        .unwrap();
        let b = FlatRecord::new(
            "labels",
            IdentityKey::Single("x".into()),
            Node::from_pairs([("fullName", "x"), ("value", "2")]),
        )
        .unwrap();
        assert!(a.same_slot(&b));
        assert_ne!(a.body, b.body);
    }
}
