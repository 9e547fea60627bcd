//! Per-section key extraction and ordering policies.

use std::cmp::Ordering;

use metadelta_types::{IdentityKey, Node};

use crate::error::{IdentityError, IdentityResult};
use crate::ordering::compare_hierarchical;

/// Width every dotted component of a range bound is zero-padded to.
pub const RANGE_COMPONENT_WIDTH: usize = 3;

/// How a section derives identity keys from its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionPolicy {
    /// Key on a single scalar field.
    Field(&'static str),
    /// Key on a dotted hierarchical name (e.g. `Account.Industry`), ordered
    /// with [`compare_hierarchical`].
    Hierarchical(&'static str),
    /// Key on a primary field and an optional secondary field.
    Composite {
        primary: &'static str,
        secondary: &'static str,
    },
    /// Key on a pair of dotted numeric bounds, padded so that string order
    /// equals numeric order.
    Range {
        start: &'static str,
        end: &'static str,
    },
    /// The section holds exactly one entry; its key is a constant.
    Constant,
    /// Fallback: the entry's canonical body is its key.
    Body,
}

impl SectionPolicy {
    /// Extract the identity key of `entry`, which lives in `section`.
    pub fn extract(&self, section: &str, entry: &Node) -> IdentityResult<IdentityKey> {
        match *self {
            SectionPolicy::Field(field) | SectionPolicy::Hierarchical(field) => {
                Ok(IdentityKey::Single(required(section, entry, field)?.to_string()))
            }
            SectionPolicy::Composite { primary, secondary } => Ok(IdentityKey::Composite {
                primary: required(section, entry, primary)?.to_string(),
                secondary: entry
                    .field_text(secondary)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string),
            }),
            SectionPolicy::Range { start, end } => Ok(IdentityKey::Range {
                start: pad_range_bound(required(section, entry, start)?),
                end: pad_range_bound(required(section, entry, end)?),
            }),
            SectionPolicy::Constant => Ok(IdentityKey::Constant),
            SectionPolicy::Body => Ok(IdentityKey::Body(entry.canonical_body()?)),
        }
    }

    /// Order two keys of this section.
    ///
    /// Keys compare by ordinal (byte-wise) order of their flattened form;
    /// distinct keys that flatten identically fall back to comparing parts.
    pub fn compare(&self, a: &IdentityKey, b: &IdentityKey) -> Ordering {
        match self {
            SectionPolicy::Constant => Ordering::Equal,
            SectionPolicy::Hierarchical(_) => {
                compare_hierarchical(&a.flatten(), &b.flatten()).then_with(|| a.parts().cmp(&b.parts()))
            }
            _ => a
                .flatten()
                .cmp(&b.flatten())
                .then_with(|| a.parts().cmp(&b.parts())),
        }
    }

    /// Returns `true` for singleton sections, which are emitted unsorted.
    pub fn is_constant(&self) -> bool {
        matches!(self, SectionPolicy::Constant)
    }
}

fn required<'a>(section: &str, entry: &'a Node, field: &str) -> IdentityResult<&'a str> {
    entry
        .field_text(field)
        .ok_or_else(|| IdentityError::MissingField {
            section: section.to_string(),
            field: field.to_string(),
        })
}

/// Zero-pad every dotted component of `bound` to [`RANGE_COMPONENT_WIDTH`].
///
/// `10.0.0.1` becomes `010000000001`.
pub fn pad_range_bound(bound: &str) -> String {
    bound
        .split('.')
        .map(|component| format!("{component:0>width$}", width = RANGE_COMPONENT_WIDTH))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadelta_types::Field;

    #[test]
    fn field_policy_extracts_value() {
        let entry = Node::from_pairs([("apexClass", "MyController"), ("enabled", "true")]);
        let key = SectionPolicy::Field("apexClass")
            .extract("classAccesses", &entry)
            .unwrap();
        assert_eq!(key, IdentityKey::Single("MyController".into()));
    }

    #[test]
    fn missing_field_is_an_error() {
        let entry = Node::from_pairs([("enabled", "true")]);
        let err = SectionPolicy::Field("apexClass")
            .extract("classAccesses", &entry)
            .unwrap_err();
        assert!(matches!(err, IdentityError::MissingField { field, .. } if field == "apexClass"));
    }

    #[test]
    fn composite_with_and_without_secondary() {
        let policy = SectionPolicy::Composite {
            primary: "layout",
            secondary: "recordType",
        };
        let plain = Node::from_pairs([("layout", "Account-Account Layout")]);
        let typed = Node::from_pairs([
            ("layout", "Account-Account Layout"),
            ("recordType", "Account.Business"),
        ]);
        assert_eq!(
            policy.extract("layoutAssignments", &plain).unwrap().flatten(),
            "Account-Account Layout"
        );
        assert_eq!(
            policy.extract("layoutAssignments", &typed).unwrap().flatten(),
            "Account-Account Layout.Account.Business"
        );
    }

    #[test]
    fn range_bounds_sort_numerically_after_padding() {
        let policy = SectionPolicy::Range {
            start: "startAddress",
            end: "endAddress",
        };
        let low = policy
            .extract(
                "loginIpRanges",
                &Node::from_pairs([("startAddress", "9.0.0.1"), ("endAddress", "9.0.0.255")]),
            )
            .unwrap();
        let high = policy
            .extract(
                "loginIpRanges",
                &Node::from_pairs([("startAddress", "10.0.0.1"), ("endAddress", "10.0.0.255")]),
            )
            .unwrap();
        // Unpadded "10..." would sort before "9...".
        assert_eq!(policy.compare(&low, &high), Ordering::Less);
        assert_eq!(low.flatten(), "009000000001009000000255");
    }

    #[test]
    fn pad_range_bound_pads_each_octet() {
        assert_eq!(pad_range_bound("192.168.1.10"), "192168001010");
        assert_eq!(pad_range_bound("0.0.0.0"), "000000000000");
    }

    #[test]
    fn constant_policy_ignores_content() {
        let key = SectionPolicy::Constant
            .extract("userLicense", &Node::text("Salesforce"))
            .unwrap();
        assert_eq!(key, IdentityKey::Constant);
    }

    #[test]
    fn body_policy_keys_on_content() {
        let entry = Node::Element(vec![Field::text("something", "x")]);
        let key = SectionPolicy::Body.extract("unknown", &entry).unwrap();
        assert_eq!(key, IdentityKey::Body(entry.canonical_body().unwrap()));
    }

    #[test]
    fn ordinal_compare_is_case_sensitive() {
        let policy = SectionPolicy::Field("fullName");
        let upper = IdentityKey::Single("labelZ".into());
        let lower = IdentityKey::Single("labela".into());
        assert_eq!(policy.compare(&upper, &lower), Ordering::Less);
    }
}
