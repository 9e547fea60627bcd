//! Comparator for dotted hierarchical names.

use std::cmp::Ordering;

const SEGMENT_SEPARATOR: char = '.';

/// Compare two dotted hierarchical names.
///
/// - Names whose first segment differs compare by plain ordinal order.
/// - Otherwise a name that is a strict prefix of the other sorts first.
/// - Otherwise the name with fewer segments sorts first.
/// - Names of equal depth compare by ordinal order.
///
/// With equal first segments, `Account.Fieldx` (two segments) sorts before
/// `Account.Field.x` (three segments) even though ordinal order says the
/// opposite. That tie-break is kept literally.
pub fn compare_hierarchical(a: &str, b: &str) -> Ordering {
    if first_segment(a) != first_segment(b) {
        return a.cmp(b);
    }
    if a.len() != b.len() {
        if b.starts_with(a) {
            return Ordering::Less;
        }
        if a.starts_with(b) {
            return Ordering::Greater;
        }
    }
    depth(a).cmp(&depth(b)).then_with(|| a.cmp(b))
}

fn first_segment(name: &str) -> &str {
    name.split(SEGMENT_SEPARATOR).next().unwrap_or(name)
}

fn depth(name: &str) -> usize {
    name.split(SEGMENT_SEPARATOR).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn different_primaries_use_ordinal_order() {
        assert_eq!(compare_hierarchical("Account.Name", "Contact.Name"), Ordering::Less);
        assert_eq!(compare_hierarchical("Zeta.A", "Alpha.B.C"), Ordering::Greater);
    }

    #[test]
    fn strict_prefix_sorts_first() {
        assert_eq!(compare_hierarchical("Account.Field", "Account.Field2"), Ordering::Less);
        assert_eq!(compare_hierarchical("Account.Field.Sub", "Account.Field"), Ordering::Greater);
    }

    #[test]
    fn fewer_segments_sort_first_within_a_primary() {
        assert_eq!(
            compare_hierarchical("Account.Zeta", "Account.Alpha.Sub"),
            Ordering::Less
        );
    }

    #[test]
    fn equal_depth_uses_ordinal_order() {
        assert_eq!(compare_hierarchical("Account.Industry", "Account.Name"), Ordering::Less);
        assert_eq!(compare_hierarchical("Account.name", "Account.Name"), Ordering::Greater);
    }

    // Documented edge case: a non-numeric discriminator appended to a segment
    // does not make the shorter-depth name sort by ordinal order.
    #[test]
    fn appended_discriminator_edge_case_follows_depth_rule() {
        assert!("Account.Field.x" < "Account.Fieldx");
        assert_eq!(
            compare_hierarchical("Account.Fieldx", "Account.Field.x"),
            Ordering::Less
        );
    }

    proptest! {
        #[test]
        fn comparator_is_antisymmetric(a in "[A-Ca-c]{1,3}(\\.[A-Ca-c]{1,3}){0,2}",
                                       b in "[A-Ca-c]{1,3}(\\.[A-Ca-c]{1,3}){0,2}") {
            prop_assert_eq!(compare_hierarchical(&a, &b), compare_hierarchical(&b, &a).reverse());
        }

        #[test]
        fn comparator_is_reflexive(a in "[A-Za-z]{1,4}(\\.[A-Za-z]{1,4}){0,3}") {
            prop_assert_eq!(compare_hierarchical(&a, &a), Ordering::Equal);
        }
    }
}
