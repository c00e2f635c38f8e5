//! Attribute-level comparison of two resource records.
//!
//! Attributes are compared flat: a nested attribute value is either equal or
//! reported as changed in full. Identifying attributes are reported first, and
//! derived checksum/encoding attributes are never reported.

use crate::diff::{Change, SectionDiff};
use crate::extract::Section;

/// Attributes evaluated before all others, in this order.
pub const PRIORITY_ATTRIBUTES: [&str; 3] = ["id", "url", "content"];

/// Attributes that never appear in a diff, whatever their values.
pub const SKIP_ATTRIBUTES: [&str; 7] = [
    "response_body_base64",
    "content_base64sha256",
    "content_base64sha512",
    "content_md5",
    "content_sha1",
    "content_sha256",
    "content_sha512",
];

pub fn is_priority(name: &str) -> bool {
    PRIORITY_ATTRIBUTES.contains(&name)
}

pub fn is_skipped(name: &str) -> bool {
    SKIP_ATTRIBUTES.contains(&name)
}

/// Compares two effective attribute dictionaries.
///
/// Order of the resulting changes:
/// 1. priority attributes, in [`PRIORITY_ATTRIBUTES`] order;
/// 2. remaining attributes of `old` (modified or removed), by name;
/// 3. remaining attributes only in `new`, by name.
///
/// ```
/// use tfplan_diff::attributes::compare_attributes;
/// use tfplan_diff::extract::Section;
/// use tfplan_diff::Node;
///
/// let old: Section = [("id".to_string(), Node::from("a")), ("content_md5".to_string(), Node::from("x"))].into();
/// let new: Section = [("id".to_string(), Node::from("b")), ("content_md5".to_string(), Node::from("y"))].into();
///
/// let diff = compare_attributes(&old, &new);
/// assert_eq!(diff.changes.len(), 1);
/// assert_eq!(diff.changes[0].name, "id");
/// ```
pub fn compare_attributes(old: &Section, new: &Section) -> SectionDiff {
    let mut changes = Vec::new();

    compare_priority_attributes(old, new, &mut changes);
    compare_remaining_attributes(old, new, &mut changes);
    collect_added_attributes(old, new, &mut changes);

    SectionDiff { changes }
}

fn compare_priority_attributes(old: &Section, new: &Section, changes: &mut Vec<Change>) {
    for name in PRIORITY_ATTRIBUTES {
        match (old.get(name), new.get(name)) {
            (Some(old_value), Some(new_value)) if old_value != new_value => {
                changes.push(Change::modified(name, old_value.clone(), new_value.clone()));
            }
            (Some(old_value), None) => {
                changes.push(Change::removed(name, old_value.clone()));
            }
            (None, Some(new_value)) => {
                changes.push(Change::added(name, new_value.clone()));
            }
            _ => {}
        }
    }
}

fn compare_remaining_attributes(old: &Section, new: &Section, changes: &mut Vec<Change>) {
    for (name, old_value) in old {
        if is_priority(name) || is_skipped(name) {
            continue;
        }

        match new.get(name) {
            Some(new_value) if new_value != old_value => {
                changes.push(Change::modified(
                    name.as_str(),
                    old_value.clone(),
                    new_value.clone(),
                ));
            }
            Some(_) => {}
            None => changes.push(Change::removed(name.as_str(), old_value.clone())),
        }
    }
}

fn collect_added_attributes(old: &Section, new: &Section, changes: &mut Vec<Change>) {
    for (name, new_value) in new {
        if !old.contains_key(name) && !is_priority(name) && !is_skipped(name) {
            changes.push(Change::added(name.as_str(), new_value.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeType;
    use crate::tree::Node;

    fn attrs(entries: &[(&str, Node)]) -> Section {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn names(diff: &SectionDiff) -> Vec<&str> {
        diff.changes.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_identical_attributes() {
        let a = attrs(&[("id", Node::from("1")), ("name", Node::from("n"))]);
        assert!(compare_attributes(&a, &a).is_empty());
    }

    #[test]
    fn test_priority_attributes_come_first() {
        let old = attrs(&[
            ("acl", Node::from("private")),
            ("content", Node::from("old body")),
            ("id", Node::from("1")),
        ]);
        let new = attrs(&[
            ("acl", Node::from("public")),
            ("content", Node::from("new body")),
            ("id", Node::from("2")),
        ]);
        let diff = compare_attributes(&old, &new);
        assert_eq!(names(&diff), vec!["id", "content", "acl"]);
    }

    #[test]
    fn test_priority_added_and_removed() {
        let old = attrs(&[("id", Node::from("1"))]);
        let new = attrs(&[("url", Node::from("https://example.com"))]);
        let diff = compare_attributes(&old, &new);
        assert_eq!(diff.changes.len(), 2);
        assert_eq!(diff.get("id").unwrap().change_type, ChangeType::Removed);
        assert_eq!(diff.get("url").unwrap().change_type, ChangeType::Added);
    }

    #[test]
    fn test_skipped_attributes_never_reported() {
        let old = attrs(&[
            ("content_md5", Node::from("a")),
            ("content_sha256", Node::from("b")),
            ("response_body_base64", Node::from("c")),
        ]);
        let new = attrs(&[
            ("content_md5", Node::from("z")),
            ("content_sha512", Node::from("y")),
            ("content_base64sha256", Node::from("x")),
        ]);
        let diff = compare_attributes(&old, &new);
        assert!(diff.is_empty(), "unexpected changes: {:?}", diff.changes);
    }

    #[test]
    fn test_regular_changes_then_additions() {
        let old = attrs(&[("b", Node::Number(1.0)), ("c", Node::Number(1.0))]);
        let new = attrs(&[("a", Node::Number(1.0)), ("b", Node::Number(2.0))]);
        let diff = compare_attributes(&old, &new);
        assert_eq!(names(&diff), vec!["b", "c", "a"]);
        assert_eq!(diff.changes[0].change_type, ChangeType::Modified);
        assert_eq!(diff.changes[1].change_type, ChangeType::Removed);
        assert_eq!(diff.changes[2].change_type, ChangeType::Added);
    }

    #[test]
    fn test_nested_values_compared_deeply() {
        let tags = |env: &str| {
            Node::Object(
                [("env".to_string(), Node::from(env))]
                    .into_iter()
                    .collect(),
            )
        };
        let old = attrs(&[("tags", tags("prod"))]);
        let same = attrs(&[("tags", tags("prod"))]);
        let new = attrs(&[("tags", tags("dev"))]);

        assert!(compare_attributes(&old, &same).is_empty());
        let diff = compare_attributes(&old, &new);
        assert_eq!(
            diff.changes,
            vec![Change::modified("tags", tags("prod"), tags("dev"))]
        );
    }

    #[test]
    fn test_policy_lists() {
        assert!(is_priority("id"));
        assert!(!is_priority("name"));
        assert!(is_skipped("content_sha1"));
        assert!(!is_skipped("content"));
    }
}
