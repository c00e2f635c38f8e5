//! Canonical key ordering for snapshot documents.
//!
//! Two snapshots that differ only in the order of their mapping keys normalize
//! to the same tree, key for key.

use crate::tree::Node;
use indexmap::IndexMap;

/// Returns a copy of `node` with every mapping's keys sorted ascending.
///
/// Sequences keep their element order; only the elements themselves are
/// normalized. Scalars are returned unchanged. The input is not modified.
///
/// ```
/// use tfplan_diff::{normalize, parser::parse_json};
///
/// let doc = parse_json(r#"{"b": 1, "a": {"z": true, "y": null}}"#).unwrap();
/// let normalized = normalize(&doc);
/// let keys: Vec<&String> = normalized.as_object().unwrap().keys().collect();
/// assert_eq!(keys, ["a", "b"]);
/// ```
pub fn normalize(node: &Node) -> Node {
    match node {
        Node::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let sorted: IndexMap<String, Node> = keys
                .into_iter()
                .map(|key| (key.clone(), normalize(&map[key])))
                .collect();
            Node::Object(sorted)
        }
        Node::Array(items) => Node::Array(items.iter().map(normalize).collect()),
        scalar => scalar.clone(),
    }
}
