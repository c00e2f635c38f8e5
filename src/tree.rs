//! Tree representation of a plan snapshot document.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Largest integer an `f64` holds exactly; integral values up to this render without a fraction.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A node representing a value in a snapshot document (parsed JSON, YAML, TOML).
///
/// Object keys keep their insertion order so that normalization is observable,
/// but equality between objects ignores key order.
#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(IndexMap<String, Node>),
    Array(Vec<Node>),
}

impl Node {
    pub fn type_name(&self) -> &str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Object(_) => "object",
            Node::Array(_) => "array",
        }
    }

    /// Views the node as a mapping, or `None` if it has another shape.
    pub fn as_object(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Views the node as a sequence, or `None` if it has another shape.
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up `key` when the node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Follows a chain of mapping keys, stopping at the first missing or non-mapping step.
    ///
    /// ```
    /// use tfplan_diff::parser::parse_json;
    ///
    /// let doc = parse_json(r#"{"planned_values": {"root_module": {"resources": []}}}"#).unwrap();
    /// assert!(doc.get_path(&["planned_values", "root_module", "resources"]).is_some());
    /// assert!(doc.get_path(&["prior_state", "values"]).is_none());
    /// ```
    pub fn get_path(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Renders the value for a text report.
    ///
    /// Scalars are shown directly (strings without quotes), containers as compact JSON.
    pub fn display_value(&self) -> String {
        match self {
            Node::Null => "null".to_string(),
            Node::Bool(b) => b.to_string(),
            Node::Number(n) => format_number(*n),
            Node::String(s) => s.clone(),
            Node::Object(_) | Node::Array(_) => {
                serde_json::to_string(self).unwrap_or_else(|_| self.type_name().to_string())
            }
        }
    }
}

/// Structural equality. Object key order is ignored and NaN equals NaN, so a
/// document always equals itself.
impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|v| value == v))
            }
            (Node::Array(a), Node::Array(b)) => a == b,
            _ => false,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() <= MAX_EXACT_INTEGER {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => {
                if !n.is_finite() {
                    // JSON has no NaN or infinity
                    serializer.serialize_str(&n.to_string())
                } else if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(entries: &[(&str, Node)]) -> Node {
        Node::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_object_equality_ignores_key_order() {
        let a = object(&[("a", Node::Number(1.0)), ("b", Node::Bool(true))]);
        let b = object(&[("b", Node::Bool(true)), ("a", Node::Number(1.0))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_equals_itself() {
        let nan = Node::Number(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(nan, Node::Number(0.0));
        let doc = object(&[("ratio", Node::Array(vec![Node::Number(f64::NAN)]))]);
        assert_eq!(doc, doc.clone());
    }

    #[test]
    fn test_non_finite_numbers_serialize_as_strings() {
        assert_eq!(
            serde_json::to_string(&Node::Number(f64::NAN)).unwrap(),
            r#""NaN""#
        );
        assert_eq!(
            serde_json::to_string(&Node::Number(f64::INFINITY)).unwrap(),
            r#""inf""#
        );
    }

    #[test]
    fn test_array_equality_respects_order() {
        let a = Node::Array(vec![Node::Number(1.0), Node::Number(2.0)]);
        let b = Node::Array(vec![Node::Number(2.0), Node::Number(1.0)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_accessors_tolerate_wrong_shapes() {
        let node = Node::String("x".to_string());
        assert!(node.as_object().is_none());
        assert!(node.as_array().is_none());
        assert!(node.get("anything").is_none());
        assert!(node.get_path(&["a", "b"]).is_none());
        assert_eq!(node.as_str(), Some("x"));
    }

    #[test]
    fn test_get_path_nested() {
        let doc = object(&[("a", object(&[("b", Node::from("leaf"))]))]);
        assert_eq!(doc.get_path(&["a", "b"]), Some(&Node::from("leaf")));
        assert_eq!(doc.get_path(&[]), Some(&doc));
    }

    #[test]
    fn test_display_value_scalars() {
        assert_eq!(Node::Null.display_value(), "null");
        assert_eq!(Node::Bool(false).display_value(), "false");
        assert_eq!(Node::Number(42.0).display_value(), "42");
        assert_eq!(Node::Number(1.5).display_value(), "1.5");
        assert_eq!(Node::from("us-east-1").display_value(), "us-east-1");
    }

    #[test]
    fn test_display_value_containers() {
        let doc = object(&[
            ("tags", Node::Array(vec![Node::from("a"), Node::Number(2.0)])),
            ("on", Node::Bool(true)),
        ]);
        assert_eq!(doc.display_value(), r#"{"tags":["a",2],"on":true}"#);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Node::Null.type_name(), "null");
        assert_eq!(Node::Array(vec![]).type_name(), "array");
        assert_eq!(Node::Object(IndexMap::new()).type_name(), "object");
    }
}
