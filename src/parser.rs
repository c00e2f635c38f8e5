//! Loading snapshot documents.
//!
//! Snapshots usually arrive as the captured output of `terraform show -json`,
//! which may be preceded by diagnostic text. [`parse_show_output`] isolates the
//! JSON payload and parses it. Snapshots saved as JSON, YAML or TOML files can
//! be read with [`parse_file`], and [`load_snapshot`] picks between the two by
//! file extension.
//!
//! # Examples
//!
//! ```
//! use tfplan_diff::parser::parse_show_output;
//!
//! let captured = "Reading plan...\n{\"format_version\": \"1.2\", \"variables\": {}}";
//! let document = parse_show_output(captured, "plan.out").unwrap();
//! assert!(document.get("format_version").is_some());
//! ```

use crate::error::{ParseError, PlanDiffError};
use crate::tree::Node;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Parses a file into a Node tree.
///
/// The format is detected by file extension (.json, .yaml, .yml, .toml). If the
/// extension is unknown or missing, JSON is tried first, then YAML.
///
/// # Errors
///
/// This function will return an error if:
/// - The file does not exist (`ParseError::FileNotFound`)
/// - The file cannot be read (`ParseError::ReadError`)
/// - The content is invalid for the detected format (`JsonError`, `YamlError`, `TomlError`)
/// - The format cannot be determined (`ParseError::UnknownFormat`)
pub fn parse_file(path: &Path) -> Result<Node, ParseError> {
    let path_name = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(ParseError::file_not_found(path_name));
    }

    let content = fs::read_to_string(path).map_err(|e| ParseError::read_error(&path_name, e))?;

    match extension(path).as_deref() {
        Some("json") => parse_json(&content).map_err(|e| ParseError::json_error(path_name, e)),
        Some("yaml") | Some("yml") => {
            parse_yaml(&content).map_err(|e| ParseError::yaml_error(path_name, e))
        }
        Some("toml") => parse_toml(&content).map_err(|e| ParseError::toml_error(path_name, e)),
        _ => parse_json(&content)
            .map_err(|_| ())
            .or_else(|_| parse_yaml(&content).map_err(|_| ()))
            .map_err(|_| ParseError::unknown_format(path_name)),
    }
}

/// Loads a snapshot document from disk.
///
/// YAML and TOML files are parsed by format. Anything else is treated as
/// captured `terraform show -json` output and goes through [`parse_show_output`].
/// The resulting document must be a mapping.
pub fn load_snapshot(path: &Path) -> Result<Node, PlanDiffError> {
    let path_name = path.to_string_lossy().to_string();

    let document = match extension(path).as_deref() {
        Some("yaml") | Some("yml") | Some("toml") => parse_file(path)?,
        _ => {
            if !path.exists() {
                return Err(ParseError::file_not_found(path_name).into());
            }
            let content =
                fs::read_to_string(path).map_err(|e| ParseError::read_error(&path_name, e))?;
            parse_show_output(&content, &path_name)?
        }
    };

    tracing::debug!(path = %path_name, "loaded snapshot");
    require_mapping(document, &path_name)
}

/// Returns the part of `output` starting at the first `{`.
///
/// ```
/// use tfplan_diff::parser::extract_payload;
///
/// assert_eq!(extract_payload("noise {\"a\": 1}"), Some("{\"a\": 1}"));
/// assert_eq!(extract_payload("no payload here"), None);
/// ```
pub fn extract_payload(output: &str) -> Option<&str> {
    output.find('{').map(|start| &output[start..])
}

/// Isolates and parses the JSON payload of captured tool output.
///
/// `source_name` only labels errors.
///
/// # Errors
///
/// - [`PlanDiffError::MissingPayload`] if the output contains no `{`
/// - [`PlanDiffError::MalformedInput`] if the payload is not a JSON object
pub fn parse_show_output(output: &str, source_name: &str) -> Result<Node, PlanDiffError> {
    let payload =
        extract_payload(output).ok_or_else(|| PlanDiffError::missing_payload(source_name))?;

    let document = parse_json(payload)
        .map_err(|e| PlanDiffError::malformed_input(source_name, e.to_string()))?;

    require_mapping(document, source_name)
}

fn require_mapping(document: Node, source_name: &str) -> Result<Node, PlanDiffError> {
    match document {
        Node::Object(_) => Ok(document),
        other => Err(PlanDiffError::malformed_input(
            source_name,
            format!("expected an object at the top level, found {}", other.type_name()),
        )),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// Parses a JSON string into a Node.
///
/// ```
/// use tfplan_diff::parser::parse_json;
///
/// let node = parse_json(r#"{"variables": {"region": {"value": "eu-west-1"}}}"#).unwrap();
/// assert!(node.get("variables").is_some());
/// ```
pub fn parse_json(content: &str) -> Result<Node, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(json_to_node(value))
}

/// Parses a YAML string into a Node.
pub fn parse_yaml(content: &str) -> Result<Node, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_node(value))
}

/// Parses a TOML document into a Node.
pub fn parse_toml(content: &str) -> Result<Node, toml::de::Error> {
    let table: toml::Table = content.parse()?;
    Ok(toml_to_node(toml::Value::Table(table)))
}

fn json_to_node(value: serde_json::Value) -> Node {
    match value {
        serde_json::Value::Null => Node::Null,
        serde_json::Value::Bool(b) => Node::Bool(b),
        serde_json::Value::Number(n) => Node::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Node::String(s),
        serde_json::Value::Array(arr) => Node::Array(arr.into_iter().map(json_to_node).collect()),
        serde_json::Value::Object(obj) => {
            let map: IndexMap<String, Node> =
                obj.into_iter().map(|(k, v)| (k, json_to_node(v))).collect();
            Node::Object(map)
        }
    }
}

/// Converts a YAML value; non-string mapping keys are stringified and tags are dropped.
fn yaml_to_node(value: serde_yaml::Value) -> Node {
    match value {
        serde_yaml::Value::Null => Node::Null,
        serde_yaml::Value::Bool(b) => Node::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                Node::Number(f)
            } else if let Some(i) = n.as_i64() {
                Node::Number(i as f64)
            } else if let Some(u) = n.as_u64() {
                Node::Number(u as f64)
            } else {
                Node::Number(0.0)
            }
        }
        serde_yaml::Value::String(s) => Node::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Node::Array(seq.into_iter().map(yaml_to_node).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let entries: IndexMap<String, Node> = map
                .into_iter()
                .map(|(k, v)| {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Null => "null".to_string(),
                        other => format!("{:?}", other),
                    };
                    (key, yaml_to_node(v))
                })
                .collect();
            Node::Object(entries)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_node(tagged.value),
    }
}

/// Converts a TOML value; datetimes become strings.
fn toml_to_node(value: toml::Value) -> Node {
    match value {
        toml::Value::String(s) => Node::String(s),
        toml::Value::Integer(i) => Node::Number(i as f64),
        toml::Value::Float(f) => Node::Number(f),
        toml::Value::Boolean(b) => Node::Bool(b),
        toml::Value::Datetime(dt) => Node::String(dt.to_string()),
        toml::Value::Array(arr) => Node::Array(arr.into_iter().map(toml_to_node).collect()),
        toml::Value::Table(table) => {
            let entries: IndexMap<String, Node> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_node(v)))
                .collect();
            Node::Object(entries)
        }
    }
}
