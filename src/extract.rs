//! Extraction of the variables, resources and outputs sections from a snapshot.
//!
//! Plan snapshots carry the same logical data in several places depending on
//! which part of the plan it came from. Each extractor reads every location it
//! knows about and reconciles them into one flat dictionary keyed by name or
//! address. Missing or oddly shaped sub-trees are treated as empty; nothing in
//! this module fails.

use crate::tree::Node;
use std::collections::BTreeMap;

/// A flat section dictionary, iterated in key order.
pub type Section = BTreeMap<String, Node>;

/// The three sections of one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    pub variables: Section,
    pub resources: Section,
    pub outputs: Section,
}

impl Sections {
    pub fn from_document(document: &Node) -> Self {
        Self {
            variables: variables(document),
            resources: resources(document),
            outputs: outputs(document),
        }
    }
}

/// Extracts `name -> value` for every entry of the top-level `variables` mapping
/// that is itself a mapping with a `value` field.
pub fn variables(document: &Node) -> Section {
    let mut result = Section::new();

    if let Some(vars) = document.get("variables").and_then(Node::as_object) {
        for (name, entry) in vars {
            if let Some(value) = entry.get("value") {
                result.insert(name.clone(), value.clone());
            }
        }
    }

    result
}

/// Extracts resource records keyed by address.
///
/// Sources are applied in order, each overwriting earlier records with the same
/// address:
/// 1. `prior_state.values.root_module.resources`
/// 2. `planned_values.root_module.resources`
/// 3. `resource_changes`
pub fn resources(document: &Node) -> Section {
    let mut result = Section::new();

    let sources: [&[&str]; 3] = [
        &["prior_state", "values", "root_module", "resources"],
        &["planned_values", "root_module", "resources"],
        &["resource_changes"],
    ];

    for path in sources {
        let Some(records) = document.get_path(path).and_then(Node::as_array) else {
            continue;
        };
        let before = result.len();
        collect_addressed_records(records, &mut result);
        tracing::trace!(
            source = %path.join("."),
            new_addresses = result.len() - before,
            "collected resource records"
        );
    }

    result
}

fn collect_addressed_records(records: &[Node], result: &mut Section) {
    for record in records {
        if let Some(address) = record.get("address").and_then(Node::as_str) {
            result.insert(address.to_string(), record.clone());
        }
    }
}

/// Extracts outputs keyed by name.
///
/// `planned_values.outputs` entries are taken first; `output_changes` only
/// fills in names that are not already present. Note this is the reverse of
/// the resource precedence.
pub fn outputs(document: &Node) -> Section {
    let mut result = Section::new();

    if let Some(planned) = document
        .get_path(&["planned_values", "outputs"])
        .and_then(Node::as_object)
    {
        for (name, value) in planned {
            result.insert(name.clone(), value.clone());
        }
    }

    if let Some(changes) = document.get("output_changes").and_then(Node::as_object) {
        for (name, value) in changes {
            result
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    result
}

/// Builds the effective attribute dictionary of a resource record: all fields of
/// `values`, overlaid by all fields of `change.after`.
pub fn effective_attributes(record: &Node) -> Section {
    let mut result = Section::new();

    let layers = [
        record.get("values"),
        record.get_path(&["change", "after"]),
    ];

    for layer in layers.into_iter().flatten() {
        if let Some(fields) = layer.as_object() {
            for (name, value) in fields {
                result.insert(name.clone(), value.clone());
            }
        }
    }

    result
}
