//! Plan diff engine.
//!
//! This module compares the sections of two snapshot documents and produces a
//! structured diff. Variables and outputs are compared key by key; resources
//! are compared by address, and resources present on both sides are compared
//! attribute by attribute (see [`crate::attributes`]).
//!
//! # Examples
//!
//! ```
//! use tfplan_diff::{compare_documents, parser::parse_json};
//!
//! let old = parse_json(r#"{"variables": {"region": {"value": "us-east-1"}}}"#).unwrap();
//! let new = parse_json(r#"{"variables": {"region": {"value": "us-west-2"}}}"#).unwrap();
//!
//! let (report, diff, has_diff) = compare_documents(&old, &new).unwrap();
//! assert!(has_diff);
//! assert!(report.contains("~ region: us-east-1 => us-west-2"));
//! assert_eq!(diff.variables.unwrap().stats().modified, 1);
//! ```

use crate::attributes::compare_attributes;
use crate::error::PlanDiffError;
use crate::extract::{effective_attributes, Section, Sections};
use crate::normalize::normalize;
use crate::output::render_report;
use crate::tree::Node;
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

/// The type of change that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Key exists in new but not old
    Added,
    /// Key exists in old but not new
    Removed,
    /// Key exists in both with different values
    Modified,
}

/// A single classified difference for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Variable name, output name, attribute name or resource address
    pub name: String,
    pub change_type: ChangeType,
    /// Old value (None for Added changes)
    pub old_value: Option<Node>,
    /// New value (None for Removed changes)
    pub new_value: Option<Node>,
}

impl Change {
    /// Creates an `Added` change carrying the new value.
    pub fn added(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            change_type: ChangeType::Added,
            old_value: None,
            new_value: Some(value),
        }
    }

    /// Creates a `Removed` change carrying the old value.
    pub fn removed(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            change_type: ChangeType::Removed,
            old_value: Some(value),
            new_value: None,
        }
    }

    /// Creates a `Modified` change carrying both values.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfplan_diff::{Change, ChangeType, Node};
    ///
    /// let change = Change::modified("region", Node::from("us-east-1"), Node::from("us-west-2"));
    /// assert_eq!(change.change_type, ChangeType::Modified);
    /// assert_eq!(change.old_value, Some(Node::from("us-east-1")));
    /// ```
    pub fn modified(name: impl Into<String>, old: Node, new: Node) -> Self {
        Self {
            name: name.into(),
            change_type: ChangeType::Modified,
            old_value: Some(old),
            new_value: Some(new),
        }
    }
}

/// Counts of changes by type.
///
/// Counts from several sections combine with `+=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, change_type: ChangeType) {
        match change_type {
            ChangeType::Added => self.added += 1,
            ChangeType::Removed => self.removed += 1,
            ChangeType::Modified => self.modified += 1,
        }
    }

    /// Returns the total number of changes.
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified
    }

    /// Returns true if no change of any type was counted.
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

impl std::ops::AddAssign for DiffStats {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.removed += other.removed;
        self.modified += other.modified;
    }
}

/// Differences within one flat dictionary (variables, outputs, or the
/// attributes of one resource).
///
/// `changes` is in report order. It serializes as
/// `{"added": [{name, value}], "removed": [{name, value}], "changed": [{name, old, new}]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionDiff {
    pub changes: Vec<Change>,
}

impl SectionDiff {
    /// Returns true if the section recorded no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Counts the changes in this section by type.
    ///
    /// # Returns
    ///
    /// A [`DiffStats`] with one count per recorded change.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfplan_diff::{Change, Node, SectionDiff};
    ///
    /// let section = SectionDiff {
    ///     changes: vec![
    ///         Change::added("zone", Node::from("b")),
    ///         Change::modified("region", Node::from("a"), Node::from("b")),
    ///     ],
    /// };
    /// let stats = section.stats();
    /// assert_eq!((stats.added, stats.removed, stats.modified), (1, 0, 1));
    /// ```
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::new();
        for change in &self.changes {
            stats.record(change.change_type);
        }
        stats
    }

    /// Iterates over the changes of one type, in report order.
    ///
    /// # Arguments
    ///
    /// * `change_type` - The type of change to keep
    pub fn of_type(&self, change_type: ChangeType) -> impl Iterator<Item = &Change> {
        self.changes
            .iter()
            .filter(move |c| c.change_type == change_type)
    }

    /// Iterates over the added keys.
    pub fn added(&self) -> impl Iterator<Item = &Change> {
        self.of_type(ChangeType::Added)
    }

    /// Iterates over the removed keys.
    pub fn removed(&self) -> impl Iterator<Item = &Change> {
        self.of_type(ChangeType::Removed)
    }

    /// Iterates over the keys whose value changed.
    pub fn modified(&self) -> impl Iterator<Item = &Change> {
        self.of_type(ChangeType::Modified)
    }

    /// Finds the change recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.name == name)
    }
}

/// A resource present on both sides whose record differs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceChange {
    /// Resource address, e.g. `aws_instance.web`
    pub address: String,
    /// Attribute-level changes; empty when the records differ only outside
    /// the effective attributes or only in skipped attributes
    pub attributes: SectionDiff,
}

/// Differences in the resources section.
///
/// `added` and `removed` are whole resources keyed by address; `changed`
/// carries an attribute-level diff per address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDiff {
    pub added: Vec<Change>,
    pub removed: Vec<Change>,
    pub changed: Vec<ResourceChange>,
}

impl ResourceDiff {
    /// Returns true if no resource was added, removed or changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Resource-level counts.
    ///
    /// A changed resource counts once as modified, however many of its
    /// attributes changed.
    pub fn stats(&self) -> DiffStats {
        DiffStats {
            added: self.added.len(),
            removed: self.removed.len(),
            modified: self.changed.len(),
        }
    }

    /// Finds the attribute diff of a changed resource.
    ///
    /// # Arguments
    ///
    /// * `address` - The resource address to look up
    ///
    /// # Returns
    ///
    /// The [`ResourceChange`] for `address`, or `None` if that resource was
    /// added, removed or left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfplan_diff::{compute_plan_diff, parser::parse_json};
    ///
    /// let old = parse_json(r#"{"resource_changes": [{"address": "a.b", "change": {"after": {"size": 1}}}]}"#).unwrap();
    /// let new = parse_json(r#"{"resource_changes": [{"address": "a.b", "change": {"after": {"size": 2}}}]}"#).unwrap();
    ///
    /// let resources = compute_plan_diff(&old, &new).resources.unwrap();
    /// let changed = resources.get_changed("a.b").unwrap();
    /// assert_eq!(changed.attributes.changes[0].name, "size");
    /// assert!(resources.get_changed("a.c").is_none());
    /// ```
    pub fn get_changed(&self, address: &str) -> Option<&ResourceChange> {
        self.changed.iter().find(|c| c.address == address)
    }
}

/// The complete structured diff between two snapshots.
///
/// A section is `None` when it is identical on both sides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDiff {
    pub variables: Option<SectionDiff>,
    pub resources: Option<ResourceDiff>,
    pub outputs: Option<SectionDiff>,
}

impl PlanDiff {
    /// Creates a diff with no differing sections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any section differs.
    pub fn has_diff(&self) -> bool {
        self.variables.is_some() || self.resources.is_some() || self.outputs.is_some()
    }

    /// Returns true if no section differs.
    pub fn is_empty(&self) -> bool {
        !self.has_diff()
    }

    /// Summary counts across all sections.
    ///
    /// Variables and outputs count per key; resources count per address
    /// (see [`ResourceDiff::stats`]).
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::new();
        if let Some(variables) = &self.variables {
            stats += variables.stats();
        }
        if let Some(resources) = &self.resources {
            stats += resources.stats();
        }
        if let Some(outputs) = &self.outputs {
            stats += outputs.stats();
        }
        stats
    }

    /// Converts the structured diff into a JSON value.
    ///
    /// Only differing sections appear as keys. Each has `added`, `removed` and
    /// `changed` lists; a changed resource carries its attribute diff in the
    /// same shape.
    ///
    /// # Returns
    ///
    /// The JSON object, `{}` for an empty diff.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use tfplan_diff::{compute_plan_diff, parser::parse_json};
    ///
    /// let old = parse_json(r#"{"variables": {"env": {"value": "dev"}}}"#).unwrap();
    /// let new = parse_json(r#"{"variables": {"env": {"value": "prod"}}}"#).unwrap();
    ///
    /// assert_eq!(
    ///     compute_plan_diff(&old, &new).to_json_value(),
    ///     json!({"variables": {
    ///         "added": [],
    ///         "removed": [],
    ///         "changed": [{"name": "env", "old": "dev", "new": "prod"}]
    ///     }})
    /// );
    /// ```
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Computes the structured diff between two already-normalized documents.
///
/// A document lacking a section compares as if that section were empty.
/// Sections are compared as a whole first; only differing sections are
/// broken down further.
///
/// # Arguments
///
/// * `old` - The old snapshot document
/// * `new` - The new snapshot document
///
/// # Returns
///
/// A [`PlanDiff`] whose sections are `Some` exactly when they differ.
pub fn compute_plan_diff(old: &Node, new: &Node) -> PlanDiff {
    let old_sections = Sections::from_document(old);
    let new_sections = Sections::from_document(new);

    let mut diff = PlanDiff::new();

    if old_sections.variables != new_sections.variables {
        tracing::debug!(section = "variables", "section differs");
        diff.variables = Some(compare_section(
            &old_sections.variables,
            &new_sections.variables,
        ));
    }

    if old_sections.resources != new_sections.resources {
        tracing::debug!(section = "resources", "section differs");
        diff.resources = Some(compare_resources(
            &old_sections.resources,
            &new_sections.resources,
        ));
    }

    if old_sections.outputs != new_sections.outputs {
        tracing::debug!(section = "outputs", "section differs");
        diff.outputs = Some(compare_section(
            &old_sections.outputs,
            &new_sections.outputs,
        ));
    }

    diff
}

/// Normalizes and compares two snapshot documents.
///
/// # Arguments
///
/// * `old` - The old snapshot document, a mapping
/// * `new` - The new snapshot document, a mapping
///
/// # Returns
///
/// The text report, the structured diff and whether anything differs.
/// When nothing differs the report is empty and the structured diff has no
/// sections.
///
/// # Errors
///
/// Returns [`PlanDiffError::MalformedInput`] if either document is not a mapping.
pub fn compare_documents(
    old: &Node,
    new: &Node,
) -> Result<(String, PlanDiff, bool), PlanDiffError> {
    require_mapping(old, "old")?;
    require_mapping(new, "new")?;

    let diff = compute_plan_diff(&normalize(old), &normalize(new));
    let has_diff = diff.has_diff();
    let report = if has_diff {
        render_report(&diff)
    } else {
        String::new()
    };

    tracing::info!(has_diff, stats = ?diff.stats(), "compared snapshots");

    Ok((report, diff, has_diff))
}

fn require_mapping(document: &Node, which: &str) -> Result<(), PlanDiffError> {
    match document {
        Node::Object(_) => Ok(()),
        other => Err(PlanDiffError::malformed_input(
            which,
            format!("expected an object at the top level, found {}", other.type_name()),
        )),
    }
}

/// Compares two flat dictionaries: added, then removed, then modified keys,
/// each in key order.
fn compare_section(old: &Section, new: &Section) -> SectionDiff {
    let mut changes = Vec::new();

    for (name, value) in new {
        if !old.contains_key(name) {
            changes.push(Change::added(name.as_str(), value.clone()));
        }
    }

    for (name, value) in old {
        if !new.contains_key(name) {
            changes.push(Change::removed(name.as_str(), value.clone()));
        }
    }

    for (name, old_value) in old {
        if let Some(new_value) = new.get(name) {
            if old_value != new_value {
                changes.push(Change::modified(
                    name.as_str(),
                    old_value.clone(),
                    new_value.clone(),
                ));
            }
        }
    }

    SectionDiff { changes }
}

fn compare_resources(old: &Section, new: &Section) -> ResourceDiff {
    let mut diff = ResourceDiff::default();

    for (address, record) in new {
        if !old.contains_key(address) {
            diff.added.push(Change::added(address.as_str(), record.clone()));
        }
    }

    for (address, record) in old {
        if !new.contains_key(address) {
            diff.removed.push(Change::removed(address.as_str(), record.clone()));
        }
    }

    for (address, old_record) in old {
        let Some(new_record) = new.get(address) else {
            continue;
        };
        if old_record == new_record {
            continue;
        }

        let attributes = compare_attributes(
            &effective_attributes(old_record),
            &effective_attributes(new_record),
        );
        tracing::debug!(
            address = address.as_str(),
            attribute_changes = attributes.changes.len(),
            "resource record differs"
        );
        diff.changed.push(ResourceChange {
            address: address.clone(),
            attributes,
        });
    }

    diff
}

struct NamedValue<'a> {
    key: &'static str,
    name: &'a str,
    value: &'a Node,
}

impl Serialize for NamedValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, self.name)?;
        map.serialize_entry("value", self.value)?;
        map.end()
    }
}

struct ChangedValue<'a>(&'a Change);

impl Serialize for ChangedValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.0.name)?;
        map.serialize_entry("old", &self.0.old_value)?;
        map.serialize_entry("new", &self.0.new_value)?;
        map.end()
    }
}

fn named_values<'a>(
    changes: impl Iterator<Item = &'a Change>,
    key: &'static str,
) -> Vec<NamedValue<'a>> {
    changes
        .filter_map(|change| {
            let value = change.new_value.as_ref().or(change.old_value.as_ref())?;
            Some(NamedValue {
                key,
                name: &change.name,
                value,
            })
        })
        .collect()
}

impl Serialize for SectionDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let changed: Vec<ChangedValue<'_>> = self.modified().map(ChangedValue).collect();

        let mut state = serializer.serialize_struct("SectionDiff", 3)?;
        state.serialize_field("added", &named_values(self.added(), "name"))?;
        state.serialize_field("removed", &named_values(self.removed(), "name"))?;
        state.serialize_field("changed", &changed)?;
        state.end()
    }
}

impl Serialize for ResourceChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResourceChange", 2)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}

impl Serialize for ResourceDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResourceDiff", 3)?;
        state.serialize_field("added", &named_values(self.added.iter(), "address"))?;
        state.serialize_field("removed", &named_values(self.removed.iter(), "address"))?;
        state.serialize_field("changed", &self.changed)?;
        state.end()
    }
}

impl Serialize for PlanDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = [
            self.variables.is_some(),
            self.resources.is_some(),
            self.outputs.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(variables) = &self.variables {
            map.serialize_entry("variables", variables)?;
        }
        if let Some(resources) = &self.resources {
            map.serialize_entry("resources", resources)?;
        }
        if let Some(outputs) = &self.outputs {
            map.serialize_entry("outputs", outputs)?;
        }
        map.end()
    }
}
