//! Output formatting for plan diffs.
//!
//! The plain text report is the canonical rendering: one line per change,
//! prefixed with `+` (added), `-` (removed) or `~` (changed), grouped under
//! section headers. The terminal format is the same layout with colors and a
//! summary line; the JSON format is the structured diff.
//!
//! # Examples
//!
//! ```
//! use tfplan_diff::{compute_plan_diff, format_plan_diff, parser::parse_json, OutputFormat, OutputOptions};
//!
//! let old = parse_json(r#"{"variables": {"env": {"value": "dev"}}}"#).unwrap();
//! let new = parse_json(r#"{"variables": {"env": {"value": "prod"}}}"#).unwrap();
//! let diff = compute_plan_diff(&old, &new);
//!
//! let options = OutputOptions { format: OutputFormat::Plain, ..Default::default() };
//! let output = format_plan_diff(&diff, &options).unwrap();
//! assert!(output.contains("~ env: dev => prod"));
//! ```

use crate::diff::{Change, ChangeType, DiffStats, PlanDiff, ResourceDiff, SectionDiff};
use crate::error::OutputError;
use colored::*;

/// Message printed in place of a report when nothing differs.
pub const NO_CHANGES_MESSAGE: &str = "The plan files are identical.";

const VARIABLES_UNDERLINE: &str = "----------";
const RESOURCES_UNDERLINE: &str = "-----------";
const OUTPUTS_UNDERLINE: &str = "--------";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored terminal output with ANSI escape codes
    Terminal,
    /// JSON representation of the structured diff
    Json,
    /// Plain text, no colors (suitable for piping)
    Plain,
}

/// Options for controlling output formatting.
///
/// The default is colored terminal output with a summary line.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Which renderer to use
    pub format: OutputFormat,
    /// Append a `Summary:` line to text reports
    pub summary: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Terminal,
            summary: true,
        }
    }
}

/// Formats a plan diff according to the options.
///
/// Text formats print [`NO_CHANGES_MESSAGE`] for an empty diff; the JSON
/// format prints `{}`.
///
/// # Arguments
///
/// * `diff` - The structured diff to format
/// * `options` - Output format and whether to append a summary line
///
/// # Returns
///
/// The formatted output, without a trailing newline for the JSON format.
///
/// # Examples
///
/// ```
/// use tfplan_diff::{format_plan_diff, OutputFormat, OutputOptions, PlanDiff};
///
/// let options = OutputOptions { format: OutputFormat::Json, summary: false };
/// assert_eq!(format_plan_diff(&PlanDiff::new(), &options).unwrap(), "{}");
/// ```
///
/// # Errors
///
/// Returns [`OutputError::JsonSerializationError`] if the JSON format cannot be produced.
pub fn format_plan_diff(diff: &PlanDiff, options: &OutputOptions) -> Result<String, OutputError> {
    match options.format {
        OutputFormat::Json => format_json(diff),
        OutputFormat::Plain => Ok(format_text(diff, options, &Palette::Plain)),
        OutputFormat::Terminal => Ok(format_text(diff, options, &Palette::Colored)),
    }
}

/// Renders the plain text report.
///
/// Sections appear in the order variables, resources, outputs, each under a
/// dashed header, and only when they differ. There are no colors and no
/// summary line.
///
/// # Arguments
///
/// * `diff` - The structured diff to render
///
/// # Returns
///
/// The report, or an empty string for an empty diff.
///
/// # Examples
///
/// ```
/// use tfplan_diff::{render_report, Change, Node, PlanDiff, SectionDiff};
///
/// let diff = PlanDiff {
///     outputs: Some(SectionDiff { changes: vec![Change::added("url", Node::from("u"))] }),
///     ..Default::default()
/// };
/// assert_eq!(render_report(&diff), "Outputs:\n--------\n+ url: u\n");
/// ```
pub fn render_report(diff: &PlanDiff) -> String {
    render_sections(diff, &Palette::Plain)
}

/// Formats the report for the text formats, with an optional summary line.
fn format_text(diff: &PlanDiff, options: &OutputOptions, palette: &Palette) -> String {
    if diff.is_empty() {
        return palette.dim(NO_CHANGES_MESSAGE);
    }

    let mut output = render_sections(diff, palette);
    if options.summary {
        output.push_str(&format_summary(&diff.stats()));
        output.push('\n');
    }
    output
}

fn format_json(diff: &PlanDiff) -> Result<String, OutputError> {
    serde_json::to_string_pretty(diff).map_err(|e| OutputError::JsonSerializationError { source: e })
}

fn render_sections(diff: &PlanDiff, palette: &Palette) -> String {
    let mut output = String::new();

    if let Some(variables) = &diff.variables {
        output.push_str(&render_section(
            "Variables",
            VARIABLES_UNDERLINE,
            variables,
            palette,
        ));
        output.push('\n');
    }

    if let Some(resources) = &diff.resources {
        output.push_str(&render_resources(resources, palette));
        output.push('\n');
    }

    if let Some(outputs) = &diff.outputs {
        output.push_str(&render_section(
            "Outputs",
            OUTPUTS_UNDERLINE,
            outputs,
            palette,
        ));
    }

    output
}

fn render_header(title: &str, underline: &str, palette: &Palette) -> String {
    format!("{}\n{}\n", palette.bold(&format!("{}:", title)), underline)
}

/// Renders a flat section (variables or outputs).
///
/// # Arguments
///
/// * `title` - Header text, printed with a trailing colon
/// * `underline` - Dashes printed under the header
/// * `section` - The changes, printed one per line in order
/// * `palette` - Plain or colored styling
fn render_section(
    title: &str,
    underline: &str,
    section: &SectionDiff,
    palette: &Palette,
) -> String {
    let mut output = render_header(title, underline, palette);
    for change in &section.changes {
        output.push_str(&format_change(change, palette));
        output.push('\n');
    }
    output
}

/// Renders the resources section: added and removed addresses, then each
/// changed address followed by its indented attribute changes.
fn render_resources(resources: &ResourceDiff, palette: &Palette) -> String {
    let mut output = render_header("Resources", RESOURCES_UNDERLINE, palette);
    output.push('\n');

    for change in &resources.added {
        output.push_str(&format!("{} {}\n", palette.symbol(ChangeType::Added), change.name));
    }
    for change in &resources.removed {
        output.push_str(&format!(
            "{} {}\n",
            palette.symbol(ChangeType::Removed),
            change.name
        ));
    }
    for resource in &resources.changed {
        output.push_str(&palette.bold(&resource.address));
        output.push('\n');
        for change in &resource.attributes.changes {
            output.push_str(&format_attribute_change(change, palette));
        }
    }

    output
}

/// Formats a single change of a flat section as one line.
fn format_change(change: &Change, palette: &Palette) -> String {
    let symbol = palette.symbol(change.change_type);
    match change.change_type {
        ChangeType::Added => format!("{} {}: {}", symbol, change.name, display(&change.new_value)),
        ChangeType::Removed => {
            format!("{} {}: {}", symbol, change.name, display(&change.old_value))
        }
        ChangeType::Modified => format!(
            "{} {}: {} => {}",
            symbol,
            change.name,
            display(&change.old_value),
            display(&change.new_value)
        ),
    }
}

/// Formats a resource attribute change, indented under its address.
///
/// Changed attributes use two extra lines so long values stay readable.
fn format_attribute_change(change: &Change, palette: &Palette) -> String {
    match change.change_type {
        ChangeType::Added | ChangeType::Removed => {
            format!("  {}\n", format_change(change, palette))
        }
        ChangeType::Modified => format!(
            "  {} {}:\n      {} {}\n      {} {}\n",
            palette.symbol(ChangeType::Modified),
            change.name,
            palette.symbol(ChangeType::Removed),
            display(&change.old_value),
            palette.symbol(ChangeType::Added),
            display(&change.new_value)
        ),
    }
}

fn display(value: &Option<crate::tree::Node>) -> String {
    value
        .as_ref()
        .map(|node| node.display_value())
        .unwrap_or_default()
}

/// Formats summary statistics.
///
/// # Returns
///
/// A line like `Summary: 2 added, 1 changed`, omitting zero counts.
fn format_summary(stats: &DiffStats) -> String {
    if stats.is_empty() {
        return "Summary: No changes".to_string();
    }

    let mut parts = Vec::new();
    if stats.added > 0 {
        parts.push(format!("{} added", stats.added));
    }
    if stats.removed > 0 {
        parts.push(format!("{} removed", stats.removed));
    }
    if stats.modified > 0 {
        parts.push(format!("{} changed", stats.modified));
    }

    format!("Summary: {}", parts.join(", "))
}

/// Styling for text output.
enum Palette {
    Plain,
    Colored,
}

impl Palette {
    fn symbol(&self, change_type: ChangeType) -> String {
        let symbol = match change_type {
            ChangeType::Added => "+",
            ChangeType::Removed => "-",
            ChangeType::Modified => "~",
        };
        match self {
            Palette::Plain => symbol.to_string(),
            Palette::Colored => match change_type {
                ChangeType::Added => symbol.bright_green().to_string(),
                ChangeType::Removed => symbol.bright_red().to_string(),
                ChangeType::Modified => symbol.bright_yellow().to_string(),
            },
        }
    }

    fn bold(&self, text: &str) -> String {
        match self {
            Palette::Plain => text.to_string(),
            Palette::Colored => text.bold().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        match self {
            Palette::Plain => text.to_string(),
            Palette::Colored => text.dimmed().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ResourceChange;
    use crate::tree::Node;

    fn variables_diff() -> PlanDiff {
        PlanDiff {
            variables: Some(SectionDiff {
                changes: vec![
                    Change::added("zone", Node::from("a")),
                    Change::removed("legacy", Node::Bool(true)),
                    Change::modified("region", Node::from("us-east-1"), Node::from("us-west-2")),
                ],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_report_empty() {
        assert_eq!(render_report(&PlanDiff::new()), "");
    }

    #[test]
    fn test_render_section_lines() {
        let report = render_report(&variables_diff());
        assert_eq!(
            report,
            "Variables:\n----------\n+ zone: a\n- legacy: true\n~ region: us-east-1 => us-west-2\n\n"
        );
    }

    #[test]
    fn test_render_resources() {
        let diff = PlanDiff {
            resources: Some(ResourceDiff {
                added: vec![Change::added("aws_s3_bucket.logs", Node::Null)],
                removed: vec![Change::removed("aws_s3_bucket.old", Node::Null)],
                changed: vec![ResourceChange {
                    address: "local_file.cfg".to_string(),
                    attributes: SectionDiff {
                        changes: vec![
                            Change::modified("id", Node::from("1"), Node::from("2")),
                            Change::added("mode", Node::from("0644")),
                        ],
                    },
                }],
            }),
            ..Default::default()
        };
        let report = render_report(&diff);
        assert_eq!(
            report,
            "Resources:\n-----------\n\n\
             + aws_s3_bucket.logs\n\
             - aws_s3_bucket.old\n\
             local_file.cfg\n  \
             ~ id:\n      - 1\n      + 2\n  \
             + mode: 0644\n\n"
        );
    }

    #[test]
    fn test_section_header_underlines() {
        let diff = PlanDiff {
            variables: Some(SectionDiff {
                changes: vec![Change::added("a", Node::Null)],
            }),
            resources: Some(ResourceDiff {
                added: vec![Change::added("r.x", Node::Null)],
                ..Default::default()
            }),
            outputs: Some(SectionDiff {
                changes: vec![Change::added("o", Node::Null)],
            }),
        };
        let report = render_report(&diff);
        assert!(report.starts_with("Variables:\n----------\n"));
        assert!(report.contains("\nResources:\n-----------\n\n+ r.x\n"));
        assert!(report.contains("\nOutputs:\n--------\n+ o: null\n"));
    }

    #[test]
    fn test_format_plain_no_changes() {
        let options = OutputOptions {
            format: OutputFormat::Plain,
            ..Default::default()
        };
        let output = format_plan_diff(&PlanDiff::new(), &options).unwrap();
        assert_eq!(output, NO_CHANGES_MESSAGE);
    }

    #[test]
    fn test_format_plain_summary() {
        let options = OutputOptions {
            format: OutputFormat::Plain,
            ..Default::default()
        };
        let output = format_plan_diff(&variables_diff(), &options).unwrap();
        assert!(output.ends_with("Summary: 1 added, 1 removed, 1 changed\n"));
    }

    #[test]
    fn test_format_json() {
        let options = OutputOptions {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let output = format_plan_diff(&variables_diff(), &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["variables"]["changed"][0]["new"], "us-west-2");
        assert_eq!(value["variables"]["added"][0]["name"], "zone");
        assert_eq!(value["variables"]["removed"][0]["value"], true);
    }

    #[test]
    fn test_format_json_empty_diff() {
        let options = OutputOptions {
            format: OutputFormat::Json,
            ..Default::default()
        };
        assert_eq!(format_plan_diff(&PlanDiff::new(), &options).unwrap(), "{}");
    }

    #[test]
    fn test_format_summary_empty() {
        assert_eq!(format_summary(&DiffStats::new()), "Summary: No changes");
    }

    #[test]
    fn test_plain_palette_symbols() {
        let palette = Palette::Plain;
        assert_eq!(palette.symbol(ChangeType::Added), "+");
        assert_eq!(palette.symbol(ChangeType::Removed), "-");
        assert_eq!(palette.symbol(ChangeType::Modified), "~");
    }
}
