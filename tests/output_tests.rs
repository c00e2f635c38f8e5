use tfplan_diff::output::NO_CHANGES_MESSAGE;
use tfplan_diff::{
    compute_plan_diff, format_plan_diff, parse_json, render_report, Change, Node, OutputFormat,
    OutputOptions, PlanDiff, SectionDiff,
};

fn plain() -> OutputOptions {
    OutputOptions {
        format: OutputFormat::Plain,
        ..Default::default()
    }
}

fn sample_diff() -> PlanDiff {
    let old = parse_json(
        r#"{
            "variables": {"env": {"value": "dev"}},
            "resource_changes": [
                {"address": "local_file.a", "change": {"after": {"filename": "a", "id": "1"}}}
            ],
            "planned_values": {"outputs": {"names": {"value": ["x"]}}}
        }"#,
    )
    .unwrap();
    let new = parse_json(
        r#"{
            "variables": {"env": {"value": "prod"}},
            "resource_changes": [
                {"address": "local_file.a", "change": {"after": {"filename": "b", "id": "1"}}}
            ],
            "planned_values": {"outputs": {"names": {"value": ["x", "y"]}}}
        }"#,
    )
    .unwrap();
    compute_plan_diff(&old, &new)
}

#[test]
fn test_report_sections_in_order() {
    let report = render_report(&sample_diff());
    let variables = report.find("Variables:").unwrap();
    let resources = report.find("Resources:").unwrap();
    let outputs = report.find("Outputs:").unwrap();
    assert!(variables < resources && resources < outputs);
}

#[test]
fn test_report_attribute_two_line_form() {
    let report = render_report(&sample_diff());
    assert!(report.contains("local_file.a\n  ~ filename:\n      - a\n      + b\n"));
}

#[test]
fn test_report_nested_values_as_json() {
    let report = render_report(&sample_diff());
    assert!(report.contains(r#"~ names: {"value":["x"]} => {"value":["x","y"]}"#));
}

#[test]
fn test_format_plain_no_changes() {
    let output = format_plan_diff(&PlanDiff::new(), &plain()).unwrap();
    assert_eq!(output, NO_CHANGES_MESSAGE);
}

#[test]
fn test_format_plain_without_summary() {
    let options = OutputOptions {
        summary: false,
        ..plain()
    };
    let output = format_plan_diff(&sample_diff(), &options).unwrap();
    assert!(!output.contains("Summary:"));
    assert_eq!(output, render_report(&sample_diff()));
}

#[test]
fn test_format_terminal_contains_text() {
    let output = format_plan_diff(&sample_diff(), &OutputOptions::default()).unwrap();
    assert!(output.contains("env"));
    assert!(output.contains("dev"));
    assert!(output.contains("prod"));
    assert!(output.contains("Summary: 3 changed"));
}

#[test]
fn test_format_json_round_trips_to_value() {
    let diff = PlanDiff {
        outputs: Some(SectionDiff {
            changes: vec![Change::removed("url", Node::from("https://example.com"))],
        }),
        ..Default::default()
    };
    let options = OutputOptions {
        format: OutputFormat::Json,
        ..Default::default()
    };
    let output = format_plan_diff(&diff, &options).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value, diff.to_json_value());
    assert!(value.get("variables").is_none());
}
