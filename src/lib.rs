//! tfplan-diff - Semantic diff for Terraform plan snapshots.
//!
//! This library compares two plan snapshots (the JSON rendering of a saved
//! plan) and reports what changed in three sections: declared variables,
//! managed resources and outputs. Key order never matters, resources are
//! compared attribute by attribute, and derived checksum attributes are
//! ignored.
//!
//! # Example
//!
//! ```no_run
//! use tfplan_diff::{compare_documents, load_snapshot};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let old = load_snapshot(Path::new("old-plan.json"))?;
//! let new = load_snapshot(Path::new("new-plan.json"))?;
//!
//! let (report, _structured, has_diff) = compare_documents(&old, &new)?;
//! if has_diff {
//!     println!("{}", report);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod diff;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod show;
pub mod tree;

// Re-export commonly used types for convenience
pub use attributes::{compare_attributes, PRIORITY_ATTRIBUTES, SKIP_ATTRIBUTES};
pub use diff::{
    compare_documents, compute_plan_diff, Change, ChangeType, DiffStats, PlanDiff,
    ResourceChange, ResourceDiff, SectionDiff,
};
pub use error::{OutputError, ParseError, PlanDiffError};
pub use extract::{Section, Sections};
pub use normalize::normalize;
pub use output::{format_plan_diff, render_report, OutputFormat, OutputOptions};
pub use parser::{extract_payload, load_snapshot, parse_file, parse_json, parse_show_output};
pub use show::{PlanRenderer, ShowError};
pub use tree::Node;
