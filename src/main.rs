//! tfplan-diff command-line interface.
//!
//! Compares two saved Terraform plans (or their JSON snapshots) and prints
//! what changed in variables, resources and outputs.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tfplan_diff::output::NO_CHANGES_MESSAGE;
use tfplan_diff::{
    compare_documents, format_plan_diff, load_snapshot, Node, OutputFormat, OutputOptions,
    PlanRenderer,
};
use tracing_subscriber::EnvFilter;

/// tfplan-diff - Semantic diff for Terraform plans
///
/// Renders both plans with `terraform show -json` and compares their
/// variables, resources and outputs, ignoring key order and derived
/// checksum attributes.
#[derive(Parser)]
#[command(name = "tfplan-diff")]
#[command(version)]
#[command(about = "Semantic diff for Terraform plans", long_about = None)]
struct Cli {
    /// Original plan file
    #[arg(value_name = "OLD")]
    old: PathBuf,

    /// New plan file
    #[arg(value_name = "NEW")]
    new: PathBuf,

    /// Inputs are snapshot documents (captured `show -json` output, YAML or TOML) rather than plan files
    #[arg(short, long)]
    snapshot: bool,

    /// Terraform-compatible binary used to render plan files
    #[arg(long, env = "TFPLAN_DIFF_TERRAFORM", default_value = "terraform")]
    terraform_bin: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "terminal")]
    format: OutputFormatArg,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (print nothing when the plans are identical, no summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Colored terminal output
    Terminal,
    /// JSON structured diff
    Json,
    /// Plain text (no colors)
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let renderer = PlanRenderer::new(&cli.terraform_bin);

    let old = load(&cli.old, cli.snapshot, &renderer)
        .with_context(|| format!("Failed to load original plan: {}", cli.old.display()))?;
    let new = load(&cli.new, cli.snapshot, &renderer)
        .with_context(|| format!("Failed to load new plan: {}", cli.new.display()))?;

    let (_, diff, has_diff) = compare_documents(&old, &new).context("Failed to compare plans")?;

    let output_options = OutputOptions {
        format: cli.format.into(),
        summary: !cli.quiet,
    };

    if has_diff || cli.format == OutputFormatArg::Json {
        let output =
            format_plan_diff(&diff, &output_options).context("Failed to format diff output")?;
        println!("{}", output.trim_end());
    } else if !cli.quiet {
        println!("{}", NO_CHANGES_MESSAGE);
    }

    Ok(if has_diff { 1 } else { 0 })
}

fn load(path: &Path, snapshot: bool, renderer: &PlanRenderer) -> Result<Node> {
    let document = if snapshot {
        load_snapshot(path)?
    } else {
        renderer.load_plan(path)?
    };
    Ok(document)
}
