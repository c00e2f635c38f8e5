//! Rendering plan files with `terraform show -json`.

use crate::error::PlanDiffError;
use crate::parser::parse_show_output;
use crate::tree::Node;
use std::path::Path;
use std::process::Command;

/// Binary used when none is configured.
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

pub type ShowResult<T> = Result<T, ShowError>;

#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error("Plan file does not exist: {0}")]
    PlanNotFound(String),

    #[error("Failed to execute {bin}: {source}")]
    CommandFailed {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{bin} show exited with {status}: {stderr}")]
    NonZeroExit {
        bin: String,
        status: String,
        stderr: String,
    },
}

/// Runs `terraform show -json` against saved plan files.
#[derive(Debug, Clone)]
pub struct PlanRenderer {
    bin: String,
}

impl Default for PlanRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TERRAFORM_BIN)
    }
}

impl PlanRenderer {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Captures the stdout of `<bin> show -json <file name>`, run from the
    /// plan file's directory.
    pub fn show_json(&self, plan_file: &Path) -> ShowResult<String> {
        if !plan_file.exists() {
            return Err(ShowError::PlanNotFound(plan_file.display().to_string()));
        }

        let file_name = plan_file.file_name().unwrap_or(plan_file.as_os_str());
        let mut command = Command::new(&self.bin);
        command.arg("show").arg("-json").arg(file_name);
        if let Some(dir) = plan_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        tracing::info!(bin = %self.bin, plan = %plan_file.display(), "running show");

        let output = command.output().map_err(|source| ShowError::CommandFailed {
            bin: self.bin.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ShowError::NonZeroExit {
                bin: self.bin.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Renders a plan file and parses the result into a snapshot document.
    pub fn load_plan(&self, plan_file: &Path) -> Result<Node, PlanDiffError> {
        let output = self.show_json(plan_file)?;
        tracing::debug!(bytes = output.len(), "captured show output");
        parse_show_output(&output, &plan_file.display().to_string())
    }
}
