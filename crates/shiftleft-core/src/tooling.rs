//! Seams between the orchestrator and the host: finding binaries, installing
//! missing ones, and running them.
//!
//! Each seam is a trait with one real implementation backed by the process
//! search path and `std::process`. Tests substitute fakes.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::action::InstallRecipe;
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// ToolLocator
// ---------------------------------------------------------------------------

pub trait ToolLocator {
    /// Absolute path of `tool` if it is reachable, `None` otherwise.
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Looks tools up on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

// ---------------------------------------------------------------------------
// ToolProvisioner
// ---------------------------------------------------------------------------

pub trait ToolProvisioner {
    /// Best-effort install of `tool` using `recipe`. The caller re-checks
    /// availability afterwards, so success here does not imply the tool is
    /// now reachable.
    fn provision(&self, tool: &str, recipe: &InstallRecipe, workdir: &Path) -> Result<()>;
}

/// Runs the recipe's package-manager command with captured output.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageManagerProvisioner;

impl ToolProvisioner for PackageManagerProvisioner {
    fn provision(&self, tool: &str, recipe: &InstallRecipe, workdir: &Path) -> Result<()> {
        let installer = which::which(&recipe.program).map_err(|_| PipelineError::InstallFailed {
            tool: tool.to_string(),
            reason: format!("installer '{}' not found on PATH", recipe.program),
        })?;

        tracing::info!(tool, command = %recipe.command_line(), "installing missing tool");
        let output = Command::new(&installer)
            .args(&recipe.args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PipelineError::InstallFailed {
                tool: tool.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("'{}' exited with {}", recipe.command_line(), output.status),
                msg => stderr_tail(msg, 500),
            };
            return Err(PipelineError::InstallFailed {
                tool: tool.to_string(),
                reason,
            });
        }
        Ok(())
    }
}

/// Last `max` characters of `text`; installers print the actual error last.
fn stderr_tail(text: &str, max: usize) -> String {
    let skip = text.chars().count().saturating_sub(max);
    text.chars().skip(skip).collect()
}

// ---------------------------------------------------------------------------
// CommandExecutor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ToolExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandExecutor {
    /// Run `program` to completion, blocking until it exits.
    fn execute(&self, program: &Path, args: &[String], workdir: &Path) -> Result<ToolExit>;
}

/// Runs tools in the foreground with the parent's stdio, so their output
/// streams straight to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, program: &Path, args: &[String], workdir: &Path) -> Result<ToolExit> {
        let status = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| PipelineError::ToolSpawnFailed {
                tool: program.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(ToolExit {
            code: status.code(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
