//! Fail-fast sequential runner for resolved actions.
//!
//! Every tool an action needs is located (and, when allowed, installed)
//! before the action's first step runs. The first failing action ends the
//! run; nothing after it is attempted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::action::Action;
use crate::error::{PipelineError, Result};
use crate::stage::Stage;
use crate::tooling::{
    CommandExecutor, PackageManagerProvisioner, PathLocator, ProcessExecutor, ToolLocator,
    ToolProvisioner,
};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub stage: Stage,
    /// Command lines that ran, in order.
    pub steps: Vec<String>,
    /// Tools installed by the provisioner during this action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installed: Vec<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub actions: Vec<ActionReport>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStatus {
    pub stage: Stage,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub installable: bool,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    workdir: PathBuf,
    locator: Box<dyn ToolLocator>,
    provisioner: Option<Box<dyn ToolProvisioner>>,
    executor: Box<dyn CommandExecutor>,
}

impl Orchestrator {
    /// Orchestrator backed by `PATH`, pip-style installs, and real processes.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            locator: Box::new(PathLocator),
            provisioner: Some(Box::new(PackageManagerProvisioner)),
            executor: Box::new(ProcessExecutor),
        }
    }

    pub fn with_locator(mut self, locator: impl ToolLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// `None` disables auto-install: missing tools fail with `ToolMissing`.
    pub fn with_provisioner(mut self, provisioner: Option<Box<dyn ToolProvisioner>>) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn with_executor(mut self, executor: impl CommandExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run `actions` in order, stopping at the first failure.
    pub fn run(&self, actions: &[Action]) -> Result<RunReport> {
        self.run_with(actions, |_, _, _| {})
    }

    /// Like [`Orchestrator::run`], calling `on_start(index, total, action)`
    /// before each action.
    pub fn run_with<F>(&self, actions: &[Action], mut on_start: F) -> Result<RunReport>
    where
        F: FnMut(usize, usize, &Action),
    {
        let run_id = uuid::Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        tracing::info!(%run_id, actions = actions.len(), "pipeline run started");

        let mut reports = Vec::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            on_start(i + 1, actions.len(), action);
            let report = self.run_action(action).inspect_err(|e| {
                tracing::info!(%run_id, stage = %action.stage, error = %e, "aborting run");
            })?;
            reports.push(report);
        }

        Ok(RunReport {
            run_id,
            started_at,
            actions: reports,
            duration_ms: clock.elapsed().as_millis() as u64,
        })
    }

    /// Check and, where allowed, install every tool, then run each step.
    pub fn run_action(&self, action: &Action) -> Result<ActionReport> {
        let clock = Instant::now();
        let stage = action.stage;
        tracing::info!(%stage, "stage started");

        let mut resolved: Vec<(String, PathBuf)> = Vec::with_capacity(action.tools.len());
        let mut installed = Vec::new();
        for tool in &action.tools {
            let path = match self.locator.locate(&tool.name) {
                Some(path) => path,
                None => {
                    let path = self.install(stage, &tool.name, tool.install.as_ref())?;
                    installed.push(tool.name.clone());
                    path
                }
            };
            tracing::debug!(tool = %tool.name, path = %path.display(), "resolved tool");
            resolved.push((tool.name.clone(), path));
        }

        let mut steps = Vec::with_capacity(action.steps.len());
        for step in &action.steps {
            let program = resolved
                .iter()
                .find(|(name, _)| *name == step.program)
                .map(|(_, path)| path.clone())
                .ok_or_else(|| PipelineError::ToolMissing {
                    tool: step.program.clone(),
                    stage: stage.to_string(),
                })?;

            tracing::info!(%stage, command = %step.command_line(), "running");
            let exit = self.executor.execute(&program, &step.args, &self.workdir)?;
            if !exit.success() {
                return Err(PipelineError::ToolExecution {
                    tool: step.program.clone(),
                    stage: stage.to_string(),
                    code: exit.code,
                });
            }
            steps.push(step.command_line());
        }

        let duration_ms = clock.elapsed().as_millis() as u64;
        tracing::info!(%stage, duration_ms, "stage finished");
        Ok(ActionReport {
            stage,
            steps,
            installed,
            duration_ms,
        })
    }

    /// Report availability of every tool the actions need. Installs and
    /// runs nothing.
    pub fn preflight(&self, actions: &[Action]) -> Vec<ToolStatus> {
        actions
            .iter()
            .flat_map(|action| {
                action.tools.iter().map(move |tool| ToolStatus {
                    stage: action.stage,
                    tool: tool.name.clone(),
                    path: self.locator.locate(&tool.name),
                    installable: tool.install.is_some() && self.provisioner.is_some(),
                })
            })
            .collect()
    }

    fn install(
        &self,
        stage: Stage,
        tool: &str,
        recipe: Option<&crate::action::InstallRecipe>,
    ) -> Result<PathBuf> {
        let (Some(provisioner), Some(recipe)) = (self.provisioner.as_ref(), recipe) else {
            return Err(PipelineError::ToolMissing {
                tool: tool.to_string(),
                stage: stage.to_string(),
            });
        };

        provisioner.provision(tool, recipe, &self.workdir)?;
        self.locator
            .locate(tool)
            .ok_or_else(|| PipelineError::InstallFailed {
                tool: tool.to_string(),
                reason: format!(
                    "still not on PATH after '{}'",
                    recipe.command_line()
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
