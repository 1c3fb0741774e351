//! Stage registry: maps each stage to the fixed command lines behind it.
//!
//! Command lines are hard-coded; configuration only fills in names such as
//! the project, image tag, or manifest path.

use crate::action::{Action, InstallRecipe, Invocation, Tool};
use crate::config::Config;
use crate::error::Result;
use crate::stage::Stage;

/// Resolve a stage name to its ordered list of actions.
///
/// Named stages yield exactly one action; `all` yields the twelve pipeline
/// actions in fixed order. Unknown names fail with `UnknownStage`.
pub fn resolve(stage_name: &str, config: &Config) -> Result<Vec<Action>> {
    let stage: Stage = stage_name.parse()?;
    Ok(resolve_stage(stage, config))
}

pub fn resolve_stage(stage: Stage, config: &Config) -> Vec<Action> {
    stage
        .expand()
        .into_iter()
        .map(|s| action_for(s, config))
        .collect()
}

/// Build the action for one concrete stage. `Stage::All` has no action of
/// its own and is expanded to the full pipeline by [`resolve_stage`].
pub fn action_for(stage: Stage, config: &Config) -> Action {
    let project = config.project_name();
    let (tools, steps) = match stage {
        Stage::All => (Vec::new(), Vec::new()),
        Stage::Talisman => (
            vec![Tool::new("talisman")],
            vec![Invocation::new("talisman", ["--scan"])],
        ),
        Stage::Dependency => (
            vec![Tool::new("dependency-check")],
            vec![Invocation::new(
                "dependency-check",
                [
                    "--project", project, "--scan", ".", "--format", "HTML", "--out", ".",
                ],
            )],
        ),
        Stage::Python => (
            vec![Tool::installable("pytest", InstallRecipe::pip("pytest"))],
            vec![Invocation::new("pytest", Vec::<String>::new())],
        ),
        Stage::Terraform => (
            vec![Tool::new("terraform")],
            vec![
                Invocation::new("terraform", ["init", "-input=false"]),
                Invocation::new("terraform", ["validate"]),
                Invocation::new("terraform", ["plan", "-input=false", "-out=tfplan.out"]),
            ],
        ),
        Stage::Ansible => {
            let inventory = config.ansible.inventory.as_str();
            let playbook = config.ansible.playbook.as_str();
            (
                vec![Tool::installable(
                    "ansible-playbook",
                    InstallRecipe::pip("ansible"),
                )],
                vec![
                    Invocation::new(
                        "ansible-playbook",
                        ["--syntax-check", "-i", inventory, playbook],
                    ),
                    Invocation::new("ansible-playbook", ["--check", "-i", inventory, playbook]),
                ],
            )
        }
        Stage::Sonar => (
            vec![Tool::new("sonar-scanner")],
            vec![Invocation::new(
                "sonar-scanner",
                [
                    format!("-Dsonar.projectKey={project}"),
                    "-Dsonar.sources=.".to_string(),
                ],
            )],
        ),
        Stage::Docker => {
            let image = config.image();
            (
                vec![Tool::new("docker"), Tool::new("trivy"), Tool::new("grype")],
                vec![
                    Invocation::new("docker", ["build", "-t", image.as_str(), "."]),
                    Invocation::new("trivy", ["image", image.as_str()]),
                    Invocation::new("grype", [image.as_str()]),
                ],
            )
        }
        Stage::Sast => (
            vec![Tool::installable("semgrep", InstallRecipe::pip("semgrep"))],
            vec![Invocation::new(
                "semgrep",
                ["scan", "--config", "auto", "--error", "."],
            )],
        ),
        Stage::Dast => (
            vec![Tool::new("zap-baseline.py")],
            vec![Invocation::new(
                "zap-baseline.py",
                ["-t", config.targets.dast_target.as_str()],
            )],
        ),
        Stage::Jenkins => {
            let url = format!(
                "{}/job/{}/build",
                config.jenkins.url.trim_end_matches('/'),
                config.jenkins_job()
            );
            (
                vec![Tool::new("curl")],
                vec![Invocation::new("curl", ["-fsS", "-X", "POST", url.as_str()])],
            )
        }
        Stage::Monitoring => {
            let m = &config.monitoring;
            (
                vec![Tool::new("helm")],
                vec![Invocation::new(
                    "helm",
                    [
                        "upgrade",
                        "--install",
                        m.release.as_str(),
                        m.chart.as_str(),
                        "--namespace",
                        m.namespace.as_str(),
                        "--create-namespace",
                    ],
                )],
            )
        }
        Stage::Deploy => (
            vec![Tool::new("kubectl")],
            vec![Invocation::new(
                "kubectl",
                ["apply", "-f", config.kubernetes.manifest.as_str()],
            )],
        ),
    };

    Action {
        stage,
        summary: stage.description().to_string(),
        tools,
        steps,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
