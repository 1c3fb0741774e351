use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// A pipeline stage selectable from the command line.
///
/// `All` expands to every concrete stage in [`Stage::pipeline`] order; every
/// other variant maps to exactly one action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    All,
    Talisman,
    Dependency,
    Python,
    Terraform,
    Ansible,
    Sonar,
    Docker,
    Sast,
    Dast,
    Jenkins,
    Monitoring,
    Deploy,
}

impl Stage {
    /// The concrete stages in execution order for `all`.
    pub fn pipeline() -> &'static [Stage] {
        &[
            Stage::Talisman,
            Stage::Dependency,
            Stage::Python,
            Stage::Terraform,
            Stage::Ansible,
            Stage::Sonar,
            Stage::Docker,
            Stage::Sast,
            Stage::Dast,
            Stage::Jenkins,
            Stage::Monitoring,
            Stage::Deploy,
        ]
    }

    /// Every accepted stage name, `all` first.
    pub fn names() -> Vec<&'static str> {
        std::iter::once(Stage::All)
            .chain(Stage::pipeline().iter().copied())
            .map(Stage::as_str)
            .collect()
    }

    pub fn expand(self) -> Vec<Stage> {
        match self {
            Stage::All => Stage::pipeline().to_vec(),
            other => vec![other],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::All => "all",
            Stage::Talisman => "talisman",
            Stage::Dependency => "dependency",
            Stage::Python => "python",
            Stage::Terraform => "terraform",
            Stage::Ansible => "ansible",
            Stage::Sonar => "sonar",
            Stage::Docker => "docker",
            Stage::Sast => "sast",
            Stage::Dast => "dast",
            Stage::Jenkins => "jenkins",
            Stage::Monitoring => "monitoring",
            Stage::Deploy => "deploy",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::All => "Run every stage in pipeline order",
            Stage::Talisman => "Scan the repository for committed secrets",
            Stage::Dependency => "Scan dependencies for known vulnerabilities",
            Stage::Python => "Run the Python test suite",
            Stage::Terraform => "Validate and plan infrastructure changes",
            Stage::Ansible => "Syntax-check and dry-run the Ansible playbook",
            Stage::Sonar => "Run SonarQube code quality analysis",
            Stage::Docker => "Build the container image and scan it",
            Stage::Sast => "Static application security testing",
            Stage::Dast => "Dynamic application security testing",
            Stage::Jenkins => "Trigger the Jenkins build job",
            Stage::Monitoring => "Install or upgrade the monitoring stack",
            Stage::Deploy => "Apply the Kubernetes deployment manifest",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Stage::All),
            "talisman" => Ok(Stage::Talisman),
            "dependency" => Ok(Stage::Dependency),
            "python" => Ok(Stage::Python),
            "terraform" => Ok(Stage::Terraform),
            "ansible" => Ok(Stage::Ansible),
            "sonar" => Ok(Stage::Sonar),
            "docker" => Ok(Stage::Docker),
            "sast" => Ok(Stage::Sast),
            "dast" => Ok(Stage::Dast),
            "jenkins" => Ok(Stage::Jenkins),
            "monitoring" => Ok(Stage::Monitoring),
            "deploy" => Ok(Stage::Deploy),
            other => Err(PipelineError::UnknownStage(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_order_is_fixed() {
        let names: Vec<&str> = Stage::pipeline().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "talisman",
                "dependency",
                "python",
                "terraform",
                "ansible",
                "sonar",
                "docker",
                "sast",
                "dast",
                "jenkins",
                "monitoring",
                "deploy",
            ]
        );
    }

    #[test]
    fn every_name_parses_back() {
        let names = Stage::names();
        assert_eq!(names.len(), 13);
        for name in names {
            let stage: Stage = name.parse().unwrap();
            assert_eq!(stage.as_str(), name);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        for bad in ["bogus", "", "ALL", "Terraform", " all", "dependency-check"] {
            let err = bad.parse::<Stage>().unwrap_err();
            assert!(matches!(err, PipelineError::UnknownStage(ref n) if n == bad));
        }
    }

    #[test]
    fn expand_all_and_single() {
        assert_eq!(Stage::All.expand().len(), 12);
        assert_eq!(Stage::Docker.expand(), vec![Stage::Docker]);
        assert!(!Stage::pipeline().contains(&Stage::All));
    }

    #[test]
    fn default_is_all() {
        assert_eq!(Stage::default(), Stage::All);
    }
}
