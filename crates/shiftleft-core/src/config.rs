use crate::error::{PipelineError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Section types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Falls back to the project root's directory name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Container image tag; `<project>:latest` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_dast_target")]
    pub dast_target: String,
}

fn default_dast_target() -> String {
    "http://localhost:3000".to_string()
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            image: None,
            dast_target: default_dast_target(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsConfig {
    #[serde(default = "default_jenkins_url")]
    pub url: String,
    /// Job name; the project name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

fn default_jenkins_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: default_jenkins_url(),
            job: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsibleConfig {
    #[serde(default = "default_playbook")]
    pub playbook: String,
    #[serde(default = "default_inventory")]
    pub inventory: String,
}

fn default_playbook() -> String {
    "playbook.yml".to_string()
}

fn default_inventory() -> String {
    "inventory.ini".to_string()
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        Self {
            playbook: default_playbook(),
            inventory: default_inventory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_release")]
    pub release: String,
    #[serde(default = "default_chart")]
    pub chart: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_release() -> String {
    "monitoring".to_string()
}

fn default_chart() -> String {
    "prometheus-community/kube-prometheus-stack".to_string()
}

fn default_namespace() -> String {
    "monitoring".to_string()
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            release: default_release(),
            chart: default_chart(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

fn default_manifest() -> String {
    "k8s/deployment.yml".to_string()
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Attempt the tool's install recipe when it is missing from PATH.
    #[serde(default = "default_install_enabled")]
    pub enabled: bool,
}

fn default_install_enabled() -> bool {
    true
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            enabled: default_install_enabled(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub jenkins: JenkinsConfig,
    #[serde(default)]
    pub ansible: AnsibleConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub install: InstallConfig,
    /// Usage errors (unknown flag or stage) exit 2 instead of 0.
    #[serde(default)]
    pub strict_usage: bool,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: Some(project_name.into()),
            },
            targets: TargetsConfig::default(),
            jenkins: JenkinsConfig::default(),
            ansible: AnsibleConfig::default(),
            monitoring: MonitoringConfig::default(),
            kubernetes: KubernetesConfig::default(),
            install: InstallConfig::default(),
            strict_usage: false,
        }
    }

    /// Load `.shiftleft/config.yaml` under `root`, or defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::new(paths::default_project_name(root)));
        }
        let data = std::fs::read_to_string(&path)?;
        let mut cfg: Config = serde_yaml::from_str(&data)?;
        if cfg.project.name.is_none() {
            cfg.project.name = Some(paths::default_project_name(root));
        }
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config for `root` unless one exists. Returns true if written.
    pub fn init(root: &Path) -> Result<bool> {
        let path = paths::config_path(root);
        let cfg = Self::new(paths::default_project_name(root));
        let data = serde_yaml::to_string(&cfg)?;
        crate::io::write_if_missing(&path, data.as_bytes())
    }

    pub fn project_name(&self) -> &str {
        self.project.name.as_deref().unwrap_or("app")
    }

    pub fn image(&self) -> String {
        match &self.targets.image {
            Some(image) => image.clone(),
            None => format!("{}:latest", self.project_name()),
        }
    }

    pub fn jenkins_job(&self) -> &str {
        self.jenkins.job.as_deref().unwrap_or(self.project_name())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if self.project_name().trim().is_empty() {
            error("project.name is empty".to_string());
        }
        if self.image().trim().is_empty() || self.image().contains(char::is_whitespace) {
            error(format!("targets.image '{}' is not a valid image tag", self.image()));
        }
        if self.ansible.playbook.trim().is_empty() {
            error("ansible.playbook is empty".to_string());
        }
        if self.kubernetes.manifest.trim().is_empty() {
            error("kubernetes.manifest is empty".to_string());
        }
        if self.monitoring.namespace.trim().is_empty() {
            error("monitoring.namespace is empty".to_string());
        }

        for (key, url) in [
            ("targets.dast_target", &self.targets.dast_target),
            ("jenkins.url", &self.jenkins.url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{key} '{url}' is not an http(s) URL"),
                });
            }
        }

        warnings
    }

    /// Fail with [`PipelineError::InvalidConfig`] when validation reports errors.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidConfig(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        let expected = paths::default_project_name(dir.path());
        assert_eq!(cfg.project_name(), expected);
        assert_eq!(cfg.image(), format!("{expected}:latest"));
        assert_eq!(cfg.kubernetes.manifest, "k8s/deployment.yml");
        assert!(cfg.install.enabled);
        assert!(!cfg.strict_usage);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".shiftleft")).unwrap();
        std::fs::write(
            paths::config_path(dir.path()),
            "jenkins:\n  job: nightly\ninstall:\n  enabled: false\nstrict_usage: true\n",
        )
        .unwrap();

        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.jenkins_job(), "nightly");
        assert_eq!(cfg.jenkins.url, "http://localhost:8080");
        assert!(!cfg.install.enabled);
        assert!(cfg.strict_usage);
        assert_eq!(cfg.project_name(), paths::default_project_name(dir.path()));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".shiftleft")).unwrap();
        std::fs::write(paths::config_path(dir.path()), "version: [not a number").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(PipelineError::Yaml(_))
        ));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        assert!(Config::init(dir.path()).unwrap());
        assert!(!Config::init(dir.path()).unwrap());
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
    }

    #[test]
    fn save_then_load_keeps_overrides() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("shop");
        cfg.targets.image = Some("registry.local/shop:1.2".to_string());
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project_name(), "shop");
        assert_eq!(loaded.image(), "registry.local/shop:1.2");
    }

    #[test]
    fn validate_flags_bad_urls_as_warnings() {
        let mut cfg = Config::new("shop");
        cfg.jenkins.url = "jenkins.internal".to_string();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("jenkins.url"));
        assert!(cfg.ensure_valid().is_ok());
    }

    #[test]
    fn validate_flags_empty_fields_as_errors() {
        let mut cfg = Config::new("shop");
        cfg.kubernetes.manifest = " ".to_string();
        cfg.targets.image = Some("bad image".to_string());
        let err = cfg.ensure_valid().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("kubernetes.manifest"));
        assert!(msg.contains("targets.image"));
    }
}
