use std::path::{Path, PathBuf};

pub const SHIFTLEFT_DIR: &str = ".shiftleft";
pub const CONFIG_FILE: &str = ".shiftleft/config.yaml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Name used when the config does not set `project.name`.
pub fn default_project_name(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("app")
        .to_string()
}
