use crate::output::{print_json, print_table};
use shiftleft_core::action::Action;
use shiftleft_core::orchestrator::Orchestrator;
use std::path::Path;

pub fn run(root: &Path, actions: &[Action], install: bool, json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(root).with_provisioner(super::provisioner(install));
    let statuses = orchestrator.preflight(actions);

    if json {
        print_json(&statuses)?;
    } else {
        let rows: Vec<Vec<String>> = statuses
            .iter()
            .map(|s| {
                let status = match (s.is_available(), s.installable) {
                    (true, _) => "ok",
                    (false, true) => "missing (installable)",
                    (false, false) => "missing",
                };
                let path = s
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                vec![s.stage.to_string(), s.tool.clone(), status.to_string(), path]
            })
            .collect();
        print_table(&["STAGE", "TOOL", "STATUS", "PATH"], &rows);
    }

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| !s.is_available())
        .map(|s| s.tool.as_str())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "{} required tool(s) missing: {}",
            missing.len(),
            missing.join(", ")
        );
    }
    Ok(())
}
