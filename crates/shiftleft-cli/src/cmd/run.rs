use crate::output::print_json;
use anyhow::Context;
use shiftleft_core::action::Action;
use shiftleft_core::orchestrator::Orchestrator;
use std::path::Path;

pub fn run(root: &Path, actions: &[Action], install: bool, json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(root).with_provisioner(super::provisioner(install));

    let report = orchestrator
        .run_with(actions, |i, total, action| {
            if !json {
                println!("==> [{i}/{total}] {}: {}", action.stage, action.summary);
            }
        })
        .context("pipeline aborted")?;

    if json {
        print_json(&report)?;
        return Ok(());
    }

    for action in &report.actions {
        if !action.installed.is_empty() {
            println!("    installed: {}", action.installed.join(", "));
        }
    }
    println!(
        "==> done: {} stage(s) passed in {} ms",
        report.actions.len(),
        report.duration_ms
    );
    Ok(())
}
