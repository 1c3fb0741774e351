use crate::output::{print_json, print_table};
use shiftleft_core::action::Action;

/// Show what the resolved stage would run. Nothing is executed.
pub fn run(actions: &[Action], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&actions);
    }

    let rows: Vec<Vec<String>> = actions
        .iter()
        .flat_map(|action| {
            action.steps.iter().enumerate().map(move |(i, step)| {
                let stage = if i == 0 {
                    action.stage.to_string()
                } else {
                    String::new()
                };
                vec![stage, step.command_line()]
            })
        })
        .collect();
    print_table(&["STAGE", "COMMAND"], &rows);
    Ok(())
}
