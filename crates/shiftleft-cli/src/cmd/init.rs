use anyhow::Context;
use shiftleft_core::config::Config;
use shiftleft_core::paths;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let written = Config::init(root).context("failed to write config")?;
    let path = paths::config_path(root);
    if written {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, leaving it unchanged", path.display());
    }
    Ok(())
}
