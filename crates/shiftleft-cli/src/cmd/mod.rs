pub mod check;
pub mod init;
pub mod list;
pub mod run;

use shiftleft_core::tooling::{PackageManagerProvisioner, ToolProvisioner};

/// The provisioner for this invocation, or `None` when installs are off.
fn provisioner(install: bool) -> Option<Box<dyn ToolProvisioner>> {
    install.then(|| Box::new(PackageManagerProvisioner) as Box<dyn ToolProvisioner>)
}
