use std::path::{Path, PathBuf};

/// Resolve the project root tools run in.
///
/// Priority:
/// 1. `--root` flag / `SHIFTLEFT_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of the cwd containing `.shiftleft/`
/// 3. Nearest ancestor of the cwd containing `.git/`
/// 4. The cwd itself
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_root_from(explicit, &cwd)
}

fn resolve_root_from(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    find_ancestor_with(cwd, shiftleft_core::paths::SHIFTLEFT_DIR)
        .or_else(|| find_ancestor_with(cwd, ".git"))
        .unwrap_or_else(|| cwd.to_path_buf())
}

fn find_ancestor_with(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}
