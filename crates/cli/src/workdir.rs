// Path: crates/cli/src/workdir.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Prefix of every run's working directory.
pub const WORKING_DIR_PREFIX: &str = "jnode_VIT_";

/// The directory holding the running executable.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("{} has no parent directory", exe.display()))
}

/// Creates a fresh, uniquely named working directory under `parent`.
///
/// The directory outlives the process so the node can be restarted from it
/// by hand.
pub fn create_working_dir(parent: &Path) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(WORKING_DIR_PREFIX)
        .tempdir_in(parent)
        .with_context(|| format!("creating working directory in {}", parent.display()))?
        .keep();
    tracing::info!(target: "cli", path = %dir.display(), "working directory created");
    Ok(dir)
}
