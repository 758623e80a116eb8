use std::path::Path;

use anyhow::{Context, Result};

use crate::fs::Repository;
use crate::utils::path::resolve_path;

/// Creates a new git repository in `directory` (relative to `cwd`), or in `cwd` if none is given.
///
/// # Errors
///
/// This function will fail if any of the operations related with the creation of directories and
/// files fail.
pub fn init(cwd: &Path, directory: Option<&Path>, branch: &str) -> Result<String> {
    let work_tree = match directory {
        Some(dir) => resolve_path(cwd, dir),
        None => cwd.to_owned(),
    };

    if Repository::open(&work_tree).is_ok() {
        return Ok("The directory is already a git repository".into());
    }

    Repository::init(&work_tree, branch).context("could not initialize repository")?;

    Ok("Initialized git directory".into())
}
