use anyhow::{Context, Result};

use crate::fs::Repository;
use crate::object::tree::TreeBuilder;

/// Snapshots the working tree, returning the hash of the root tree.
pub fn write_tree(repo: &Repository) -> Result<String> {
    let store = repo.store();
    let hash = TreeBuilder::new(&store)
        .build_and_write(repo.work_tree())
        .context("could not write working tree")?;
    Ok(hash.to_string())
}
