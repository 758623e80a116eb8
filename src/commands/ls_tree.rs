use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::fs::ObjectStore;
use crate::hashing::Hash;
use crate::object::{ObjectKind, tree};

pub fn ls_tree(store: &ObjectStore, hash: &str, name_only: bool) -> Result<String> {
    let hash = Hash::from_str(hash).context("tree hash was invalid")?;
    let object = store
        .read(&hash)
        .context(format!("could not read object {}", hash))?;

    if object.kind != ObjectKind::Tree {
        bail!("{} is a {}, not a tree", hash, object.kind)
    }

    let entries = tree::from_bytes(&object.data).context("could not decode tree")?;
    Ok(if name_only {
        tree::display_names(&entries)
    } else {
        tree::display(&entries)
    })
}
