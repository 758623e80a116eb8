use std::str::FromStr;

use anyhow::{Context, Result};

use crate::fs::ObjectStore;
use crate::hashing::Hash;
use crate::object::{ObjectKind, tree};

use super::Output;

/// Returns the payload of the object with the given hash. Trees are shown one entry per line
/// since their payload is binary.
pub fn cat_file(store: &ObjectStore, hash: &str) -> Result<Output> {
    let hash = Hash::from_str(hash).context("object hash was invalid")?;

    let object = store
        .read(&hash)
        .context(format!("could not read object {}", hash))?;

    match object.kind {
        ObjectKind::Tree => {
            let entries = tree::from_bytes(&object.data).context("could not decode tree")?;
            Ok(Output::Message(tree::display(&entries)))
        }
        _ => Ok(Output::Raw(object.data.to_vec())),
    }
}
