use std::path::Path;

use anyhow::{Context, Result};

use crate::fs::ObjectStore;
use crate::object::{Object, ObjectKind};

/// Returns the hash `path` has as a blob, writing the blob to `store` if one is given.
pub fn hash_object(path: &Path, store: Option<&ObjectStore>) -> Result<String> {
    let data = std::fs::read(path).context(format!("could not read {:?}", path))?;
    let blob = Object::new(ObjectKind::Blob, data);

    let hash = match store {
        Some(store) => store.write(&blob).context("could not write blob")?,
        None => blob.hash().context("could not hash blob")?,
    };

    Ok(hash.to_string())
}
