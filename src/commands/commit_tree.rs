use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::config::Config;
use crate::fs::ObjectStore;
use crate::hashing::Hash;
use crate::object::commit::{self, CommitUser, CommitUserKind};
use crate::object::{Object, ObjectKind};

fn existing(store: &ObjectStore, hash: &str, kind: ObjectKind) -> Result<Hash> {
    let hash = Hash::from_str(hash).context(format!("{} hash was invalid", kind))?;
    let object = store
        .read(&hash)
        .context(format!("could not read {} {}", kind, hash))?;
    if object.kind != kind {
        bail!("{} is a {}, not a {}", hash, object.kind, kind)
    }
    Ok(hash)
}

/// Writes a commit pointing to `tree`, returning its hash.
pub fn commit_tree(
    store: &ObjectStore,
    tree: &str,
    parent: Option<&str>,
    message: &str,
    config: &Config,
) -> Result<String> {
    let tree = existing(store, tree, ObjectKind::Tree)?;
    let parent = parent
        .map(|p| existing(store, p, ObjectKind::Commit))
        .transpose()?;

    let author = CommitUser::now(
        CommitUserKind::Author,
        &config.author_name,
        &config.author_email,
    );
    let committer = CommitUser {
        kind: CommitUserKind::Committer,
        ..author.clone()
    };

    let payload = commit::as_bytes(&tree, parent.as_ref(), &author, &committer, message)
        .context("could not encode commit")?;
    let hash = store
        .write(&Object::new(ObjectKind::Commit, payload))
        .context("could not write commit")?;

    Ok(hash.to_string())
}
