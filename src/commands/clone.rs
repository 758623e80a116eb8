use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::Config;
use crate::fs::Repository;
use crate::object::tree::checkout_commit;
use crate::pack;
use crate::transport::RemoteClient;
use crate::utils::path::resolve_path;

/// Clones the repository at `url` into `directory` (relative to `cwd`).
///
/// # Errors
///
/// This function will fail if `directory` exists and is not empty, or if any step of fetching,
/// unpacking or checking out the remote history fails.
pub fn clone(cwd: &Path, url: &str, directory: &Path, config: &Config) -> Result<String> {
    let target = resolve_path(cwd, directory);
    let client = RemoteClient::new(url, config.http_timeout)
        .context("could not create http client")?;

    let head = clone_into(&client, &target, &config.default_branch)?;

    Ok(format!("Cloned {} at {} into {:?}", url, head, target))
}

fn ensure_empty(target: &Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }
    if !target.is_dir() {
        bail!("{:?} already exists and is not a directory", target)
    }
    let mut entries = fs::read_dir(target).context(format!("could not read {:?}", target))?;
    if entries.next().is_some() {
        bail!("destination {:?} already exists and is not empty", target)
    }
    Ok(())
}

/// Fetches the head of `branch` from `client` into a new repository at `target`, returning the
/// hash of the checked out commit.
pub fn clone_into(client: &RemoteClient, target: &Path, branch: &str) -> Result<String> {
    ensure_empty(target)?;

    let repo = Repository::init(target, branch)?;
    let store = repo.store();

    let head = client
        .discover_head(branch)
        .context(format!("could not discover refs of {}", client.base_url()))?;
    let pack_bytes = client
        .request_pack(&head)
        .context(format!("could not fetch pack for {}", head))?;

    let entries = pack::parse(&pack_bytes).context("could not decode pack")?;
    let summary = pack::resolve(&store, entries).context("could not unpack objects")?;
    log::info!(
        "unpacked {} objects ({} from deltas) in {} passes",
        summary.objects + summary.deltas,
        summary.deltas,
        summary.passes
    );

    repo.update_branch(branch, &head)?;
    checkout_commit(&store, &head, repo.work_tree())
        .context(format!("could not check out {}", head))?;

    Ok(head.to_string())
}
