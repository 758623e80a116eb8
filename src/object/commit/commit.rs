use std::rc::Rc;
use std::str::FromStr;

use crate::hashing::Hash;
use crate::{Error, Result};

use super::*;

/// Returns the payload of a commit object, with the following format:
///
/// tree {`tree_hash`}
/// parent {`parent_hash`} (only if there is a parent)
/// author {`author.identifier`} {`author.timestamp`} {`author.timezone`}
/// committer {`committer.identifier`} {`committer.timestamp`} {`committer.timezone`}
///
/// {`message`}
pub fn as_bytes(
    tree_hash: &Hash,
    parent: Option<&Hash>,
    author: &CommitUser,
    committer: &CommitUser,
    message: &str,
) -> Result<Rc<[u8]>> {
    let mut commit = format!("{} {}\n", TREE_STR, tree_hash);
    if let Some(hash) = parent {
        commit.push_str(&format!("{} {}\n", PARENT_STR, hash));
    }
    commit.push_str(&author.to_line()?);
    commit.push('\n');
    commit.push_str(&committer.to_line()?);
    commit.push_str("\n\n");
    commit.push_str(message);
    if !message.ends_with('\n') {
        commit.push('\n');
    }

    Ok(commit.as_bytes().into())
}

/// Extracts the hash in the `tree` line of a commit payload. Nothing else is parsed.
///
/// # Errors
///
/// This function will fail if the header of the commit has no `tree` line or its hash is invalid.
pub fn tree_hash(payload: &[u8]) -> Result<Hash> {
    let header_end = payload
        .windows(2)
        .position(|w| w == b"\n\n")
        .unwrap_or(payload.len());
    let header = String::from_utf8_lossy(&payload[..header_end]);

    for line in header.lines() {
        if let Some((key, value)) = line.split_once(' ') {
            if key == TREE_STR {
                return Hash::from_str(value.trim()).map_err(|_| {
                    Error::Formatting(format!("commit has an invalid tree hash {:?}", value))
                });
            }
        }
    }

    Err(Error::Formatting("commit does not have a tree line".into()))
}
