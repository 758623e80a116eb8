mod cat_file;
mod clone;
mod commit_tree;
mod hash_object;
mod init;
mod ls_tree;
mod write_tree;

use std::env;

use anyhow::{Context, Result};

use cat_file::cat_file;
use clone::clone;
use commit_tree::commit_tree;
use hash_object::hash_object;
use init::init;
use ls_tree::ls_tree;
use write_tree::write_tree;

use crate::args::Command;
use crate::config::Config;
use crate::fs::Repository;

/// What a command prints on success.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
    /// Text printed followed by a newline, nothing is printed if it is empty
    Message(String),
    /// Bytes written as they are
    Raw(Vec<u8>),
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Output::Message(value)
    }
}

/// Calls the corresponding function to perform every command variant.
///
/// # Errors
///
/// This function will fail if any of the executed commands return an error.
pub fn execute_command(command: &Command, config: &Config) -> Result<Output> {
    let cwd = env::current_dir().context("could not get current directory")?;
    let open_repository = || Repository::open(&cwd);

    let output = match command {
        Command::Init { directory } => {
            init(&cwd, directory.as_deref(), &config.default_branch)?.into()
        }
        Command::CatFile { hash } => cat_file(&open_repository()?.store(), hash)?,
        Command::HashObject { write, path } => {
            let store = if *write {
                Some(open_repository()?.store())
            } else {
                None
            };
            hash_object(&cwd.join(path), store.as_ref())?.into()
        }
        Command::LsTree { name_only, hash } => {
            ls_tree(&open_repository()?.store(), hash, *name_only)?.into()
        }
        Command::WriteTree => write_tree(&open_repository()?)?.into(),
        Command::CommitTree {
            tree,
            parent,
            message,
        } => commit_tree(
            &open_repository()?.store(),
            tree,
            parent.as_deref(),
            message,
            config,
        )?
        .into(),
        Command::Clone { url, directory } => clone(&cwd, url, directory, config)?.into(),
    };

    Ok(output)
}
