use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::Constants;
use crate::hashing::Hash;

use super::ObjectStore;

/// Branch names become paths under `refs/heads`, so only plain relative components are allowed.
fn check_branch_name(branch: &str) -> Result<()> {
    let valid = !branch.is_empty()
        && Path::new(branch)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !valid {
        bail!("{:?} is not a valid branch name", branch)
    }
    Ok(())
}

/// A working tree together with its repository folder.
#[derive(Debug, Clone)]
pub struct Repository {
    work_tree: PathBuf,
}

impl Repository {
    /// Creates the repository folder structure inside of `work_tree`, making `branch` the branch
    /// HEAD points to.
    ///
    /// An already existing HEAD file is not overwritten.
    ///
    /// # Errors
    ///
    /// This function will fail if any of the directories or the HEAD file could not be created.
    pub fn init(work_tree: &Path, branch: &str) -> Result<Self> {
        check_branch_name(branch)?;
        let repo = Self {
            work_tree: work_tree.to_owned(),
        };

        for p in [repo.objects_path(), repo.heads_path()] {
            fs::create_dir_all(&p).context(format!(
                "could not create repository subdirectories, specifically: {:?}",
                p
            ))?;
        }

        let head = repo.head_path();
        if !head.exists() {
            fs::write(&head, Constants::head_content(branch))
                .context("could not write to HEAD when initializing")?;
        }

        Ok(repo)
    }

    /// Opens the repository whose working tree is `work_tree`.
    ///
    /// # Errors
    ///
    /// This function will fail if `work_tree` does not contain a repository folder.
    pub fn open(work_tree: &Path) -> Result<Self> {
        let repo = Self {
            work_tree: work_tree.to_owned(),
        };
        if !repo.git_dir().is_dir() {
            bail!("{:?} is not a git repository", work_tree)
        }
        Ok(repo)
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    pub fn git_dir(&self) -> PathBuf {
        self.work_tree.join(Constants::REPOSITORY_FOLDER_NAME)
    }

    pub fn objects_path(&self) -> PathBuf {
        self.git_dir().join(Constants::OBJECTS_FOLDER_NAME)
    }

    pub fn heads_path(&self) -> PathBuf {
        self.git_dir()
            .join(Constants::REFS_FOLDER_NAME)
            .join(Constants::HEADS_FOLDER_NAME)
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_dir().join(Constants::HEAD_FILE_NAME)
    }

    pub fn store(&self) -> ObjectStore {
        ObjectStore::new(self.objects_path())
    }

    /// Makes `refs/heads/<branch>` point to `hash`.
    pub fn update_branch(&self, branch: &str, hash: &Hash) -> Result<()> {
        check_branch_name(branch)?;
        let path = self.heads_path().join(branch);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create refs directory")?;
        }
        fs::write(&path, format!("{}\n", hash))
            .context(format!("could not update branch {:?}", branch))?;
        Ok(())
    }
}
