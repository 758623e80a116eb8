use std::fs;
use std::path::Path;

use crate::Constants;
use crate::Result;
use crate::fs::ObjectStore;
use crate::hashing::Hash;
use crate::object::{Object, ObjectKind};

use super::entry::{self, EntryMode, TreeEntry};

/// Snapshots directories into tree objects, writing every blob and subtree to the store on the
/// way.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    store: &'a ObjectStore,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Builds the tree for `dir` and all the directories inside of it, returning the hash of the
    /// root tree.
    ///
    /// The repository folder is skipped. Files are stored as regular file blobs no matter their
    /// permissions.
    ///
    /// # Errors
    ///
    /// This function can fail if a directory or file could not be read or an object could not be
    /// written.
    pub fn build_and_write(&self, dir: &Path) -> Result<Hash> {
        let mut entries = Vec::new();

        for direntry in fs::read_dir(dir)? {
            let direntry = direntry?;
            let name = direntry.file_name();
            if name == Constants::REPOSITORY_FOLDER_NAME {
                continue;
            }

            let path = direntry.path();
            let entry = if path.is_dir() {
                TreeEntry::new(EntryMode::Directory, name, self.build_and_write(&path)?)
            } else {
                let data = fs::read(&path)?;
                let hash = self.store.write(&Object::new(ObjectKind::Blob, data))?;
                TreeEntry::new(EntryMode::Regular, name, hash)
            };
            entries.push(entry);
        }

        entries.sort_by(|a, b| a.name_bytes().cmp(b.name_bytes()));

        let payload = entry::as_bytes(&entries)?;
        let hash = self.store.write(&Object::new(ObjectKind::Tree, payload))?;
        log::debug!("built tree {} for {:?} ({} entries)", hash, dir, entries.len());
        Ok(hash)
    }
}
