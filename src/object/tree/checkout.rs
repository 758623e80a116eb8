use std::fs;
use std::path::Path;

use crate::fs::ObjectStore;
use crate::hashing::Hash;
use crate::object::commit;
use crate::object::{Object, ObjectKind};
use crate::{Constants, Error, Result};

use super::entry::{self, EntryMode, TreeEntry};

/// Reads `hash` from the store and checks it is an object of kind `kind`.
fn read_kind(store: &ObjectStore, hash: &Hash, kind: ObjectKind) -> Result<Object> {
    let object = store.read(hash)?;
    if object.kind != kind {
        return Err(Error::DataConsistency(format!(
            "expected {} to be a {}, but it is a {}",
            hash, kind, object.kind
        )));
    }
    Ok(object)
}

/// Entry names come from untrusted trees, they must not escape the destination directory nor
/// reach into a repository folder.
fn check_entry_name(entry: &TreeEntry) -> Result<()> {
    let name = entry.name_bytes();
    if name.is_empty()
        || name == b"."
        || name == b".."
        || name.contains(&b'/')
        || name.eq_ignore_ascii_case(Constants::REPOSITORY_FOLDER_NAME.as_bytes())
    {
        return Err(Error::DataConsistency(format!(
            "refusing to check out tree entry named {:?}",
            entry.name
        )));
    }
    Ok(())
}

/// Materializes the tree `hash` inside of `destination`, creating directories as needed and
/// overwriting files that already exist.
///
/// # Errors
///
/// This function will fail with `Error::ObjectNotFound` if the tree, or any object it references,
/// is missing from the store.
pub fn checkout(store: &ObjectStore, hash: &Hash, destination: &Path) -> Result<()> {
    let object = read_kind(store, hash, ObjectKind::Tree)?;
    let entries = entry::from_bytes(&object.data)?;

    fs::create_dir_all(destination)?;

    for entry in entries {
        check_entry_name(&entry)?;
        let path = destination.join(&entry.name);

        match entry.mode {
            EntryMode::Directory => checkout(store, &entry.hash, &path)?,
            EntryMode::Submodule => {
                log::warn!("skipping submodule {:?} ({})", path, entry.hash);
            }
            EntryMode::Regular | EntryMode::Executable | EntryMode::Symlink => {
                let blob = read_kind(store, &entry.hash, ObjectKind::Blob)?;
                fs::write(&path, &blob.data)?;
                if entry.mode == EntryMode::Executable {
                    set_executable(&path)?;
                }
            }
        }
    }

    Ok(())
}

/// Checks out the tree the commit `hash` points to.
pub fn checkout_commit(store: &ObjectStore, hash: &Hash, destination: &Path) -> Result<Hash> {
    let commit = read_kind(store, hash, ObjectKind::Commit)?;
    let tree = commit::tree_hash(&commit.data)?;
    checkout(store, &tree, destination)?;
    log::info!("checked out tree {} of commit {} into {:?}", tree, hash, destination);
    Ok(tree)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::tree::TreeBuilder;

    fn write_tree(store: &ObjectStore, entries: &[TreeEntry]) -> Hash {
        let payload = entry::as_bytes(entries).unwrap();
        store.write(&Object::new(ObjectKind::Tree, payload)).unwrap()
    }

    fn write_blob(store: &ObjectStore, data: &[u8]) -> Hash {
        store.write(&Object::new(ObjectKind::Blob, data)).unwrap()
    }

    #[test]
    fn test_build_then_checkout() {
        let source = tempfile::tempdir().unwrap();
        fs::create_dir_all(source.path().join("a/b")).unwrap();
        fs::write(source.path().join("top.txt"), b"top").unwrap();
        fs::write(source.path().join("a/b/deep.bin"), [0u8, 159, 146, 150]).unwrap();

        let store_dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(store_dir.path());
        let hash = TreeBuilder::new(&store)
            .build_and_write(source.path())
            .unwrap();

        let destination = tempfile::tempdir().unwrap();
        let target = destination.path().join("out");
        checkout(&store, &hash, &target).unwrap();

        assert_eq!(b"top".to_vec(), fs::read(target.join("top.txt")).unwrap());
        assert_eq!(
            vec![0u8, 159, 146, 150],
            fs::read(target.join("a/b/deep.bin")).unwrap()
        );
    }

    #[test]
    fn test_missing_blob_fails() {
        let store_dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(store_dir.path());
        let missing = Hash::compute(b"never written");
        let hash = write_tree(
            &store,
            &[TreeEntry::new(EntryMode::Regular, "ghost.txt", missing)],
        );

        let destination = tempfile::tempdir().unwrap();
        match checkout(&store, &hash, destination.path()) {
            Err(Error::ObjectNotFound(h)) => assert_eq!(missing, h),
            other => panic!("expected ObjectNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_checkout_of_non_tree_fails() {
        let store_dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(store_dir.path());
        let blob = write_blob(&store, b"not a tree");

        let destination = tempfile::tempdir().unwrap();
        assert!(matches!(
            checkout(&store, &blob, destination.path()),
            Err(Error::DataConsistency(_))
        ));
    }

    #[test]
    fn test_dangerous_names_are_rejected() {
        let store_dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(store_dir.path());
        let blob = write_blob(&store, b"evil");
        let hash = write_tree(&store, &[TreeEntry::new(EntryMode::Regular, "..", blob)]);

        let destination = tempfile::tempdir().unwrap();
        assert!(checkout(&store, &hash, destination.path()).is_err());
    }

    #[test]
    fn test_repository_folder_is_rejected() {
        let work = tempfile::tempdir().unwrap();
        let repo = crate::fs::Repository::init(work.path(), "main").unwrap();
        let store = repo.store();

        let head = write_blob(&store, b"ref: refs/heads/evil\n");
        let inner = write_tree(&store, &[TreeEntry::new(EntryMode::Regular, "HEAD", head)]);
        for name in [".git", ".GIT"] {
            let hash = write_tree(&store, &[TreeEntry::new(EntryMode::Directory, name, inner)]);
            assert!(matches!(
                checkout(&store, &hash, work.path()),
                Err(Error::DataConsistency(_))
            ));
        }

        assert_eq!(
            "ref: refs/heads/main\n",
            fs::read_to_string(repo.head_path()).unwrap()
        );
    }

    #[test]
    fn test_modes_from_remote_trees() {
        let store_dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(store_dir.path());
        let script = write_blob(&store, b"#!/bin/sh\necho hi\n");
        let link = write_blob(&store, b"script.sh");
        let hash = write_tree(
            &store,
            &[
                TreeEntry::new(EntryMode::Symlink, "link", link),
                TreeEntry::new(EntryMode::Executable, "script.sh", script),
                TreeEntry::new(EntryMode::Submodule, "vendor", Hash::compute(b"elsewhere")),
            ],
        );

        let destination = tempfile::tempdir().unwrap();
        checkout(&store, &hash, destination.path()).unwrap();

        assert_eq!(
            b"script.sh".to_vec(),
            fs::read(destination.path().join("link")).unwrap()
        );
        assert!(!destination.path().join("vendor").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(destination.path().join("script.sh"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(0o755, mode & 0o777);
        }
    }
}
