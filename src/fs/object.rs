use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::hashing::Hash;
use crate::object::Object;
use crate::{Error, Result};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Handle over an `objects` directory, where every object lives in
/// `<root>/<first 2 hex chars>/<remaining 38 hex chars>` as its compressed encoding.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, hash: &Hash) -> PathBuf {
        let (dir, file) = hash.to_path_parts();
        self.root.join(OsStr::new(&dir)).join(OsStr::new(&file))
    }

    pub fn has(&self, hash: &Hash) -> bool {
        self.object_path(hash).is_file()
    }

    /// Reads and decodes the object identified by `hash`.
    ///
    /// # Errors
    ///
    /// This function will fail with `Error::ObjectNotFound` if there is no entry for the hash, or
    /// if the entry could not be read or decoded.
    pub fn read(&self, hash: &Hash) -> Result<Object> {
        let data = match fs::read(self.object_path(hash)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::ObjectNotFound(*hash)),
            Err(e) => return Err(e.into()),
        };
        Object::decode(&data)
    }

    /// Writes a compressed version of the object, returning the hash used to find it.
    ///
    /// # Errors
    ///
    /// This function can fail if it was not possible to create and write to the file or the object
    /// couldn't be compressed.
    pub fn write(&self, object: &Object) -> Result<Hash> {
        let (hash, compressed) = object.encode()?;
        self.write_raw(&hash, &compressed)?;
        Ok(hash)
    }

    /// Stores already compressed bytes under `hash`, trusting the caller that they belong to it.
    ///
    /// Existing entries are left untouched. New entries are written to a temporary file inside
    /// the bucket and renamed into place, so readers never see half of an entry.
    pub fn write_raw(&self, hash: &Hash, compressed: &[u8]) -> Result<()> {
        let file_path = self.object_path(hash);
        if file_path.is_file() {
            log::debug!("object {} already stored", hash);
            return Ok(());
        }

        let Some(bucket) = file_path.parent() else {
            return Err(Error::DataConsistency(format!(
                "object path {:?} has no bucket",
                file_path
            )));
        };
        fs::create_dir_all(bucket)?;

        let temp_path = file_path.with_extension(format!(
            "tmp.{}.{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&temp_path, compressed)?;
        if let Err(e) = fs::rename(&temp_path, &file_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::debug!("wrote object {}", hash);
        Ok(())
    }
}
