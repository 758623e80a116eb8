use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::io::{Cursor, Read};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::rc::Rc;
use std::str::FromStr;

use crate::hashing::{HASH_BYTE_LEN, Hash};
use crate::object::{NULL_BYTE, ObjectKind, SPACE_BYTE};
use crate::utils::cursor::EasyRead;
use crate::{Error, Result};

/// File modes a tree entry can have.
///
/// Trees built locally only ever contain `Regular` and `Directory` entries, the rest can show up
/// in trees fetched from a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Regular,
    Executable,
    Symlink,
    Directory,
    Submodule,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Directory => "40000",
            Self::Submodule => "160000",
        }
    }

    /// The kind of object an entry with this mode points to.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            Self::Submodule => ObjectKind::Commit,
            _ => ObjectKind::Blob,
        }
    }
}

impl FromStr for EntryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "100644" | "100664" => Ok(Self::Regular),
            "100755" => Ok(Self::Executable),
            "120000" => Ok(Self::Symlink),
            "40000" | "040000" => Ok(Self::Directory),
            "160000" => Ok(Self::Submodule),
            _ => Err(Error::Formatting(format!(
                "could not get mode from {:?}",
                s
            ))),
        }
    }
}

/// Struct that represents a single tree entry in a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: OsString,
    pub hash: Hash,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<OsString>, hash: Hash) -> Self {
        Self {
            mode,
            name: name.into(),
            hash,
        }
    }

    pub fn name_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }
}

impl Display for TreeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{:0>6} {} {}\t{}",
            self.mode.as_str(),
            self.mode.object_kind(),
            self.hash,
            self.name.to_string_lossy(),
        ))
    }
}

/// Encodes the payload of a tree object:
///
/// "`{mode} {filename}\0{hash}`" for every entry, concatenated.
///
/// # Errors
///
/// Entries must be sorted by name (byte-wise) and names must be unique, otherwise this function
/// returns `Error::DataConsistency`.
pub fn as_bytes(entries: &[TreeEntry]) -> Result<Rc<[u8]>> {
    for pair in entries.windows(2) {
        if pair[0].name_bytes() >= pair[1].name_bytes() {
            return Err(Error::DataConsistency(format!(
                "tree entries out of order: {:?} must come after {:?}",
                pair[0].name, pair[1].name
            )));
        }
    }

    let mut bytes: Vec<u8> = Vec::new();
    for e in entries {
        if e.name.is_empty() || e.name_bytes().contains(&NULL_BYTE) {
            return Err(Error::Formatting(format!(
                "invalid tree entry name {:?}",
                e.name
            )));
        }
        bytes.extend(e.mode.as_str().as_bytes());
        bytes.push(SPACE_BYTE);
        bytes.extend(e.name_bytes());
        bytes.push(NULL_BYTE);
        bytes.extend(e.hash.as_ref());
    }

    Ok(bytes.into())
}

/// Decodes the payload of a tree object. Entries are returned in the order they are stored.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut cursor = Cursor::new(bytes);

    let mut entries = Vec::new();
    let mut hash_buf = [0; HASH_BYTE_LEN];
    while !cursor.is_exhausted() {
        let mode_buf = cursor
            .read_until_checked(SPACE_BYTE)
            .map_err(|_| Error::Formatting("expected space after tree entry mode".into()))?;
        let mode = EntryMode::from_str(&String::from_utf8_lossy(&mode_buf))?;

        let name_buf = cursor
            .read_until_checked(NULL_BYTE)
            .map_err(|_| Error::Formatting("expected null byte after tree entry name".into()))?;

        cursor
            .read_exact(&mut hash_buf)
            .map_err(|_| Error::Formatting("could not read tree entry hash".into()))?;

        entries.push(TreeEntry {
            mode,
            name: OsString::from_vec(name_buf),
            hash: Hash::from(hash_buf),
        });
    }

    Ok(entries)
}

pub fn display(entries: &[TreeEntry]) -> String {
    let mut s = String::new();
    for e in entries {
        s.push_str(&e.to_string());
        s.push('\n');
    }
    s.pop(); // removing trailing newline
    s
}

pub fn display_names(entries: &[TreeEntry]) -> String {
    entries
        .iter()
        .map(|e| OsStr::to_string_lossy(&e.name).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}
