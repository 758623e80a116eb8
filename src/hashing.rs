use std::fmt::Display;
use std::str::FromStr;

use sha1::{Digest, Sha1};

use crate::{Error, Result};

pub const HASH_BYTE_LEN: usize = 20;
pub const HASH_HEX_LEN: usize = HASH_BYTE_LEN * 2;

/// A SHA1 digest identifying an object in the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_BYTE_LEN]);

impl Hash {
    /// Returns the SHA1 hash for the data passed.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Splits the hex representation into the fan-out bucket (first two characters) and the
    /// file name inside of it (the remaining 38).
    pub fn to_path_parts(&self) -> (String, String) {
        let hex = self.to_string();
        let (dir, file) = hex.split_at(2);
        (dir.to_owned(), file.to_owned())
    }
}

impl From<[u8; HASH_BYTE_LEN]> for Hash {
    fn from(value: [u8; HASH_BYTE_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Hash {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        let bytes: [u8; HASH_BYTE_LEN] = value.try_into().map_err(|_| {
            Error::Formatting(format!(
                "a hash has {} bytes, got {}",
                HASH_BYTE_LEN,
                value.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != HASH_HEX_LEN {
            return Err(Error::Arg(s.to_owned()));
        }
        let mut bytes = [0; HASH_BYTE_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::Arg(s.to_owned()))?;
        Ok(Self(bytes))
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// Tests
