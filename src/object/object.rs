use std::io::{Cursor, Write};
use std::rc::Rc;
use std::str::FromStr;

use byteorder::WriteBytesExt;

use crate::byteable::Byteable;
use crate::hashing::Hash;
use crate::utils::cursor::EasyRead;
use crate::utils::zlib;
use crate::{Error, Result};

use super::{NULL_BYTE, ObjectKind, SPACE_BYTE};

/// An immutable object: its kind and its payload. The identity of an object is the SHA1 of its
/// encoded form (see `as_bytes`), so two objects with the same kind and payload are the same
/// object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub kind: ObjectKind,
    pub data: Rc<[u8]>,
}

impl Object {
    pub fn new(kind: ObjectKind, data: impl Into<Rc<[u8]>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Returns the SHA1 hash for this object, computed over the uncompressed encoding.
    pub fn hash(&self) -> Result<Hash> {
        Ok(Hash::compute(&self.as_bytes()?))
    }

    /// Returns the identity of this object along with its compressed encoding, which is what gets
    /// written to the object store.
    ///
    /// # Errors
    ///
    /// This function can fail if it couldn't encode the object or it couldn't write to the
    /// encoder.
    pub fn encode(&self) -> Result<(Hash, Rc<[u8]>)> {
        let bytes = self.as_bytes()?;
        let hash = Hash::compute(&bytes);
        let compressed = zlib::compress(&bytes)?;
        Ok((hash, compressed))
    }

    /// Inflates `compressed` and decodes the object inside.
    ///
    /// # Errors
    ///
    /// This function will fail if the data could not be inflated or the object had an invalid
    /// header.
    pub fn decode(compressed: &[u8]) -> Result<Self> {
        let bytes = zlib::decompress(compressed)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} {}", self.kind, self.data.len()))
    }
}

impl Byteable for Object {
    /// Returns the encoded data for this object, with the following format:
    ///
    /// `{type} {data_length}\0{data}`
    fn as_bytes(&self) -> Result<Rc<[u8]>> {
        let mut cursor = Cursor::new(Vec::with_capacity(self.data.len() + 32));

        cursor.write_all(self.kind.as_str().as_bytes())?;
        cursor.write_u8(SPACE_BYTE)?;
        cursor.write_all(self.data.len().to_string().as_bytes())?;
        cursor.write_u8(NULL_BYTE)?;
        cursor.write_all(&self.data)?;

        Ok(cursor.into_inner().into())
    }

    /// Reads a byte slice, assuming it is an uncompressed object encoding.
    ///
    /// The length written in the header must match the length of the payload that follows.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let header = cursor.read_until_checked(NULL_BYTE)?;
        let header = String::from_utf8(header)
            .map_err(|_| Error::Formatting("object header is not valid utf-8".into()))?;
        let (kind, len) = header.split_once(' ').ok_or_else(|| {
            Error::Formatting(format!("expected space in object header {:?}", header))
        })?;

        let kind = ObjectKind::from_str(kind)?;
        let data_len: usize = len.parse().map_err(|_| {
            Error::Formatting(format!("could not read object length {:?} as a number", len))
        })?;

        let data = &bytes[cursor.position() as usize..];
        if data_len != data.len() {
            return Err(Error::DataConsistency(format!(
                "length in header \"{}\" did not match actual data length \"{}\"",
                data_len,
                data.len()
            )));
        }

        Ok(Object::new(kind, data))
    }
}
