use std::io::Cursor;
use std::rc::Rc;

use byteorder::{BigEndian, ReadBytesExt};

use crate::hashing::{HASH_BYTE_LEN, Hash};
use crate::object::ObjectKind;
use crate::utils::zlib;
use crate::{Constants, Error, Result};

pub const PACK_HEADER_LEN: usize = 12;

const OBJ_COMMIT: u8 = 1;
const OBJ_TREE: u8 = 2;
const OBJ_BLOB: u8 = 3;
const OBJ_TAG: u8 = 4;
const OBJ_OFS_DELTA: u8 = 6;
const OBJ_REF_DELTA: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub version: u32,
    pub count: u32,
}

/// Where a delta entry takes its base from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaBase {
    /// Absolute offset, inside the pack, of the entry the delta is made against.
    Offset(usize),
    Hash(Hash),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackEntryKind {
    Object(ObjectKind),
    Delta(DeltaBase),
}

/// A single entry of a pack, with its payload already inflated. For deltas the payload is the
/// delta itself.
#[derive(Debug, Clone)]
pub struct PackEntry {
    pub offset: usize,
    pub kind: PackEntryKind,
    pub data: Rc<[u8]>,
}

fn malformed(offset: usize, message: &str) -> Error {
    Error::MalformedPackResponse(format!("entry at offset {}: {}", offset, message))
}

/// Validates the signature and version of a pack and reads how many entries it has.
pub fn parse_header(bytes: &[u8]) -> Result<PackHeader> {
    if bytes.len() < PACK_HEADER_LEN {
        return Err(Error::MalformedPackResponse(format!(
            "pack header needs {} bytes, got {}",
            PACK_HEADER_LEN,
            bytes.len()
        )));
    }
    if &bytes[..4] != Constants::PACK_SIGNATURE {
        return Err(Error::MalformedPackResponse(format!(
            "pack does not start with its signature: {:?}",
            &bytes[..4]
        )));
    }

    let mut cursor = Cursor::new(&bytes[4..PACK_HEADER_LEN]);
    let version = cursor.read_u32::<BigEndian>()?;
    let count = cursor.read_u32::<BigEndian>()?;

    if version != 2 && version != 3 {
        return Err(Error::MalformedPackResponse(format!(
            "unsupported pack version {}",
            version
        )));
    }

    Ok(PackHeader { version, count })
}

/// Decodes the type and inflated size of an entry. The first byte holds the type in bits 4-6 and
/// the lowest 4 bits of the size; every following byte adds 7 more bits while the previous one
/// had its high bit set.
///
/// Returns the type code, the size, and the amount of bytes read.
pub fn read_type_and_size(bytes: &[u8]) -> Option<(u8, usize, usize)> {
    let first = *bytes.first()?;
    let kind = (first >> 4) & 0x07;
    let mut size = (first & 0x0f) as usize;
    let mut shift = 4;
    let mut used = 1;
    let mut byte = first;

    while byte & 0x80 != 0 {
        if shift >= usize::BITS {
            return None;
        }
        byte = *bytes.get(used)?;
        size |= ((byte & 0x7f) as usize) << shift;
        shift += 7;
        used += 1;
    }

    Some((kind, size, used))
}

/// Decodes the distance from an ofs-delta entry back to its base.
///
/// Every continuation byte adds one before shifting, so that no distance has two encodings.
///
/// Returns the distance and the amount of bytes read.
pub fn read_base_distance(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut byte = *bytes.first()?;
    let mut distance = (byte & 0x7f) as usize;
    let mut used = 1;

    while byte & 0x80 != 0 {
        byte = *bytes.get(used)?;
        distance = distance
            .checked_add(1)?
            .checked_mul(1 << 7)?
            | (byte & 0x7f) as usize;
        used += 1;
    }

    Some((distance, used))
}

fn object_kind(code: u8) -> Option<ObjectKind> {
    match code {
        OBJ_COMMIT => Some(ObjectKind::Commit),
        OBJ_TREE => Some(ObjectKind::Tree),
        OBJ_BLOB => Some(ObjectKind::Blob),
        OBJ_TAG => Some(ObjectKind::Tag),
        _ => None,
    }
}

/// Decodes every entry of the pack in `bytes`, which must start at the pack signature.
///
/// Each entry starts right where the compressed data of the previous one ended, as reported by
/// the inflater. The size in the entry header is only used as a hint.
///
/// # Errors
///
/// This function will fail with `Error::MalformedPackResponse` if the header or an entry header is
/// invalid or truncated, and with `Error::Decompression` if an entry payload can't be inflated.
pub fn parse(bytes: &[u8]) -> Result<Vec<PackEntry>> {
    let header = parse_header(bytes)?;
    log::info!(
        "pack version {} with {} entries",
        header.version,
        header.count
    );

    // every entry takes at least two bytes, the count itself is not trusted
    let mut entries = Vec::with_capacity((header.count as usize).min(bytes.len() / 2));
    let mut pos = PACK_HEADER_LEN;

    for _ in 0..header.count {
        let offset = pos;
        let (code, size, used) = read_type_and_size(&bytes[pos..])
            .ok_or_else(|| malformed(offset, "truncated type and size"))?;
        pos += used;

        let kind = match code {
            OBJ_OFS_DELTA => {
                let (distance, used) = read_base_distance(&bytes[pos..])
                    .ok_or_else(|| malformed(offset, "truncated base offset"))?;
                pos += used;
                let base = offset
                    .checked_sub(distance)
                    .filter(|_| distance != 0)
                    .ok_or_else(|| {
                        malformed(offset, &format!("base distance {} is invalid", distance))
                    })?;
                PackEntryKind::Delta(DeltaBase::Offset(base))
            }
            OBJ_REF_DELTA => {
                let raw = bytes
                    .get(pos..pos + HASH_BYTE_LEN)
                    .ok_or_else(|| malformed(offset, "truncated base hash"))?;
                pos += HASH_BYTE_LEN;
                PackEntryKind::Delta(DeltaBase::Hash(Hash::try_from(raw)?))
            }
            code => PackEntryKind::Object(
                object_kind(code)
                    .ok_or_else(|| malformed(offset, &format!("invalid type {}", code)))?,
            ),
        };

        let (data, consumed) = zlib::decompress_stream(&bytes[pos..], size).map_err(|e| {
            Error::Decompression(format!("entry at offset {}: {}", offset, e))
        })?;
        pos += consumed;

        if data.len() != size {
            log::warn!(
                "entry at offset {} announced {} bytes but inflated to {}",
                offset,
                size,
                data.len()
            );
        }
        log::debug!("decoded {:?} at offset {} ({} bytes)", kind, offset, data.len());

        entries.push(PackEntry {
            offset,
            kind,
            data: data.into(),
        });
    }

    Ok(entries)
}
