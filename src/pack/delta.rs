//! Application of copy/insert deltas.
//!
//! A delta starts with two sizes (the base length and the result length), then a sequence of
//! instructions. An instruction byte with the high bit set copies a range of the base: its low
//! 4 bits say which offset bytes follow and bits 4-6 which size bytes follow, both little-endian.
//! Any other nonzero byte inserts that many literal bytes taken from the delta itself.

use crate::{Error, Result};

const COPY_INSTRUCTION: u8 = 0x80;
/// Size used by copy instructions that don't encode one.
const DEFAULT_COPY_SIZE: usize = 0x10000;
const MAX_PREALLOCATION: usize = 1 << 20;

/// Decodes a little-endian base-128 number (7 bits per byte, high bit set on every byte but the
/// last), returning it along with the amount of bytes it took.
pub fn read_size(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut value: usize = 0;
    let mut shift = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if shift >= usize::BITS {
            return None;
        }
        value |= ((byte & 0x7f) as usize) << shift;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
        shift += 7;
    }
    None
}

fn integrity_error(message: String) -> Error {
    Error::DataConsistency(format!("invalid delta: {}", message))
}

/// Reads the optional little-endian bytes of a copy instruction selected by the bits of `mask`.
fn read_copy_field(delta: &[u8], pos: &mut usize, mask: u8, bytes: usize) -> Result<usize> {
    let mut value = 0;
    for i in 0..bytes {
        if mask & (1 << i) != 0 {
            let byte = *delta
                .get(*pos)
                .ok_or_else(|| integrity_error("truncated copy instruction".into()))?;
            value |= (byte as usize) << (8 * i);
            *pos += 1;
        }
    }
    Ok(value)
}

/// Rebuilds an object from its `base` and a `delta` against it.
///
/// # Errors
///
/// This function will fail with `Error::DataConsistency` if the delta was made for a base of a
/// different size, if it copies outside of the base, if it is truncated or holds a zero
/// instruction, or if the result does not have the size the delta announced.
pub fn apply(base: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    let (base_size, mut pos) =
        read_size(delta).ok_or_else(|| integrity_error("truncated base size".into()))?;
    let (target_size, used) = read_size(&delta[pos..])
        .ok_or_else(|| integrity_error("truncated result size".into()))?;
    pos += used;

    if base_size != base.len() {
        return Err(integrity_error(format!(
            "made for a base of {} bytes, but the base has {}",
            base_size,
            base.len()
        )));
    }

    // the announced size is only enforced as the output grows
    let mut output = Vec::with_capacity(target_size.min(MAX_PREALLOCATION));
    while pos < delta.len() {
        let instruction = delta[pos];
        pos += 1;

        if instruction & COPY_INSTRUCTION != 0 {
            let offset = read_copy_field(delta, &mut pos, instruction, 4)?;
            let size = match read_copy_field(delta, &mut pos, instruction >> 4, 3)? {
                0 => DEFAULT_COPY_SIZE,
                size => size,
            };
            let end = offset
                .checked_add(size)
                .filter(|&end| end <= base.len())
                .ok_or_else(|| {
                    integrity_error(format!(
                        "copy of {} bytes at {} is outside a base of {} bytes",
                        size,
                        offset,
                        base.len()
                    ))
                })?;
            output.extend_from_slice(&base[offset..end]);
        } else if instruction != 0 {
            let end = pos + instruction as usize;
            let literal = delta.get(pos..end).ok_or_else(|| {
                integrity_error(format!(
                    "insert of {} bytes runs past the end of the delta",
                    instruction
                ))
            })?;
            output.extend_from_slice(literal);
            pos = end;
        } else {
            return Err(integrity_error(format!(
                "zero instruction byte at {}",
                pos - 1
            )));
        }

        if output.len() > target_size {
            return Err(integrity_error(format!(
                "result grows past the announced {} bytes",
                target_size
            )));
        }
    }

    if output.len() != target_size {
        return Err(integrity_error(format!(
            "result has {} bytes, {} were announced",
            output.len(),
            target_size
        )));
    }

    Ok(output)
}
