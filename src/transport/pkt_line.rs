//! Length-prefixed framing used by the git transfer protocol.
//!
//! Every frame starts with its total length (prefix included) as 4 lowercase hex digits. A few
//! lengths that can never belong to a data frame are used as markers, the most important being
//! `0000` (flush), which closes a section.

use crate::{Error, Result};

const LENGTH_PREFIX: usize = 4;
/// Largest frame allowed by the protocol, prefix included.
pub const MAX_PKT_LEN: usize = 65520;

pub const FLUSH_PKT: &[u8; 4] = b"0000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PktLine {
    Data(Vec<u8>),
    /// `0000`
    Flush,
    /// `0001`
    Delim,
    /// `0002`
    ResponseEnd,
}

impl PktLine {
    /// The payload of a data frame without its trailing newline, if any.
    pub fn text(&self) -> Option<&[u8]> {
        match self {
            PktLine::Data(data) => Some(data.strip_suffix(b"\n").unwrap_or(data)),
            _ => None,
        }
    }
}

/// Frames `payload`, prefixing it with `payload.len() + 4` as 4 hex digits.
///
/// # Errors
///
/// This function will fail if the framed payload would be larger than `MAX_PKT_LEN`.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>> {
    let len = payload.len() + LENGTH_PREFIX;
    if len > MAX_PKT_LEN {
        return Err(Error::Formatting(format!(
            "pkt-line payload of {} bytes is too long",
            payload.len()
        )));
    }

    let mut framed = Vec::with_capacity(len);
    framed.extend(format!("{:04x}", len).as_bytes());
    framed.extend(payload);
    Ok(framed)
}

pub fn flush() -> &'static [u8] {
    FLUSH_PKT
}

/// Decodes the frame at the start of `bytes`, returning it along with the amount of bytes it
/// took.
pub fn decode_one(bytes: &[u8]) -> Result<(PktLine, usize)> {
    let prefix = bytes.get(..LENGTH_PREFIX).ok_or_else(|| {
        Error::Formatting(format!("truncated pkt-line length prefix {:?}", bytes))
    })?;
    let prefix = std::str::from_utf8(prefix)
        .map_err(|_| Error::Formatting(format!("invalid pkt-line length {:?}", prefix)))?;
    let len = usize::from_str_radix(prefix, 16)
        .map_err(|_| Error::Formatting(format!("invalid pkt-line length {:?}", prefix)))?;

    match len {
        0 => Ok((PktLine::Flush, LENGTH_PREFIX)),
        1 => Ok((PktLine::Delim, LENGTH_PREFIX)),
        2 => Ok((PktLine::ResponseEnd, LENGTH_PREFIX)),
        3 => Err(Error::Formatting("pkt-line length 3 is invalid".into())),
        _ => {
            let data = bytes.get(LENGTH_PREFIX..len).ok_or_else(|| {
                Error::Formatting(format!(
                    "pkt-line claims {} bytes but only {} are left",
                    len,
                    bytes.len()
                ))
            })?;
            Ok((PktLine::Data(data.to_vec()), len))
        }
    }
}

/// Decodes every frame in `bytes`. Whatever follows a flush is decoded as the next frame.
pub fn decode(bytes: &[u8]) -> Result<Vec<PktLine>> {
    let mut lines = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (line, used) = decode_one(&bytes[pos..])?;
        lines.push(line);
        pos += used;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(b"0009done\n".to_vec(), encode(b"done\n").unwrap());
        assert_eq!(b"0004".to_vec(), encode(b"").unwrap());
        assert_eq!(
            b"0032want 0123456789012345678901234567890123456789\n".to_vec(),
            encode(b"want 0123456789012345678901234567890123456789\n").unwrap()
        );
    }

    #[test]
    fn test_encode_uses_lowercase_hex() {
        let payload = vec![b'a'; 0xab - 4];
        assert!(encode(&payload).unwrap().starts_with(b"00ab"));
    }

    #[test]
    fn test_encode_too_long() {
        assert!(encode(&vec![0; MAX_PKT_LEN]).is_err());
    }

    #[test]
    fn test_decode_content_after_flush() {
        let mut stream = encode(b"# service=git-upload-pack\n").unwrap();
        stream.extend(flush());
        stream.extend(encode(b"hello\n").unwrap());
        stream.extend(flush());

        let lines = decode(&stream).unwrap();
        assert_eq!(
            vec![
                PktLine::Data(b"# service=git-upload-pack\n".to_vec()),
                PktLine::Flush,
                PktLine::Data(b"hello\n".to_vec()),
                PktLine::Flush,
            ],
            lines
        );
        assert_eq!(Some(b"hello".as_slice()), lines[2].text());
        assert_eq!(None, lines[1].text());
    }

    #[test]
    fn test_decode_markers() {
        assert_eq!(
            vec![PktLine::Delim, PktLine::ResponseEnd],
            decode(b"00010002").unwrap()
        );
    }

    #[test]
    fn test_decode_errors() {
        assert!(decode(b"00").is_err());
        assert!(decode(b"zzzz").is_err());
        assert!(decode(b"0003").is_err());
        assert!(decode(b"0010short").is_err());
    }
}
