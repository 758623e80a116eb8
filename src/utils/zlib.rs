use std::io::Write;
use std::rc::Rc;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::{Error, Result};

const OUTPUT_CHUNK: usize = 8 * 1024;
/// Upper bound on what a size hint can preallocate, hints come from untrusted headers.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Compresses `bytes` using a zlib encoder.
///
/// # Errors
///
/// This function will fail if the `ZlibEncoder` fails.
pub fn compress(bytes: &[u8]) -> Result<Rc<[u8]>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    let compressed = encoder.finish()?.into();

    Ok(compressed)
}

/// Returns `bytes` decompressed. Trailing bytes after the end of the zlib stream are ignored.
///
/// # Errors
///
/// This function will fail if the data is not a complete zlib stream.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    decompress_stream(bytes, 0).map(|(data, _)| data)
}

/// Inflates the zlib stream at the start of `input`, returning the inflated bytes along with how
/// many bytes of `input` the stream occupied.
///
/// `size_hint` is only used to preallocate the output, and only up to a bound.
///
/// # Errors
///
/// This function will fail if the stream is corrupt, or if `input` runs out (or the inflater stops
/// making progress) before the end of the stream is reached.
pub fn decompress_stream(input: &[u8], size_hint: usize) -> Result<(Vec<u8>, usize)> {
    let mut inflater = Decompress::new(true);
    let mut output = Vec::with_capacity(size_hint.clamp(OUTPUT_CHUNK, MAX_PREALLOCATION));

    loop {
        if output.len() == output.capacity() {
            output.reserve(OUTPUT_CHUNK);
        }

        let in_before = inflater.total_in();
        let out_before = inflater.total_out();
        let consumed = in_before as usize;

        let status = inflater
            .decompress_vec(&input[consumed..], &mut output, FlushDecompress::None)
            .map_err(|e| Error::Decompression(format!("corrupt zlib stream: {}", e)))?;

        match status {
            Status::StreamEnd => return Ok((output, inflater.total_in() as usize)),
            Status::Ok | Status::BufError => {
                // There was always free output space, so no progress means the input is exhausted
                if inflater.total_in() == in_before && inflater.total_out() == out_before {
                    return Err(Error::Decompression(format!(
                        "zlib stream ended after {} bytes without its terminator",
                        consumed
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let data = b"blob 11\0hello world";
        let compressed = compress(data).unwrap();
        assert_eq!(data.to_vec(), decompress(&compressed).unwrap());
    }

    #[test]
    fn test_large_payload_needs_several_iterations() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = compress(&data).unwrap();
        let (inflated, consumed) = decompress_stream(&compressed, 0).unwrap();
        assert_eq!(data, inflated);
        assert_eq!(compressed.len(), consumed);
    }

    #[test]
    fn test_consumed_ignores_trailing_bytes() {
        let compressed = compress(b"first").unwrap();
        let mut input = compressed.to_vec();
        input.extend(compress(b"second").unwrap().iter());

        let (inflated, consumed) = decompress_stream(&input, 5).unwrap();
        assert_eq!(b"first".to_vec(), inflated);
        assert_eq!(compressed.len(), consumed);

        let (second, _) = decompress_stream(&input[consumed..], 6).unwrap();
        assert_eq!(b"second".to_vec(), second);
    }

    #[test]
    fn test_huge_size_hint_is_not_trusted() {
        let compressed = compress(b"x").unwrap();
        let (inflated, consumed) = decompress_stream(&compressed, usize::MAX >> 2).unwrap();
        assert_eq!(b"x".to_vec(), inflated);
        assert_eq!(compressed.len(), consumed);
    }

    #[test]
    fn test_truncated_stream_fails() {
        let compressed = compress(b"some data that will be cut short").unwrap();
        let result = decompress(&compressed[..compressed.len() - 4]);
        assert!(matches!(result, Err(Error::Decompression(_))));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(matches!(
            decompress(b"definitely not zlib"),
            Err(Error::Decompression(_))
        ));
        assert!(matches!(decompress(&[]), Err(Error::Decompression(_))));
    }
}
