//! # bitpress-entropy
//!
//! Chunked canonical Huffman coding over the bitpress bit stream layer.
//!
//! Every chunk of input (64 KB by default) gets its own code book, derived
//! in place from the chunk's byte frequencies and transmitted as a compact
//! self-describing header: the alphabet of present symbols followed by
//! exp-Golomb coded code-length deltas. Decoding runs through a two-level
//! table — a 4096-entry fast table for codes up to 12 bits and a per-length
//! slow table for the rest.
//!
//! ## Modules
//!
//! - [`huffman`]: [`HuffmanEncoder`] / [`HuffmanDecoder`]
//! - [`exp_golomb`]: exp-Golomb coding of small signed integers
//! - [`alphabet`]: present-symbol set transmission
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```rust
//! use bitpress_entropy::{compress, decompress};
//!
//! let original = b"so it goes, so it goes, so it goes";
//! let encoded = compress(original).unwrap();
//! let decoded = decompress(&encoded, original.len()).unwrap();
//! assert_eq!(decoded, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod alphabet;
pub mod error;
pub mod exp_golomb;
pub mod huffman;

// Re-exports for convenience
pub use bitpress_core::{InputBitStream, OutputBitStream};
pub use error::{EntropyError, Result};
pub use exp_golomb::{ExpGolombDecoder, ExpGolombEncoder};
pub use huffman::{DEFAULT_CHUNK_SIZE, HuffmanDecoder, HuffmanEncoder, MAX_CODE_LENGTH};

use std::io::Cursor;

/// Huffman-compress `data` with the default chunk size.
///
/// Returns the encoded byte stream (headers plus coded payload, final byte
/// zero-padded).
///
/// # Example
///
/// ```rust
/// use bitpress_entropy::compress;
///
/// let encoded = compress(&[b'a'; 4096]).unwrap();
/// assert!(encoded.len() < 4096);
/// ```
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = HuffmanEncoder::new(OutputBitStream::new(Vec::new()));
    encoder.encode(data)?;
    let mut writer = encoder.into_bitstream();
    writer.close()?;
    Ok(writer.into_inner()?)
}

/// Decompress a stream produced by [`compress`].
///
/// `expected_size` must be the original byte count; the chunk structure of
/// the stream is derived from it.
///
/// # Example
///
/// ```rust
/// use bitpress_entropy::{compress, decompress};
///
/// let original: Vec<u8> = (0..=255).collect();
/// let encoded = compress(&original).unwrap();
/// assert_eq!(decompress(&encoded, original.len()).unwrap(), original);
/// ```
pub fn decompress(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(data)));
    let mut output = vec![0u8; expected_size];
    decoder.decode(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_roundtrip() {
        let original = b"The quick brown fox jumps over the lazy dog. ".repeat(100);
        let encoded = compress(&original).unwrap();
        assert!(encoded.len() < original.len());
        assert_eq!(decompress(&encoded, original.len()).unwrap(), original);
    }

    #[test]
    fn test_compress_empty() {
        let encoded = compress(&[]).unwrap();
        assert_eq!(decompress(&encoded, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_compress_incompressible() {
        // A full-spread distribution still round-trips, just without gain
        let original: Vec<u8> = (0..8192u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
            .collect();
        let encoded = compress(&original).unwrap();
        assert_eq!(decompress(&encoded, original.len()).unwrap(), original);
    }
}
