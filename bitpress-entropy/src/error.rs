//! Error types for the entropy coding layer.

use bitpress_core::BitpressError;
use thiserror::Error;

/// Errors produced by the entropy coders.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// Error from the underlying bit stream.
    #[error("Bit stream error: {0}")]
    BitStream(#[from] BitpressError),

    /// Chunk size outside `{0} ∪ [1024, 2^30]`.
    #[error("Invalid chunk size: {size} (must be 0 or in [1024..2^30])")]
    InvalidChunkSize {
        /// The rejected chunk size.
        size: usize,
    },

    /// Alphabet with an unusable symbol count.
    #[error("Invalid alphabet size: {count}")]
    InvalidAlphabet {
        /// The rejected symbol count.
        count: usize,
    },

    /// A frequency distribution produced a code length of 0 or above the cap.
    #[error("Could not generate codes: max code length ({max} bits) exceeded")]
    CodeLengthOverflow {
        /// The code length cap.
        max: usize,
    },

    /// A chunk header that cannot describe a valid code book.
    #[error("Malformed stream: {message}")]
    MalformedHeader {
        /// Description of the defect.
        message: String,
    },

    /// No code matched the bit stream within the maximum code length.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where decoding failed.
        bit_position: u64,
    },
}

/// Result type alias for entropy coding operations.
pub type Result<T> = std::result::Result<T, EntropyError>;

impl EntropyError {
    /// Create a malformed stream error.
    pub fn malformed_header(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EntropyError::InvalidChunkSize { size: 512 };
        assert!(err.to_string().contains("512"));

        let err = EntropyError::malformed_header("incorrect code length 25 for symbol 65");
        assert!(err.to_string().contains("symbol 65"));

        let err = EntropyError::invalid_huffman(12345);
        assert!(err.to_string().contains("12345"));
    }

    #[test]
    fn test_bitstream_error_conversion() {
        let err: EntropyError = BitpressError::Exhausted.into();
        assert!(matches!(err, EntropyError::BitStream(_)));
    }
}
