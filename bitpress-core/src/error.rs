//! Error types for bit stream operations.

use std::io;
use thiserror::Error;

/// The error type for bit stream operations.
#[derive(Debug, Error)]
pub enum BitpressError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid construction parameter (e.g. buffer size out of range).
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the rejected parameter.
        message: String,
    },

    /// Bit count outside the supported [1, 64] range.
    #[error("Invalid bit count: {count} (must be in [1..64])")]
    InvalidBitCount {
        /// The rejected bit count.
        count: u32,
    },

    /// Invalid argument to a bulk operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// Operation attempted on a closed stream.
    #[error("Stream closed")]
    Closed,

    /// The byte source ran out of data mid-operation.
    #[error("No more data to read in the bit stream")]
    Exhausted,
}

/// Result type alias for bit stream operations.
pub type Result<T> = std::result::Result<T, BitpressError>;

impl BitpressError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an invalid bit count error.
    pub fn invalid_bit_count(count: u32) -> Self {
        Self::InvalidBitCount { count }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
