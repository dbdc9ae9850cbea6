//! # bitpress-core
//!
//! Core bit-level I/O for the bitpress compression library.
//!
//! This crate provides the transport layer the entropy coders are built on:
//!
//! - [`bitstream`]: buffered MSB-first [`InputBitStream`]/[`OutputBitStream`]
//!   over any `std::io` reader/writer, moving 1 to 64 bits per call
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! bitpress is a layered stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ L2: Entropy codec (bitpress-entropy)         │
//! │     Canonical Huffman, exp-Golomb, alphabet  │
//! ├──────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                   │
//! │     InputBitStream / OutputBitStream         │
//! ├──────────────────────────────────────────────┤
//! │ L0: Byte I/O (std::io::Read / Write)         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bitpress_core::{InputBitStream, OutputBitStream};
//! use std::io::Cursor;
//!
//! let mut writer = OutputBitStream::new(Vec::new());
//! writer.write_bits(0x2A, 6).unwrap();
//! writer.write_bit(1).unwrap();
//! writer.close().unwrap();
//!
//! let mut reader = InputBitStream::new(Cursor::new(writer.into_inner().unwrap()));
//! assert_eq!(reader.read_bits(6).unwrap(), 0x2A);
//! assert_eq!(reader.read_bit().unwrap(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod error;

// Re-exports for convenience
pub use bitstream::{InputBitStream, OutputBitStream};
pub use error::{BitpressError, Result};
