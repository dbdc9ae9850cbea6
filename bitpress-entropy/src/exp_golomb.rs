//! Order-0 exponential-Golomb coding.
//!
//! Used by the Huffman chunk header to transmit small signed integers (the
//! code-length deltas). Zero is the single bit `1`; a nonzero value with
//! magnitude `v` is sent as `k` zero bits followed by `v + 1` in `k + 1`
//! bits, where `k = floor(log2(v + 1))`, then a sign bit in signed mode.
//! Encoder and decoder must agree on the signed flag.

use crate::error::{EntropyError, Result};
use bitpress_core::{InputBitStream, OutputBitStream};
use std::io::{Read, Write};

/// Exp-Golomb encoder over a borrowed output bit stream.
#[derive(Debug)]
pub struct ExpGolombEncoder<'a, W: Write> {
    bitstream: &'a mut OutputBitStream<W>,
    signed: bool,
}

impl<'a, W: Write> ExpGolombEncoder<'a, W> {
    /// Create an encoder. `signed` selects two's-complement byte handling.
    pub fn new(bitstream: &'a mut OutputBitStream<W>, signed: bool) -> Self {
        Self { bitstream, signed }
    }

    /// Encode one byte (interpreted as an `i8` in signed mode).
    pub fn encode_byte(&mut self, val: u8) -> Result<()> {
        if val == 0 {
            self.bitstream.write_bit(1)?;
            return Ok(());
        }

        let (magnitude, negative) = if self.signed {
            let v = val as i8 as i32;
            (v.unsigned_abs(), v < 0)
        } else {
            (val as u32, false)
        };

        // k zeros then magnitude + 1 in k + 1 bits, emitted as one field
        let m = magnitude + 1;
        let k = 31 - m.leading_zeros();
        self.bitstream.write_bits(m as u64, 2 * k + 1)?;

        if self.signed {
            self.bitstream.write_bit(negative as u32)?;
        }

        Ok(())
    }
}

/// Exp-Golomb decoder over a borrowed input bit stream.
#[derive(Debug)]
pub struct ExpGolombDecoder<'a, R: Read> {
    bitstream: &'a mut InputBitStream<R>,
    signed: bool,
}

impl<'a, R: Read> ExpGolombDecoder<'a, R> {
    /// Create a decoder. `signed` must match the encoder's flag.
    pub fn new(bitstream: &'a mut InputBitStream<R>, signed: bool) -> Self {
        Self { bitstream, signed }
    }

    /// Decode one byte (an `i8` in two's complement in signed mode).
    pub fn decode_byte(&mut self) -> Result<u8> {
        let mut k = 0u32;

        while self.bitstream.read_bit()? == 0 {
            k += 1;

            if k > 8 {
                return Err(EntropyError::malformed_header(
                    "exp-Golomb prefix exceeds the byte range",
                ));
            }
        }

        if k == 0 {
            return Ok(0);
        }

        let low = self.bitstream.read_bits(k)?;
        let magnitude = ((1u64 << k) | low) - 1;

        if self.signed {
            let negative = self.bitstream.read_bit()? == 1;

            if magnitude > 128 || (!negative && magnitude > 127) {
                return Err(EntropyError::malformed_header(
                    "exp-Golomb value outside the signed byte range",
                ));
            }

            let v = if negative {
                -(magnitude as i32)
            } else {
                magnitude as i32
            };

            Ok(v as i8 as u8)
        } else {
            if magnitude > 255 {
                return Err(EntropyError::malformed_header(
                    "exp-Golomb value outside the byte range",
                ));
            }

            Ok(magnitude as u8)
        }
    }
}
