//! Alphabet transmission for chunk headers.
//!
//! A chunk's code book only covers the symbols that actually occur, so the
//! header starts by naming that set. The layout is one flag bit — `1` means
//! every byte value is present and nothing else follows — otherwise an
//! 8-bit count and each present symbol as 8 bits in ascending order.

use crate::error::{EntropyError, Result};
use bitpress_core::{InputBitStream, OutputBitStream};
use std::io::{Read, Write};

/// Number of symbols in the byte alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// Write the set of present symbols, given in ascending order.
pub fn encode_alphabet<W: Write>(
    bitstream: &mut OutputBitStream<W>,
    symbols: &[usize],
) -> Result<()> {
    if symbols.is_empty() || symbols.len() > ALPHABET_SIZE {
        return Err(EntropyError::InvalidAlphabet {
            count: symbols.len(),
        });
    }

    if symbols.len() == ALPHABET_SIZE {
        bitstream.write_bit(1)?;
        return Ok(());
    }

    bitstream.write_bit(0)?;
    bitstream.write_bits(symbols.len() as u64, 8)?;

    for &symbol in symbols {
        bitstream.write_bits(symbol as u64, 8)?;
    }

    Ok(())
}

/// Read the set of present symbols into `ranks[0..count]`, ascending.
///
/// Returns the symbol count. A zero count or out-of-order symbol list is
/// rejected as malformed.
pub fn decode_alphabet<R: Read>(
    bitstream: &mut InputBitStream<R>,
    ranks: &mut [usize; ALPHABET_SIZE],
) -> Result<usize> {
    if bitstream.read_bit()? == 1 {
        for (i, rank) in ranks.iter_mut().enumerate() {
            *rank = i;
        }

        return Ok(ALPHABET_SIZE);
    }

    let count = bitstream.read_bits(8)? as usize;

    if count == 0 {
        return Err(EntropyError::InvalidAlphabet { count });
    }

    let mut prev: i32 = -1;

    for rank in ranks.iter_mut().take(count) {
        let symbol = bitstream.read_bits(8)? as i32;

        if symbol <= prev {
            return Err(EntropyError::malformed_header(format!(
                "alphabet symbol {symbol} out of order"
            )));
        }

        *rank = symbol as usize;
        prev = symbol;
    }

    Ok(count)
}
