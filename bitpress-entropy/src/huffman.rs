//! Chunked canonical Huffman coding.
//!
//! The encoder derives a fresh code book for every chunk of input (64 KB by
//! default): it tallies byte frequencies, computes minimum-redundancy code
//! lengths in place with the Moffat–Katajainen algorithm, turns them into
//! canonical codes, and transmits only the code lengths (as exp-Golomb
//! deltas behind the alphabet of present symbols) before the coded payload.
//!
//! The decoder rebuilds the identical canonical codes from the header and
//! decodes through two tables: a 4096-entry fast table keyed by the next 12
//! bits for the common case, and a compact per-length slow table for longer
//! codes and for the end of each chunk, where the fast path's 64-bit
//! lookahead could otherwise run past the stream.

use crate::alphabet::{ALPHABET_SIZE, decode_alphabet, encode_alphabet};
use crate::error::{EntropyError, Result};
use crate::exp_golomb::{ExpGolombDecoder, ExpGolombEncoder};
use bitpress_core::{InputBitStream, OutputBitStream};
use std::io::{Read, Write};

/// Maximum Huffman code length in bits.
pub const MAX_CODE_LENGTH: usize = 24;

/// Default number of bytes covered by one code book.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 16;

/// Minimum explicit chunk size in bytes.
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Maximum chunk size in bytes.
pub const MAX_CHUNK_SIZE: usize = 1 << 30;

/// Bits consumed per fast-table lookup.
const DECODING_BATCH_SIZE: u32 = 12;

const DECODING_MASK: usize = (1 << DECODING_BATCH_SIZE) - 1;

/// Largest fast-table entry that can be decoded without the slow path.
const MAX_FAST_ENTRY: u32 = (DECODING_BATCH_SIZE << 8) | 0xFF;

/// Slow-table index sentinel for lengths with no codes.
const ABSENT_LENGTH: i32 = i32::MAX;

fn validate_chunk_size(size: usize) -> Result<()> {
    if size != 0 && size < MIN_CHUNK_SIZE {
        return Err(EntropyError::InvalidChunkSize { size });
    }

    if size > MAX_CHUNK_SIZE {
        return Err(EntropyError::InvalidChunkSize { size });
    }

    Ok(())
}

/// Assign canonical codes for the lengths in `sizes`, over the symbols in
/// `ranks`, which is sorted into (length, symbol) order in the process.
///
/// Codes of a given length are consecutive; each length increase left-shifts
/// the running code, so shorter codes are numerically smaller left-aligned.
fn generate_canonical_codes(
    sizes: &[u8; ALPHABET_SIZE],
    codes: &mut [u32; ALPHABET_SIZE],
    ranks: &mut [usize],
) -> Result<()> {
    if ranks.len() > 1 {
        ranks.sort_unstable_by_key(|&r| (sizes[r], r));
    }

    let mut code = 0u32;
    let mut length = sizes[ranks[0]];

    for &r in ranks.iter() {
        if sizes[r] > length {
            code <<= sizes[r] - length;
            length = sizes[r];

            if length as usize > MAX_CODE_LENGTH {
                return Err(EntropyError::CodeLengthOverflow {
                    max: MAX_CODE_LENGTH,
                });
            }
        }

        codes[r] = code;
        code += 1;
    }

    Ok(())
}

/// Phase 1 of the in-place minimum-redundancy computation: merge weights
/// left to right, leaving a parent-pointer forest in the array.
fn compute_in_place_sizes_phase1(data: &mut [u64]) {
    let n = data.len();
    let (mut s, mut r) = (0usize, 0usize);

    for t in 0..n - 1 {
        let mut sum = 0u64;

        for _ in 0..2 {
            if s >= n || (r < t && data[r] < data[s]) {
                sum += data[r];
                data[r] = t as u64;
                r += 1;
            } else {
                sum += data[s];

                if s > t {
                    data[s] = 0;
                }

                s += 1;
            }
        }

        data[t] = sum;
    }
}

/// Phase 2: walk the forest top down, overwriting each entry with its depth.
fn compute_in_place_sizes_phase2(data: &mut [u64]) {
    let n = data.len();
    let mut level_top = (n - 2) as u64; // root
    let mut depth = 1u64;
    let mut i = n;
    let mut total_nodes_at_level = 2u64;

    while i > 0 {
        let mut k = level_top;

        while k > 0 && data[(k - 1) as usize] >= level_top {
            k -= 1;
        }

        let internal_nodes_at_level = level_top - k;
        let leaves_at_level = total_nodes_at_level - internal_nodes_at_level;

        for _ in 0..leaves_at_level {
            i -= 1;
            data[i] = depth;
        }

        total_nodes_at_level = internal_nodes_at_level << 1;
        level_top = k;
        depth += 1;
    }
}

/// A static Huffman encoder over an owned output bit stream.
///
/// Canonical codes are generated in place from per-chunk frequencies; no
/// tree is built. Each symbol's length and code are packed into one table
/// entry so emission is a single load and a single
/// [`write_bits`](OutputBitStream::write_bits).
#[derive(Debug)]
pub struct HuffmanEncoder<W: Write> {
    bitstream: OutputBitStream<W>,
    /// Per symbol: `(length << 24) | canonical code`.
    codes: [u32; ALPHABET_SIZE],
    /// Present symbols of the current chunk, ascending.
    ranks: [usize; ALPHABET_SIZE],
    /// Scratch ordering of `ranks` for length computation and code assignment.
    sranks: [usize; ALPHABET_SIZE],
    chunk_size: usize,
}

impl<W: Write> HuffmanEncoder<W> {
    /// Create an encoder with the default chunk size (64 KB).
    pub fn new(bitstream: OutputBitStream<W>) -> Self {
        let mut codes = [0u32; ALPHABET_SIZE];

        for (i, code) in codes.iter_mut().enumerate() {
            *code = i as u32;
        }

        Self {
            bitstream,
            codes,
            ranks: [0; ALPHABET_SIZE],
            sranks: [0; ALPHABET_SIZE],
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create an encoder with an explicit chunk size.
    ///
    /// `chunk_size` is the number of bytes encoded before the frequency
    /// statistics reset; 0 means one code book for the whole block.
    pub fn with_chunk_size(bitstream: OutputBitStream<W>, chunk_size: usize) -> Result<Self> {
        validate_chunk_size(chunk_size)?;
        let mut encoder = Self::new(bitstream);
        encoder.chunk_size = chunk_size;
        Ok(encoder)
    }

    /// Rebuild the code book from `frequencies` and emit the chunk header.
    fn update_frequencies(&mut self, frequencies: &[u32; ALPHABET_SIZE]) -> Result<usize> {
        let mut count = 0usize;
        let mut sizes = [0u8; ALPHABET_SIZE];

        for (i, &freq) in frequencies.iter().enumerate() {
            self.codes[i] = 0;

            if freq > 0 {
                self.ranks[count] = i;
                count += 1;
            }
        }

        if count == 0 {
            return Ok(0);
        }

        if count == 1 {
            // Sole symbol: a 1-bit code, one wasted bit per byte
            self.sranks[0] = self.ranks[0];
            sizes[self.ranks[0]] = 1;
        } else {
            self.compute_code_lengths(frequencies, &mut sizes, count)?;
        }

        encode_alphabet(&mut self.bitstream, &self.ranks[..count])?;

        // Transmit code lengths only, as deltas against a running previous
        // size seeded at 2; frequencies and codes are never transmitted
        let mut egenc = ExpGolombEncoder::new(&mut self.bitstream, true);
        let mut prev_size = 2u8;

        for &r in &self.ranks[..count] {
            let curr_size = sizes[r];
            egenc.encode_byte(curr_size.wrapping_sub(prev_size))?;
            prev_size = curr_size;
        }

        generate_canonical_codes(&sizes, &mut self.codes, &mut self.sranks[..count])?;

        // Pack length and code (length <= 24 bits)
        for &r in &self.ranks[..count] {
            self.codes[r] |= (sizes[r] as u32) << 24;
        }

        Ok(count)
    }

    /// In-place calculation of minimum-redundancy code lengths, after
    /// Moffat & Katajainen. `count > 1` by construction.
    fn compute_code_lengths(
        &mut self,
        frequencies: &[u32; ALPHABET_SIZE],
        sizes: &mut [u8; ALPHABET_SIZE],
        count: usize,
    ) -> Result<()> {
        // Sort by increasing frequency, ties by increasing symbol value
        self.sranks[..count].copy_from_slice(&self.ranks[..count]);
        self.sranks[..count].sort_unstable_by_key(|&r| (frequencies[r], r));

        let mut buffer = [0u64; ALPHABET_SIZE];
        let buf = &mut buffer[..count];

        for (slot, &r) in buf.iter_mut().zip(self.sranks.iter()) {
            *slot = frequencies[r] as u64;
        }

        compute_in_place_sizes_phase1(buf);
        compute_in_place_sizes_phase2(buf);

        for (i, &depth) in buf.iter().enumerate() {
            if depth == 0 || depth > MAX_CODE_LENGTH as u64 {
                return Err(EntropyError::CodeLengthOverflow {
                    max: MAX_CODE_LENGTH,
                });
            }

            sizes[self.sranks[i]] = depth as u8;
        }

        Ok(())
    }

    /// Encode `block`, deriving a fresh code book for every chunk.
    ///
    /// Returns the number of bytes consumed. On a code-length overflow the
    /// offending chunk is abandoned without payload and the bit stream must
    /// not be reused.
    pub fn encode(&mut self, block: &[u8]) -> Result<usize> {
        if block.is_empty() {
            return Ok(0);
        }

        let end = block.len();
        let size_chunk = if self.chunk_size == 0 {
            end
        } else {
            self.chunk_size
        };
        let mut start_chunk = 0usize;

        while start_chunk < end {
            let end_chunk = (start_chunk + size_chunk).min(end);
            let chunk = &block[start_chunk..end_chunk];

            let mut frequencies = [0u32; ALPHABET_SIZE];

            for &b in chunk {
                frequencies[b as usize] += 1;
            }

            self.update_frequencies(&frequencies)?;

            for &b in chunk {
                let entry = self.codes[b as usize];
                self.bitstream.write_bits(entry as u64, entry >> 24)?;
            }

            start_chunk = end_chunk;
        }

        Ok(block.len())
    }

    /// Get a reference to the underlying bit stream.
    pub fn bitstream(&self) -> &OutputBitStream<W> {
        &self.bitstream
    }

    /// Get a mutable reference to the underlying bit stream.
    pub fn bitstream_mut(&mut self) -> &mut OutputBitStream<W> {
        &mut self.bitstream
    }

    /// Consume the encoder and return the underlying bit stream.
    pub fn into_bitstream(self) -> OutputBitStream<W> {
        self.bitstream
    }
}

/// A static Huffman decoder over an owned input bit stream.
///
/// Symbols are decoded through tables, not a tree: a fast table keyed by
/// the next 12 bits handles codes up to 12 bits in one lookup, longer codes
/// fall through to a per-length slow table. The decoder batches bit stream
/// reads through its own 64-bit cache.
#[derive(Debug)]
pub struct HuffmanDecoder<R: Read> {
    bitstream: InputBitStream<R>,
    codes: [u32; ALPHABET_SIZE],
    ranks: [usize; ALPHABET_SIZE],
    sizes: [u8; ALPHABET_SIZE],
    /// Fast decoding table: `(length << 8) | symbol` per 12-bit window.
    fd_table: Vec<u32>,
    /// Slow decoding table, entries in canonical order.
    sd_table: [u32; ALPHABET_SIZE],
    /// Per length: `index of first entry - first canonical code`, so that
    /// `sd_table[sdt_indexes[len] + code]` addresses a code's entry.
    sdt_indexes: [i32; MAX_CODE_LENGTH + 1],
    chunk_size: usize,
    /// Bits read from the bit stream but not yet consumed.
    state: u64,
    bits: u32,
    min_code_len: u8,
}

impl<R: Read> HuffmanDecoder<R> {
    /// Create a decoder with the default chunk size (64 KB).
    pub fn new(bitstream: InputBitStream<R>) -> Self {
        let mut codes = [0u32; ALPHABET_SIZE];

        for (i, code) in codes.iter_mut().enumerate() {
            *code = i as u32;
        }

        Self {
            bitstream,
            codes,
            ranks: [0; ALPHABET_SIZE],
            sizes: [8; ALPHABET_SIZE],
            fd_table: vec![0; 1 << DECODING_BATCH_SIZE],
            sd_table: [0; ALPHABET_SIZE],
            sdt_indexes: [ABSENT_LENGTH; MAX_CODE_LENGTH + 1],
            chunk_size: DEFAULT_CHUNK_SIZE,
            state: 0,
            bits: 0,
            min_code_len: 8,
        }
    }

    /// Create a decoder with an explicit chunk size (must match the encoder).
    pub fn with_chunk_size(bitstream: InputBitStream<R>, chunk_size: usize) -> Result<Self> {
        validate_chunk_size(chunk_size)?;
        let mut decoder = Self::new(bitstream);
        decoder.chunk_size = chunk_size;
        Ok(decoder)
    }

    /// Parse a chunk header and rebuild the decoding tables.
    ///
    /// Returns the symbol count of the new code book.
    fn read_lengths(&mut self) -> Result<usize> {
        let count = decode_alphabet(&mut self.bitstream, &mut self.ranks)?;

        let mut min_code_len = MAX_CODE_LENGTH as i32;
        let mut prev_size = 2i32;
        let mut egdec = ExpGolombDecoder::new(&mut self.bitstream, true);

        for &r in &self.ranks[..count] {
            self.codes[r] = 0;
            let curr_size = prev_size + egdec.decode_byte()? as i8 as i32;

            if curr_size <= 0 || curr_size > MAX_CODE_LENGTH as i32 {
                return Err(EntropyError::malformed_header(format!(
                    "incorrect code length {curr_size} for symbol {r}"
                )));
            }

            if min_code_len > curr_size {
                min_code_len = curr_size;
            }

            self.sizes[r] = curr_size as u8;
            prev_size = curr_size;
        }

        self.min_code_len = min_code_len as u8;
        generate_canonical_codes(&self.sizes, &mut self.codes, &mut self.ranks[..count])?;
        self.build_decoding_tables(count);
        Ok(count)
    }

    /// Fill both decoding tables from the canonical codes.
    ///
    /// `ranks` is in canonical (length, symbol) order at this point. Codes
    /// of up to 12 bits are replicated over every fast-table window sharing
    /// their prefix; longer codes plant a single fall-through entry whose
    /// length field pushes it past [`MAX_FAST_ENTRY`].
    fn build_decoding_tables(&mut self, count: usize) {
        self.fd_table.fill(0);
        self.sd_table.fill(0);
        self.sdt_indexes.fill(ABSENT_LENGTH);

        let mut length = 0u8;

        for (i, &r) in self.ranks.iter().enumerate().take(count) {
            let code = self.codes[r];

            if self.sizes[r] > length {
                length = self.sizes[r];
                self.sdt_indexes[length as usize] = i as i32 - code as i32;
            }

            let val = ((self.sizes[r] as u32) << 8) | r as u32;
            self.sd_table[i] = val;

            if (length as u32) < DECODING_BATCH_SIZE {
                let idx = (code << (DECODING_BATCH_SIZE - length as u32)) as usize;
                let end = idx + (1usize << (DECODING_BATCH_SIZE - length as u32));

                for slot in &mut self.fd_table[idx..end] {
                    *slot = val;
                }
            } else {
                let idx = (code >> (length as u32 - DECODING_BATCH_SIZE)) as usize;
                self.fd_table[idx] = val;
            }
        }
    }

    /// Decode into `block`, whose length must be the original byte count.
    ///
    /// Each chunk re-reads a header and rebuilds the tables. The bulk of a
    /// chunk goes through the fast path; the last
    /// `ceil(64 / min_code_len)` bytes are decoded one symbol at a time so
    /// the 64-bit lookahead never reads past the chunk's final bit.
    pub fn decode(&mut self, block: &mut [u8]) -> Result<usize> {
        if block.is_empty() {
            return Ok(0);
        }

        let end = block.len();
        let size_chunk = if self.chunk_size == 0 {
            end
        } else {
            self.chunk_size
        };
        let mut start_chunk = 0usize;

        while start_chunk < end {
            self.read_lengths()?;

            let end_chunk = (start_chunk + size_chunk).min(end);
            let min_code_len = self.min_code_len as usize;
            let mut end_padding = 64 / min_code_len;

            if min_code_len * end_padding != 64 {
                end_padding += 1;
            }

            let end_chunk8 = (end_chunk.saturating_sub(end_padding) & !7).max(start_chunk);

            for b in &mut block[start_chunk..end_chunk8] {
                *b = self.fast_decode_byte()?;
            }

            for b in &mut block[end_chunk8..end_chunk] {
                *b = self.slow_decode_byte(0, 0)?;
            }

            start_chunk = end_chunk;
        }

        Ok(block.len())
    }

    /// Decode one symbol through the fast table.
    ///
    /// Requires 64 bits of lookahead in the bit stream; callers stay clear
    /// of the end-of-chunk padding zone.
    #[inline]
    fn fast_decode_byte(&mut self) -> Result<u8> {
        if self.bits < DECODING_BATCH_SIZE {
            let fetched = self.bitstream.read_bits(64 - self.bits)?;

            self.state = if self.bits == 0 {
                fetched
            } else {
                (self.state << (64 - self.bits)) | fetched
            };

            self.bits = 64;
        }

        let window = (self.state >> (self.bits - DECODING_BATCH_SIZE)) as usize & DECODING_MASK;
        let val = self.fd_table[window];

        if val == 0 {
            // A window no code covers: only possible on corrupt input
            return Err(EntropyError::invalid_huffman(self.bitstream.bits_read()));
        }

        if val > MAX_FAST_ENTRY {
            self.bits -= DECODING_BATCH_SIZE;
            let code = (self.state >> self.bits) as usize & DECODING_MASK;
            return self.slow_decode_byte(code as i32, DECODING_BATCH_SIZE);
        }

        self.bits -= val >> 8;
        Ok(val as u8)
    }

    /// Decode one symbol bit by bit through the slow table, starting from a
    /// partial `code` of `code_len` bits.
    fn slow_decode_byte(&mut self, code: i32, code_len: u32) -> Result<u8> {
        let mut code = code;
        let mut code_len = code_len;

        while (code_len as usize) < MAX_CODE_LENGTH {
            code_len += 1;
            code <<= 1;

            if self.bits == 0 {
                code |= self.bitstream.read_bit()? as i32;
            } else {
                // Consume remaining bits in 'state' first
                self.bits -= 1;
                code |= ((self.state >> self.bits) & 1) as i32;
            }

            let idx = self.sdt_indexes[code_len as usize];

            if idx == ABSENT_LENGTH {
                continue;
            }

            let slot = idx as i64 + code as i64;

            if !(0..ALPHABET_SIZE as i64).contains(&slot) {
                continue;
            }

            let entry = self.sd_table[slot as usize];

            if entry >> 8 == code_len {
                return Ok(entry as u8);
            }
        }

        Err(EntropyError::invalid_huffman(self.bitstream.bits_read()))
    }

    /// Get a reference to the underlying bit stream.
    pub fn bitstream(&self) -> &InputBitStream<R> {
        &self.bitstream
    }

    /// Get a mutable reference to the underlying bit stream.
    pub fn bitstream_mut(&mut self) -> &mut InputBitStream<R> {
        &mut self.bitstream
    }

    /// Consume the decoder and return the underlying bit stream.
    pub fn into_bitstream(self) -> InputBitStream<R> {
        self.bitstream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(data: &[u8], chunk_size: usize) -> Vec<u8> {
        let mut encoder =
            HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), chunk_size).unwrap();
        assert_eq!(encoder.encode(data).unwrap(), data.len());
        let mut writer = encoder.into_bitstream();
        writer.close().unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut decoder =
            HuffmanDecoder::with_chunk_size(InputBitStream::new(Cursor::new(bytes)), chunk_size)
                .unwrap();
        let mut output = vec![0u8; data.len()];
        assert_eq!(decoder.decode(&mut output).unwrap(), data.len());
        output
    }

    #[test]
    fn test_canonical_code_ordering() {
        // Lengths A=1, B=2, C=2 must yield codes 0, 10, 11
        let mut sizes = [0u8; ALPHABET_SIZE];
        sizes[65] = 1;
        sizes[66] = 2;
        sizes[67] = 2;
        let mut codes = [0u32; ALPHABET_SIZE];
        let mut ranks = [66usize, 67, 65];

        generate_canonical_codes(&sizes, &mut codes, &mut ranks).unwrap();
        assert_eq!(ranks, [65, 66, 67]);
        assert_eq!(codes[65], 0b0);
        assert_eq!(codes[66], 0b10);
        assert_eq!(codes[67], 0b11);
    }

    #[test]
    fn test_canonical_codes_prefix_free() {
        // A staircase of lengths; every code must be prefix-free
        let mut sizes = [0u8; ALPHABET_SIZE];
        let symbols = [10usize, 20, 30, 40, 50];
        let lengths = [1u8, 2, 3, 4, 4];

        for (&s, &l) in symbols.iter().zip(&lengths) {
            sizes[s] = l;
        }

        let mut codes = [0u32; ALPHABET_SIZE];
        let mut ranks = symbols;
        generate_canonical_codes(&sizes, &mut codes, &mut ranks).unwrap();

        for &a in &symbols {
            for &b in &symbols {
                if a == b {
                    continue;
                }

                let (la, lb) = (sizes[a] as u32, sizes[b] as u32);

                if la <= lb {
                    assert_ne!(codes[b] >> (lb - la), codes[a], "{a} prefixes {b}");
                }
            }
        }
    }

    #[test]
    fn test_code_length_computation() {
        // Weights 8,4,2,1,1 form a spine: depths 1,2,3,4,4
        let mut buf = [1u64, 1, 2, 4, 8];
        compute_in_place_sizes_phase1(&mut buf);
        compute_in_place_sizes_phase2(&mut buf);
        assert_eq!(buf, [4, 4, 3, 2, 1]);

        // Uniform weights over four symbols give a flat tree
        let mut buf = [5u64, 5, 5, 5];
        compute_in_place_sizes_phase1(&mut buf);
        compute_in_place_sizes_phase2(&mut buf);
        assert_eq!(buf, [2, 2, 2, 2]);
    }

    #[test]
    fn test_roundtrip_text() {
        let data = b"it was the best of times, it was the worst of times".repeat(40);
        assert_eq!(roundtrip(&data, DEFAULT_CHUNK_SIZE), data);
    }

    #[test]
    fn test_roundtrip_two_symbols() {
        let data: Vec<u8> = (0..4096).map(|i| if i % 3 == 0 { b'x' } else { b'y' }).collect();
        assert_eq!(roundtrip(&data, 0), data);
    }

    #[test]
    fn test_roundtrip_single_symbol() {
        let data = vec![0x42u8; 4096];

        let mut encoder = HuffmanEncoder::new(OutputBitStream::new(Vec::new()));
        encoder.encode(&data).unwrap();
        let mut writer = encoder.into_bitstream();
        writer.close().unwrap();
        // Header: flag + count + symbol + one delta; payload: 1 bit per byte
        assert!(writer.bits_written() <= 32 + 4096);
        let bytes = writer.into_inner().unwrap();

        let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(bytes)));
        let mut output = vec![0u8; data.len()];
        decoder.decode(&mut output).unwrap();
        assert_eq!(output, data);
    }

    #[test]
    fn test_roundtrip_all_symbols() {
        let data: Vec<u8> = (0..=255u8).cycle().take(8192).collect();
        assert_eq!(roundtrip(&data, DEFAULT_CHUNK_SIZE), data);
    }

    #[test]
    fn test_roundtrip_long_codes() {
        // A steep distribution forces a wide spread of code lengths
        let mut data = Vec::new();

        for symbol in 0u8..20 {
            let reps = 1usize << (symbol.min(16) as usize);
            data.extend(std::iter::repeat(symbol).take(reps));
        }

        assert_eq!(roundtrip(&data, 0), data);
    }

    #[test]
    fn test_encoder_rejects_code_length_overflow() {
        // 26 Fibonacci-weighted symbols need a depth-25 spine
        let mut fib = (1u32, 1u32);
        let mut data = Vec::new();

        for symbol in 0u8..26 {
            data.extend(std::iter::repeat(symbol).take(fib.0 as usize));
            fib = (fib.1, fib.0 + fib.1);
        }

        let mut encoder =
            HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), 0).unwrap();
        assert!(matches!(
            encoder.encode(&data),
            Err(EntropyError::CodeLengthOverflow { .. })
        ));
    }

    #[test]
    fn test_decoder_rejects_bad_length() {
        // Hand-built header: symbol 65 with delta 23 declares length 25
        let mut writer = OutputBitStream::new(Vec::new());
        encode_alphabet(&mut writer, &[65]).unwrap();
        {
            let mut egenc = ExpGolombEncoder::new(&mut writer, true);
            egenc.encode_byte(23).unwrap();
        }
        writer.write_bits(0, 64).unwrap();
        writer.close().unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(bytes)));
        let mut output = vec![0u8; 16];
        assert!(matches!(
            decoder.decode(&mut output),
            Err(EntropyError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_decoder_rejects_zero_length() {
        // Delta -2 against the seed of 2 declares length 0
        let mut writer = OutputBitStream::new(Vec::new());
        encode_alphabet(&mut writer, &[65]).unwrap();
        {
            let mut egenc = ExpGolombEncoder::new(&mut writer, true);
            egenc.encode_byte((-2i8) as u8).unwrap();
        }
        writer.write_bits(0, 64).unwrap();
        writer.close().unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(bytes)));
        let mut output = vec![0u8; 16];
        assert!(matches!(
            decoder.decode(&mut output),
            Err(EntropyError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_decoder_rejects_truncated_stream() {
        let data = b"some reasonably compressible input text".repeat(64);

        let mut encoder = HuffmanEncoder::new(OutputBitStream::new(Vec::new()));
        encoder.encode(&data).unwrap();
        let mut writer = encoder.into_bitstream();
        writer.close().unwrap();
        let mut bytes = writer.into_inner().unwrap();
        bytes.truncate(bytes.len() / 2);

        let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(bytes)));
        let mut output = vec![0u8; data.len()];
        assert!(decoder.decode(&mut output).is_err());
    }

    #[test]
    fn test_invalid_chunk_sizes() {
        assert!(HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), 512).is_err());
        assert!(
            HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), MAX_CHUNK_SIZE + 1)
                .is_err()
        );
        assert!(HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), 0).is_ok());
        assert!(
            HuffmanDecoder::with_chunk_size(InputBitStream::new(Cursor::new(Vec::<u8>::new())), 1023)
                .is_err()
        );
        assert!(
            HuffmanDecoder::with_chunk_size(InputBitStream::new(Cursor::new(Vec::<u8>::new())), 1024)
                .is_ok()
        );
    }

    #[test]
    fn test_empty_block() {
        let mut encoder = HuffmanEncoder::new(OutputBitStream::new(Vec::new()));
        assert_eq!(encoder.encode(&[]).unwrap(), 0);

        let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(Vec::<u8>::new())));
        assert_eq!(decoder.decode(&mut []).unwrap(), 0);
    }
}
