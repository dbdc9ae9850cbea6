//! Integration tests for the Huffman codec.
//!
//! These drive the full encode-close-decode cycle over in-memory streams
//! across chunk sizes, data shapes and malformed inputs.

use bitpress_entropy::error::EntropyError;
use bitpress_entropy::{HuffmanDecoder, HuffmanEncoder, InputBitStream, OutputBitStream};
use std::io::Cursor;

/// Deterministic pseudo-random bytes (linear congruential generator).
fn lcg_bytes(len: usize, mut seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);

    for _ in 0..len {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }

    data
}

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
fn test_pattern_100kb_chunked() {
    // 32-byte pattern repeated to 100 KB, one code book per 64 KB chunk
    let pattern: [u8; 32] = [
        3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9, 3, 31, 14, 41, 15, 59, 92, 26, 65, 53, 35,
        58, 89, 97, 79, 93, 32,
    ];
    let data: Vec<u8> = pattern.iter().copied().cycle().take(100 * 1024).collect();

    let decoded = roundtrip(&data, 65536);
    assert_eq!(decoded.len(), data.len());
    assert_eq!(decoded, data);
}

#[test]
fn test_single_symbol_block() {
    let data = vec![0xA7u8; 50_000];

    let mut encoder =
        HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), 65536).unwrap();
    encoder.encode(&data).unwrap();
    let mut writer = encoder.into_bitstream();
    writer.close().unwrap();

    // One bit per byte plus a tiny single-symbol header
    assert!(writer.bits_written() < 50_000 + 64);
    let bytes = writer.into_inner().unwrap();

    let mut decoder =
        HuffmanDecoder::with_chunk_size(InputBitStream::new(Cursor::new(bytes)), 65536).unwrap();
    let mut output = vec![0u8; data.len()];
    decoder.decode(&mut output).unwrap();
    assert_eq!(output, data);
}

#[test]
fn test_chunk_size_sweep() {
    let data = lcg_bytes(10_000, 0x243F6A8885A308D3);

    for chunk_size in [0usize, 1024, 65536] {
        assert_eq!(roundtrip(&data, chunk_size), data, "chunk {chunk_size}");
    }
}

#[test]
fn test_multi_chunk_heterogeneous() {
    // Each chunk sees a different distribution, so every header re-describes
    // a different code book
    let mut data = Vec::new();
    data.extend(std::iter::repeat(b'a').take(2048));
    data.extend(b"mixed text with far more symbol variety 0123456789".repeat(41));
    data.extend(lcg_bytes(2048, 99));

    assert_eq!(roundtrip(&data, 1024), data);
}

#[test]
fn test_text_like_data() {
    let data = b"it was the best of times, it was the worst of times, \
                 it was the age of wisdom, it was the age of foolishness"
        .repeat(500);
    assert_eq!(roundtrip(&data, 65536), data);
}

#[test]
fn test_block_smaller_than_end_padding() {
    // Blocks shorter than the fast path's padding zone decode entirely
    // through the slow path
    for len in [1usize, 7, 13, 63] {
        let data = lcg_bytes(len, len as u64 + 1);
        assert_eq!(roundtrip(&data, 0), data, "len {len}");
    }
}

#[test]
fn test_all_symbols_flat() {
    let data: Vec<u8> = (0..=255u8).cycle().take(65536).collect();
    assert_eq!(roundtrip(&data, 0), data);
}

#[test]
fn test_malformed_length_header() {
    use bitpress_entropy::alphabet::encode_alphabet;
    use bitpress_entropy::exp_golomb::ExpGolombEncoder;

    // Declared code length 2 + 23 = 25 exceeds the 24-bit cap
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
    let mut output = vec![0u8; 1024];
    assert!(matches!(
        decoder.decode(&mut output),
        Err(EntropyError::MalformedHeader { .. })
    ));
    assert!(output.iter().all(|&b| b == 0));
}

#[test]
fn test_garbage_input() {
    let garbage = lcg_bytes(4096, 0xDEADBEEF);
    let mut decoder = HuffmanDecoder::new(InputBitStream::new(Cursor::new(garbage)));
    let mut output = vec![0u8; 65536];
    assert!(decoder.decode(&mut output).is_err());
}

#[test]
fn test_decoded_byte_count_matches() {
    let data = lcg_bytes(70_000, 4242);

    let mut encoder =
        HuffmanEncoder::with_chunk_size(OutputBitStream::new(Vec::new()), 65536).unwrap();
    let consumed = encoder.encode(&data).unwrap();
    assert_eq!(consumed, 70_000);
    let mut writer = encoder.into_bitstream();
    writer.close().unwrap();
    let bytes = writer.into_inner().unwrap();

    let mut decoder =
        HuffmanDecoder::with_chunk_size(InputBitStream::new(Cursor::new(bytes)), 65536).unwrap();
    let mut output = vec![0u8; 70_000];
    let produced = decoder.decode(&mut output).unwrap();
    assert_eq!(produced, consumed);
    assert_eq!(output, data);
}
