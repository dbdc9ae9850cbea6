//! Buffered MSB-first bit stream I/O.
//!
//! This module provides [`OutputBitStream`] and [`InputBitStream`], which
//! adapt byte-oriented `Write`/`Read` implementations into bit streams that
//! can transfer 1 to 64 bits per call. Both sides stage bits in a 64-bit
//! word cache backed by a byte buffer, so the underlying sink/source only
//! sees large block transfers.
//!
//! # Bit Ordering
//!
//! The streams are MSB-first: the first bit written becomes the most
//! significant bit of the first output byte, which is the natural order for
//! big-endian canonical code emission.
//!
//! # Example
//!
//! ```
//! use bitpress_core::bitstream::{InputBitStream, OutputBitStream};
//! use std::io::Cursor;
//!
//! let mut writer = OutputBitStream::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b1100, 4).unwrap();
//! writer.close().unwrap();
//! let bytes = writer.into_inner().unwrap();
//!
//! let mut reader = InputBitStream::new(Cursor::new(bytes));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{BitpressError, Result};
use std::io::{Read, Write};

/// Default internal buffer size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 65536;

/// Minimum internal buffer size in bytes.
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Maximum internal buffer size in bytes.
pub const MAX_BUFFER_SIZE: usize = 1 << 29;

fn validate_buffer_size(size: usize) -> Result<()> {
    if size < MIN_BUFFER_SIZE {
        return Err(BitpressError::invalid_configuration(format!(
            "buffer size {size} is below the minimum of {MIN_BUFFER_SIZE} bytes"
        )));
    }

    if size > MAX_BUFFER_SIZE {
        return Err(BitpressError::invalid_configuration(format!(
            "buffer size {size} is above the maximum of {MAX_BUFFER_SIZE} bytes"
        )));
    }

    if size & 7 != 0 {
        return Err(BitpressError::invalid_configuration(format!(
            "buffer size {size} is not a multiple of 8"
        )));
    }

    Ok(())
}

/// An MSB-first bit writer over any `Write` implementation.
///
/// Bits accumulate in a 64-bit word; full words are staged big-endian into
/// the internal buffer, which is flushed to the sink in one `write_all` when
/// full. [`close`](OutputBitStream::close) pads the final byte with zeros on
/// the LSB side. Bits still pending when the stream is dropped without a
/// close are lost, so always close (or use
/// [`into_inner`](OutputBitStream::into_inner), which closes first).
#[derive(Debug)]
pub struct OutputBitStream<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    /// Bytes staged in `buffer`, always a multiple of 8 between closes.
    position: usize,
    /// Pending bits, held in the high `pending` positions of `current`.
    current: u64,
    pending: u32,
    /// Bits flushed to the sink so far.
    written: u64,
    closed: bool,
}

impl<W: Write> OutputBitStream<W> {
    /// Create a bit writer with the default buffer size.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buffer: vec![0; DEFAULT_BUFFER_SIZE],
            position: 0,
            current: 0,
            pending: 0,
            written: 0,
            closed: false,
        }
    }

    /// Create a bit writer with an explicit buffer size.
    ///
    /// The size must be a multiple of 8 in `[1024, 2^29]`.
    pub fn with_buffer_size(sink: W, buffer_size: usize) -> Result<Self> {
        validate_buffer_size(buffer_size)?;

        Ok(Self {
            sink,
            buffer: vec![0; buffer_size],
            position: 0,
            current: 0,
            pending: 0,
            written: 0,
            closed: false,
        })
    }

    /// Get a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Get a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Close the stream and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        Ok(self.sink)
    }

    /// Write a single bit (the low bit of `bit`).
    #[inline]
    pub fn write_bit(&mut self, bit: u32) -> Result<()> {
        if self.closed {
            return Err(BitpressError::Closed);
        }

        self.current |= ((bit & 1) as u64) << (63 - self.pending);
        self.pending += 1;

        if self.pending == 64 {
            self.push_current()?;
        }

        Ok(())
    }

    /// Write the low `count` bits of `value`, MSB-first.
    ///
    /// Extra high bits of `value` are ignored. `count` must be in `[1, 64]`.
    #[inline]
    pub fn write_bits(&mut self, value: u64, count: u32) -> Result<()> {
        if self.closed {
            return Err(BitpressError::Closed);
        }

        if count == 0 || count > 64 {
            return Err(BitpressError::invalid_bit_count(count));
        }

        let value = value & (u64::MAX >> (64 - count));
        let free = 64 - self.pending;

        if count < free {
            // Enough room in 'current'
            self.current |= value << (free - count);
            self.pending += count;
        } else {
            let remaining = count - free;
            self.current |= value >> remaining;
            self.push_current()?;

            if remaining != 0 {
                self.current = value << (64 - remaining);
                self.pending = remaining;
            }
        }

        Ok(())
    }

    /// Write `count` bits taken MSB-first from `src`.
    ///
    /// If `count` is not a multiple of 8, the trailing bits come from the
    /// high bits of `src[count / 8]`. Returns `count`.
    pub fn write_array(&mut self, src: &[u8], count: usize) -> Result<usize> {
        if self.closed {
            return Err(BitpressError::Closed);
        }

        if count > src.len() << 3 {
            return Err(BitpressError::invalid_argument(format!(
                "bit count {count} exceeds source capacity of {} bits",
                src.len() << 3
            )));
        }

        if count == 0 {
            return Ok(0);
        }

        let mut remaining = count;
        let mut start = 0usize;

        if self.pending & 7 == 0 {
            // Fill 'current' up to the next word boundary
            while self.pending != 0 && remaining >= 8 {
                self.write_bits(src[start] as u64, 8)?;
                start += 1;
                remaining -= 8;
            }

            // Copy whole internal buffers
            while remaining >> 3 >= self.buffer.len() - self.position {
                let n = self.buffer.len() - self.position;
                self.buffer[self.position..].copy_from_slice(&src[start..start + n]);
                self.position = self.buffer.len();
                self.flush_buffer()?;
                start += n;
                remaining -= n << 3;
            }

            // Copy whole 8-byte words
            let r = (remaining >> 6) << 3;

            if r > 0 {
                self.buffer[self.position..self.position + r]
                    .copy_from_slice(&src[start..start + r]);
                self.position += r;
                start += r;
                remaining -= r << 3;
            }
        } else {
            // Not byte aligned: emit full words through 'current'
            let held = self.pending;

            while remaining >= 64 {
                let mut word = [0u8; 8];
                word.copy_from_slice(&src[start..start + 8]);
                let value = u64::from_be_bytes(word);

                self.current |= value >> held;
                self.push_current()?;
                self.current = value << (64 - held);
                self.pending = held;
                start += 8;
                remaining -= 64;
            }
        }

        // Last bytes and bits
        while remaining >= 8 {
            self.write_bits(src[start] as u64, 8)?;
            start += 1;
            remaining -= 8;
        }

        if remaining > 0 {
            self.write_bits((src[start] >> (8 - remaining)) as u64, remaining as u32)?;
        }

        Ok(count)
    }

    /// Stage the full 64-bit cache into the buffer, flushing when full.
    #[inline]
    fn push_current(&mut self) -> Result<()> {
        self.buffer[self.position..self.position + 8].copy_from_slice(&self.current.to_be_bytes());
        self.current = 0;
        self.pending = 0;
        self.position += 8;

        if self.position >= self.buffer.len() {
            self.flush_buffer()?;
        }

        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.position > 0 {
            self.sink.write_all(&self.buffer[..self.position])?;
            self.written += (self.position as u64) << 3;
            self.position = 0;
        }

        Ok(())
    }

    /// Flush pending bits, zero-padding the final byte on the LSB side.
    ///
    /// Idempotent. Further writes fail with [`BitpressError::Closed`]. The
    /// underlying sink is flushed but remains open and owned by the stream
    /// until [`into_inner`](OutputBitStream::into_inner).
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if self.pending > 0 {
            let size = ((self.pending + 7) >> 3) as usize;
            let word = self.current.to_be_bytes();
            self.buffer[self.position..self.position + size].copy_from_slice(&word[..size]);
            self.position += size;
            self.current = 0;
            self.pending = 0;
        }

        self.flush_buffer()?;
        self.sink.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Cumulative bits written so far.
    ///
    /// Across a close that flushes a partial byte this rises to the byte
    /// boundary, then stays stable.
    pub fn bits_written(&self) -> u64 {
        if self.closed {
            self.written
        } else {
            self.written + ((self.position as u64) << 3) + self.pending as u64
        }
    }

    /// Whether the stream has been closed.
    pub fn closed(&self) -> bool {
        self.closed
    }
}

/// An MSB-first bit reader over any `Read` implementation.
///
/// The reader refills a 64-bit word cache from an internal byte buffer; at
/// end of stream the final refill may load a partial word with fewer than
/// 64 valid bits. Reading past the total bit count that was written (beyond
/// the final zero-padded byte) fails with [`BitpressError::Exhausted`].
#[derive(Debug)]
pub struct InputBitStream<R: Read> {
    source: R,
    buffer: Vec<u8>,
    /// Next unconsumed byte in `buffer`.
    position: usize,
    /// Count of valid bytes in `buffer`; 0 means empty.
    limit: usize,
    /// Unconsumed bits, held in the low `avail_bits` positions of `current`.
    current: u64,
    avail_bits: u32,
    /// Bits retired to past refills.
    read: u64,
    closed: bool,
}

impl<R: Read> InputBitStream<R> {
    /// Create a bit reader with the default buffer size.
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: vec![0; DEFAULT_BUFFER_SIZE],
            position: 0,
            limit: 0,
            current: 0,
            avail_bits: 0,
            read: 0,
            closed: false,
        }
    }

    /// Create a bit reader with an explicit buffer size.
    ///
    /// The size must be a multiple of 8 in `[1024, 2^29]`.
    pub fn with_buffer_size(source: R, buffer_size: usize) -> Result<Self> {
        validate_buffer_size(buffer_size)?;

        Ok(Self {
            source,
            buffer: vec![0; buffer_size],
            position: 0,
            limit: 0,
            current: 0,
            avail_bits: 0,
            read: 0,
            closed: false,
        })
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Consume the stream and return the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Read a single bit, returning 0 or 1.
    #[inline]
    pub fn read_bit(&mut self) -> Result<u32> {
        if self.avail_bits == 0 {
            self.pull_current()?;
        }

        self.avail_bits -= 1;
        Ok(((self.current >> self.avail_bits) & 1) as u32)
    }

    /// Read `count` bits MSB-first, zero-extended into a `u64`.
    ///
    /// `count` must be in `[1, 64]`.
    #[inline]
    pub fn read_bits(&mut self, count: u32) -> Result<u64> {
        if count == 0 || count > 64 {
            return Err(BitpressError::invalid_bit_count(count));
        }

        if count <= self.avail_bits {
            // Enough bits in 'current'
            self.avail_bits -= count;
            return Ok((self.current >> self.avail_bits) & (u64::MAX >> (64 - count)));
        }

        // Straddling read: drain 'current', refill, combine MSB-first
        let taken = self.avail_bits;
        let high = self.current & ((1u64 << taken) - 1);
        let remaining = count - taken;
        self.pull_current()?;

        if remaining > self.avail_bits {
            return Err(BitpressError::Exhausted);
        }

        self.avail_bits -= remaining;

        if remaining == 64 {
            Ok(self.current)
        } else {
            Ok((high << remaining) | (self.current >> self.avail_bits))
        }
    }

    /// Read exactly `count` bits into `dst`.
    ///
    /// Full bytes land at `dst[0..count / 8]`; if `count` is not a multiple
    /// of 8, the trailing bits occupy the high bits of `dst[count / 8]` with
    /// zero-filled low bits. Returns `count`.
    pub fn read_array(&mut self, dst: &mut [u8], count: usize) -> Result<usize> {
        if self.closed {
            return Err(BitpressError::Closed);
        }

        if count > dst.len() << 3 {
            return Err(BitpressError::invalid_argument(format!(
                "bit count {count} exceeds destination capacity of {} bits",
                dst.len() << 3
            )));
        }

        if count == 0 {
            return Ok(0);
        }

        let mut remaining = count;
        let mut start = 0usize;

        if self.avail_bits & 7 == 0 {
            // Byte-aligned cursor
            if self.avail_bits == 0 {
                self.pull_current()?;
            }

            // Empty 'current'
            while self.avail_bits > 0 && remaining >= 8 {
                dst[start] = self.read_bits(8)? as u8;
                start += 1;
                remaining -= 8;
            }

            // Copy whole buffer runs
            while remaining >> 3 > self.limit - self.position {
                let n = self.limit - self.position;
                dst[start..start + n].copy_from_slice(&self.buffer[self.position..self.limit]);
                self.position = self.limit;
                start += n;
                remaining -= n << 3;
                self.refill()?;
            }

            // Copy whole 8-byte words
            let r = (remaining >> 6) << 3;

            if r > 0 {
                dst[start..start + r]
                    .copy_from_slice(&self.buffer[self.position..self.position + r]);
                self.position += r;
                start += r;
                remaining -= r << 3;
            }
        } else {
            // Not byte aligned: read full words via the straddling formula
            let needed = 64 - self.avail_bits;

            while remaining >= 64 {
                let high = self.current & ((1u64 << self.avail_bits) - 1);
                self.pull_current()?;

                if needed > self.avail_bits {
                    return Err(BitpressError::Exhausted);
                }

                self.avail_bits -= needed;
                let word = (high << needed) | (self.current >> self.avail_bits);
                dst[start..start + 8].copy_from_slice(&word.to_be_bytes());
                start += 8;
                remaining -= 64;
            }
        }

        // Last bytes and bits
        while remaining >= 8 {
            dst[start] = self.read_bits(8)? as u8;
            start += 1;
            remaining -= 8;
        }

        if remaining > 0 {
            dst[start] = (self.read_bits(remaining as u32)? as u8) << (8 - remaining);
        }

        Ok(count)
    }

    /// Whether at least one more bit can be read. May trigger a refill.
    ///
    /// Returns `Ok(false)` once the source is cleanly exhausted and an error
    /// after [`close`](InputBitStream::close).
    pub fn has_more_to_read(&mut self) -> Result<bool> {
        if self.closed {
            return Err(BitpressError::Closed);
        }

        if self.position < self.limit || self.avail_bits > 0 {
            return Ok(true);
        }

        match self.refill() {
            Ok(_) => Ok(true),
            Err(BitpressError::Exhausted) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Load the next 64 bits of `current` from the buffer.
    ///
    /// At end of stream fewer than 8 bytes may remain; they are packed with
    /// `avail_bits` set to the exact count so no fictitious bits appear.
    fn pull_current(&mut self) -> Result<()> {
        if self.position >= self.limit {
            self.refill()?;
        }

        if self.position + 8 > self.limit {
            // End of stream: partial word
            let nbytes = self.limit - self.position;
            let mut val = 0u64;

            for _ in 0..nbytes {
                val = (val << 8) | self.buffer[self.position] as u64;
                self.position += 1;
            }

            self.current = val;
            self.avail_bits = (nbytes << 3) as u32;
        } else {
            let mut word = [0u8; 8];
            word.copy_from_slice(&self.buffer[self.position..self.position + 8]);
            self.current = u64::from_be_bytes(word);
            self.avail_bits = 64;
            self.position += 8;
        }

        Ok(())
    }

    /// Refill the byte buffer from the source.
    ///
    /// Only called once every buffered byte has been consumed, so the whole
    /// previous fill is retired into the `read` counter.
    fn refill(&mut self) -> Result<usize> {
        if self.closed {
            return Err(BitpressError::Closed);
        }

        self.read += (self.limit as u64) << 3;
        let size = self.source.read(&mut self.buffer)?;
        self.position = 0;
        self.limit = size;

        if size == 0 {
            return Err(BitpressError::Exhausted);
        }

        Ok(size)
    }

    /// Close the stream. Idempotent; further reads fail.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.closed = true;

        // Retire buffered bytes so the counter lands on the byte boundary,
        // then force the next pull into a failing refill
        self.read += (self.position as u64) << 3;
        self.position = 0;
        self.limit = 0;
        self.avail_bits = 0;
        Ok(())
    }

    /// Cumulative bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.read + ((self.position as u64) << 3) - self.avail_bits as u64
    }

    /// Whether the stream has been closed.
    pub fn closed(&self) -> bool {
        self.closed
    }
}
