//! Bit-granularity stream reader and writer.
//!
//! Both streams transfer bits most-significant-first within each byte and
//! share the same bookkeeping structure ([`BitPos`]) for the partial-byte
//! accumulator and the total-bits-processed counter. The encoder and decoder
//! in [`crate::coder`] are built on top of these streams.

use crate::error::{Error, Result};

/// An append-only destination for completed bytes.
pub trait ByteSink {
    /// Append one byte to the sink.
    fn put_byte(&mut self, byte: u8) -> Result<()>;
}

impl ByteSink for Vec<u8> {
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.push(byte);
        Ok(())
    }
}

/// A sequential source of bytes.
pub trait ByteSource {
    /// Read the next byte, failing with [`Error::EndOfStream`] when the
    /// source is exhausted.
    fn next_byte(&mut self) -> Result<u8>;

    /// The number of bytes still available, if known.
    fn remaining(&self) -> Option<u64> {
        None
    }
}

impl ByteSource for std::vec::IntoIter<u8> {
    fn next_byte(&mut self) -> Result<u8> {
        self.next().ok_or(Error::EndOfStream)
    }

    fn remaining(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl ByteSource for std::slice::Iter<'_, u8> {
    fn next_byte(&mut self) -> Result<u8> {
        self.next().copied().ok_or(Error::EndOfStream)
    }

    fn remaining(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

/// Shared bit-position bookkeeping for both stream directions.
///
/// Invariant: `processed` equals the sum of all bits read or written since
/// construction, alignment padding included.
#[derive(Debug, Default)]
struct BitPos {
    /// Partial-byte accumulator.
    acc: u8,
    /// Number of bits currently buffered in `acc` (0-7, transiently 8).
    filled: u8,
    /// Total bits processed so far.
    processed: u64,
}

/// Sequential bit-level reader over a byte source.
///
/// Bits are consumed most-significant-first from each byte.
pub struct InputBitStream<S: ByteSource> {
    source: S,
    pos: BitPos,
}

impl<'a> InputBitStream<std::slice::Iter<'a, u8>> {
    /// Create a reader over a byte slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(data.iter())
    }
}

impl<S: ByteSource> InputBitStream<S> {
    /// Create a reader over the given byte source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pos: BitPos::default(),
        }
    }

    /// Read the next bit (0 or 1).
    ///
    /// # Errors
    /// Returns [`Error::EndOfStream`] if the source is exhausted.
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.pos.filled == 0 {
            self.pos.acc = self.source.next_byte()?;
            self.pos.filled = 8;
        }
        self.pos.filled -= 1;
        self.pos.processed += 1;
        Ok((self.pos.acc >> self.pos.filled) & 1)
    }

    /// Read `n` consecutive bits (`n` <= 64) into an unsigned integer,
    /// most-significant bit first.
    ///
    /// # Errors
    /// Returns [`Error::EndOfStream`] if fewer than `n` bits remain. When
    /// the source reports its remaining length, availability is checked up
    /// front so a failed read consumes nothing.
    pub fn read_bits(&mut self, n: u32) -> Result<u64> {
        assert!(n <= 64, "cannot read more than 64 bits at once");
        if let Some(bytes) = self.source.remaining() {
            let available = u64::from(self.pos.filled) + 8 * bytes;
            if u64::from(n) > available {
                return Err(Error::EndOfStream);
            }
        }
        let mut value = 0u64;
        for _ in 0..n {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Advance to the next byte boundary, discarding the rest of a
    /// partially-consumed byte. Idempotent when already aligned.
    pub fn align(&mut self) {
        self.pos.processed += u64::from(self.pos.filled);
        self.pos.filled = 0;
        self.pos.acc = 0;
    }

    /// Total bits consumed so far, alignment padding included.
    pub fn bits_processed(&self) -> u64 {
        self.pos.processed
    }
}

/// Sequential bit-level writer over a byte sink.
///
/// Bits are emitted most-significant-first into each byte; a completed byte
/// is pushed to the sink immediately. Call [`OutputBitStream::finish`]
/// before discarding the stream, or buffered bits are lost.
pub struct OutputBitStream<S: ByteSink> {
    sink: S,
    pos: BitPos,
    finished: bool,
}

impl<S: ByteSink> OutputBitStream<S> {
    /// Create a writer over the given byte sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pos: BitPos::default(),
            finished: false,
        }
    }

    /// Append one bit.
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] if the stream is already finished.
    pub fn write_bit(&mut self, bit: u8) -> Result<()> {
        if self.finished {
            return Err(Error::InvalidState);
        }
        self.pos.acc = (self.pos.acc << 1) | (bit & 1);
        self.pos.filled += 1;
        self.pos.processed += 1;
        if self.pos.filled == 8 {
            self.sink.put_byte(self.pos.acc)?;
            self.pos.acc = 0;
            self.pos.filled = 0;
        }
        Ok(())
    }

    /// Append the low `n` bits of `value` (`n` <= 64), most-significant of
    /// those bits first.
    pub fn write_bits(&mut self, value: u64, n: u32) -> Result<()> {
        assert!(n <= 64, "cannot write more than 64 bits at once");
        for i in (0..n).rev() {
            self.write_bit(((value >> i) & 1) as u8)?;
        }
        Ok(())
    }

    /// Zero-pad to the next byte boundary and flush the completed byte.
    /// Idempotent when already aligned.
    pub fn align(&mut self) -> Result<()> {
        while self.pos.filled != 0 {
            self.write_bit(0)?;
        }
        Ok(())
    }

    /// Align, flush, and mark the stream finished. Idempotent: a second
    /// call produces no additional output.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.align()?;
        self.finished = true;
        Ok(())
    }

    /// Total bits written so far, alignment padding included.
    pub fn bits_processed(&self) -> u64 {
        self.pos.processed
    }

    /// Consume the stream and return the underlying sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
