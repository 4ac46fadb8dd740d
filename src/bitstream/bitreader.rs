//! BitReader: reads a packed bitstream written by BitWriter.
//!
//! Bits are pulled most significant bit first. The source is read one byte at a time, only when
//! the current byte is exhausted, so reading `n` bits consumes exactly `ceil(n / 8)` bytes of the
//! source. Codec sections that follow a bit-packed section can therefore be read straight from
//! the same source once the bit reader is dropped.
//!
//! NOTE: This module can read from any I/O source that supports the read() call.
//!

use std::io::Read;

use crate::error::Result;

const BIT_MASK: u8 = 0x80;

#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    current: u8,
    /// Bits of `current` already handed out. 8 means we need a fresh byte.
    bit_index: u8,
    bytes_read: usize,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            current: 0,
            bit_index: 8,
            bytes_read: 0,
        }
    }

    /// Refill the single byte buffer. End of input is an UnexpectedEof I/O error.
    fn refill(&mut self) -> Result<()> {
        let mut byte = [0_u8; 1];
        self.source.read_exact(&mut byte)?;
        self.current = byte[0];
        self.bit_index = 0;
        self.bytes_read += 1;
        Ok(())
    }

    /// Return the next bit, true for 1.
    pub fn bit(&mut self) -> Result<bool> {
        if self.bit_index == 8 {
            self.refill()?;
        }
        let bit = self.current & (BIT_MASK >> self.bit_index) != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    /// Return the next n bits (0-32) as an unsigned value.
    pub fn bint(&mut self, n: u8) -> Result<u32> {
        let mut result = 0_u32;
        for _ in 0..n {
            result = (result << 1) | self.bit()? as u32;
        }
        Ok(result)
    }

    /// Number of source bytes consumed so far.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Debugging function. Report current position as bytes.bits.
    pub fn loc(&self) -> String {
        if self.bit_index == 8 {
            format!("[{}.0]", self.bytes_read)
        } else {
            format!("[{}.{}]", self.bytes_read - 1, self.bit_index)
        }
    }
}
