//! Bit-level writer mirroring [`BitReader`](crate::BitReader)'s layout.
//!
//! The decoder is read-only; this writer exists to build fixtures and fuzz
//! corpora in the exact wire layout the reader expects.

use crate::error::{BitError, BitResult};

/// An LSB-first bit writer backed by a growable buffer.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit_len
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if value {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << offset;
            }
        }
        self.bit_len += 1;
    }

    /// Writes the low `bits` bits of `value`, least significant first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u32) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange { value, bits });
        }
        for i in 0..bits {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Writes a two's-complement value in `bits` bits.
    pub fn write_signed(&mut self, value: i64, bits: u32) -> BitResult<()> {
        if bits == 0 || bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits < 64 {
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(BitError::ValueOutOfRange {
                    value: value as u64,
                    bits,
                });
            }
        }
        let mask = if bits == 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        };
        self.write_bits(value as u64 & mask, bits)
    }

    /// Writes a byte.
    pub fn write_byte(&mut self, value: u8) {
        for i in 0..8 {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Writes every byte of `bytes`.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }

    /// Writes `value` followed by a NUL terminator.
    pub fn write_cstring(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
        self.write_byte(0);
    }

    /// Writes an unsigned varint.
    pub fn write_varu64(&mut self, mut value: u64) {
        loop {
            let group = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.write_byte(group);
                return;
            }
            self.write_byte(group | 0x80);
        }
    }

    /// Writes an unsigned 32-bit varint.
    pub fn write_varu32(&mut self, value: u32) {
        self.write_varu64(u64::from(value));
    }

    /// Writes a zigzag-encoded signed 32-bit varint.
    pub fn write_vars32(&mut self, value: i32) {
        self.write_varu32(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Writes a zigzag-encoded signed 64-bit varint.
    pub fn write_vars64(&mut self, value: i64) {
        self.write_varu64(((value << 1) ^ (value >> 63)) as u64);
    }

    /// Finishes writing and returns the byte buffer, zero-padded to a byte.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}
