//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// Maximum number of bits a single [`BitReader::read_bits`] call may return.
pub const MAX_READ_BITS: u32 = 32;

/// Maximum number of bytes consumed by a 32-bit varint.
pub const VARINT32_MAX_BYTES: u32 = 5;

/// Maximum number of bytes consumed by a 64-bit varint.
pub const VARINT64_MAX_BYTES: u32 = 10;

/// A bit-level cursor over a borrowed byte buffer.
///
/// Bits are consumed least-significant first within each byte and bytes are
/// consumed in order. All reads are bounds-checked against the cursor's bit
/// length and return errors instead of truncating.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
    bit_len: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader over every bit of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_pos: 0,
            bit_len: data.len().saturating_mul(8),
        }
    }

    /// Creates a reader limited to the first `bits` bits of `data`.
    ///
    /// The length is clamped to the bits actually present in the buffer.
    #[must_use]
    pub fn with_bit_len(data: &'a [u8], bits: usize) -> Self {
        Self {
            data,
            bit_pos: 0,
            bit_len: bits.min(data.len().saturating_mul(8)),
        }
    }

    /// Returns the total number of readable bits.
    #[must_use]
    pub const fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.bit_len.saturating_sub(self.bit_pos)
    }

    /// Returns `true` while unread bits remain.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.bits_remaining() > 0
    }

    /// Returns the current absolute bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Moves the cursor forward, stopping at the end of the buffer.
    pub fn seek_forward(&mut self, bits: usize) {
        self.bit_pos = self.bit_pos.saturating_add(bits).min(self.bit_len);
    }

    /// Moves the cursor backward, stopping at the start of the buffer.
    pub fn seek_backward(&mut self, bits: usize) {
        self.bit_pos = self.bit_pos.saturating_sub(bits);
    }

    /// Reads up to 32 bits as an unsigned integer.
    pub fn read_bits(&mut self, bits: u32) -> BitResult<u32> {
        if bits > MAX_READ_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_READ_BITS,
            });
        }
        if bits == 0 {
            return Ok(0);
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u32;
        let mut filled = 0u32;
        while filled < bits {
            let byte = u32::from(self.data[self.bit_pos / 8]);
            let offset = (self.bit_pos % 8) as u32;
            let take = (8 - offset).min(bits - filled);
            let chunk = (byte >> offset) & ((1u32 << take) - 1);
            value |= chunk << filled;
            filled += take;
            self.bit_pos += take as usize;
        }
        Ok(value)
    }

    /// Reads an n-bit two's-complement value and sign-extends it.
    pub fn read_signed(&mut self, bits: u32) -> BitResult<i32> {
        let raw = self.read_bits(bits)?;
        if bits == 0 || bits == MAX_READ_BITS {
            return Ok(raw as i32);
        }
        let shift = MAX_READ_BITS - bits;
        Ok(((raw << shift) as i32) >> shift)
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads eight bits as a byte.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads up to 64 bits, low word first.
    pub fn read_bits_u64(&mut self, bits: u32) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        self.ensure_bits(bits as usize)?;
        let low_bits = bits.min(MAX_READ_BITS);
        let low = u64::from(self.read_bits(low_bits)?);
        let high = u64::from(self.read_bits(bits - low_bits)?);
        Ok(low | (high << low_bits))
    }

    /// Reads `count` whole bytes.
    pub fn read_bytes(&mut self, count: usize) -> BitResult<Vec<u8>> {
        self.ensure_bits(count.saturating_mul(8))?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_byte()?);
        }
        Ok(out)
    }

    /// Reads `bits` bits into a byte vector; a trailing partial byte keeps its
    /// bits in the low positions.
    pub fn read_bits_to_vec(&mut self, bits: usize) -> BitResult<Vec<u8>> {
        self.ensure_bits(bits)?;
        let mut out = Vec::with_capacity(bits.div_ceil(8));
        let mut remaining = bits;
        while remaining >= 8 {
            out.push(self.read_byte()?);
            remaining -= 8;
        }
        if remaining > 0 {
            out.push(self.read_bits(remaining as u32)? as u8);
        }
        Ok(out)
    }

    /// Reads a NUL-terminated byte string; the terminator is consumed but not
    /// returned.
    ///
    /// Fails with [`BitError::StringTooLong`] once `max_bytes` non-NUL bytes
    /// have been read.
    pub fn read_cstring(&mut self, max_bytes: usize) -> BitResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let byte = self.read_byte()?;
            if byte == 0 {
                return Ok(out);
            }
            if out.len() >= max_bytes {
                return Err(BitError::StringTooLong { limit: max_bytes });
            }
            out.push(byte);
        }
    }

    /// Reads a fixed-length string, replacing invalid UTF-8.
    pub fn read_string(&mut self, len: usize) -> BitResult<String> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads an unsigned 32-bit varint.
    ///
    /// Decoding stops after [`VARINT32_MAX_BYTES`] bytes and returns whatever
    /// has accumulated.
    pub fn read_varu32(&mut self) -> BitResult<u32> {
        let mut result = 0u32;
        for group in 0..VARINT32_MAX_BYTES {
            let byte = self.read_byte()?;
            result |= u32::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Reads an unsigned 64-bit varint, capped at [`VARINT64_MAX_BYTES`].
    pub fn read_varu64(&mut self) -> BitResult<u64> {
        let mut result = 0u64;
        for group in 0..VARINT64_MAX_BYTES {
            let byte = self.read_byte()?;
            result |= u64::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Reads a zigzag-encoded signed 32-bit varint.
    pub fn read_vars32(&mut self) -> BitResult<i32> {
        let raw = self.read_varu32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    /// Reads a zigzag-encoded signed 64-bit varint.
    pub fn read_vars64(&mut self) -> BitResult<i64> {
        let raw = self.read_varu64()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::EndOfBuffer {
                requested: bits,
                available,
                position: self.bit_pos,
            });
        }
        Ok(())
    }
}
