//! Error types for bitstream operations.

use thiserror::Error;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level reads and fixture writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// Attempted to read past the end of the buffer.
    #[error(
        "attempted to read {requested} bits at bit {position} but only {available} bits available"
    )]
    EndOfBuffer {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
        /// Cursor position when the read was attempted.
        position: usize,
    },

    /// Invalid bit count for the operation.
    #[error("invalid bit count {bits}, maximum allowed is {max_bits}")]
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u32,
        /// Maximum allowed bits for this operation.
        max_bits: u32,
    },

    /// Value exceeds the range representable by the specified number of bits.
    #[error("value {value} cannot be represented in {bits} bits")]
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u32,
    },

    /// A NUL-terminated string did not terminate within its byte cap.
    #[error("string exceeds {limit} bytes without a terminator")]
    StringTooLong {
        /// Maximum number of bytes permitted.
        limit: usize,
    },
}
