//! Error types for boundary record validation.

use std::fmt;

use thiserror::Error;

use crate::record::RecordKind;

/// Result type for wire record operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors raised while validating a record before it reaches the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// A record exceeded one of the configured [`Limits`](crate::Limits).
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A record carried a structurally impossible value.
    #[error("invalid {kind} record: {reason}")]
    InvalidRecord {
        kind: RecordKind,
        reason: &'static str,
    },

    /// A record payload could not be read as bits.
    #[error("bit read failed: {0}")]
    Bits(#[from] bitstream::BitError),
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PayloadBytes,
    TableProps,
    ServerClasses,
    StringTableEntries,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PayloadBytes => "payload bytes",
            Self::TableProps => "table props",
            Self::ServerClasses => "server classes",
            Self::StringTableEntries => "string table entries",
        };
        write!(f, "{name}")
    }
}
