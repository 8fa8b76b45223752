//! Error types for codec operations.

use std::fmt;

use thiserror::Error;
use wire::RecordKind;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while applying records to decoder state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Bitstream error.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// Schema error.
    #[error("schema error: {0}")]
    Schema(#[from] schema::SchemaError),

    /// Wire record error.
    #[error("wire error: {0}")]
    Wire(#[from] wire::DecodeError),

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A world coordinate carried neither an integer nor a fraction part.
    #[error("world coordinate has neither integer nor fraction part")]
    EmptyCoordinate,

    /// An entity index exceeded the slot range.
    #[error("entity index {index} exceeds maximum {max}")]
    EntityIndexOutOfRange { index: u32, max: u32 },

    /// A class id was not below the announced class count.
    #[error("class id {class_id} out of range for {max_classes} classes")]
    ClassIdOutOfRange { class_id: u32, max_classes: u32 },

    /// A class id had no registered binding.
    #[error("unknown class id {class_id}")]
    UnknownClass { class_id: u32 },

    /// An update targeted a slot with no live entity.
    #[error("entity {index} not found")]
    EntityNotFound { index: u32 },

    /// A field index exceeded the class's flat field list.
    #[error("field index {index} out of range for {len} fields")]
    FieldIndexOutOfRange { index: usize, len: usize },

    /// A string table id was never created.
    #[error("unknown string table {table_id}")]
    UnknownStringTable { table_id: usize },

    /// A string table name was created twice.
    #[error("string table {name:?} already exists")]
    DuplicateStringTable { name: String },

    /// A key back-reference pointed past the history.
    #[error("string history index {index} out of range for {len} entries")]
    StringHistoryOutOfRange { index: usize, len: usize },

    /// A key back-reference asked for more bytes than the source key holds.
    #[error("substring length {length} exceeds {available} available bytes")]
    SubstringOutOfRange { length: usize, available: usize },

    /// A string table entry index reached the table's capacity.
    #[error("string table index {index} out of range for {max_entries} entries")]
    StringTableIndexOutOfRange { index: usize, max_entries: usize },

    /// Entity records arrived before the server announced its class count.
    #[error("entity data received before server info")]
    MissingServerInfo,

    /// An array declared more elements than its descriptor allows.
    #[error("array count {count} exceeds {max} elements")]
    ArrayTooLong { count: usize, max: usize },

    /// A flat field list contained a kind that cannot carry a value.
    #[error("field {field:?} has undecodable kind {kind}")]
    UnexpectedFieldKind { field: String, kind: u32 },

    /// A frame's tick went backwards.
    #[error("tick {tick} arrived after tick {last}")]
    TickOutOfOrder { last: u32, tick: u32 },

    /// Failure while decoding one entity.
    #[error("entity {index} at bit {bit_offset}: {source}")]
    Entity {
        index: u32,
        bit_offset: usize,
        source: Box<CodecError>,
    },

    /// Failure while decoding one string table record.
    #[error("string table {table_id} at bit {bit_offset}: {source}")]
    StringTable {
        table_id: usize,
        bit_offset: usize,
        source: Box<CodecError>,
    },

    /// Failure while applying one record.
    #[error("{kind} record at tick {tick}: {source}")]
    Record {
        kind: RecordKind,
        tick: u32,
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Strips context wrappers and returns the underlying error.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Entity { source, .. }
            | Self::StringTable { source, .. }
            | Self::Record { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn in_entity(self, index: u32, bit_offset: usize) -> Self {
        Self::Entity {
            index,
            bit_offset,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_string_table(self, table_id: usize, bit_offset: usize) -> Self {
        Self::StringTable {
            table_id,
            bit_offset,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_record(self, kind: RecordKind, tick: u32) -> Self {
        Self::Record {
            kind,
            tick,
            source: Box::new(self),
        }
    }
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    StringKeyBytes,
    StringPayloadBytes,
    FieldStringBytes,
    ArrayElements,
    FieldsPerUpdate,
    EntityUpdates,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StringKeyBytes => "string key bytes",
            Self::StringPayloadBytes => "string payload bytes",
            Self::FieldStringBytes => "field string bytes",
            Self::ArrayElements => "array elements",
            Self::FieldsPerUpdate => "fields per update",
            Self::EntityUpdates => "entity updates",
        };
        write!(f, "{name}")
    }
}
