//! String table and entity state reconstruction for replay decoding.
//!
//! This is the main decoding crate that ties together bitstream, wire, and
//! schema to rebuild the server's world state from a stream of records.
//!
//! # Features
//!
//! - Numeric field codecs (coordinates, normals, quantized floats)
//! - String tables with key history compression
//! - Server class registry and instance baselines
//! - Entity create/preserve/delete/leave with per-field change reporting
//! - A [`Session`] that routes frames to all of the above
//!
//! # Design Principles
//!
//! - **Correctness first** - Malformed input is an error, never a panic.
//! - **Bounded work** - Every count read from the stream is checked against [`CodecLimits`].
//! - **Deterministic** - Same frames produce the same state and events.

mod baseline;
mod classes;
mod delta;
mod entity;
mod error;
mod limits;
mod numeric;
mod scratch;
mod session;
mod string_table;
mod types;
mod value;

pub use baseline::BaselineCache;
pub use classes::{ClassRegistry, ServerClass};
pub use delta::{
    read_entity_index, read_field_indices, read_index_delta, read_update_kind, UpdateKind,
    FIELD_LIST_TERMINATOR,
};
pub use entity::{EntityEvent, EntityStateStore, FieldChange, FieldMap, PacketEntity};
pub use error::{CodecError, CodecResult, LimitKind};
pub use limits::CodecLimits;
pub use numeric::{
    read_cell_coord, read_coord, read_coord_mp, read_no_scale, read_normal, read_quantized,
    CellCoordKind, CoordMpKind,
};
pub use scratch::DecodeScratch;
pub use session::{Session, SessionConfig, DEFAULT_BASELINE_TABLE};
pub use string_table::{StringTable, StringTableEntry, StringTableStore, KEY_HISTORY_SIZE};
pub use types::{
    ClassId, EntityHandle, Tick, ENTITY_INDEX_BITS, MAX_ENTITY_INDEX, SERIAL_BITS,
};
pub use value::{decode_field, FieldValue};
pub use wire::Limits as WireLimits;
