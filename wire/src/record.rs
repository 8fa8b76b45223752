//! Decoded records handed over by the framing layer.
//!
//! The framing layer splits a replay into command records, decompresses
//! them, and parses their envelope messages. What reaches the decoding core
//! is one of the [`Record`] variants below, tagged with its tick.

use std::fmt;

use bitstream::BitReader;

use crate::error::{DecodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// A record together with the tick it was captured at.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u32,
    pub record: Record,
}

impl Frame {
    #[must_use]
    pub const fn new(tick: u32, record: Record) -> Self {
        Self { tick, record }
    }
}

/// Every record kind the decoding core consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Server metadata; must precede entity records.
    ServerInfo(ServerInfo),
    /// One field table definition.
    SendTable(SendTableDef),
    /// Class id to table bindings.
    ClassInfo(Vec<ServerClassDef>),
    /// Creation of a string table with its initial entries.
    CreateStringTable(CreateStringTable),
    /// Incremental update of an existing string table.
    UpdateStringTable(UpdateStringTable),
    /// One tick's entity update payload.
    PacketEntities(PacketEntities),
}

/// Server metadata relevant to decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerInfo {
    /// Number of server classes; sizes the class id field.
    pub max_classes: u32,
}

/// A raw field table definition as sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SendTableDef {
    pub name: String,
    pub props: Vec<SendPropDef>,
}

/// A raw field definition. `kind` and `flags` are unvalidated wire codes.
#[derive(Debug, Clone, PartialEq)]
pub struct SendPropDef {
    pub kind: u32,
    pub name: String,
    pub flags: u32,
    pub priority: u32,
    /// Referenced table for nested-table props and exclusions.
    pub nested_table: Option<String>,
    pub elements: u32,
    pub low: f32,
    pub high: f32,
    pub bits: u32,
}

/// One class id binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerClassDef {
    pub class_id: u32,
    pub name: String,
    pub table: String,
}

/// Creation of a string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStringTable {
    pub name: String,
    pub max_entries: u32,
    /// Whether every entry payload has the fixed width `entry_bits`.
    pub fixed_size: bool,
    pub entry_bits: u32,
    pub entry_count: u32,
    pub data: Vec<u8>,
}

/// Incremental update of a string table, addressed by creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStringTable {
    pub table_id: u32,
    pub changed_entries: u32,
    pub data: Vec<u8>,
}

/// Entity updates for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketEntities {
    pub max_entries: u32,
    pub updated_entries: u32,
    pub is_delta: bool,
    pub data: Vec<u8>,
}

impl CreateStringTable {
    /// Returns a bit reader over the entry data.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.data)
    }
}

impl UpdateStringTable {
    /// Returns a bit reader over the entry data.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.data)
    }
}

impl PacketEntities {
    /// Returns a bit reader over the update payload.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.data)
    }
}

/// Discriminant of a [`Record`], used in logs and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    ServerInfo,
    SendTable,
    ClassInfo,
    CreateStringTable,
    UpdateStringTable,
    PacketEntities,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ServerInfo => "server info",
            Self::SendTable => "send table",
            Self::ClassInfo => "class info",
            Self::CreateStringTable => "create string table",
            Self::UpdateStringTable => "update string table",
            Self::PacketEntities => "packet entities",
        };
        write!(f, "{name}")
    }
}

impl Record {
    /// Returns the kind of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::ServerInfo(_) => RecordKind::ServerInfo,
            Self::SendTable(_) => RecordKind::SendTable,
            Self::ClassInfo(_) => RecordKind::ClassInfo,
            Self::CreateStringTable(_) => RecordKind::CreateStringTable,
            Self::UpdateStringTable(_) => RecordKind::UpdateStringTable,
            Self::PacketEntities(_) => RecordKind::PacketEntities,
        }
    }

    /// Checks the record against `limits` and its own structural rules.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LimitsExceeded`] or
    /// [`DecodeError::InvalidRecord`].
    pub fn validate(&self, limits: &Limits) -> WireResult<()> {
        let kind = self.kind();
        match self {
            Self::ServerInfo(info) => {
                if info.max_classes == 0 {
                    return Err(DecodeError::InvalidRecord {
                        kind,
                        reason: "max_classes is zero",
                    });
                }
            }
            Self::SendTable(table) => {
                check(LimitKind::TableProps, limits.max_props_per_table, table.props.len())?;
            }
            Self::ClassInfo(classes) => {
                check(LimitKind::ServerClasses, limits.max_server_classes, classes.len())?;
            }
            Self::CreateStringTable(create) => {
                check(LimitKind::PayloadBytes, limits.max_payload_bytes, create.data.len())?;
                check(
                    LimitKind::StringTableEntries,
                    limits.max_string_table_entries,
                    create.max_entries as usize,
                )?;
                if create.max_entries == 0 {
                    return Err(DecodeError::InvalidRecord {
                        kind,
                        reason: "max_entries is zero",
                    });
                }
                if create.entry_count > create.max_entries {
                    return Err(DecodeError::InvalidRecord {
                        kind,
                        reason: "entry_count exceeds max_entries",
                    });
                }
            }
            Self::UpdateStringTable(update) => {
                check(LimitKind::PayloadBytes, limits.max_payload_bytes, update.data.len())?;
            }
            Self::PacketEntities(entities) => {
                check(LimitKind::PayloadBytes, limits.max_payload_bytes, entities.data.len())?;
            }
        }
        Ok(())
    }
}

fn check(kind: LimitKind, limit: usize, actual: usize) -> WireResult<()> {
    if actual > limit {
        return Err(DecodeError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}
