//! Per-replay decoding session.
//!
//! A [`Session`] owns every piece of decoder state for one replay and routes
//! each incoming [`Frame`] to the component that consumes it.

use std::sync::Arc;

use bitstream::BitReader;
use schema::{FieldDescriptor, FieldKind, FieldTable, FlatFieldList, SchemaResolver, SchemaResult};
use tracing::{debug, debug_span, trace, warn};
use wire::{Frame, PacketEntities, Record, SendTableDef};

use crate::baseline::BaselineCache;
use crate::classes::{ClassRegistry, ServerClass};
use crate::delta::{read_entity_index, read_field_indices, read_update_kind, UpdateKind};
use crate::entity::{EntityEvent, EntityStateStore, FieldMap, PacketEntity};
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::scratch::DecodeScratch;
use crate::string_table::{StringTable, StringTableStore};
use crate::types::{ClassId, Tick, SERIAL_BITS};
use crate::value::{decode_field, FieldValue};

/// Name of the string table holding per-class instance baselines.
pub const DEFAULT_BASELINE_TABLE: &str = "instancebaseline";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    pub limits: CodecLimits,
    pub wire_limits: wire::Limits,
    /// String table whose entries are keyed by decimal class id.
    pub baseline_table: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            limits: CodecLimits::default(),
            wire_limits: wire::Limits::default(),
            baseline_table: DEFAULT_BASELINE_TABLE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with testing limits.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            limits: CodecLimits::for_testing(),
            wire_limits: wire::Limits::for_testing(),
            baseline_table: DEFAULT_BASELINE_TABLE.to_string(),
        }
    }
}

/// Decoder state for one replay.
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    resolver: SchemaResolver,
    classes: ClassRegistry,
    string_tables: StringTableStore,
    entities: EntityStateStore,
    baselines: BaselineCache<Arc<FieldMap>>,
    scratch: DecodeScratch,
    last_tick: Option<Tick>,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Tick of the last successfully applied frame.
    #[must_use]
    pub const fn last_tick(&self) -> Option<Tick> {
        self.last_tick
    }

    /// Applies one frame and returns the entity events it produced.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TickOutOfOrder`] if the frame's tick is below the
    /// last applied tick. Any failure while applying the record is wrapped in
    /// [`CodecError::Record`]; the session should be discarded afterwards.
    pub fn apply(&mut self, frame: &Frame) -> CodecResult<Vec<EntityEvent>> {
        if let Some(last) = self.last_tick {
            if frame.tick < last.raw() {
                return Err(CodecError::TickOutOfOrder {
                    last: last.raw(),
                    tick: frame.tick,
                });
            }
        }

        let kind = frame.record.kind();
        let span = debug_span!("record", %kind, tick = frame.tick);
        let _guard = span.enter();

        let events = self
            .dispatch(&frame.record)
            .map_err(|err| err.in_record(kind, frame.tick))?;
        self.last_tick = Some(Tick::new(frame.tick));
        debug!(events = events.len(), "record applied");
        Ok(events)
    }

    fn dispatch(&mut self, record: &Record) -> CodecResult<Vec<EntityEvent>> {
        record.validate(&self.config.wire_limits)?;

        match record {
            Record::ServerInfo(info) => {
                self.classes.set_max_classes(info.max_classes);
            }
            Record::SendTable(def) => {
                let table = field_table(def)?;
                self.resolver.add_table(table);
                self.baselines.clear();
            }
            Record::ClassInfo(defs) => {
                for def in defs {
                    self.classes.register(ServerClass {
                        id: ClassId::new(def.class_id),
                        name: def.name.clone(),
                        table: def.table.clone(),
                    });
                }
                self.baselines.clear();
                debug!(classes = self.classes.len(), "class info applied");
            }
            Record::CreateStringTable(create) => {
                let table_id = self.string_tables.create_table(
                    &create.name,
                    create.max_entries,
                    create.fixed_size,
                    create.entry_bits,
                )?;
                self.string_tables.apply_create(
                    table_id,
                    &create.data,
                    create.entry_count,
                    &self.config.limits,
                )?;
            }
            Record::UpdateStringTable(update) => {
                self.string_tables.apply_update(
                    update.table_id as usize,
                    &update.data,
                    update.changed_entries,
                    &self.config.limits,
                )?;
            }
            Record::PacketEntities(packet) => return self.apply_packet_entities(packet),
        }
        Ok(Vec::new())
    }

    fn apply_packet_entities(&mut self, packet: &PacketEntities) -> CodecResult<Vec<EntityEvent>> {
        let class_bits = self.classes.class_bits()?;
        let count = packet.updated_entries as usize;
        if count > self.config.limits.max_entity_updates {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::EntityUpdates,
                limit: self.config.limits.max_entity_updates,
                actual: count,
            });
        }

        let mut reader = packet.reader();
        let mut events = Vec::with_capacity(count);
        let mut previous = None;
        for _ in 0..count {
            let index = read_entity_index(&mut reader, previous)?;
            previous = Some(index);

            let start = reader.bit_position();
            let event = self
                .apply_entity(&mut reader, index, class_bits)
                .map_err(|err| err.in_entity(index, start))?;
            events.push(event);
        }

        debug!(
            updates = count,
            is_delta = packet.is_delta,
            live = self.entities.live_count(),
            "entity updates applied"
        );
        Ok(events)
    }

    fn apply_entity(
        &mut self,
        reader: &mut BitReader<'_>,
        index: u32,
        class_bits: u32,
    ) -> CodecResult<EntityEvent> {
        let kind = read_update_kind(reader)?;
        trace!(index, ?kind, "entity update");

        match kind {
            UpdateKind::Create => {
                let class_id = ClassId::new(reader.read_bits(class_bits)?);
                let serial = reader.read_bits(SERIAL_BITS)?;
                let fields = self.class_fields(class_id)?;
                let baseline = self.baseline(class_id, &fields)?;
                let updates =
                    read_fields(reader, &fields, &self.config.limits, &mut self.scratch)?;

                let entity =
                    self.entities
                        .create(index, serial, class_id, FieldMap::clone(&baseline), updates);
                Ok(EntityEvent::Created {
                    index,
                    handle: entity.handle(),
                    class_id,
                })
            }
            UpdateKind::Preserve => {
                let class_id = self.entities.live_class(index)?;
                let fields = self.class_fields(class_id)?;
                let updates =
                    read_fields(reader, &fields, &self.config.limits, &mut self.scratch)?;
                let changes = self.entities.preserve(index, updates)?.to_vec();
                Ok(EntityEvent::Preserved { index, changes })
            }
            UpdateKind::Delete => {
                self.entities.delete(index)?;
                Ok(EntityEvent::Deleted { index })
            }
            UpdateKind::Leave => Ok(EntityEvent::Left { index }),
        }
    }

    /// Returns the decoded instance baseline of `class_id`, decoding and
    /// caching it on first use for the current baseline table revision.
    fn baseline(&mut self, class_id: ClassId, fields: &FlatFieldList) -> CodecResult<Arc<FieldMap>> {
        let Some(table) = self.string_tables.by_name(&self.config.baseline_table) else {
            warn!(class_id = class_id.raw(), table = %self.config.baseline_table, "baseline table missing");
            return Ok(Arc::default());
        };

        let revision = table.revision();
        if let Some(cached) = self.baselines.get(class_id, revision) {
            return Ok(Arc::clone(cached));
        }

        let key = class_id.raw().to_string();
        let data = table
            .find_key(&key)
            .and_then(|(_, entry)| entry.value.as_deref());
        let values = match data {
            Some(data) => {
                let mut reader = BitReader::new(data);
                read_fields(&mut reader, fields, &self.config.limits, &mut self.scratch)?
                    .into_iter()
                    .collect()
            }
            None => {
                warn!(class_id = class_id.raw(), "no instance baseline for class");
                FieldMap::new()
            }
        };

        let values = Arc::new(values);
        self.baselines.insert(class_id, revision, Arc::clone(&values));
        Ok(values)
    }

    /// Resolves the flat field list of a registered class.
    pub fn class_fields(&mut self, class_id: ClassId) -> CodecResult<Arc<FlatFieldList>> {
        let table = self.classes.lookup(class_id)?.table.clone();
        Ok(self.resolver.resolve(&table)?)
    }

    #[must_use]
    pub const fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    #[must_use]
    pub const fn string_tables(&self) -> &StringTableStore {
        &self.string_tables
    }

    #[must_use]
    pub fn string_table(&self, name: &str) -> Option<&StringTable> {
        self.string_tables.by_name(name)
    }

    #[must_use]
    pub const fn entities(&self) -> &EntityStateStore {
        &self.entities
    }

    #[must_use]
    pub fn entity(&self, index: u32) -> Option<&PacketEntity> {
        self.entities.get(index)
    }
}

/// Reads a field index list and the value of every listed field.
fn read_fields(
    reader: &mut BitReader<'_>,
    fields: &FlatFieldList,
    limits: &CodecLimits,
    scratch: &mut DecodeScratch,
) -> CodecResult<Vec<(Arc<str>, FieldValue)>> {
    let indices = scratch.field_indices_mut();
    read_field_indices(reader, fields.len(), limits, indices)?;

    let mut values = Vec::with_capacity(indices.len());
    for &index in indices.iter() {
        let field = fields.get(index).ok_or(CodecError::FieldIndexOutOfRange {
            index,
            len: fields.len(),
        })?;
        let value = decode_field(reader, &field.descriptor, limits)?;
        values.push((Arc::clone(&field.path), value));
    }
    Ok(values)
}

/// Converts a raw send table into a field table.
fn field_table(def: &SendTableDef) -> CodecResult<FieldTable> {
    let fields = def
        .props
        .iter()
        .map(|prop| {
            let kind = FieldKind::from_raw(prop.kind, &prop.name)?;
            let mut descriptor = FieldDescriptor::new(def.name.as_str(), prop.name.as_str(), kind)
                .flags(prop.flags)
                .bits(prop.bits)
                .range(prop.low, prop.high)
                .elements(prop.elements)
                .priority(prop.priority);
            if let Some(nested) = &prop.nested_table {
                descriptor = descriptor.nested(nested.as_str());
            }
            Ok(descriptor)
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    debug!(table = %def.name, props = fields.len(), "send table parsed");
    Ok(FieldTable::new(def.name.as_str(), fields)?)
}
