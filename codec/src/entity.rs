//! Live entity state.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{CodecError, CodecResult};
use crate::types::{ClassId, EntityHandle};
use crate::value::FieldValue;

/// Field values of one entity keyed by flat path, in first-write order.
pub type FieldMap = IndexMap<Arc<str>, FieldValue>;

/// One field written by an update, with the value it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub path: Arc<str>,
    pub old: Option<FieldValue>,
    pub new: FieldValue,
}

/// What one entity update record did.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Created {
        index: u32,
        handle: EntityHandle,
        class_id: ClassId,
    },
    Preserved {
        index: u32,
        changes: Vec<FieldChange>,
    },
    Deleted {
        index: u32,
    },
    Left {
        index: u32,
    },
}

impl EntityEvent {
    /// Returns the slot index the event refers to.
    #[must_use]
    pub const fn index(&self) -> u32 {
        match self {
            Self::Created { index, .. }
            | Self::Preserved { index, .. }
            | Self::Deleted { index }
            | Self::Left { index } => *index,
        }
    }
}

/// A networked entity reconstructed from baseline and updates.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketEntity {
    index: u32,
    serial: u32,
    class_id: ClassId,
    values: FieldMap,
    last_changes: Vec<FieldChange>,
    live: bool,
}

impl PacketEntity {
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    #[must_use]
    pub const fn class_id(&self) -> ClassId {
        self.class_id
    }

    #[must_use]
    pub const fn handle(&self) -> EntityHandle {
        EntityHandle::from_parts(self.index, self.serial)
    }

    /// Returns `false` once the entity has been deleted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.values.get(path)
    }

    #[must_use]
    pub const fn values(&self) -> &FieldMap {
        &self.values
    }

    /// Fields written by the most recent create or preserve.
    #[must_use]
    pub fn last_changes(&self) -> &[FieldChange] {
        &self.last_changes
    }

    fn write(&mut self, updates: Vec<(Arc<str>, FieldValue)>) {
        self.last_changes.clear();
        for (path, new) in updates {
            let old = self.values.insert(Arc::clone(&path), new.clone());
            self.last_changes.push(FieldChange { path, old, new });
        }
    }
}

/// Slot-indexed storage of every entity seen in a session.
#[derive(Debug, Default)]
pub struct EntityStateStore {
    slots: Vec<Option<PacketEntity>>,
    live: usize,
}

impl EntityStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entity in slot `index`, live or deleted.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&PacketEntity> {
        self.slots.get(index as usize)?.as_ref()
    }

    /// Returns the entity a handle refers to if its serial still matches.
    #[must_use]
    pub fn by_handle(&self, handle: EntityHandle) -> Option<&PacketEntity> {
        self.get(handle.index())
            .filter(|entity| entity.serial == handle.serial())
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &PacketEntity> {
        self.slots.iter().flatten().filter(|entity| entity.live)
    }

    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Places a new entity in `index`, replacing whatever was there.
    ///
    /// `values` starts from the class baseline; `updates` are the explicit
    /// fields of the create record.
    pub(crate) fn create(
        &mut self,
        index: u32,
        serial: u32,
        class_id: ClassId,
        values: FieldMap,
        updates: Vec<(Arc<str>, FieldValue)>,
    ) -> &PacketEntity {
        let slot = index as usize;
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        if self.slots[slot].as_ref().is_some_and(|old| old.live) {
            self.live -= 1;
        }

        let mut entity = PacketEntity {
            index,
            serial,
            class_id,
            values,
            last_changes: Vec::new(),
            live: true,
        };
        entity.write(updates);
        self.live += 1;
        self.slots[slot].insert(entity)
    }

    /// Applies explicit field values to a live entity and returns the
    /// changes.
    pub(crate) fn preserve(
        &mut self,
        index: u32,
        updates: Vec<(Arc<str>, FieldValue)>,
    ) -> CodecResult<&[FieldChange]> {
        let entity = self.live_mut(index)?;
        entity.write(updates);
        Ok(entity.last_changes.as_slice())
    }

    /// Marks a live entity deleted, keeping its last state readable.
    pub(crate) fn delete(&mut self, index: u32) -> CodecResult<()> {
        let entity = self.live_mut(index)?;
        entity.live = false;
        self.live -= 1;
        Ok(())
    }

    /// Returns the class of the live entity in `index`.
    pub(crate) fn live_class(&self, index: u32) -> CodecResult<ClassId> {
        self.get(index)
            .filter(|entity| entity.live)
            .map(PacketEntity::class_id)
            .ok_or(CodecError::EntityNotFound { index })
    }

    fn live_mut(&mut self, index: u32) -> CodecResult<&mut PacketEntity> {
        self.slots
            .get_mut(index as usize)
            .and_then(Option::as_mut)
            .filter(|entity| entity.live)
            .ok_or(CodecError::EntityNotFound { index })
    }
}
