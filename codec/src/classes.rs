//! Server class registry.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::types::ClassId;

/// A networked class and the field table describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerClass {
    pub id: ClassId,
    pub name: String,
    pub table: String,
}

/// Maps class ids to server classes and sizes the class id field.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    max_classes: Option<u32>,
    classes: BTreeMap<ClassId, ServerClass>,
}

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the server's class count.
    pub fn set_max_classes(&mut self, max_classes: u32) {
        debug!(max_classes, "server class count set");
        self.max_classes = Some(max_classes);
    }

    #[must_use]
    pub const fn max_classes(&self) -> Option<u32> {
        self.max_classes
    }

    /// Width of the class id field: `ceil(log2(max_classes)) + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingServerInfo`] before the class count is known.
    pub fn class_bits(&self) -> CodecResult<u32> {
        let max = self.max_classes.ok_or(CodecError::MissingServerInfo)?;
        Ok(ceil_log2(max) + 1)
    }

    /// Registers (or replaces) a class binding.
    pub fn register(&mut self, class: ServerClass) {
        debug!(class_id = class.id.raw(), name = %class.name, table = %class.table, "server class registered");
        self.classes.insert(class.id, class);
    }

    /// Looks up a class, checking it against the announced class count.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ClassIdOutOfRange`] or [`CodecError::UnknownClass`].
    pub fn lookup(&self, id: ClassId) -> CodecResult<&ServerClass> {
        if let Some(max_classes) = self.max_classes {
            if id.raw() >= max_classes {
                return Err(CodecError::ClassIdOutOfRange {
                    class_id: id.raw(),
                    max_classes,
                });
            }
        }
        self.classes
            .get(&id)
            .ok_or(CodecError::UnknownClass { class_id: id.raw() })
    }

    #[must_use]
    pub fn get(&self, id: ClassId) -> Option<&ServerClass> {
        self.classes.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates classes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ServerClass> {
        self.classes.values()
    }
}

fn ceil_log2(value: u32) -> u32 {
    if value <= 1 {
        0
    } else {
        u32::BITS - (value - 1).leading_zeros()
    }
}
