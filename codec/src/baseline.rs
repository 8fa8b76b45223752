//! Decoded baseline cache.

use std::collections::HashMap;

use crate::types::ClassId;

/// Per-class decoded baselines, each stamped with the revision of the
/// string table it was decoded from.
///
/// A lookup only hits when the stored revision matches the caller's, so a
/// baseline table update invalidates every class lazily.
#[derive(Debug)]
pub struct BaselineCache<T> {
    entries: HashMap<ClassId, Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    revision: u64,
    value: T,
}

impl<T> Default for BaselineCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> BaselineCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached classes, stale or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores the baseline of `class` decoded at `revision`.
    pub fn insert(&mut self, class: ClassId, revision: u64, value: T) {
        self.entries.insert(class, Entry { revision, value });
    }

    /// Returns the baseline of `class` if it was decoded at `revision`.
    #[must_use]
    pub fn get(&self, class: ClassId, revision: u64) -> Option<&T> {
        self.entries
            .get(&class)
            .filter(|entry| entry.revision == revision)
            .map(|entry| &entry.value)
    }

    /// Drops every cached baseline.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
