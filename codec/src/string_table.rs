//! Incremental string tables.
//!
//! A string table is a fixed-capacity array of entries, each with an
//! optional key and an optional binary payload. Tables are created with an
//! initial batch of entries and then patched by update records. Keys are
//! compressed against the table's 32 most recent keys.

use std::collections::{HashMap, VecDeque};

use bitstream::{BitError, BitReader};
use tracing::{debug, trace};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;

/// Number of recent keys kept for back-references.
pub const KEY_HISTORY_SIZE: usize = 32;

const HISTORY_INDEX_BITS: u32 = 5;
const SUBSTRING_LENGTH_BITS: u32 = 5;
const PAYLOAD_LENGTH_BITS: u32 = 14;

/// One string table slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTableEntry {
    pub key: Option<String>,
    pub value: Option<Vec<u8>>,
}

/// A single string table and its key history.
#[derive(Debug, Clone)]
pub struct StringTable {
    name: String,
    max_entries: u32,
    fixed_size: bool,
    entry_bits: u32,
    entries: Vec<StringTableEntry>,
    keys: HashMap<String, usize>,
    history: VecDeque<Vec<u8>>,
    revision: u64,
}

impl StringTable {
    fn new(name: String, max_entries: u32, fixed_size: bool, entry_bits: u32) -> Self {
        Self {
            name,
            max_entries,
            fixed_size,
            entry_bits,
            entries: Vec::new(),
            keys: HashMap::new(),
            history: VecDeque::with_capacity(KEY_HISTORY_SIZE),
            revision: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn max_entries(&self) -> u32 {
        self.max_entries
    }

    /// Number of slots written so far (highest index + 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&StringTableEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &StringTableEntry)> {
        self.entries.iter().enumerate()
    }

    /// Returns the index and entry whose key is `key`.
    #[must_use]
    pub fn find_key(&self, key: &str) -> Option<(usize, &StringTableEntry)> {
        let index = *self.keys.get(key)?;
        self.entries.get(index).map(|entry| (index, entry))
    }

    /// Counts applied records; changes whenever any entry may have changed.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the key history, oldest first.
    pub fn key_history(&self) -> impl Iterator<Item = &[u8]> {
        self.history.iter().map(Vec::as_slice)
    }

    fn index_bits(&self) -> u32 {
        if self.max_entries <= 1 {
            0
        } else {
            u32::BITS - (self.max_entries - 1).leading_zeros()
        }
    }

    fn apply_entries(
        &mut self,
        reader: &mut BitReader<'_>,
        count: u32,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        let bulk = reader.read_bit()?;
        trace!(table = %self.name, count, bulk, "applying string table entries");

        let index_bits = self.index_bits();
        let mut previous: Option<usize> = None;

        for _ in 0..count {
            let index = if reader.read_bit()? {
                reader.read_bits(index_bits)? as usize
            } else {
                previous.map_or(0, |prev| prev + 1)
            };
            if index >= self.max_entries as usize {
                return Err(CodecError::StringTableIndexOutOfRange {
                    index,
                    max_entries: self.max_entries as usize,
                });
            }
            previous = Some(index);

            let key = if reader.read_bit()? {
                Some(self.read_key(reader, limits)?)
            } else {
                None
            };
            let value = if reader.read_bit()? {
                Some(self.read_payload(reader, limits)?)
            } else {
                None
            };

            self.write_entry(index, key, value);
        }

        self.revision += 1;
        Ok(())
    }

    fn read_key(&mut self, reader: &mut BitReader<'_>, limits: &CodecLimits) -> CodecResult<String> {
        let mut key = if reader.read_bit()? {
            let index = reader.read_bits(HISTORY_INDEX_BITS)? as usize;
            let length = reader.read_bits(SUBSTRING_LENGTH_BITS)? as usize;
            let source = self
                .history
                .get(index)
                .ok_or(CodecError::StringHistoryOutOfRange {
                    index,
                    len: self.history.len(),
                })?;
            if length > source.len() {
                return Err(CodecError::SubstringOutOfRange {
                    length,
                    available: source.len(),
                });
            }
            source[..length].to_vec()
        } else {
            Vec::new()
        };

        let remaining = limits.max_string_key_bytes.saturating_sub(key.len());
        let suffix = reader
            .read_cstring(remaining)
            .map_err(|err| key_limit_error(err, limits))?;
        key.extend_from_slice(&suffix);

        if self.history.len() == KEY_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(key.clone());

        Ok(String::from_utf8_lossy(&key).into_owned())
    }

    fn read_payload(
        &self,
        reader: &mut BitReader<'_>,
        limits: &CodecLimits,
    ) -> CodecResult<Vec<u8>> {
        let bits = if self.fixed_size {
            self.entry_bits as usize
        } else {
            reader.read_bits(PAYLOAD_LENGTH_BITS)? as usize * 8
        };
        let bytes = bits.div_ceil(8);
        if bytes > limits.max_string_payload_bytes {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::StringPayloadBytes,
                limit: limits.max_string_payload_bytes,
                actual: bytes,
            });
        }
        Ok(reader.read_bits_to_vec(bits)?)
    }

    fn write_entry(&mut self, index: usize, key: Option<String>, value: Option<Vec<u8>>) {
        if self.entries.len() <= index {
            self.entries.resize_with(index + 1, StringTableEntry::default);
        }
        let entry = &mut self.entries[index];

        if let Some(key) = key {
            if let Some(old) = entry.key.take() {
                if self.keys.get(&old) == Some(&index) {
                    self.keys.remove(&old);
                }
            }
            self.keys.insert(key.clone(), index);
            entry.key = Some(key);
        }
        if let Some(value) = value {
            entry.value = Some(value);
        }
    }
}

fn key_limit_error(err: BitError, limits: &CodecLimits) -> CodecError {
    match err {
        BitError::StringTooLong { .. } => CodecError::LimitsExceeded {
            kind: LimitKind::StringKeyBytes,
            limit: limits.max_string_key_bytes,
            actual: limits.max_string_key_bytes + 1,
        },
        other => other.into(),
    }
}

/// All string tables of a session, addressed by creation order or name.
#[derive(Debug, Default)]
pub struct StringTableStore {
    tables: Vec<StringTable>,
    by_name: HashMap<String, usize>,
}

impl StringTableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty table and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateStringTable`] if the name is taken.
    pub fn create_table(
        &mut self,
        name: &str,
        max_entries: u32,
        fixed_size: bool,
        entry_bits: u32,
    ) -> CodecResult<usize> {
        if self.by_name.contains_key(name) {
            return Err(CodecError::DuplicateStringTable {
                name: name.to_string(),
            });
        }
        let table_id = self.tables.len();
        self.tables.push(StringTable::new(
            name.to_string(),
            max_entries,
            fixed_size,
            entry_bits,
        ));
        self.by_name.insert(name.to_string(), table_id);
        debug!(table = name, table_id, max_entries, fixed_size, "string table created");
        Ok(table_id)
    }

    /// Applies the initial entries of a freshly created table.
    pub fn apply_create(
        &mut self,
        table_id: usize,
        data: &[u8],
        entry_count: u32,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        self.apply(table_id, data, entry_count, limits)
    }

    /// Applies an update record to an existing table.
    pub fn apply_update(
        &mut self,
        table_id: usize,
        data: &[u8],
        changed_entries: u32,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        self.apply(table_id, data, changed_entries, limits)
    }

    fn apply(
        &mut self,
        table_id: usize,
        data: &[u8],
        count: u32,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        let table = self
            .tables
            .get_mut(table_id)
            .ok_or(CodecError::UnknownStringTable { table_id })?;
        let mut reader = BitReader::new(data);
        table
            .apply_entries(&mut reader, count, limits)
            .map_err(|err| err.in_string_table(table_id, reader.bit_position()))
    }

    #[must_use]
    pub fn get(&self, table_id: usize) -> Option<&StringTable> {
        self.tables.get(table_id)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&StringTable> {
        self.by_name.get(name).and_then(|&id| self.tables.get(id))
    }

    #[must_use]
    pub fn table_id(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StringTable> {
        self.tables.iter()
    }
}
