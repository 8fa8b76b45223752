//! Entity update record headers and field index lists.

use bitstream::BitReader;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::types::MAX_ENTITY_INDEX;

/// Varint value that ends a field index list.
pub const FIELD_LIST_TERMINATOR: u32 = 16383;

/// What an entity update record does to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Update an existing entity in place.
    Preserve,
    /// Create (or recreate) an entity.
    Create,
    /// Entity left the client's view; state is untouched.
    Leave,
    /// Entity was destroyed.
    Delete,
}

/// Reads the index increment of the next update record.
///
/// A 4-bit base is extended by 4 more bits (shifted by 4) and 8 more bits
/// (shifted by 8) when the corresponding flag bits are set.
pub fn read_index_delta(reader: &mut BitReader<'_>) -> CodecResult<u32> {
    let mut delta = reader.read_bits(4)?;
    let more_nibble = reader.read_bit()?;
    let more_byte = reader.read_bit()?;
    if more_nibble {
        delta += reader.read_bits(4)? << 4;
    }
    if more_byte {
        delta += reader.read_bits(8)? << 8;
    }
    Ok(delta)
}

/// Reads the next entity index given the previous one (`None` before the
/// first record).
pub fn read_entity_index(reader: &mut BitReader<'_>, previous: Option<u32>) -> CodecResult<u32> {
    let delta = read_index_delta(reader)?;
    let index = previous.map_or(delta, |prev| prev + 1 + delta);
    if index > MAX_ENTITY_INDEX {
        return Err(CodecError::EntityIndexOutOfRange {
            index,
            max: MAX_ENTITY_INDEX,
        });
    }
    Ok(index)
}

/// Reads the 2-bit update tag.
pub fn read_update_kind(reader: &mut BitReader<'_>) -> CodecResult<UpdateKind> {
    let leaving = reader.read_bit()?;
    let second = reader.read_bit()?;
    Ok(match (leaving, second) {
        (false, false) => UpdateKind::Preserve,
        (false, true) => UpdateKind::Create,
        (true, false) => UpdateKind::Leave,
        (true, true) => UpdateKind::Delete,
    })
}

/// Reads a field index list into `out`, replacing its contents.
///
/// A set bit advances to the next index; otherwise a varint either ends the
/// list or skips ahead by its value plus one. Every index must be below
/// `field_count`.
pub fn read_field_indices(
    reader: &mut BitReader<'_>,
    field_count: usize,
    limits: &CodecLimits,
    out: &mut Vec<usize>,
) -> CodecResult<()> {
    out.clear();
    let mut previous: Option<usize> = None;

    loop {
        let index = if reader.read_bit()? {
            previous.map_or(0, |prev| prev + 1)
        } else {
            let step = reader.read_varu32()?;
            if step == FIELD_LIST_TERMINATOR {
                return Ok(());
            }
            let step = step as usize;
            previous.map_or(step, |prev| prev + step + 1)
        };

        if index >= field_count {
            return Err(CodecError::FieldIndexOutOfRange {
                index,
                len: field_count,
            });
        }
        if out.len() >= limits.max_fields_per_update {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::FieldsPerUpdate,
                limit: limits.max_fields_per_update,
                actual: out.len() + 1,
            });
        }
        out.push(index);
        previous = Some(index);
    }
}
