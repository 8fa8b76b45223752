//! Field values and per-kind field decoding.

use bitstream::BitReader;
use schema::{FieldDescriptor, FieldFlags, FieldKind, SchemaError};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::numeric::{
    read_cell_coord, read_coord, read_coord_mp, read_no_scale, read_normal, read_quantized,
    CellCoordKind, CoordMpKind,
};

/// Bits of the length prefix on string fields.
const STRING_LENGTH_BITS: u32 = 9;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i32),
    UInt(u32),
    Float(f32),
    Vector([f32; 3]),
    VectorXY([f32; 2]),
    String(String),
    Array(Vec<FieldValue>),
    Int64(i64),
    UInt64(u64),
}

impl FieldValue {
    /// Returns the value as an `i64` if it is any integer kind that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(i64::from(*v)),
            Self::UInt(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as an `f32` if it is a float.
    #[must_use]
    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Decodes one value of `descriptor`'s kind.
pub fn decode_field(
    reader: &mut BitReader<'_>,
    descriptor: &FieldDescriptor,
    limits: &CodecLimits,
) -> CodecResult<FieldValue> {
    match descriptor.kind {
        FieldKind::Int => decode_int(reader, descriptor),
        FieldKind::Float => decode_float(reader, descriptor).map(FieldValue::Float),
        FieldKind::Vector => decode_vector(reader, descriptor),
        FieldKind::VectorXY => {
            let x = decode_float(reader, descriptor)?;
            let y = decode_float(reader, descriptor)?;
            Ok(FieldValue::VectorXY([x, y]))
        }
        FieldKind::String => decode_string(reader, limits),
        FieldKind::Array => decode_array(reader, descriptor, limits),
        FieldKind::Int64 => decode_int64(reader, descriptor),
        FieldKind::DataTable => Err(CodecError::UnexpectedFieldKind {
            field: descriptor.name.clone(),
            kind: descriptor.kind.raw(),
        }),
    }
}

fn decode_int(reader: &mut BitReader<'_>, descriptor: &FieldDescriptor) -> CodecResult<FieldValue> {
    let flags = descriptor.flags;
    let value = match (flags.is_tick_encoded(), flags.is_unsigned()) {
        (true, true) => FieldValue::UInt(reader.read_varu32()?),
        (true, false) => FieldValue::Int(reader.read_vars32()?),
        (false, true) => FieldValue::UInt(reader.read_bits(descriptor.bits)?),
        (false, false) => FieldValue::Int(reader.read_signed(descriptor.bits)?),
    };
    Ok(value)
}

fn decode_int64(
    reader: &mut BitReader<'_>,
    descriptor: &FieldDescriptor,
) -> CodecResult<FieldValue> {
    let flags = descriptor.flags;
    if flags.is_tick_encoded() {
        return Ok(if flags.is_unsigned() {
            FieldValue::UInt64(reader.read_varu64()?)
        } else {
            FieldValue::Int64(reader.read_vars64()?)
        });
    }

    if flags.is_unsigned() {
        let low = u64::from(reader.read_bits(32)?);
        let high = u64::from(reader.read_bits(descriptor.bits.saturating_sub(32))?);
        return Ok(FieldValue::UInt64((high << 32) | low));
    }

    // Sign-magnitude: the sign bit comes first and is not part of the value.
    let negative = reader.read_bit()?;
    let low = u64::from(reader.read_bits(32)?);
    let high = u64::from(reader.read_bits(descriptor.bits.saturating_sub(33))?);
    let magnitude = ((high << 32) | low) as i64;
    Ok(FieldValue::Int64(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }))
}

/// Decodes a float using the first matching encoding flag.
fn decode_float(reader: &mut BitReader<'_>, descriptor: &FieldDescriptor) -> CodecResult<f32> {
    let flags = descriptor.flags;
    if flags.contains(FieldFlags::COORD) {
        read_coord(reader)
    } else if flags.contains(FieldFlags::COORD_MP) {
        read_coord_mp(reader, CoordMpKind::Normal)
    } else if flags.contains(FieldFlags::COORD_MP_LOW_PRECISION) {
        read_coord_mp(reader, CoordMpKind::LowPrecision)
    } else if flags.contains(FieldFlags::COORD_MP_INTEGRAL) {
        read_coord_mp(reader, CoordMpKind::Integral)
    } else if flags.contains(FieldFlags::NO_SCALE) {
        read_no_scale(reader)
    } else if flags.contains(FieldFlags::NORMAL) {
        read_normal(reader)
    } else if flags.contains(FieldFlags::CELL_COORD) {
        read_cell_coord(reader, descriptor.bits, CellCoordKind::Normal)
    } else if flags.contains(FieldFlags::CELL_COORD_LOW_PRECISION) {
        read_cell_coord(reader, descriptor.bits, CellCoordKind::LowPrecision)
    } else if flags.contains(FieldFlags::CELL_COORD_INTEGRAL) {
        read_cell_coord(reader, descriptor.bits, CellCoordKind::Integral)
    } else {
        read_quantized(reader, descriptor.bits, descriptor.low, descriptor.high)
    }
}

fn decode_vector(
    reader: &mut BitReader<'_>,
    descriptor: &FieldDescriptor,
) -> CodecResult<FieldValue> {
    let x = decode_float(reader, descriptor)?;
    let y = decode_float(reader, descriptor)?;

    let z = if descriptor.flags.contains(FieldFlags::NORMAL) {
        let negative = reader.read_bit()?;
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        if negative {
            -z
        } else {
            z
        }
    } else {
        decode_float(reader, descriptor)?
    };

    Ok(FieldValue::Vector([x, y, z]))
}

fn decode_string(reader: &mut BitReader<'_>, limits: &CodecLimits) -> CodecResult<FieldValue> {
    let len = reader.read_bits(STRING_LENGTH_BITS)? as usize;
    if len > limits.max_field_string_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::FieldStringBytes,
            limit: limits.max_field_string_bytes,
            actual: len,
        });
    }
    Ok(FieldValue::String(reader.read_string(len)?))
}

fn decode_array(
    reader: &mut BitReader<'_>,
    descriptor: &FieldDescriptor,
    limits: &CodecLimits,
) -> CodecResult<FieldValue> {
    let element = descriptor
        .element
        .as_deref()
        .ok_or_else(|| SchemaError::MissingArrayElement {
            table: descriptor.table.clone(),
            field: descriptor.name.clone(),
        })?;

    let max = descriptor.elements as usize;
    let count = reader.read_bits(array_count_bits(descriptor.elements))? as usize;
    if count > max {
        return Err(CodecError::ArrayTooLong { count, max });
    }
    if count > limits.max_array_elements {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::ArrayElements,
            limit: limits.max_array_elements,
            actual: count,
        });
    }

    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(decode_field(reader, element, limits)?);
    }
    Ok(FieldValue::Array(values))
}

/// Width of an array's count prefix: `floor(log2(elements)) + 1`.
fn array_count_bits(elements: u32) -> u32 {
    (u32::BITS - elements.leading_zeros()).max(1)
}
