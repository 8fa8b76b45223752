//! Compact float encodings.
//!
//! Each reader consumes exactly the bits its encoding defines and returns
//! the decoded value. Varints and zigzag integers live on
//! [`BitReader`] itself.

use bitstream::BitReader;

use crate::error::{CodecError, CodecResult};

const COORD_INTEGER_BITS: u32 = 14;
const COORD_INTEGER_BITS_MP: u32 = 11;
const COORD_FRACTIONAL_BITS: u32 = 5;
const COORD_FRACTIONAL_BITS_LOW_PRECISION: u32 = 3;
const COORD_RESOLUTION: f32 = 1.0 / (1 << COORD_FRACTIONAL_BITS) as f32;
const COORD_RESOLUTION_LOW_PRECISION: f32 = 1.0 / (1 << COORD_FRACTIONAL_BITS_LOW_PRECISION) as f32;

const NORMAL_FRACTIONAL_BITS: u32 = 11;
const NORMAL_RESOLUTION: f32 = 1.0 / ((1 << NORMAL_FRACTIONAL_BITS) - 1) as f32;

/// Offset added to integral cell coordinates whose bit 7 is set.
const CELL_COORD_WRAP: f32 = 4_294_967_296.0;

/// Variant of the multiplayer coordinate encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordMpKind {
    Normal,
    LowPrecision,
    Integral,
}

/// Variant of the cell coordinate encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCoordKind {
    Normal,
    LowPrecision,
    Integral,
}

/// Reads a normalized float in `[-1, 1]`: sign bit, then 11 fraction bits.
pub fn read_normal(reader: &mut BitReader<'_>) -> CodecResult<f32> {
    let negative = reader.read_bit()?;
    let fraction = reader.read_bits(NORMAL_FRACTIONAL_BITS)?;
    let value = fraction as f32 * NORMAL_RESOLUTION;
    Ok(if negative { -value } else { value })
}

/// Reads a world coordinate.
///
/// # Errors
///
/// Returns [`CodecError::EmptyCoordinate`] when neither the integer nor the
/// fraction presence bit is set.
pub fn read_coord(reader: &mut BitReader<'_>) -> CodecResult<f32> {
    let has_int = reader.read_bit()?;
    let has_fraction = reader.read_bit()?;
    if !has_int && !has_fraction {
        return Err(CodecError::EmptyCoordinate);
    }

    let negative = reader.read_bit()?;
    let int = if has_int {
        reader.read_bits(COORD_INTEGER_BITS)? + 1
    } else {
        0
    };
    let fraction = if has_fraction {
        reader.read_bits(COORD_FRACTIONAL_BITS)?
    } else {
        0
    };

    let value = int as f32 + fraction as f32 * COORD_RESOLUTION;
    Ok(if negative { -value } else { value })
}

/// Reads a multiplayer-optimized coordinate.
pub fn read_coord_mp(reader: &mut BitReader<'_>, kind: CoordMpKind) -> CodecResult<f32> {
    let in_bounds = reader.read_bit()?;
    let int_bits = if in_bounds {
        COORD_INTEGER_BITS_MP
    } else {
        COORD_INTEGER_BITS
    };

    if kind == CoordMpKind::Integral {
        if !reader.read_bit()? {
            return Ok(0.0);
        }
        let negative = reader.read_bit()?;
        let value = (reader.read_bits(int_bits)? + 1) as f32;
        return Ok(if negative { -value } else { value });
    }

    let has_int = reader.read_bit()?;
    let negative = reader.read_bit()?;
    let int = if has_int {
        reader.read_bits(int_bits)? + 1
    } else {
        0
    };
    let (fraction_bits, resolution) = match kind {
        CoordMpKind::LowPrecision => (COORD_FRACTIONAL_BITS_LOW_PRECISION, COORD_RESOLUTION_LOW_PRECISION),
        _ => (COORD_FRACTIONAL_BITS, COORD_RESOLUTION),
    };
    let fraction = reader.read_bits(fraction_bits)?;

    let value = int as f32 + fraction as f32 * resolution;
    Ok(if negative { -value } else { value })
}

/// Reads a cell-relative coordinate with a `bits`-wide integer part.
pub fn read_cell_coord(
    reader: &mut BitReader<'_>,
    bits: u32,
    kind: CellCoordKind,
) -> CodecResult<f32> {
    let int = reader.read_bits(bits)?;

    if kind == CellCoordKind::Integral {
        let mut value = int as f32;
        if int & 0x80 != 0 {
            value += CELL_COORD_WRAP;
        }
        return Ok(value);
    }

    let (fraction_bits, resolution) = match kind {
        CellCoordKind::LowPrecision => (COORD_FRACTIONAL_BITS_LOW_PRECISION, COORD_RESOLUTION_LOW_PRECISION),
        _ => (COORD_FRACTIONAL_BITS, COORD_RESOLUTION),
    };
    let fraction = reader.read_bits(fraction_bits)?;
    Ok(int as f32 + fraction as f32 * resolution)
}

/// Reads a `bits`-wide interpolant across `[low, high]`.
pub fn read_quantized(
    reader: &mut BitReader<'_>,
    bits: u32,
    low: f32,
    high: f32,
) -> CodecResult<f32> {
    let interpolant = reader.read_bits(bits)?;
    if bits == 0 {
        return Ok(low);
    }
    let steps = ((1u64 << bits) - 1) as f32;
    Ok(low + (high - low) * (interpolant as f32 / steps))
}

/// Reads raw IEEE-754 single precision bits.
pub fn read_no_scale(reader: &mut BitReader<'_>) -> CodecResult<f32> {
    Ok(f32::from_bits(reader.read_bits(32)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::BitWriter;

    fn reader_for(write: impl FnOnce(&mut BitWriter)) -> Vec<u8> {
        let mut writer = BitWriter::new();
        write(&mut writer);
        writer.finish()
    }

    #[test]
    fn normal_positive_and_negative() {
        let bytes = reader_for(|w| {
            w.write_bit(false);
            w.write_bits(2047, 11).unwrap();
            w.write_bit(true);
            w.write_bits(1024, 11).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_normal(&mut reader).unwrap(), 2047.0 * (1.0 / 2047.0));
        assert_eq!(read_normal(&mut reader).unwrap(), -(1024.0 * (1.0 / 2047.0)));
        assert_eq!(reader.bit_position(), 24);
    }

    #[test]
    fn coord_integer_and_fraction() {
        // -(12 + 1) - 8/32
        let bytes = reader_for(|w| {
            w.write_bit(true);
            w.write_bit(true);
            w.write_bit(true);
            w.write_bits(12, 14).unwrap();
            w.write_bits(8, 5).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_coord(&mut reader).unwrap(), -13.25);
        assert_eq!(reader.bit_position(), 22);
    }

    #[test]
    fn coord_fraction_only() {
        let bytes = reader_for(|w| {
            w.write_bit(false);
            w.write_bit(true);
            w.write_bit(false);
            w.write_bits(16, 5).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_coord(&mut reader).unwrap(), 0.5);
    }

    #[test]
    fn coord_without_parts_is_an_error() {
        let bytes = reader_for(|w| {
            w.write_bit(false);
            w.write_bit(false);
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_coord(&mut reader), Err(CodecError::EmptyCoordinate));
    }

    #[test]
    fn coord_mp_in_bounds_uses_short_integer() {
        let bytes = reader_for(|w| {
            w.write_bit(true); // in bounds
            w.write_bit(true); // has int
            w.write_bit(false); // positive
            w.write_bits(99, 11).unwrap();
            w.write_bits(4, 5).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_coord_mp(&mut reader, CoordMpKind::Normal).unwrap(), 100.125);
        assert_eq!(reader.bit_position(), 19);
    }

    #[test]
    fn coord_mp_low_precision_out_of_bounds() {
        let bytes = reader_for(|w| {
            w.write_bit(false);
            w.write_bit(true);
            w.write_bit(true);
            w.write_bits(4999, 14).unwrap();
            w.write_bits(3, 3).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            read_coord_mp(&mut reader, CoordMpKind::LowPrecision).unwrap(),
            -5000.375
        );
        assert_eq!(reader.bit_position(), 20);
    }

    #[test]
    fn coord_mp_integral() {
        let bytes = reader_for(|w| {
            w.write_bit(true);
            w.write_bit(true);
            w.write_bit(true);
            w.write_bits(6, 11).unwrap();
            // second value: no integer part
            w.write_bit(true);
            w.write_bit(false);
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_coord_mp(&mut reader, CoordMpKind::Integral).unwrap(), -7.0);
        assert_eq!(read_coord_mp(&mut reader, CoordMpKind::Integral).unwrap(), 0.0);
        assert_eq!(reader.bit_position(), 16);
    }

    #[test]
    fn cell_coord_fractional() {
        let bytes = reader_for(|w| {
            w.write_bits(37, 10).unwrap();
            w.write_bits(8, 5).unwrap();
            w.write_bits(37, 10).unwrap();
            w.write_bits(5, 3).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_cell_coord(&mut reader, 10, CellCoordKind::Normal).unwrap(), 37.25);
        assert_eq!(
            read_cell_coord(&mut reader, 10, CellCoordKind::LowPrecision).unwrap(),
            37.625
        );
    }

    #[test]
    fn cell_coord_integral_wraps_on_bit_seven() {
        let bytes = reader_for(|w| {
            w.write_bits(5, 10).unwrap();
            w.write_bits(0x80, 10).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_cell_coord(&mut reader, 10, CellCoordKind::Integral).unwrap(), 5.0);
        assert_eq!(
            read_cell_coord(&mut reader, 10, CellCoordKind::Integral).unwrap(),
            128.0 + 4_294_967_296.0
        );
    }

    #[test]
    fn quantized_spans_range() {
        let bytes = reader_for(|w| {
            w.write_bits(0, 8).unwrap();
            w.write_bits(255, 8).unwrap();
            w.write_bits(51, 8).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_quantized(&mut reader, 8, -10.0, 10.0).unwrap(), -10.0);
        assert_eq!(read_quantized(&mut reader, 8, -10.0, 10.0).unwrap(), 10.0);
        assert_eq!(
            read_quantized(&mut reader, 8, 0.0, 255.0).unwrap(),
            0.0 + 255.0 * (51.0 / 255.0)
        );
    }

    #[test]
    fn quantized_zero_bits_is_low() {
        let mut reader = BitReader::new(&[]);
        assert_eq!(read_quantized(&mut reader, 0, 3.5, 9.0).unwrap(), 3.5);
    }

    #[test]
    fn no_scale_is_raw_ieee() {
        let bytes = reader_for(|w| {
            w.write_bits(u64::from(1234.5f32.to_bits()), 32).unwrap();
        });
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_no_scale(&mut reader).unwrap(), 1234.5);
    }

    #[test]
    fn truncated_input_reports_end_of_buffer() {
        let mut reader = BitReader::new(&[0xFF]);
        let err = read_coord(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Bitstream(bitstream::BitError::EndOfBuffer { .. })
        ));
    }
}
