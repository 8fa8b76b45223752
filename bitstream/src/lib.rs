//! Bit cursor primitives for replay decoding.
//!
//! This crate provides [`BitReader`], a bounded LSB-first cursor over a
//! borrowed byte buffer, plus the varint and zigzag readers built on it.
//! [`BitWriter`] mirrors the layout for building fixtures.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked against the bit length.
//! - **No domain knowledge** - This crate knows nothing about entities, tables, or schemas.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//! writer.write_varu32(300);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_varu32().unwrap(), 300);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::{BitReader, MAX_READ_BITS, VARINT32_MAX_BYTES, VARINT64_MAX_BYTES};
pub use writer::BitWriter;
