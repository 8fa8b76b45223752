//! Field table schema and flat field list resolution.
//!
//! This crate describes how networked classes are laid out on the wire:
//! - Field descriptors with kinds, flags, bit widths, and float ranges
//! - Named field tables that nest one another
//! - The resolver that flattens a class table into its ordered field list
//! - Deterministic flat list hashing
//!
//! # Design Principles
//!
//! - **Order is the contract** - Flat list positions are wire field indices.
//! - **Explicit schemas** - Tables arrive at runtime; nothing is reflected.
//! - **Deterministic resolution** - Identical tables always resolve identically.

mod error;
mod field;
mod hash;
mod resolver;
mod table;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDescriptor, FieldFlags, FieldKind, DEFAULT_PRIORITY};
pub use hash::flat_list_hash;
pub use resolver::{FlatField, FlatFieldList, SchemaResolver};
pub use table::FieldTable;
