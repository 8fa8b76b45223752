//! Field kinds, flags, and descriptors.

use crate::error::{SchemaError, SchemaResult};

/// Priority assigned to fields that declare none; also the bucket that
/// collects fields flagged [`FieldFlags::CHANGES_OFTEN`].
pub const DEFAULT_PRIORITY: u32 = 64;

/// The encoding kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum FieldKind {
    /// Integer of up to 32 bits.
    Int = 0,
    /// Float with one of several compact encodings.
    Float = 1,
    /// Three floats.
    Vector = 2,
    /// Two floats.
    VectorXY = 3,
    /// Length-prefixed string.
    String = 4,
    /// Counted array of a linked element type.
    Array = 5,
    /// Reference to another field table.
    DataTable = 6,
    /// Integer of up to 64 bits.
    Int64 = 7,
}

impl FieldKind {
    /// Parses a kind from its wire code.
    pub fn from_raw(raw: u32, field: &str) -> SchemaResult<Self> {
        match raw {
            0 => Ok(Self::Int),
            1 => Ok(Self::Float),
            2 => Ok(Self::Vector),
            3 => Ok(Self::VectorXY),
            4 => Ok(Self::String),
            5 => Ok(Self::Array),
            6 => Ok(Self::DataTable),
            7 => Ok(Self::Int64),
            _ => Err(SchemaError::UnknownFieldKind {
                raw,
                field: field.to_string(),
            }),
        }
    }

    /// Returns the wire code of this kind.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Field flags controlling sub-encodings and flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldFlags(u32);

impl FieldFlags {
    pub const UNSIGNED: u32 = 1 << 0;
    /// World coordinate float encoding.
    pub const COORD: u32 = 1 << 1;
    /// Raw IEEE float bits.
    pub const NO_SCALE: u32 = 1 << 2;
    pub const ROUND_DOWN: u32 = 1 << 3;
    pub const ROUND_UP: u32 = 1 << 4;
    /// Normalized float; on vectors, z is derived from x and y.
    pub const NORMAL: u32 = 1 << 5;
    /// Marks a field that removes `(table, name)` from the flattened list.
    pub const EXCLUDE: u32 = 1 << 6;
    pub const XYZE: u32 = 1 << 7;
    /// Element-type field describing the next array field.
    pub const INSIDE_ARRAY: u32 = 1 << 8;
    pub const PROXY_ALWAYS: u32 = 1 << 9;
    pub const VECTOR_ELEM: u32 = 1 << 10;
    /// Nested table is inlined at the parent's path.
    pub const COLLAPSIBLE: u32 = 1 << 11;
    pub const COORD_MP: u32 = 1 << 12;
    pub const COORD_MP_LOW_PRECISION: u32 = 1 << 13;
    pub const COORD_MP_INTEGRAL: u32 = 1 << 14;
    pub const CELL_COORD: u32 = 1 << 15;
    pub const CELL_COORD_LOW_PRECISION: u32 = 1 << 16;
    pub const CELL_COORD_INTEGRAL: u32 = 1 << 17;
    /// Field joins the default priority bucket regardless of its priority.
    pub const CHANGES_OFTEN: u32 = 1 << 18;
    /// Integer sent as a varint delta against the tick count.
    pub const ENCODED_AGAINST_TICKCOUNT: u32 = 1 << 19;

    /// Creates flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `mask` is set.
    #[must_use]
    pub const fn contains(self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    /// Returns these flags with `mask` added.
    #[must_use]
    pub const fn with(self, mask: u32) -> Self {
        Self(self.0 | mask)
    }

    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        self.contains(Self::UNSIGNED)
    }

    #[must_use]
    pub const fn is_excluded(self) -> bool {
        self.contains(Self::EXCLUDE)
    }

    #[must_use]
    pub const fn is_inside_array(self) -> bool {
        self.contains(Self::INSIDE_ARRAY)
    }

    #[must_use]
    pub const fn is_collapsible(self) -> bool {
        self.contains(Self::COLLAPSIBLE)
    }

    #[must_use]
    pub const fn changes_often(self) -> bool {
        self.contains(Self::CHANGES_OFTEN)
    }

    #[must_use]
    pub const fn is_tick_encoded(self) -> bool {
        self.contains(Self::ENCODED_AGAINST_TICKCOUNT)
    }
}

impl From<u32> for FieldFlags {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Immutable metadata describing one networked field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDescriptor {
    pub name: String,
    /// Name of the table that declares this field.
    pub table: String,
    pub kind: FieldKind,
    pub flags: FieldFlags,
    pub bits: u32,
    pub low: f32,
    pub high: f32,
    /// Maximum element count for arrays.
    pub elements: u32,
    pub priority: u32,
    /// For `DataTable` fields (and exclusions) the table being referenced.
    pub nested_table: Option<String>,
    /// For `Array` fields, the linked element type.
    pub element: Option<Box<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// Creates a descriptor with default width, range, and priority.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            kind,
            flags: FieldFlags::default(),
            bits: 0,
            low: 0.0,
            high: 0.0,
            elements: 0,
            priority: DEFAULT_PRIORITY,
            nested_table: None,
            element: None,
        }
    }

    /// Creates a nested-table field referring to `nested`.
    #[must_use]
    pub fn data_table(
        table: impl Into<String>,
        name: impl Into<String>,
        nested: impl Into<String>,
    ) -> Self {
        Self::new(table, name, FieldKind::DataTable).nested(nested)
    }

    /// Creates an exclusion entry removing `(target_table, name)`.
    #[must_use]
    pub fn exclude(
        table: impl Into<String>,
        target_table: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(table, name, FieldKind::Int)
            .flags(FieldFlags::EXCLUDE)
            .nested(target_table)
    }

    /// Adds flags.
    #[must_use]
    pub const fn flags(mut self, mask: u32) -> Self {
        self.flags = self.flags.with(mask);
        self
    }

    /// Sets the declared bit width.
    #[must_use]
    pub const fn bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Sets the float range.
    #[must_use]
    pub const fn range(mut self, low: f32, high: f32) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Sets the array element count.
    #[must_use]
    pub const fn elements(mut self, elements: u32) -> Self {
        self.elements = elements;
        self
    }

    /// Sets the ordering priority.
    #[must_use]
    pub const fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the referenced table.
    #[must_use]
    pub fn nested(mut self, nested: impl Into<String>) -> Self {
        self.nested_table = Some(nested.into());
        self
    }

    /// Table whose field this exclusion entry removes.
    #[must_use]
    pub fn exclusion_target(&self) -> &str {
        self.nested_table.as_deref().unwrap_or(&self.table)
    }
}
