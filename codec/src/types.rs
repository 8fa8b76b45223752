//! Core types for the codec.

/// Bits used for an entity slot index.
pub const ENTITY_INDEX_BITS: u32 = 14;

/// Bits used for an entity serial number.
pub const SERIAL_BITS: u32 = 10;

/// Highest valid entity slot index.
pub const MAX_ENTITY_INDEX: u32 = (1 << ENTITY_INDEX_BITS) - 1;

/// A server tick number.
///
/// Frames are applied in non-decreasing tick order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(u32);

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(tick: u32) -> Self {
        Self(tick)
    }

    /// Returns the raw tick value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for Tick {
    fn from(tick: u32) -> Self {
        Self(tick)
    }
}

impl From<Tick> for u32 {
    fn from(tick: Tick) -> Self {
        tick.0
    }
}

/// A server class identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassId(u32);

impl ClassId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for ClassId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A combined entity reference: slot index in the low 14 bits, serial in
/// the next 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityHandle(u32);

impl EntityHandle {
    /// Builds a handle from an index and serial; excess bits are masked off.
    #[must_use]
    pub const fn from_parts(index: u32, serial: u32) -> Self {
        let index = index & MAX_ENTITY_INDEX;
        let serial = serial & ((1 << SERIAL_BITS) - 1);
        Self(index | (serial << ENTITY_INDEX_BITS))
    }

    /// Wraps a raw handle value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & MAX_ENTITY_INDEX
    }

    /// Returns the serial number.
    #[must_use]
    pub const fn serial(self) -> u32 {
        (self.0 >> ENTITY_INDEX_BITS) & ((1 << SERIAL_BITS) - 1)
    }
}
