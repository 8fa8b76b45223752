//! Reusable scratch buffers for codec operations.

/// Scratch buffers reused across entity updates.
#[derive(Debug, Default)]
pub struct DecodeScratch {
    field_indices: Vec<usize>,
}

impl DecodeScratch {
    /// Creates a new scratch buffer with no pre-allocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the field index buffer, emptied.
    pub(crate) fn field_indices_mut(&mut self) -> &mut Vec<usize> {
        self.field_indices.clear();
        &mut self.field_indices
    }
}
