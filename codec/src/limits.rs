//! Limits for codec-level decoding.

/// Codec-specific limits enforced while decoding record payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum length of a string-table key in bytes.
    pub max_string_key_bytes: usize,
    /// Maximum size of a string-table entry payload in bytes.
    pub max_string_payload_bytes: usize,
    /// Maximum length of a string field value in bytes.
    pub max_field_string_bytes: usize,
    /// Maximum number of elements in an array field.
    pub max_array_elements: usize,
    /// Maximum number of field indices in one entity update.
    pub max_fields_per_update: usize,
    /// Maximum number of entity updates in one record.
    pub max_entity_updates: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_string_key_bytes: 1024,
            max_string_payload_bytes: 16384,
            max_field_string_bytes: 512,
            max_array_elements: 1024,
            max_fields_per_update: 16384,
            max_entity_updates: 16384,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_string_key_bytes: 64,
            max_string_payload_bytes: 256,
            max_field_string_bytes: 64,
            max_array_elements: 32,
            max_fields_per_update: 128,
            max_entity_updates: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_string_key_bytes: usize::MAX,
            max_string_payload_bytes: usize::MAX,
            max_field_string_bytes: usize::MAX,
            max_array_elements: usize::MAX,
            max_fields_per_update: usize::MAX,
            max_entity_updates: usize::MAX,
        }
    }
}
