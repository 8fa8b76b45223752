//! Configurable limits for bounded record handling.

/// Record-level limits checked before a record is dispatched.
///
/// Payload parsing limits belong to the codec; these only bound the size
/// of what the framing layer hands over.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum payload size of a single string-table or entity record.
    pub max_payload_bytes: usize,

    /// Maximum number of props in a single send table.
    pub max_props_per_table: usize,

    /// Maximum number of server classes in a class-info record.
    pub max_server_classes: usize,

    /// Maximum `max_entries` a string table may declare.
    pub max_string_table_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Full entity snapshots of busy servers run to a few hundred KB.
            max_payload_bytes: 2 * 1024 * 1024,
            max_props_per_table: 4096,
            max_server_classes: 8192,
            max_string_table_entries: 1 << 16,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_payload_bytes: 4096,
            max_props_per_table: 64,
            max_server_classes: 64,
            max_string_table_entries: 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_payload_bytes: usize::MAX,
            max_props_per_table: usize::MAX,
            max_server_classes: usize::MAX,
            max_string_table_entries: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_payload_bytes() {
        let limits = Limits::default();
        assert_eq!(limits.max_payload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_payload_bytes < default_limits.max_payload_bytes);
        assert!(test_limits.max_props_per_table < default_limits.max_props_per_table);
        assert!(test_limits.max_server_classes < default_limits.max_server_classes);
        assert!(test_limits.max_string_table_entries < default_limits.max_string_table_entries);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_payload_bytes, usize::MAX);
        assert_eq!(limits.max_server_classes, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_props_per_table, 64);
    }
}
