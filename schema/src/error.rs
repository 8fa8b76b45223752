//! Schema resolution errors.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building tables or resolving flat field lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A table name was referenced but never defined.
    #[error("unknown field table {name:?}")]
    UnknownTable { name: String },

    /// A field carried a kind code outside the known set.
    #[error("unknown field kind {raw} for field {field:?}")]
    UnknownFieldKind { raw: u32, field: String },

    /// A nested-table field did not name the table it nests.
    #[error("nested field {field:?} in table {table:?} names no table")]
    MissingNestedTable { table: String, field: String },

    /// An array field has no preceding inside-array element field.
    #[error("array field {field:?} in table {table:?} has no element field")]
    MissingArrayElement { table: String, field: String },

    /// A table nests itself, directly or transitively.
    #[error("field table {name:?} nests itself")]
    RecursiveTable { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_mentions_names() {
        let err = SchemaError::UnknownTable {
            name: "DT_Missing".to_string(),
        };
        assert!(err.to_string().contains("DT_Missing"));

        let err = SchemaError::UnknownFieldKind {
            raw: 9,
            field: "m_iHealth".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains("m_iHealth"));
    }
}
