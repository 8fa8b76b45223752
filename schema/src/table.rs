//! Named field tables.

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDescriptor, FieldKind};

/// A named, ordered collection of field descriptors.
///
/// Tables reference one another by name through `DataTable` fields; the
/// references are resolved lazily by [`SchemaResolver`](crate::SchemaResolver).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldTable {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl FieldTable {
    /// Creates a table, linking every `Array` field to the element field
    /// declared immediately before it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingArrayElement`] if an array has no
    /// preceding inside-array field, and [`SchemaError::MissingNestedTable`]
    /// if a `DataTable` field names no table.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> SchemaResult<Self> {
        let name = name.into();
        let mut linked = Vec::with_capacity(fields.len());
        let mut previous: Option<FieldDescriptor> = None;

        for mut field in fields {
            match field.kind {
                FieldKind::Array if field.element.is_none() => {
                    let element = previous
                        .as_ref()
                        .filter(|prev| prev.flags.is_inside_array())
                        .ok_or_else(|| SchemaError::MissingArrayElement {
                            table: name.clone(),
                            field: field.name.clone(),
                        })?;
                    field.element = Some(Box::new(element.clone()));
                }
                FieldKind::DataTable
                    if field.nested_table.is_none() && !field.flags.is_excluded() =>
                {
                    return Err(SchemaError::MissingNestedTable {
                        table: name,
                        field: field.name,
                    });
                }
                _ => {}
            }
            previous = Some(field.clone());
            linked.push(field);
        }

        Ok(Self {
            name,
            fields: linked,
        })
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declared order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the table declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the names of tables this table nests.
    pub fn nested_tables(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.kind == FieldKind::DataTable && !field.flags.is_excluded())
            .filter_map(|field| field.nested_table.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldFlags;

    #[test]
    fn array_links_preceding_element() {
        let table = FieldTable::new(
            "DT_Inventory",
            vec![
                FieldDescriptor::new("DT_Inventory", "000", FieldKind::Int)
                    .bits(8)
                    .flags(FieldFlags::UNSIGNED | FieldFlags::INSIDE_ARRAY),
                FieldDescriptor::new("DT_Inventory", "m_items", FieldKind::Array).elements(16),
            ],
        )
        .unwrap();

        let array = &table.fields()[1];
        let element = array.element.as_ref().unwrap();
        assert_eq!(element.name, "000");
        assert_eq!(element.bits, 8);
    }

    #[test]
    fn array_without_element_fails() {
        let err = FieldTable::new(
            "DT_Inventory",
            vec![
                FieldDescriptor::new("DT_Inventory", "m_count", FieldKind::Int).bits(4),
                FieldDescriptor::new("DT_Inventory", "m_items", FieldKind::Array).elements(16),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingArrayElement {
                table: "DT_Inventory".to_string(),
                field: "m_items".to_string(),
            }
        );
    }

    #[test]
    fn array_first_in_table_fails() {
        let err = FieldTable::new(
            "DT_A",
            vec![FieldDescriptor::new("DT_A", "m_items", FieldKind::Array)],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingArrayElement { .. }));
    }

    #[test]
    fn data_table_without_target_fails() {
        let err = FieldTable::new(
            "DT_A",
            vec![FieldDescriptor::new("DT_A", "baseclass", FieldKind::DataTable)],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingNestedTable { .. }));
    }

    #[test]
    fn nested_tables_lists_references() {
        let table = FieldTable::new(
            "DT_Player",
            vec![
                FieldDescriptor::data_table("DT_Player", "baseclass", "DT_Base"),
                FieldDescriptor::new("DT_Player", "m_iHealth", FieldKind::Int),
                FieldDescriptor::data_table("DT_Player", "m_Local", "DT_Local"),
            ],
        )
        .unwrap();
        let nested: Vec<_> = table.nested_tables().collect();
        assert_eq!(nested, vec!["DT_Base", "DT_Local"]);
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }
}
