//! Flattening of nested field tables into per-class field lists.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDescriptor, FieldKind, DEFAULT_PRIORITY};
use crate::table::FieldTable;

/// One resolved primitive field and its dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatField {
    pub path: Arc<str>,
    pub descriptor: Arc<FieldDescriptor>,
}

/// The ordered flat field list of one class table.
///
/// Positions in this list are the field indices used on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatFieldList {
    table: String,
    fields: Vec<FlatField>,
}

impl FlatFieldList {
    /// Returns the name of the table this list was resolved from.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the field at wire index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FlatField> {
        self.fields.get(index)
    }

    #[must_use]
    pub fn fields(&self) -> &[FlatField] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatField> {
        self.fields.iter()
    }

    /// Returns the wire index of the field at `path`.
    #[must_use]
    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.fields.iter().position(|field| &*field.path == path)
    }
}

type Exclusions = HashSet<(String, String)>;

/// Owns every known field table and caches resolved flat lists.
#[derive(Debug, Default)]
pub struct SchemaResolver {
    tables: HashMap<String, FieldTable>,
    cache: HashMap<String, Arc<FlatFieldList>>,
}

impl SchemaResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, replacing any table of the same name.
    ///
    /// Invalidates every cached flat list.
    pub fn add_table(&mut self, table: FieldTable) {
        debug!(table = table.name(), fields = table.len(), "field table registered");
        self.cache.clear();
        self.tables.insert(table.name().to_string(), table);
    }

    /// Returns the table named `name`, if registered.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&FieldTable> {
        self.tables.get(name)
    }

    /// Returns the number of registered tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Resolves (or returns the cached) flat field list for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTable`] if `name` or any table it nests
    /// is not registered, and [`SchemaError::RecursiveTable`] if a table
    /// nests itself.
    pub fn resolve(&mut self, name: &str) -> SchemaResult<Arc<FlatFieldList>> {
        if let Some(list) = self.cache.get(name) {
            return Ok(Arc::clone(list));
        }

        let mut fields = Vec::new();
        let mut stack = Vec::new();
        self.flatten_pass(name, "", &mut fields, &mut stack)?;
        sort_by_priority(&mut fields);

        debug!(table = name, fields = fields.len(), "flat field list resolved");
        let list = Arc::new(FlatFieldList {
            table: name.to_string(),
            fields,
        });
        self.cache.insert(name.to_string(), Arc::clone(&list));
        Ok(list)
    }

    fn lookup(&self, name: &str) -> SchemaResult<&FieldTable> {
        self.tables.get(name).ok_or_else(|| SchemaError::UnknownTable {
            name: name.to_string(),
        })
    }

    /// Runs one independent flatten pass rooted at `name`.
    ///
    /// Fields of non-collapsible nested tables reach `out` first; this
    /// level's own fields follow once its loop completes.
    fn flatten_pass(
        &self,
        name: &str,
        base: &str,
        out: &mut Vec<FlatField>,
        stack: &mut Vec<String>,
    ) -> SchemaResult<()> {
        let mut exclusions = Exclusions::new();
        self.collect_exclusions(name, &mut exclusions, &mut Vec::new())?;

        let mut own = Vec::new();
        enter(stack, name)?;
        self.flatten_level(name, base, &exclusions, &mut own, out, stack)?;
        stack.pop();

        out.extend(own);
        Ok(())
    }

    fn flatten_level(
        &self,
        name: &str,
        path: &str,
        exclusions: &Exclusions,
        own: &mut Vec<FlatField>,
        out: &mut Vec<FlatField>,
        stack: &mut Vec<String>,
    ) -> SchemaResult<()> {
        let table = self.lookup(name)?;

        for field in table.fields() {
            if field.flags.is_excluded()
                || field.flags.is_inside_array()
                || exclusions.contains(&(table.name().to_string(), field.name.clone()))
            {
                continue;
            }

            if field.kind == FieldKind::DataTable {
                let nested = nested_name(table, field)?;
                if field.flags.is_collapsible() {
                    enter(stack, nested)?;
                    self.flatten_level(nested, path, exclusions, own, out, stack)?;
                    stack.pop();
                } else {
                    let prefix = join(&join(path, nested), &field.name);
                    self.flatten_pass(nested, &prefix, out, stack)?;
                }
                continue;
            }

            own.push(FlatField {
                path: join(path, &field.name).into(),
                descriptor: Arc::new(field.clone()),
            });
        }
        Ok(())
    }

    fn collect_exclusions(
        &self,
        name: &str,
        exclusions: &mut Exclusions,
        visiting: &mut Vec<String>,
    ) -> SchemaResult<()> {
        let table = self.lookup(name)?;
        enter(visiting, name)?;

        for field in table.fields() {
            if field.flags.is_excluded() {
                exclusions.insert((
                    field.exclusion_target().to_string(),
                    field.name.clone(),
                ));
            } else if field.kind == FieldKind::DataTable {
                let nested = nested_name(table, field)?;
                self.collect_exclusions(nested, exclusions, visiting)?;
            }
        }

        visiting.pop();
        Ok(())
    }
}

fn enter(stack: &mut Vec<String>, name: &str) -> SchemaResult<()> {
    if stack.iter().any(|open| open == name) {
        return Err(SchemaError::RecursiveTable {
            name: name.to_string(),
        });
    }
    stack.push(name.to_string());
    Ok(())
}

fn nested_name<'a>(table: &FieldTable, field: &'a FieldDescriptor) -> SchemaResult<&'a str> {
    field
        .nested_table
        .as_deref()
        .ok_or_else(|| SchemaError::MissingNestedTable {
            table: table.name().to_string(),
            field: field.name.clone(),
        })
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

/// Groups fields into ascending priority buckets, keeping declared order
/// within each bucket.
///
/// Bucket 64 always exists and also takes every `CHANGES_OFTEN` field.
fn sort_by_priority(fields: &mut [FlatField]) {
    let mut priorities: Vec<u32> = fields
        .iter()
        .map(|field| field.descriptor.priority)
        .chain(std::iter::once(DEFAULT_PRIORITY))
        .collect();
    priorities.sort_unstable();
    priorities.dedup();

    let mut start = 0;
    for priority in priorities {
        for cursor in start..fields.len() {
            let descriptor = &fields[cursor].descriptor;
            let matches = descriptor.priority == priority
                || (priority == DEFAULT_PRIORITY && descriptor.flags.changes_often());
            if matches {
                // Slide the match into the next free slot; skipped fields
                // shift right by one and keep their order.
                fields[start..=cursor].rotate_right(1);
                start += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldFlags;

    fn int(table: &str, name: &str) -> FieldDescriptor {
        FieldDescriptor::new(table, name, FieldKind::Int).bits(8)
    }

    fn paths(list: &FlatFieldList) -> Vec<&str> {
        list.iter().map(|field| &*field.path).collect()
    }

    fn resolver_with(tables: Vec<FieldTable>) -> SchemaResolver {
        let mut resolver = SchemaResolver::new();
        for table in tables {
            resolver.add_table(table);
        }
        resolver
    }

    #[test]
    fn flat_table_keeps_declared_order() {
        let mut resolver = resolver_with(vec![FieldTable::new(
            "DT_Unit",
            vec![int("DT_Unit", "m_iHealth"), int("DT_Unit", "m_iMana")],
        )
        .unwrap()]);
        let list = resolver.resolve("DT_Unit").unwrap();
        assert_eq!(paths(&list), vec!["m_iHealth", "m_iMana"]);
        assert_eq!(list.table(), "DT_Unit");
        assert_eq!(list.index_of("m_iMana"), Some(1));
    }

    #[test]
    fn priority_buckets_are_stable() {
        let t = "DT_P";
        let mut resolver = resolver_with(vec![FieldTable::new(
            t,
            vec![
                int(t, "a").priority(25),
                int(t, "b").priority(64),
                int(t, "c").priority(25),
                int(t, "d").priority(1),
                int(t, "e").priority(64),
            ],
        )
        .unwrap()]);
        let list = resolver.resolve(t).unwrap();
        assert_eq!(paths(&list), vec!["d", "a", "c", "b", "e"]);
    }

    #[test]
    fn changes_often_joins_default_bucket() {
        let t = "DT_P";
        let mut resolver = resolver_with(vec![FieldTable::new(
            t,
            vec![
                int(t, "late").priority(128),
                int(t, "often").priority(200).flags(FieldFlags::CHANGES_OFTEN),
                int(t, "early").priority(10),
                int(t, "normal"),
            ],
        )
        .unwrap()]);
        let list = resolver.resolve(t).unwrap();
        assert_eq!(paths(&list), vec!["early", "often", "normal", "late"]);
    }

    #[test]
    fn exclusions_remove_base_fields() {
        let mut resolver = resolver_with(vec![
            FieldTable::new(
                "DT_Base",
                vec![int("DT_Base", "m_keep"), int("DT_Base", "m_hidden")],
            )
            .unwrap(),
            FieldTable::new(
                "DT_Child",
                vec![
                    FieldDescriptor::exclude("DT_Child", "DT_Base", "m_hidden"),
                    FieldDescriptor::data_table("DT_Child", "baseclass", "DT_Base")
                        .flags(FieldFlags::COLLAPSIBLE),
                    int("DT_Child", "m_own"),
                ],
            )
            .unwrap(),
        ]);
        let list = resolver.resolve("DT_Child").unwrap();
        assert_eq!(paths(&list), vec!["m_keep", "m_own"]);

        let base = resolver.resolve("DT_Base").unwrap();
        assert_eq!(paths(&base), vec!["m_keep", "m_hidden"]);
    }

    #[test]
    fn inside_array_fields_are_skipped() {
        let t = "DT_Inv";
        let mut resolver = resolver_with(vec![FieldTable::new(
            t,
            vec![
                int(t, "000").flags(FieldFlags::INSIDE_ARRAY),
                FieldDescriptor::new(t, "m_items", FieldKind::Array).elements(4),
            ],
        )
        .unwrap()]);
        let list = resolver.resolve(t).unwrap();
        assert_eq!(paths(&list), vec!["m_items"]);
        assert!(list.get(0).unwrap().descriptor.element.is_some());
    }

    #[test]
    fn non_collapsible_nested_pass_comes_first_with_prefix() {
        let mut resolver = resolver_with(vec![
            FieldTable::new("DT_Local", vec![int("DT_Local", "m_iFOV")]).unwrap(),
            FieldTable::new(
                "DT_Player",
                vec![
                    int("DT_Player", "m_iHealth"),
                    FieldDescriptor::data_table("DT_Player", "m_Local", "DT_Local"),
                    int("DT_Player", "m_iArmor"),
                ],
            )
            .unwrap(),
        ]);
        let list = resolver.resolve("DT_Player").unwrap();
        assert_eq!(
            paths(&list),
            vec!["DT_Local.m_Local.m_iFOV", "m_iHealth", "m_iArmor"]
        );
    }

    #[test]
    fn nested_pass_recomputes_exclusions() {
        // The parent's exclusion only applies to its own context; the
        // independent nested pass keeps the field.
        let mut resolver = resolver_with(vec![
            FieldTable::new("DT_Sub", vec![int("DT_Sub", "m_x")]).unwrap(),
            FieldTable::new(
                "DT_Top",
                vec![
                    FieldDescriptor::exclude("DT_Top", "DT_Sub", "m_x"),
                    FieldDescriptor::data_table("DT_Top", "m_sub", "DT_Sub"),
                ],
            )
            .unwrap(),
        ]);
        let list = resolver.resolve("DT_Top").unwrap();
        assert_eq!(paths(&list), vec!["DT_Sub.m_sub.m_x"]);
    }

    #[test]
    fn unknown_table_fails() {
        let mut resolver = SchemaResolver::new();
        let err = resolver.resolve("DT_Nope").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownTable {
                name: "DT_Nope".to_string()
            }
        );
    }

    #[test]
    fn unknown_nested_table_fails() {
        let mut resolver = resolver_with(vec![FieldTable::new(
            "DT_A",
            vec![FieldDescriptor::data_table("DT_A", "baseclass", "DT_Gone")
                .flags(FieldFlags::COLLAPSIBLE)],
        )
        .unwrap()]);
        assert!(matches!(
            resolver.resolve("DT_A"),
            Err(SchemaError::UnknownTable { .. })
        ));
    }

    #[test]
    fn self_nesting_table_fails() {
        let mut resolver = resolver_with(vec![
            FieldTable::new(
                "DT_A",
                vec![FieldDescriptor::data_table("DT_A", "b", "DT_B")],
            )
            .unwrap(),
            FieldTable::new(
                "DT_B",
                vec![FieldDescriptor::data_table("DT_B", "a", "DT_A")
                    .flags(FieldFlags::COLLAPSIBLE)],
            )
            .unwrap(),
        ]);
        assert!(matches!(
            resolver.resolve("DT_A"),
            Err(SchemaError::RecursiveTable { .. })
        ));
    }

    #[test]
    fn resolve_is_cached_and_deterministic() {
        let build = || {
            resolver_with(vec![
                FieldTable::new("DT_Base", vec![int("DT_Base", "m_a").priority(3)]).unwrap(),
                FieldTable::new(
                    "DT_Unit",
                    vec![
                        FieldDescriptor::data_table("DT_Unit", "baseclass", "DT_Base")
                            .flags(FieldFlags::COLLAPSIBLE),
                        int("DT_Unit", "m_b"),
                    ],
                )
                .unwrap(),
            ])
        };
        let mut first = build();
        let mut second = build();
        let a = first.resolve("DT_Unit").unwrap();
        let b = second.resolve("DT_Unit").unwrap();
        assert_eq!(a, b);

        let again = first.resolve("DT_Unit").unwrap();
        assert!(Arc::ptr_eq(&a, &again));
    }

    #[test]
    fn add_table_invalidates_cache() {
        let mut resolver = resolver_with(vec![FieldTable::new(
            "DT_A",
            vec![int("DT_A", "m_x")],
        )
        .unwrap()]);
        let before = resolver.resolve("DT_A").unwrap();
        resolver.add_table(
            FieldTable::new("DT_A", vec![int("DT_A", "m_x"), int("DT_A", "m_y")]).unwrap(),
        );
        let after = resolver.resolve("DT_A").unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(resolver.table_count(), 1);
    }
}
