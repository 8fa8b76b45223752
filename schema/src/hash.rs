//! Deterministic flat list hashing.

use blake3::Hasher;

use crate::field::FieldDescriptor;
use crate::resolver::FlatFieldList;

/// Computes a deterministic fingerprint of a resolved flat field list.
///
/// Two lists hash equal only if they carry the same paths, in the same
/// order, with the same wire-relevant descriptor metadata.
#[must_use]
pub fn flat_list_hash(list: &FlatFieldList) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, list.table());
    write_u32(&mut hasher, list.len() as u32);

    for field in list.iter() {
        write_str(&mut hasher, &field.path);
        write_descriptor(&mut hasher, &field.descriptor);
    }

    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

fn write_descriptor(hasher: &mut Hasher, descriptor: &FieldDescriptor) {
    write_u32(hasher, descriptor.kind.raw());
    write_u32(hasher, descriptor.flags.raw());
    write_u32(hasher, descriptor.bits);
    write_u32(hasher, descriptor.low.to_bits());
    write_u32(hasher, descriptor.high.to_bits());
    write_u32(hasher, descriptor.elements);
    write_u32(hasher, descriptor.priority);
    match &descriptor.element {
        Some(element) => {
            write_u8(hasher, 1);
            write_descriptor(hasher, element);
        }
        None => write_u8(hasher, 0),
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldKind, FieldTable, SchemaResolver};

    fn resolve(fields: Vec<FieldDescriptor>) -> std::sync::Arc<FlatFieldList> {
        let mut resolver = SchemaResolver::new();
        resolver.add_table(FieldTable::new("DT_Unit", fields).unwrap());
        resolver.resolve("DT_Unit").unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        let fields = || {
            vec![
                FieldDescriptor::new("DT_Unit", "m_iHealth", FieldKind::Int).bits(10),
                FieldDescriptor::new("DT_Unit", "m_flSpeed", FieldKind::Float)
                    .bits(12)
                    .range(0.0, 600.0),
            ]
        };
        assert_eq!(
            flat_list_hash(&resolve(fields())),
            flat_list_hash(&resolve(fields()))
        );
    }

    #[test]
    fn hash_changes_with_bit_width() {
        let a = resolve(vec![
            FieldDescriptor::new("DT_Unit", "m_iHealth", FieldKind::Int).bits(10),
        ]);
        let b = resolve(vec![
            FieldDescriptor::new("DT_Unit", "m_iHealth", FieldKind::Int).bits(11),
        ]);
        assert_ne!(flat_list_hash(&a), flat_list_hash(&b));
    }

    #[test]
    fn hash_changes_with_order() {
        let a = resolve(vec![
            FieldDescriptor::new("DT_Unit", "m_a", FieldKind::Int),
            FieldDescriptor::new("DT_Unit", "m_b", FieldKind::Int),
        ]);
        let b = resolve(vec![
            FieldDescriptor::new("DT_Unit", "m_b", FieldKind::Int),
            FieldDescriptor::new("DT_Unit", "m_a", FieldKind::Int),
        ]);
        assert_ne!(flat_list_hash(&a), flat_list_hash(&b));
    }
}
