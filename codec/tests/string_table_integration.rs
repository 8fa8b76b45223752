use bitstream::BitWriter;
use codec::{CodecError, LimitKind, Session, SessionConfig};
use wire::{CreateStringTable, Frame, Record, UpdateStringTable};

fn write_keyed(writer: &mut BitWriter, key: &str, value: &[u8]) {
    writer.write_bit(false); // next index
    writer.write_bit(true);
    writer.write_bit(false);
    writer.write_cstring(key);
    writer.write_bit(true);
    writer.write_bits(value.len() as u64, 14).unwrap();
    writer.write_bytes(value);
}

fn create(name: &str, max_entries: u32, entries: &[(&str, &[u8])]) -> Record {
    let mut writer = BitWriter::new();
    writer.write_bit(false);
    for (key, value) in entries {
        write_keyed(&mut writer, key, value);
    }
    Record::CreateStringTable(CreateStringTable {
        name: name.to_string(),
        max_entries,
        fixed_size: false,
        entry_bits: 0,
        entry_count: entries.len() as u32,
        data: writer.finish(),
    })
}

#[test]
fn tables_are_found_by_name_and_id() {
    let mut session = Session::new(SessionConfig::for_testing());
    session
        .apply(&Frame::new(0, create("downloadables", 4, &[])))
        .unwrap();
    session
        .apply(&Frame::new(
            0,
            create("userinfo", 16, &[("player0", &b"\x01"[..]), ("player1", &b"\x02"[..])]),
        ))
        .unwrap();

    let tables = session.string_tables();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables.table_id("userinfo"), Some(1));

    let userinfo = session.string_table("userinfo").unwrap();
    assert_eq!(userinfo.len(), 2);
    let (index, entry) = userinfo.find_key("player1").unwrap();
    assert_eq!(index, 1);
    assert_eq!(entry.value.as_deref(), Some(&b"\x02"[..]));
    assert!(session.string_table("missing").is_none());
}

#[test]
fn history_spans_records() {
    let mut session = Session::new(SessionConfig::for_testing());
    session
        .apply(&Frame::new(0, create("userinfo", 8, &[("npc_dota_hero_axe", &[][..])])))
        .unwrap();

    let mut writer = BitWriter::new();
    writer.write_bit(false);
    writer.write_bit(true);
    writer.write_bits(1, 3).unwrap();
    writer.write_bit(true);
    writer.write_bit(true);
    writer.write_bits(0, 5).unwrap();
    writer.write_bits(14, 5).unwrap();
    writer.write_cstring("lina");
    writer.write_bit(false);
    session
        .apply(&Frame::new(
            1,
            Record::UpdateStringTable(UpdateStringTable {
                table_id: 0,
                changed_entries: 1,
                data: writer.finish(),
            }),
        ))
        .unwrap();

    let table = session.string_table("userinfo").unwrap();
    assert_eq!(table.entry(1).unwrap().key.as_deref(), Some("npc_dota_hero_lina"));
    assert_eq!(table.revision(), 2);
}

#[test]
fn duplicate_table_is_rejected() {
    let mut session = Session::new(SessionConfig::for_testing());
    session.apply(&Frame::new(0, create("userinfo", 4, &[]))).unwrap();
    let err = session
        .apply(&Frame::new(0, create("userinfo", 4, &[])))
        .unwrap_err();
    assert_eq!(
        err.root_cause(),
        &CodecError::DuplicateStringTable {
            name: "userinfo".to_string()
        }
    );
}

#[test]
fn update_of_unknown_table_fails() {
    let mut session = Session::new(SessionConfig::for_testing());
    let err = session
        .apply(&Frame::new(
            0,
            Record::UpdateStringTable(UpdateStringTable {
                table_id: 3,
                changed_entries: 0,
                data: vec![0],
            }),
        ))
        .unwrap_err();
    assert_eq!(err.root_cause(), &CodecError::UnknownStringTable { table_id: 3 });
}

#[test]
fn entry_count_above_capacity_is_rejected() {
    let mut session = Session::new(SessionConfig::for_testing());
    let mut record = create("userinfo", 2, &[]);
    if let Record::CreateStringTable(create) = &mut record {
        create.entry_count = 3;
    }
    let err = session.apply(&Frame::new(0, record)).unwrap_err();
    assert!(matches!(err.root_cause(), CodecError::Wire(_)));
    assert!(session.string_tables().is_empty());
}

#[test]
fn long_keys_hit_the_limit() {
    let mut session = Session::new(SessionConfig::for_testing());
    let key = "k".repeat(100);
    let err = session
        .apply(&Frame::new(0, create("userinfo", 4, &[(key.as_str(), &[][..])])))
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        CodecError::LimitsExceeded {
            kind: LimitKind::StringKeyBytes,
            ..
        }
    ));
}
