#![no_main]

use codec::{Session, SessionConfig};
use libfuzzer_sys::fuzz_target;
use wire::{
    CreateStringTable, Frame, PacketEntities, Record, SendPropDef, SendTableDef, ServerClassDef,
    ServerInfo, UpdateStringTable,
};

fn prop(index: usize, kind: u32, flags: u32, bits: u32) -> SendPropDef {
    SendPropDef {
        kind,
        name: format!("m_field{index}"),
        flags,
        priority: 64,
        nested_table: None,
        elements: 4,
        low: -16.0,
        high: 16.0,
        bits,
    }
}

fn prepared_session() -> Option<Session> {
    let mut session = Session::new(SessionConfig::for_testing());
    let props = vec![
        prop(0, 0, 0, 12),
        prop(1, 1, 0, 10),
        prop(2, 2, 1 << 5, 12),
        prop(3, 4, 0, 0),
        prop(4, 1, 1 << 8, 8),
        prop(5, 5, 0, 0),
        prop(6, 7, 1 << 0, 40),
    ];
    let records = [
        Record::ServerInfo(ServerInfo { max_classes: 4 }),
        Record::SendTable(SendTableDef {
            name: "DT_Fuzz".to_string(),
            props,
        }),
        Record::ClassInfo(vec![ServerClassDef {
            class_id: 1,
            name: "CFuzz".to_string(),
            table: "DT_Fuzz".to_string(),
        }]),
    ];
    for record in records {
        session.apply(&Frame::new(0, record)).ok()?;
    }
    Some(session)
}

fuzz_target!(|data: &[u8]| {
    let Some(mut session) = prepared_session() else {
        return;
    };

    // Each chunk is one record: a selector byte, a count byte, then payload.
    let mut idx = 0usize;
    let mut tick = 1u32;
    while idx + 2 <= data.len() && idx < 4096 {
        let selector = data[idx];
        let count = u32::from(data[idx + 1]);
        idx += 2;
        let len = (usize::from(selector) % 96).min(data.len() - idx);
        let payload = data[idx..idx + len].to_vec();
        idx += len;

        let record = match selector % 3 {
            0 => Record::CreateStringTable(CreateStringTable {
                name: if count % 2 == 0 {
                    "instancebaseline".to_string()
                } else {
                    format!("table{count}")
                },
                max_entries: 16,
                fixed_size: false,
                entry_bits: 0,
                entry_count: count % 17,
                data: payload,
            }),
            1 => Record::UpdateStringTable(UpdateStringTable {
                table_id: count % 2,
                changed_entries: count % 17,
                data: payload,
            }),
            _ => Record::PacketEntities(PacketEntities {
                max_entries: 64,
                updated_entries: count % 32,
                is_delta: true,
                data: payload,
            }),
        };
        if session.apply(&Frame::new(tick, record)).is_err() {
            return;
        }
        tick += 1;
    }
});
