//! Property tests for record validation.

use proptest::prelude::*;
use wire::{DecodeError, LimitKind, Limits, PacketEntities, Record, UpdateStringTable};

proptest! {
    #[test]
    fn payload_limit_is_exact(len in 0usize..8192) {
        let limits = Limits::for_testing();
        let record = Record::PacketEntities(PacketEntities {
            max_entries: 64,
            updated_entries: 0,
            is_delta: false,
            data: vec![0; len],
        });
        let result = record.validate(&limits);
        if len <= limits.max_payload_bytes {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result,
                Err(DecodeError::LimitsExceeded {
                    kind: LimitKind::PayloadBytes,
                    limit: limits.max_payload_bytes,
                    actual: len,
                })
            );
        }
    }

    #[test]
    fn unlimited_accepts_any_update(data in proptest::collection::vec(any::<u8>(), 0..2048), table_id in any::<u32>()) {
        let record = Record::UpdateStringTable(UpdateStringTable {
            table_id,
            changed_entries: 1,
            data,
        });
        prop_assert!(record.validate(&Limits::unlimited()).is_ok());
    }
}
