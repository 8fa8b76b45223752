//! Boundary records for the replay decoding core.
//!
//! This crate defines the decoded records the framing layer hands to the
//! core: server metadata, field table definitions, class bindings, string
//! table records, and raw entity payloads. It does not parse the replay
//! container itself; it only describes and bounds what comes out of it.
//!
//! # Design Principles
//!
//! - **Closed record set** - Consumers match exhaustively over [`Record`].
//! - **Bounded input** - Every record is validated against [`Limits`] before dispatch.
//! - **No domain knowledge** - Payloads stay opaque bytes until the codec reads them.

mod error;
mod limits;
mod record;

pub use error::{DecodeError, LimitKind, WireResult};
pub use limits::Limits;
pub use record::{
    CreateStringTable, Frame, PacketEntities, Record, RecordKind, SendPropDef, SendTableDef,
    ServerClassDef, ServerInfo, UpdateStringTable,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Limits::default();
        let frame = Frame::new(7, Record::ServerInfo(ServerInfo { max_classes: 4 }));
        assert_eq!(frame.tick, 7);
        assert_eq!(frame.record.kind(), RecordKind::ServerInfo);
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn limits_default_is_reasonable() {
        let limits = Limits::default();
        assert!(
            limits.max_payload_bytes >= 64 * 1024,
            "should allow full entity snapshots"
        );
        assert!(
            limits.max_server_classes >= 1024,
            "should allow large class lists"
        );
    }
}
