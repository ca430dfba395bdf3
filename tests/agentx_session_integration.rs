//! AgentX master session lifecycle: open, register a subtree, encode/decode
//! the frame header that would have carried the registration, then close
//! the session and confirm its registrations are revoked.

use std::time::Duration;

use bytes::Bytes;

use priot::agentx::header::{Command, Header};
use priot::agentx::session::SessionTable;
use priot::oid;

#[test]
fn test_open_register_close_revokes_registrations() {
    let mut table = SessionTable::new();

    let session_id = table.open(Duration::from_secs(150), oid!(1, 3, 6, 1, 4, 1, 99999), Bytes::from_static(b"test subagent"));
    assert!(table.get(session_id).is_some());

    let registered_oid = oid!(1, 3, 6, 1, 4, 1, 99999, 1);
    table.record_registration(session_id, "".to_string(), registered_oid.clone());

    let header = Header::new(Command::Register, session_id, 1, 1);
    let bytes = header.encode();
    let decoded = Header::decode(&bytes).unwrap();
    assert_eq!(decoded.command, Command::Register);
    assert_eq!(decoded.session_id, session_id);

    let revoked = table.close(Some(session_id));
    assert_eq!(revoked, vec![("".to_string(), registered_oid)]);
    assert!(table.get(session_id).is_none());
}

#[test]
fn test_index_allocate_rejects_duplicate_explicit_value() {
    use priot::value::Value;

    let mut table = SessionTable::new();
    let _session_id = table.open(Duration::from_secs(150), oid!(1, 3, 6, 1, 4, 1, 99999), Bytes::new());
    let index_oid = oid!(1, 3, 6, 1, 4, 1, 99999, 2, 1);

    let first = table
        .index_allocate(&[(index_oid.clone(), Some(Value::Integer(1)), false)])
        .unwrap();
    assert_eq!(first, vec![Value::Integer(1)]);

    let second = table.index_allocate(&[(index_oid, Some(Value::Integer(1)), false)]);
    assert!(second.is_err());
}
