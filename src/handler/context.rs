//! Request context for MIB handlers.

use std::net::SocketAddr;

use bytes::Bytes;

use crate::message::SecurityLevel;
use crate::pdu::PduType;
use crate::version::Version;

use super::SecurityModel;

/// Request context passed to MIB handlers.
///
/// Contains information about the incoming request for authorization decisions,
/// including VACM-resolved access control information when VACM is enabled.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Source address of the request.
    pub source: SocketAddr,
    /// SNMP version.
    pub version: Version,
    /// Security model used.
    pub security_model: SecurityModel,
    /// Security name (community string or username).
    pub security_name: Bytes,
    /// Security level (v3 only, NoAuthNoPriv for v1/v2c).
    pub security_level: SecurityLevel,
    /// Context name (v3 only, empty for v1/v2c).
    pub context_name: Bytes,
    /// Request ID from the PDU.
    pub request_id: i32,
    /// PDU type (GetRequest, GetNextRequest, etc.).
    pub pdu_type: PduType,
    /// Resolved group name (if VACM enabled).
    pub group_name: Option<Bytes>,
    /// Read view name (if VACM enabled).
    pub read_view: Option<Bytes>,
    /// Write view name (if VACM enabled).
    pub write_view: Option<Bytes>,
}

impl RequestContext {
    /// A context for requests the agent generates against itself rather
    /// than receiving off the wire (the event engine's trigger sampling and
    /// set-action dispatch). Carries no peer identity, so VACM views are
    /// left unresolved; callers that need access control on internal
    /// queries must resolve and set `read_view`/`write_view` themselves.
    pub(crate) fn internal(pdu_type: PduType) -> Self {
        Self {
            source: "127.0.0.1:0".parse().unwrap(),
            version: Version::V2c,
            security_model: SecurityModel::V2c,
            security_name: Bytes::from_static(b"_eventmib"),
            security_level: SecurityLevel::NoAuthNoPriv,
            context_name: Bytes::new(),
            request_id: 0,
            pdu_type,
            group_name: None,
            read_view: None,
            write_view: None,
        }
    }
}

#[cfg(test)]
impl RequestContext {
    /// A context with arbitrary-but-valid fields, for tests that only care
    /// about the handler's return value and not request metadata.
    pub(crate) fn for_test() -> Self {
        Self {
            source: "127.0.0.1:161".parse().unwrap(),
            version: Version::V2c,
            security_model: SecurityModel::V2c,
            security_name: Bytes::from_static(b"public"),
            security_level: SecurityLevel::NoAuthNoPriv,
            context_name: Bytes::new(),
            request_id: 1,
            pdu_type: PduType::GetRequest,
            group_name: None,
            read_view: None,
            write_view: None,
        }
    }
}
