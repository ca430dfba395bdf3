//! Protocol data unit: the command + varbind-list structure shared by SNMP
//! PDUs and AgentX packets.
//!
//! A classic SNMP PDU (RFC 1157 / RFC 3416) is a context-tagged SEQUENCE
//! carrying a request-id, an error-status/error-index pair (or, for
//! GETBULK, non-repeaters/max-repetitions in the same wire position), and a
//! varbind list. AgentX (RFC 2741) carries the same conceptual payload
//! behind a 20-byte binary header instead of a BER tag, with a few
//! additional fields (session-id, transaction-id) that classic SNMP has no
//! use for. [`Pdu`] is the union of both shapes so the registry/dispatch
//! layer and [`crate::handler::MibHandler`] can stay oblivious to which
//! protocol delivered the request.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// Which SNMP PDU this is, identified by its BER context tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduType {
    GetRequest,
    GetNextRequest,
    Response,
    SetRequest,
    TrapV1,
    GetBulkRequest,
    InformRequest,
    TrapV2,
    Report,
}

impl PduType {
    /// The BER tag this PDU type is encoded under.
    pub const fn tag(self) -> u8 {
        match self {
            Self::GetRequest => tag::pdu::GET_REQUEST,
            Self::GetNextRequest => tag::pdu::GET_NEXT_REQUEST,
            Self::Response => tag::pdu::RESPONSE,
            Self::SetRequest => tag::pdu::SET_REQUEST,
            Self::TrapV1 => tag::pdu::TRAP_V1,
            Self::GetBulkRequest => tag::pdu::GET_BULK_REQUEST,
            Self::InformRequest => tag::pdu::INFORM_REQUEST,
            Self::TrapV2 => tag::pdu::TRAP_V2,
            Self::Report => tag::pdu::REPORT,
        }
    }

    /// Resolve a PDU type from its BER tag.
    pub fn from_tag(t: u8) -> Option<Self> {
        match t {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::TRAP_V1 => Some(Self::TrapV1),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            tag::pdu::INFORM_REQUEST => Some(Self::InformRequest),
            tag::pdu::TRAP_V2 => Some(Self::TrapV2),
            tag::pdu::REPORT => Some(Self::Report),
            _ => None,
        }
    }

    /// True for PDUs that carry `nonRepeaters`/`maxRepetitions` instead of
    /// `errorStatus`/`errorIndex` in the second and third SEQUENCE slots.
    pub const fn is_bulk(self) -> bool {
        matches!(self, Self::GetBulkRequest)
    }

    /// True for PDUs a responder is expected to answer with a `Response`.
    pub const fn expects_response(self) -> bool {
        matches!(
            self,
            Self::GetRequest
                | Self::GetNextRequest
                | Self::SetRequest
                | Self::GetBulkRequest
                | Self::InformRequest
        )
    }
}

/// SNMPv1 trap-specific fields (RFC 1157 Section 4.1.6), carried only when
/// [`Pdu::pdu_type`] is [`PduType::TrapV1`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrapV1Fields {
    pub enterprise: crate::oid::Oid,
    pub agent_addr: [u8; 4],
    pub generic_trap: i32,
    pub specific_trap: i32,
    pub timestamp: u32,
}

/// A protocol data unit, generalized across classic SNMP and AgentX.
///
/// Most fields are `None`/default for whichever protocol doesn't use them:
/// a GETBULK-over-SNMP PDU leaves the AgentX-only `session_id` and
/// `transaction_id` unset, while an AgentX `Get` packet leaves `community`
/// and the v3 security fields unset (AgentX carries no security parameters
/// of its own, since the master already authenticated the originating
/// manager).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pdu {
    /// Which command this PDU carries.
    pub pdu_type: PduType,
    /// `request-id` (SNMP) / reused as the AgentX packet header's `packetID`.
    pub request_id: i32,
    /// `error-status`, or (for GETBULK) `non-repeaters`.
    pub error_status: i32,
    /// `error-index`, or (for GETBULK) `max-repetitions`.
    pub error_index: i32,
    /// Variable bindings.
    pub varbinds: Vec<VarBind>,

    /// SNMPv3 `msgID` (distinct from `request_id`, which lives in the
    /// encrypted scoped PDU).
    pub message_id: Option<i32>,
    /// AgentX `sessionID` (RFC 2741 Section 6.1), assigned by the master on
    /// `Open` and echoed on every subsequent packet in the session.
    pub session_id: Option<u32>,
    /// AgentX `transactionID`, correlating a Register/notify exchange.
    pub transaction_id: Option<u32>,
    /// AgentX `Ping`/`TestSet` timeout hint, or SNMP's engine-time hint
    /// depending on context; kept generic since both are a small integer
    /// advisory value rather than wire-critical.
    pub time_hint: Option<u32>,

    /// SNMPv1/v2c community string.
    pub community: Option<Bytes>,
    /// SNMPv3 `contextEngineID`.
    pub context_engine_id: Option<Bytes>,
    /// SNMPv3 `contextName`.
    pub context_name: Option<Bytes>,
    /// SNMPv3 `msgAuthoritativeEngineID` (the security engine).
    pub security_engine_id: Option<Bytes>,
    /// SNMPv3 `msgUserName`.
    pub security_name: Option<Bytes>,
    /// SNMPv3 security level.
    pub security_level: Option<crate::message::SecurityLevel>,
    /// SNMPv3/AgentX-side security model identifier (RFC 3411 Section 4).
    pub security_model: Option<u8>,
    /// Opaque transport-layer tag (e.g. which socket/peer a response must
    /// be routed back through); never placed on the wire, carried purely
    /// for in-process bookkeeping by the agent's dispatcher.
    pub transport_opaque: Option<Bytes>,

    /// SNMPv1 trap fields, present only when `pdu_type == TrapV1`.
    pub trap_v1: Option<TrapV1Fields>,
}

impl Pdu {
    /// A bare `Response` PDU echoing `request_id`, ready for error/varbind
    /// fields to be filled in.
    pub fn response_to(request_id: i32) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id,
            ..Default::default()
        }
    }

    /// A successful response carrying `varbinds` and no error.
    pub fn success_response(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            varbinds,
            ..Self::response_to(request_id)
        }
    }

    /// An error response: `varbinds` is normally the echoed request list
    /// per RFC 3416 Section 4.2.1.
    pub fn error_response(
        request_id: i32,
        error_status: i32,
        error_index: i32,
        varbinds: Vec<VarBind>,
    ) -> Self {
        Self {
            error_status,
            error_index,
            varbinds,
            ..Self::response_to(request_id)
        }
    }

    /// Encode the classic-SNMP PDU body (request-id/error fields/varbinds),
    /// wrapped in this PDU's context tag. Does not include the outer
    /// version/community/message SEQUENCE; callers assemble that.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        if self.pdu_type == PduType::TrapV1 {
            self.encode_trap_v1(buf);
            return;
        }
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    fn encode_trap_v1(&self, buf: &mut EncodeBuf) {
        let fields = self.trap_v1.clone().unwrap_or_default();
        buf.push_constructed(PduType::TrapV1.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_unsigned32(tag::application::TIMETICKS, fields.timestamp);
            buf.push_integer(fields.specific_trap);
            buf.push_integer(fields.generic_trap);
            buf.push_ip_address(fields.agent_addr);
            buf.push_oid(&fields.enterprise);
        });
    }

    /// Decode a classic-SNMP PDU from a tagged TLV already identified by
    /// `pdu_type` (obtained via [`Decoder::read_constructed`]).
    pub fn decode(pdu_type: PduType, mut body: Decoder) -> Result<Self> {
        if pdu_type == PduType::TrapV1 {
            return Self::decode_trap_v1(body);
        }
        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let varbinds = decode_varbind_list(&mut body)?;
        Ok(Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
            ..Default::default()
        })
    }

    fn decode_trap_v1(mut body: Decoder) -> Result<Self> {
        let enterprise = body.read_oid()?;
        let agent_addr = body.read_ip_address()?;
        let generic_trap = body.read_integer()?;
        let specific_trap = body.read_integer()?;
        let timestamp = body.read_unsigned32(tag::application::TIMETICKS)?;
        let varbinds = decode_varbind_list(&mut body)?;
        Ok(Self {
            pdu_type: PduType::TrapV1,
            varbinds,
            trap_v1: Some(TrapV1Fields {
                enterprise,
                agent_addr,
                generic_trap,
                specific_trap,
                timestamp,
            }),
            ..Default::default()
        })
    }

    /// Read a PDU whose enclosing tag has not yet been consumed.
    pub fn decode_tagged(dec: &mut Decoder) -> Result<Self> {
        let (t, body) = dec.read_constructed()?;
        let pdu_type = PduType::from_tag(t)
            .ok_or_else(|| Error::decode(0, DecodeErrorKind::UnknownPduType(t)))?;
        Self::decode(pdu_type, body)
    }
}

impl Default for PduType {
    fn default() -> Self {
        PduType::GetRequest
    }
}
