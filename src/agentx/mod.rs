//! The AgentX master/subagent protocol engine (§4.3).
//!
//! This module models the wire framing, the master's session table and
//! index pool, and response correlation for delegated requests. It does
//! not own a transport: callers decode a frame off whatever
//! [`crate::transport::AgentTransport`] they're running, drive the state
//! machine here, and write back whatever bytes result.

pub mod header;
pub mod session;

pub use header::{Command, Flags, Header};
pub use session::{Session, SessionTable};

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ErrorStatus, Result};
use crate::handler::MibHandler;
use crate::oid::Oid;
use crate::registry::Registry;

/// AgentX response error codes (RFC 2741 Section 6.2.15), distinct from the
/// SNMP PDU error-status codes they get translated to/from at the
/// master/subagent boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentxError {
    NoError,
    OpenFailed,
    NotOpen,
    IndexWrongType,
    IndexAlreadyAllocated,
    IndexNoneAvailable,
    IndexNotAllocated,
    UnsupportedContext,
    DuplicateRegistration,
    UnknownRegistration,
    UnknownAgentCaps,
    ParseError,
    RequestDenied,
    ProcessingError,
}

impl AgentxError {
    pub fn as_u16(self) -> u16 {
        match self {
            AgentxError::NoError => 0,
            AgentxError::OpenFailed => 256,
            AgentxError::NotOpen => 257,
            AgentxError::IndexWrongType => 258,
            AgentxError::IndexAlreadyAllocated => 259,
            AgentxError::IndexNoneAvailable => 260,
            AgentxError::IndexNotAllocated => 261,
            AgentxError::UnsupportedContext => 262,
            AgentxError::DuplicateRegistration => 263,
            AgentxError::UnknownRegistration => 264,
            AgentxError::UnknownAgentCaps => 265,
            AgentxError::ParseError => 266,
            AgentxError::RequestDenied => 267,
            AgentxError::ProcessingError => 268,
        }
    }

    /// Map a `priot::Error` encountered while servicing a `Register` to the
    /// AgentX response code §4.3 specifies: `DuplicateRegistration` maps
    /// directly, everything else maps to `requestDenied`.
    pub fn from_register_error(err: &crate::error::Error) -> Self {
        match err {
            crate::error::Error::DuplicateRegistration { .. } => AgentxError::DuplicateRegistration,
            _ => AgentxError::RequestDenied,
        }
    }

    /// Map a subagent's AgentX response error back onto an SNMP
    /// error-status for the original request, per §4.3's "response
    /// handling (master side)" rule: `parseFailed`/`requestDenied`/
    /// `processingError` collapse to `genErr`; everything else passes
    /// through unchanged (by numeric value, since AgentX reuses the SNMPv2
    /// error-status space below 256).
    pub fn to_snmp_error_status(self) -> ErrorStatus {
        match self {
            AgentxError::NoError => ErrorStatus::NoError,
            AgentxError::ParseError | AgentxError::RequestDenied | AgentxError::ProcessingError => {
                ErrorStatus::GenErr
            }
            other => ErrorStatus::from_i32(other.as_u16() as i32),
        }
    }
}

/// Tracks SNMP requests currently delegated to a subagent session, keyed by
/// the `(transaction_id, packet_id)` pair the forwarded AgentX PDU carries.
///
/// Per §8's delegation-closure invariant, every entry inserted here must
/// eventually be removed by [`DelegationTable::complete`] (reply received)
/// or [`DelegationTable::fail`] (timeout/abort), never silently dropped.
#[derive(Default)]
pub struct DelegationTable {
    pending: HashMap<(u32, u32), Delegation>,
}

/// What the master needs to resume an originating SNMP request once a
/// subagent's AgentX response arrives (or the wait times out).
#[derive(Debug, Clone)]
pub struct Delegation {
    pub request_id: i32,
    pub session_id: u32,
    /// Index into the original request's varbind list this delegation
    /// covers, preserving wire order on reassembly.
    pub varbind_indices: Vec<usize>,
}

impl DelegationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transaction_id: u32, packet_id: u32, delegation: Delegation) {
        self.pending.insert((transaction_id, packet_id), delegation);
    }

    /// Reply arrived: remove and return the delegation so the caller can
    /// splice the reply varbinds back into the original request.
    pub fn complete(&mut self, transaction_id: u32, packet_id: u32) -> Option<Delegation> {
        self.pending.remove(&(transaction_id, packet_id))
    }

    /// Transport disconnect or timeout closed `session_id`: fail every
    /// delegation parked on it and return them so the caller can complete
    /// each original request with `GenErr`.
    pub fn fail_session(&mut self, session_id: u32) -> Vec<Delegation> {
        let keys: Vec<_> = self
            .pending
            .iter()
            .filter(|(_, d)| d.session_id == session_id)
            .map(|(k, _)| *k)
            .collect();
        keys.into_iter()
            .filter_map(|k| self.pending.remove(&k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Decode the `Register` PDU's varbind-carried range per §4.3: the single
/// varbind's OID is the subtree to register; when `range_subid > 0` the
/// upper-bound value lives in `objid[range_subid - 1]`, which this function
/// splits out and resets to the registered OID's own arc (the encoded form
/// never carries the range bound as a separate field).
pub fn split_range_registration(oid: &Oid, range_subid: u8, upper_bound: u32) -> (Oid, Option<Oid>) {
    if range_subid == 0 {
        return (oid.clone(), None);
    }
    let idx = range_subid as usize - 1;
    let mut arcs = oid.arcs().to_vec();
    if idx >= arcs.len() {
        return (oid.clone(), None);
    }
    let mut end_arcs = arcs.clone();
    end_arcs[idx] = upper_bound;
    arcs[idx] = arcs[idx].min(upper_bound);
    (Oid::from_vec(arcs), Some(Oid::from_vec(end_arcs)))
}

/// Service a `Register` command against `registry`, per §4.2 step 4: the
/// base OID (`range_subid == 0`, or the low end of the range) is always
/// registered, and when `range_subid > 0` one further copy of the subtree
/// is deep-copied into the registry for each value in
/// `[range_lbound + 1, range_ubound]` at the `range_subid` position, all
/// sharing `handler`. Any failure (most commonly a duplicate registration
/// partway through the range) unregisters every OID this call already
/// granted, so a partial range is never left behind.
pub fn register_range(
    registry: &Registry,
    context: &str,
    oid: &Oid,
    range_subid: u8,
    range_ubound: u32,
    priority: u8,
    handler: Arc<dyn MibHandler>,
) -> Result<Vec<Oid>> {
    let (start, end) = split_range_registration(oid, range_subid, range_ubound);
    registry.register(context, start.clone(), priority, handler.clone())?;
    let mut registered = vec![start.clone()];

    if let Some(end) = end {
        let idx = range_subid as usize - 1;
        let lbound = start.arcs()[idx];
        let ubound = end.arcs()[idx];
        for value in (lbound + 1)..=ubound {
            let mut arcs = start.arcs().to_vec();
            arcs[idx] = value;
            let candidate = Oid::from_vec(arcs);
            match registry.register(context, candidate.clone(), priority, handler.clone()) {
                Ok(()) => registered.push(candidate),
                Err(e) => {
                    for reg in &registered {
                        let _ = registry.unregister(context, reg);
                    }
                    return Err(e);
                }
            }
        }
    }
    Ok(registered)
}

/// Classify an incoming `Notify`'s varbind list per §4.3: the sysUpTime
/// leader (if present) is skipped, and the following varbind must be
/// `snmpTrapOID`. Returns `None` if the PDU doesn't meet that shape.
pub fn notify_trap_oid_index(varbinds: &[crate::varbind::VarBind]) -> Option<usize> {
    let sys_up_time = crate::oid!(1, 3, 6, 1, 2, 1, 1, 3, 0);
    let snmp_trap_oid = crate::oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0);

    let start = if varbinds.first().map(|v| &v.oid) == Some(&sys_up_time) {
        1
    } else {
        0
    };
    let candidate = varbinds.get(start)?;
    if candidate.oid == snmp_trap_oid {
        Some(start)
    } else {
        None
    }
}
