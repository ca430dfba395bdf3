//! Common test fixtures and constants.

use priot::handler::{RequestContext, SecurityModel};
use priot::message::SecurityLevel;
use priot::pdu::PduType;
use priot::version::Version;
use priot::{Oid, oid};

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}
pub fn sys_services() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)
}

// =============================================================================
// Subtree roots (for walks)
// =============================================================================

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Interfaces subtree root: 1.3.6.1.2.1.2
pub fn interfaces_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2)
}

// =============================================================================
// Test OIDs
// =============================================================================

/// Nonexistent OID for testing NoSuchObject/NoSuchInstance
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

// =============================================================================
// V2c community / V3 credentials shared across agent + AgentX test fixtures
// =============================================================================

/// V2c read-only community
pub const COMMUNITY_RO: &[u8] = b"public";
/// V2c read-write community
pub const COMMUNITY_RW: &[u8] = b"private";

/// Auth password used to derive test USM keys.
pub const AUTH_PASSWORD: &str = "authpass123";
/// Privacy password used to derive test USM keys.
pub const PRIV_PASSWORD: &str = "privpass123";

// =============================================================================
// Request context builder (RequestContext's test-only constructor is
// `pub(crate)`, so integration tests build one directly from its public
// fields instead)
// =============================================================================

pub fn request_context(version: Version, security_name: &[u8]) -> RequestContext {
    RequestContext {
        source: "127.0.0.1:161".parse().unwrap(),
        version,
        security_model: match version {
            Version::V1 => SecurityModel::V1,
            Version::V2c => SecurityModel::V2c,
            Version::V3 => SecurityModel::Usm,
            _ => unreachable!("Version is non_exhaustive but only V1/V2c/V3 are defined"),
        },
        security_name: security_name.to_vec().into(),
        security_level: SecurityLevel::NoAuthNoPriv,
        context_name: Default::default(),
        request_id: 1,
        pdu_type: PduType::GetRequest,
        group_name: None,
        read_view: None,
        write_view: None,
    }
}
