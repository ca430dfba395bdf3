//! SNMPv3 engine discovery and time synchronization (RFC 3414 Section 4).
//!
//! A manager that has never talked to an engine sends an unauthenticated
//! discovery `Get` and reads the authoritative engine's identity plus boot
//! count/time back off the Report it receives. [`EngineCache`] remembers
//! that triple per engine ID so later requests can be authenticated without
//! re-discovering, and the `is_*_report` helpers classify a Report PDU's
//! single varbind against the `usmStats*` OIDs that RFC 3414 defines for it.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use bytes::Bytes;

use crate::oid::Oid;
use crate::pdu::Pdu;

/// Default `msgMaxSize` advertised when none is configured (RFC 3412
/// Section 6, matching common agent defaults).
pub const DEFAULT_MSG_MAX_SIZE: u32 = 65_507;

/// Maximum representable `snmpEngineTime` before it wraps (RFC 3414 Section
/// 2.2.2): 2^31 - 1 seconds.
pub const MAX_ENGINE_TIME: u32 = i32::MAX as u32;

/// Time window (seconds) within which a message's claimed engine time must
/// fall relative to the cached value to be accepted (RFC 3414 Section 3.2,
/// step 7).
pub const TIME_WINDOW: u32 = 150;

fn usm_stats_oid(minor: u32) -> Oid {
    crate::oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, minor, 0)
}

/// Authoritative engine identity + time state, as learned from discovery or
/// a subsequent authenticated exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineState {
    pub engine_id: Bytes,
    pub engine_boots: u32,
    pub engine_time: u32,
}

impl EngineState {
    /// True if `claimed_time` is within [`TIME_WINDOW`] seconds of this
    /// state's `engine_time`, or the engine has rebooted since (RFC 3414
    /// Section 3.2 step 7b).
    pub fn in_time_window(&self, claimed_boots: u32, claimed_time: u32) -> bool {
        if claimed_boots != self.engine_boots {
            return claimed_boots > self.engine_boots;
        }
        claimed_time.abs_diff(self.engine_time) <= TIME_WINDOW
    }
}

struct CacheEntry {
    state: EngineState,
    learned_at: Instant,
}

/// Tracks the most recently observed [`EngineState`] per engine ID across a
/// session's lifetime.
#[derive(Default)]
pub struct EngineCache {
    entries: RwLock<HashMap<Bytes, CacheEntry>>,
}

impl EngineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, engine_id: &[u8]) -> Option<EngineState> {
        self.entries
            .read()
            .unwrap()
            .get(engine_id)
            .map(|e| e.state.clone())
    }

    /// Record (or advance) the state learned for `engine_id`. Local clock
    /// extrapolation (RFC 3414 Section 2.3) is the caller's responsibility;
    /// this just remembers the last value observed on the wire.
    pub fn update(&self, state: EngineState) {
        self.entries.write().unwrap().insert(
            state.engine_id.clone(),
            CacheEntry {
                state,
                learned_at: Instant::now(),
            },
        );
    }

    /// Extrapolate the current engine time for `engine_id` from the cached
    /// value and elapsed wall-clock time, clamped to [`MAX_ENGINE_TIME`].
    pub fn estimated_time(&self, engine_id: &[u8]) -> Option<u32> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(engine_id)?;
        let elapsed = entry.learned_at.elapsed().as_secs() as u32;
        Some(entry.state.engine_time.saturating_add(elapsed) % (MAX_ENGINE_TIME + 1))
    }
}

impl std::fmt::Debug for EngineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineCache")
            .field("entries", &self.entries.read().unwrap().len())
            .finish()
    }
}

/// Extract the authoritative engine's identity and boot/time state from a
/// discovery Report, with `DEFAULT_MSG_MAX_SIZE`-scale sanity limits.
pub fn parse_discovery_response(
    engine_id: Bytes,
    engine_boots: u32,
    engine_time: u32,
) -> EngineState {
    parse_discovery_response_with_limits(engine_id, engine_boots, engine_time, MAX_ENGINE_TIME)
}

/// As [`parse_discovery_response`], with an explicit cap on the accepted
/// `engineTime` (used in tests to exercise the wrap boundary).
pub fn parse_discovery_response_with_limits(
    engine_id: Bytes,
    engine_boots: u32,
    engine_time: u32,
    max_engine_time: u32,
) -> EngineState {
    EngineState {
        engine_id,
        engine_boots,
        engine_time: engine_time.min(max_engine_time),
    }
}

fn report_matches(pdu: &Pdu, minor: u32) -> bool {
    use crate::pdu::PduType;
    pdu.pdu_type == PduType::Report
        && pdu
            .varbinds
            .first()
            .is_some_and(|vb| vb.oid == usm_stats_oid(minor))
}

/// `usmStatsUnsupportedSecLevels` (RFC 3414 Section 5, OID `...15.1.1.1.0`).
pub fn is_unsupported_sec_level_report(pdu: &Pdu) -> bool {
    report_matches(pdu, 1)
}

/// `usmStatsNotInTimeWindows` (`...15.1.1.2.0`).
pub fn is_not_in_time_window_report(pdu: &Pdu) -> bool {
    report_matches(pdu, 2)
}

/// `usmStatsUnknownUserNames` (`...15.1.1.3.0`).
pub fn is_unknown_user_name_report(pdu: &Pdu) -> bool {
    report_matches(pdu, 3)
}

/// `usmStatsUnknownEngineIDs` (`...15.1.1.4.0`).
pub fn is_unknown_engine_id_report(pdu: &Pdu) -> bool {
    report_matches(pdu, 4)
}

/// `usmStatsWrongDigests` (`...15.1.1.5.0`).
pub fn is_wrong_digest_report(pdu: &Pdu) -> bool {
    report_matches(pdu, 5)
}

/// `usmStatsDecryptionErrors` (`...15.1.1.6.0`).
pub fn is_decryption_error_report(pdu: &Pdu) -> bool {
    report_matches(pdu, 6)
}
