//! SNMPv3 message-header concepts shared by handlers, VACM, and the wire codec.
//!
//! USM authentication/encryption itself lives behind the trait boundary in
//! [`crate::v3`]; this module only carries the plain data that every layer
//! (registry dispatch, VACM, AgentX forwarding) needs to agree on.

use bytes::Bytes;

/// `msgSecurityLevel` (RFC 3411 Section 3.4.3).
///
/// Ordered from weakest to strongest: `NoAuthNoPriv < AuthNoPriv < AuthPriv`.
/// VACM access checks use this ordering directly (a request at a given level
/// satisfies any access entry requiring that level or weaker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SecurityLevel {
    /// No authentication, no privacy.
    NoAuthNoPriv = 0,
    /// Authenticated, not encrypted.
    AuthNoPriv = 1,
    /// Authenticated and encrypted.
    AuthPriv = 2,
}

impl SecurityLevel {
    /// True if this level requires authentication.
    pub fn requires_auth(self) -> bool {
        self >= SecurityLevel::AuthNoPriv
    }

    /// True if this level requires privacy (encryption).
    pub fn requires_priv(self) -> bool {
        self == SecurityLevel::AuthPriv
    }

    /// Decode from the low two bits of `msgFlags` (RFC 3412 Section 6.4).
    ///
    /// Bit 0 set = authenticated, bit 1 set = encrypted. `priv` without
    /// `auth` is not a valid combination and is rejected by the caller.
    pub fn from_flags(auth: bool, priv_: bool) -> Option<Self> {
        match (auth, priv_) {
            (false, false) => Some(SecurityLevel::NoAuthNoPriv),
            (true, false) => Some(SecurityLevel::AuthNoPriv),
            (true, true) => Some(SecurityLevel::AuthPriv),
            (false, true) => None,
        }
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthNoPriv => write!(f, "noAuthNoPriv"),
            Self::AuthNoPriv => write!(f, "authNoPriv"),
            Self::AuthPriv => write!(f, "authPriv"),
        }
    }
}

impl Default for SecurityLevel {
    fn default() -> Self {
        SecurityLevel::NoAuthNoPriv
    }
}

/// `msgFlags` (RFC 3412 Section 6.4): a single octet, only the low 3 bits
/// defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsgFlags {
    /// Bit 0: authenticated.
    pub auth: bool,
    /// Bit 1: encrypted.
    pub priv_: bool,
    /// Bit 2: reportable (a Report PDU is expected/permitted in reply).
    pub reportable: bool,
}

impl MsgFlags {
    /// Pack into the wire octet.
    pub fn to_byte(self) -> u8 {
        (self.auth as u8) | ((self.priv_ as u8) << 1) | ((self.reportable as u8) << 2)
    }

    /// Unpack from the wire octet.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            auth: byte & 0x01 != 0,
            priv_: byte & 0x02 != 0,
            reportable: byte & 0x04 != 0,
        }
    }

    /// The security level implied by the auth/priv bits, or `None` if the
    /// combination (priv without auth) is invalid per RFC 3412.
    pub fn security_level(self) -> Option<SecurityLevel> {
        SecurityLevel::from_flags(self.auth, self.priv_)
    }
}

/// Scope identifying which context a request/response applies to
/// (RFC 3411 Section 3.3): an engine ID plus a context name within it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopedContext {
    /// `contextEngineID`.
    pub engine_id: Bytes,
    /// `contextName`.
    pub context_name: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_level_ordering() {
        assert!(SecurityLevel::NoAuthNoPriv < SecurityLevel::AuthNoPriv);
        assert!(SecurityLevel::AuthNoPriv < SecurityLevel::AuthPriv);
    }

    #[test]
    fn test_security_level_from_flags() {
        assert_eq!(
            SecurityLevel::from_flags(false, false),
            Some(SecurityLevel::NoAuthNoPriv)
        );
        assert_eq!(
            SecurityLevel::from_flags(true, false),
            Some(SecurityLevel::AuthNoPriv)
        );
        assert_eq!(
            SecurityLevel::from_flags(true, true),
            Some(SecurityLevel::AuthPriv)
        );
        assert_eq!(SecurityLevel::from_flags(false, true), None);
    }

    #[test]
    fn test_msg_flags_roundtrip() {
        let flags = MsgFlags {
            auth: true,
            priv_: true,
            reportable: true,
        };
        assert_eq!(MsgFlags::from_byte(flags.to_byte()), flags);
        assert_eq!(flags.security_level(), Some(SecurityLevel::AuthPriv));
    }
}
