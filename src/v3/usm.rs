//! USM security parameters (RFC 3414 Section 2.4).
//!
//! `msgSecurityParameters` is itself BER-encoded and then wrapped in an
//! OCTET STRING inside the outer message, a SEQUENCE of five fields
//! carrying authoritative-engine identity, the user name, and the
//! (possibly zeroed, pending computation) auth/priv parameter fields.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::Result;

/// The decoded/encoded form of `UsmSecurityParameters`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsmSecurityParams {
    pub authoritative_engine_id: Bytes,
    pub authoritative_engine_boots: u32,
    pub authoritative_engine_time: u32,
    pub user_name: Bytes,
    /// The truncated MAC, zero-filled to `mac_len()` bytes before signing.
    pub auth_params: Bytes,
    /// The privacy salt/IV parameters, empty when `noPriv`.
    pub priv_params: Bytes,
}

impl UsmSecurityParams {
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_octet_string(&self.priv_params);
            buf.push_octet_string(&self.auth_params);
            buf.push_octet_string(&self.user_name);
            buf.push_unsigned32(tag::universal::INTEGER, self.authoritative_engine_time);
            buf.push_unsigned32(tag::universal::INTEGER, self.authoritative_engine_boots);
            buf.push_octet_string(&self.authoritative_engine_id);
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let authoritative_engine_id = seq.read_octet_string()?;
        let authoritative_engine_boots = seq.read_unsigned32(tag::universal::INTEGER)?;
        let authoritative_engine_time = seq.read_unsigned32(tag::universal::INTEGER)?;
        let user_name = seq.read_octet_string()?;
        let auth_params = seq.read_octet_string()?;
        let priv_params = seq.read_octet_string()?;
        Ok(Self {
            authoritative_engine_id,
            authoritative_engine_boots,
            authoritative_engine_time,
            user_name,
            auth_params,
            priv_params,
        })
    }

    /// A copy of `self` with `auth_params` replaced by `mac_len` zero bytes,
    /// as required before computing the real MAC over the whole message
    /// (RFC 3414 Section 6.3.1, step 2).
    pub fn with_zeroed_auth_params(&self, mac_len: usize) -> Self {
        Self {
            auth_params: Bytes::from(vec![0u8; mac_len]),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let params = UsmSecurityParams {
            authoritative_engine_id: Bytes::from_static(b"\x80\x00\x1f\x88\x01"),
            authoritative_engine_boots: 3,
            authoritative_engine_time: 12345,
            user_name: Bytes::from_static(b"admin"),
            auth_params: Bytes::from(vec![0u8; 12]),
            priv_params: Bytes::new(),
        };
        let mut buf = EncodeBuf::new();
        params.encode(&mut buf);
        let mut dec = Decoder::new(buf.finish());
        let back = UsmSecurityParams::decode(&mut dec).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_with_zeroed_auth_params() {
        let mut params = UsmSecurityParams::default();
        params.auth_params = Bytes::from_static(b"garbage-bytes");
        let zeroed = params.with_zeroed_auth_params(12);
        assert_eq!(zeroed.auth_params.len(), 12);
        assert!(zeroed.auth_params.iter().all(|&b| b == 0));
    }
}
