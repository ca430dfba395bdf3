//! BER length encoding/decoding (X.690 definite form only).

use crate::error::{DecodeErrorKind, Error, Result};

/// Maximum length value this codec will accept for a single TLV content
/// region. Chosen generously above any realistic SNMP/AgentX message.
pub const MAX_LENGTH: usize = 64 * 1024 * 1024;

/// Encode a definite-form BER length.
///
/// Returns a fixed buffer and the number of valid bytes, in the order they
/// must appear on the wire (short form: one byte; long form:
/// `0x80|n` followed by `n` big-endian bytes).
///
/// The reverse-buffer encoder ([`super::encode::EncodeBuf`]) pushes these
/// bytes back-to-front, so callers there iterate `bytes[..count]` in
/// reverse; this function itself always returns forward wire order.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut out = [0u8; 5];
    if len < 128 {
        out[0] = len as u8;
        (out, 1)
    } else {
        let be = (len as u64).to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(7);
        let n = 8 - first_nonzero;
        out[0] = 0x80 | (n as u8);
        out[1..1 + n].copy_from_slice(&be[first_nonzero..]);
        (out, 1 + n)
    }
}

/// Parse a definite-form BER length from the start of `buf`.
///
/// Returns `(length, bytes_consumed)`. Rejects indefinite length (`0x80`
/// alone) and over-long encodings.
pub fn parse_length(buf: &[u8]) -> Result<(usize, usize)> {
    let first = *buf
        .first()
        .ok_or_else(|| Error::decode(0, DecodeErrorKind::TruncatedData))?;
    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }
    let n = (first & 0x7F) as usize;
    if n == 0 {
        return Err(Error::decode(0, DecodeErrorKind::IndefiniteLength));
    }
    if n > 4 {
        return Err(Error::decode(0, DecodeErrorKind::LengthTooLong { octets: n }));
    }
    if buf.len() < 1 + n {
        return Err(Error::decode(0, DecodeErrorKind::TruncatedData));
    }
    let mut value: u64 = 0;
    for &b in &buf[1..1 + n] {
        value = (value << 8) | u64::from(b);
    }
    if value as usize > MAX_LENGTH {
        return Err(Error::decode(
            0,
            DecodeErrorKind::LengthExceedsMax {
                length: value as usize,
                max: MAX_LENGTH,
            },
        ));
    }
    Ok((value as usize, 1 + n))
}
