//! BER decoding.
//!
//! Mirrors [`super::encode::EncodeBuf`]'s shape but reads forward. A
//! [`Decoder`] owns a byte range; reading a constructed type (SEQUENCE, PDU)
//! yields a nested `Decoder` scoped to that type's content, so callers
//! consume exactly the declared length and `is_empty()` tells them when a
//! SEQUENCE OF has been fully walked.

use bytes::Bytes;

use super::length::parse_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// Forward BER reader over an owned byte buffer.
#[derive(Debug, Clone)]
pub struct Decoder {
    buf: Bytes,
    pos: usize,
    base_offset: usize,
}

impl Decoder {
    /// Create a decoder over the given bytes.
    pub fn new(buf: Bytes) -> Self {
        Self {
            buf,
            pos: 0,
            base_offset: 0,
        }
    }

    fn err(&self, kind: DecodeErrorKind) -> Error {
        Error::decode(self.base_offset + self.pos, kind)
    }

    /// Bytes remaining to be consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True if every byte in this decoder's scope has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Peek the next tag byte without consuming it.
    pub fn peek_tag(&self) -> Result<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.err(DecodeErrorKind::TruncatedData))
    }

    fn take(&mut self, n: usize) -> Result<Bytes> {
        if self.remaining() < n {
            return Err(self.err(DecodeErrorKind::InsufficientData {
                needed: n,
                available: self.remaining(),
            }));
        }
        let slice = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(slice)
    }

    /// Read a tag + length header, returning `(tag, content_bytes)`. Does
    /// not validate the tag value; callers check it against what they
    /// expect.
    pub fn read_tlv(&mut self) -> Result<(u8, Bytes)> {
        let tag_byte = self.take(1)?[0];
        if tag::tag_number(tag_byte) == 0x1F {
            return Err(self.err(DecodeErrorKind::UnexpectedTag {
                expected: tag_byte,
                actual: tag_byte,
            }));
        }
        let remaining_slice = &self.buf[self.pos..];
        let (len, consumed) = parse_length(remaining_slice).map_err(|_| {
            self.err(DecodeErrorKind::InvalidLength)
        })?;
        self.pos += consumed;
        let content = self.take(len)?;
        Ok((tag_byte, content))
    }

    /// Read a TLV and assert its tag equals `expected`.
    pub fn read_tagged(&mut self, expected: u8) -> Result<Bytes> {
        let start = self.pos;
        let (actual, content) = self.read_tlv()?;
        if actual != expected {
            return Err(Error::decode(
                self.base_offset + start,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        Ok(content)
    }

    /// Read a SEQUENCE, returning a nested decoder scoped to its content.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        let start = self.pos;
        let content = self.read_tagged(tag::universal::SEQUENCE)?;
        Ok(Decoder {
            base_offset: self.base_offset + start,
            pos: 0,
            buf: content,
        })
    }

    /// Read any constructed (or application-tagged constructed) TLV as a
    /// nested decoder, without checking the tag; used for PDU bodies whose
    /// tag identifies the command.
    pub fn read_constructed(&mut self) -> Result<(u8, Decoder)> {
        let start = self.pos;
        let (t, content) = self.read_tlv()?;
        Ok((
            t,
            Decoder {
                base_offset: self.base_offset + start,
                pos: 0,
                buf: content,
            },
        ))
    }

    /// Read an INTEGER.
    pub fn read_integer(&mut self) -> Result<i32> {
        let content = self.read_tagged(tag::universal::INTEGER)?;
        decode_signed(&content).map_err(|k| self.err(k))
    }

    /// Read an unsigned 32-bit value carried under `expected_tag`
    /// (Counter32/Gauge32/TimeTicks all share this shape).
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32> {
        let content = self.read_tagged(expected_tag)?;
        decode_unsigned32(&content).map_err(|k| self.err(k))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        self.read_tagged(tag::universal::OCTET_STRING)
    }

    /// Read a NULL, which must have zero length.
    pub fn read_null(&mut self) -> Result<()> {
        let content = self.read_tagged(tag::universal::NULL)?;
        if !content.is_empty() {
            return Err(self.err(DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let content = self.read_tagged(tag::universal::OBJECT_IDENTIFIER)?;
        Oid::from_ber(&content)
    }

    /// Read an IpAddress (application tag, 4 bytes).
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let content = self.read_tagged(tag::application::IP_ADDRESS)?;
        if content.len() != 4 {
            return Err(self.err(DecodeErrorKind::InvalidIpAddressLength {
                length: content.len(),
            }));
        }
        let mut out = [0u8; 4];
        out.copy_from_slice(&content);
        Ok(out)
    }

    /// Read a Counter64.
    pub fn read_counter64(&mut self) -> Result<u64> {
        let content = self.read_tagged(tag::application::COUNTER64)?;
        decode_u64(&content).map_err(|k| self.err(k))
    }

    /// Read an Opaque blob without interpreting nested sub-tags.
    pub fn read_opaque(&mut self) -> Result<Bytes> {
        self.read_tagged(tag::application::OPAQUE)
    }
}

/// Decode a two's-complement big-endian signed integer.
pub(super) fn decode_signed(content: &[u8]) -> std::result::Result<i32, DecodeErrorKind> {
    if content.is_empty() {
        return Err(DecodeErrorKind::ZeroLengthInteger);
    }
    if content.len() > 4 {
        return Err(DecodeErrorKind::IntegerOverflow);
    }
    let mut buf = if content[0] & 0x80 != 0 {
        [0xFFu8; 4]
    } else {
        [0u8; 4]
    };
    buf[4 - content.len()..].copy_from_slice(content);
    Ok(i32::from_be_bytes(buf))
}

/// Decode a big-endian unsigned 32-bit value, tolerating a leading
/// sign-extension `0x00` byte (up to 5 bytes total).
pub(super) fn decode_unsigned32(content: &[u8]) -> std::result::Result<u32, DecodeErrorKind> {
    if content.is_empty() {
        return Err(DecodeErrorKind::ZeroLengthInteger);
    }
    if content.len() > 5 {
        return Err(DecodeErrorKind::IntegerOverflow);
    }
    if content.len() == 5 && content[0] != 0 {
        return Err(DecodeErrorKind::IntegerOverflow);
    }
    let mut buf = [0u8; 4];
    let trimmed = if content.len() == 5 { &content[1..] } else { content };
    buf[4 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(u32::from_be_bytes(buf))
}

/// Decode a big-endian unsigned 64-bit value, tolerating a leading
/// sign-extension `0x00` byte (up to 9 bytes total).
pub(super) fn decode_u64(content: &[u8]) -> std::result::Result<u64, DecodeErrorKind> {
    if content.is_empty() {
        return Err(DecodeErrorKind::ZeroLengthInteger);
    }
    if content.len() > 9 {
        return Err(DecodeErrorKind::Integer64TooLong {
            length: content.len(),
        });
    }
    if content.len() == 9 && content[0] != 0 {
        return Err(DecodeErrorKind::Integer64TooLong {
            length: content.len(),
        });
    }
    let mut buf = [0u8; 8];
    let trimmed = if content.len() == 9 { &content[1..] } else { content };
    buf[8 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(u64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::encode::EncodeBuf;

    #[test]
    fn test_decode_integer() {
        let mut buf = EncodeBuf::new();
        buf.push_integer(-129);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_integer().unwrap(), -129);
    }

    #[test]
    fn test_decode_sequence_is_empty() {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_integer(1);
        });
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        let mut seq = dec.read_sequence().unwrap();
        assert!(!seq.is_empty());
        assert_eq!(seq.read_integer().unwrap(), 1);
        assert!(seq.is_empty());
    }

    #[test]
    fn test_truncated_fails() {
        let mut dec = Decoder::new(Bytes::from_static(&[0x02]));
        assert!(dec.read_integer().is_err());
    }
}
