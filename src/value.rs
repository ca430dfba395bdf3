//! SNMP varbind value types.
//!
//! Covers the BER types §4.1 requires: the universal/application SNMP
//! scalar types plus the three exception markers used in GET/GETNEXT
//! responses, and the Opaque-wrapped Float/Double/UInt64/Int64 special
//! forms.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// A decoded varbind value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// INTEGER (signed 32-bit).
    Integer(i32),
    /// Counter32 (wraps at 2^32, monotonically increasing).
    Counter32(u32),
    /// Gauge32 / Unsigned32.
    Gauge32(u32),
    /// TimeTicks, hundredths of a second.
    TimeTicks(u32),
    /// Counter64.
    Counter64(u64),
    /// OCTET STRING.
    OctetString(Bytes),
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// IpAddress, 4 bytes.
    IpAddress([u8; 4]),
    /// Opaque blob whose content is not further interpreted.
    Opaque(Bytes),
    /// Opaque-wrapped IEEE-754 single-precision float.
    Float(f32),
    /// Opaque-wrapped IEEE-754 double-precision float.
    Double(f64),
    /// Opaque-wrapped signed 64-bit integer.
    Int64(i64),
    /// Opaque-wrapped unsigned 64-bit integer.
    UInt64(u64),
    /// NULL.
    Null,
    /// noSuchObject exception (the object type is not implemented here).
    NoSuchObject,
    /// noSuchInstance exception (the type exists, this instance doesn't).
    NoSuchInstance,
    /// endOfMibView exception (no further OIDs in this direction).
    EndOfMibView,
}

impl Value {
    /// True for any of the three SNMP exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Encode this value's TLV into `buf`.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::OctetString(b) => buf.push_octet_string(b),
            Value::ObjectIdentifier(o) => buf.push_oid(o),
            Value::IpAddress(a) => buf.push_ip_address(*a),
            Value::Opaque(b) => buf.push_opaque(b),
            Value::Float(f) => buf.push_float(*f),
            Value::Double(d) => buf.push_double(*d),
            Value::Int64(v) => push_opaque_signed64(buf, 0x80, *v),
            Value::UInt64(v) => push_opaque_special_u64(buf, 0x79, *v),
            Value::Null => buf.push_null(),
            Value::NoSuchObject => push_exception(buf, tag::context::NO_SUCH_OBJECT),
            Value::NoSuchInstance => push_exception(buf, tag::context::NO_SUCH_INSTANCE),
            Value::EndOfMibView => push_exception(buf, tag::context::END_OF_MIB_VIEW),
        }
    }

    /// Decode a value from `decoder`, disambiguating Opaque sub-types.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let t = decoder.peek_tag()?;
        match t {
            tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer()?)),
            tag::universal::OCTET_STRING => Ok(Value::OctetString(decoder.read_octet_string()?)),
            tag::universal::NULL => {
                decoder.read_null()?;
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => Ok(Value::ObjectIdentifier(decoder.read_oid()?)),
            tag::application::IP_ADDRESS => Ok(Value::IpAddress(decoder.read_ip_address()?)),
            tag::application::COUNTER32 => Ok(Value::Counter32(
                decoder.read_unsigned32(tag::application::COUNTER32)?,
            )),
            tag::application::GAUGE32 => Ok(Value::Gauge32(
                decoder.read_unsigned32(tag::application::GAUGE32)?,
            )),
            tag::application::TIMETICKS => Ok(Value::TimeTicks(
                decoder.read_unsigned32(tag::application::TIMETICKS)?,
            )),
            tag::application::COUNTER64 => Ok(Value::Counter64(decoder.read_counter64()?)),
            tag::application::OPAQUE => decode_opaque(decoder),
            tag::context::NO_SUCH_OBJECT => {
                decoder.read_tagged(tag::context::NO_SUCH_OBJECT)?;
                Ok(Value::NoSuchObject)
            }
            tag::context::NO_SUCH_INSTANCE => {
                decoder.read_tagged(tag::context::NO_SUCH_INSTANCE)?;
                Ok(Value::NoSuchInstance)
            }
            tag::context::END_OF_MIB_VIEW => {
                decoder.read_tagged(tag::context::END_OF_MIB_VIEW)?;
                Ok(Value::EndOfMibView)
            }
            other => Err(Error::decode(
                0,
                DecodeErrorKind::UnexpectedTag {
                    expected: other,
                    actual: other,
                },
            )),
        }
    }
}

/// Structural equality/hash for uses like the AgentX index pool's
/// allocated-value sets. Float/Double compare and hash by bit pattern
/// (so NaN is equal to itself but distinct bit patterns are distinct),
/// which is not IEEE-754 equality but is what a hash set needs.
impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(v) => v.hash(state),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => v.hash(state),
            Value::Counter64(v) | Value::UInt64(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::OctetString(v) | Value::Opaque(v) => v.hash(state),
            Value::ObjectIdentifier(v) => v.arcs().hash(state),
            Value::IpAddress(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {}
        }
    }
}

fn push_exception(buf: &mut EncodeBuf, t: u8) {
    buf.push_length(0);
    buf.push_tag(t);
}

fn push_opaque_signed64(buf: &mut EncodeBuf, subtag: u8, value: i64) {
    let be = value.to_be_bytes();
    buf.push_constructed(tag::application::OPAQUE, |buf| {
        buf.push_bytes(&be);
        buf.push_byte(be.len() as u8);
        buf.push_byte(subtag);
        buf.push_byte(0x9f);
    });
}

fn push_opaque_special_u64(buf: &mut EncodeBuf, subtag: u8, value: u64) {
    let be = value.to_be_bytes();
    buf.push_constructed(tag::application::OPAQUE, |buf| {
        buf.push_bytes(&be);
        buf.push_byte(be.len() as u8);
        buf.push_byte(subtag);
        buf.push_byte(0x9f);
    });
}

/// Disambiguate the inner sub-tag of an Opaque TLV.
///
/// The wire format nests `{0x9f, subtag}` + a one-byte length + the raw
/// payload inside the outer Opaque content. §9's open question notes that
/// sub-tags 0x78/0x79 are shared between Counter64/UInt64 and Float/Double;
/// the parser disambiguates purely by the declared inner length (4 bytes =>
/// Float, 8 bytes with subtag 0x79 => Double, otherwise an integer).
fn decode_opaque(decoder: &mut Decoder) -> Result<Value> {
    let content = decoder.read_opaque()?;
    if content.len() < 3 || content[0] != 0x9f {
        return Ok(Value::Opaque(content));
    }
    let subtag = content[1];
    let inner_len = content[2] as usize;
    let payload = &content[3..];
    if payload.len() != inner_len {
        return Ok(Value::Opaque(content));
    }
    match (subtag, inner_len) {
        (0x78, 4) => {
            let mut b = [0u8; 4];
            b.copy_from_slice(payload);
            Ok(Value::Float(f32::from_be_bytes(b)))
        }
        (0x78, _) => Ok(Value::Counter64(read_be_u64(payload))),
        (0x79, 8) => {
            let mut swapped = [0u8; 8];
            swapped[..4].copy_from_slice(&payload[4..]);
            swapped[4..].copy_from_slice(&payload[..4]);
            Ok(Value::Double(f64::from_be_bytes(swapped)))
        }
        (0x79, _) => Ok(Value::UInt64(read_be_u64(payload))),
        (0x80, _) => Ok(Value::Int64(read_be_i64(payload))),
        _ => Ok(Value::Opaque(content)),
    }
}

fn read_be_u64(b: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let n = b.len().min(8);
    buf[8 - n..].copy_from_slice(&b[b.len() - n..]);
    u64::from_be_bytes(buf)
}

fn read_be_i64(b: &[u8]) -> i64 {
    let fill = if !b.is_empty() && b[0] & 0x80 != 0 {
        0xFF
    } else {
        0
    };
    let mut buf = [fill; 8];
    let n = b.len().min(8);
    buf[8 - n..].copy_from_slice(&b[b.len() - n..]);
    i64::from_be_bytes(buf)
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Counter32(v) => write!(f, "Counter32: {}", v),
            Value::Gauge32(v) => write!(f, "Gauge32: {}", v),
            Value::TimeTicks(v) => write!(f, "Timeticks: {}", v),
            Value::Counter64(v) => write!(f, "Counter64: {}", v),
            Value::OctetString(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::ObjectIdentifier(o) => write!(f, "{}", o),
            Value::IpAddress(a) => write!(f, "{}.{}.{}.{}", a[0], a[1], a[2], a[3]),
            Value::Opaque(_) => write!(f, "Opaque"),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Null => write!(f, "Null"),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}
