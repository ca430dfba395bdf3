//! AgentX PDU header: a fixed 20-byte frame preceding every AgentX message.

use crate::error::{Error, Result};

/// AgentX protocol version this crate speaks (RFC 2741 names it 1).
pub const VERSION: u8 = 1;

const HEADER_LEN: usize = 20;

/// `agentx-Header` commands (RFC 2741 Section 6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Open,
    Close,
    Register,
    Unregister,
    Get,
    GetNext,
    GetBulk,
    TestSet,
    CommitSet,
    UndoSet,
    CleanupSet,
    Notify,
    Ping,
    IndexAllocate,
    IndexDeallocate,
    AddAgentCaps,
    RemoveAgentCaps,
    Response,
}

impl Command {
    pub const fn as_u8(self) -> u8 {
        match self {
            Command::Open => 1,
            Command::Close => 2,
            Command::Register => 3,
            Command::Unregister => 4,
            Command::Get => 5,
            Command::GetNext => 6,
            Command::GetBulk => 7,
            Command::TestSet => 8,
            Command::CommitSet => 9,
            Command::UndoSet => 10,
            Command::CleanupSet => 11,
            Command::Notify => 12,
            Command::Ping => 13,
            Command::IndexAllocate => 14,
            Command::IndexDeallocate => 15,
            Command::AddAgentCaps => 16,
            Command::RemoveAgentCaps => 17,
            Command::Response => 18,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            1 => Command::Open,
            2 => Command::Close,
            3 => Command::Register,
            4 => Command::Unregister,
            5 => Command::Get,
            6 => Command::GetNext,
            7 => Command::GetBulk,
            8 => Command::TestSet,
            9 => Command::CommitSet,
            10 => Command::UndoSet,
            11 => Command::CleanupSet,
            12 => Command::Notify,
            13 => Command::Ping,
            14 => Command::IndexAllocate,
            15 => Command::IndexDeallocate,
            16 => Command::AddAgentCaps,
            17 => Command::RemoveAgentCaps,
            18 => Command::Response,
            _ => return None,
        })
    }

    /// True for the control commands that are handled by session
    /// open/close bookkeeping rather than the registry dispatcher.
    pub fn is_control(self) -> bool {
        matches!(self, Command::Open | Command::Close | Command::Ping)
    }
}

/// Per-message flag bits (RFC 2741 Section 6.1), carried in the header's
/// single flags octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    /// Register/Unregister: the registration covers a single instance, not
    /// a subtree.
    pub instance_registration: bool,
    /// Register: pick a never-before-used index value.
    pub new_index: bool,
    /// Register: pick any free index value.
    pub any_index: bool,
    /// The PDU carries a non-default context name after the fixed header.
    pub non_default_context: bool,
    /// Multi-byte integers in this PDU's body are network (big-endian)
    /// order. Always set by this implementation; present for wire
    /// compatibility with peers that negotiate host byte order.
    pub network_byte_order: bool,
}

impl Flags {
    fn to_byte(self) -> u8 {
        (self.instance_registration as u8)
            | ((self.new_index as u8) << 1)
            | ((self.any_index as u8) << 2)
            | ((self.non_default_context as u8) << 3)
            | ((self.network_byte_order as u8) << 4)
    }

    fn from_byte(b: u8) -> Self {
        Self {
            instance_registration: b & 0x01 != 0,
            new_index: b & 0x02 != 0,
            any_index: b & 0x04 != 0,
            non_default_context: b & 0x08 != 0,
            network_byte_order: b & 0x10 != 0,
        }
    }
}

/// The fixed 20-byte AgentX header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub command: Command,
    pub flags: Flags,
    pub session_id: u32,
    pub transaction_id: u32,
    pub packet_id: u32,
    /// Byte length of the payload following this header. Filled in by
    /// [`crate::agentx::frame::encode_frame`] after the body is built
    /// (back-patched, per §4.3's framing description), not by hand.
    pub payload_length: u32,
}

impl Header {
    pub fn new(command: Command, session_id: u32, transaction_id: u32, packet_id: u32) -> Self {
        Self {
            command,
            flags: Flags {
                network_byte_order: true,
                ..Flags::default()
            },
            session_id,
            transaction_id,
            packet_id,
            payload_length: 0,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = VERSION;
        buf[1] = self.command.as_u8();
        buf[2] = self.flags.to_byte();
        buf[3] = 0; // reserved
        buf[4..8].copy_from_slice(&self.session_id.to_be_bytes());
        buf[8..12].copy_from_slice(&self.transaction_id.to_be_bytes());
        buf[12..16].copy_from_slice(&self.packet_id.to_be_bytes());
        buf[16..20].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::decode(0, crate::error::DecodeErrorKind::TruncatedData));
        }
        if buf[0] != VERSION {
            return Err(Error::WrongVersion(buf[0]));
        }
        let command = Command::from_u8(buf[1]).ok_or(Error::UnknownPdu(buf[1]))?;
        let flags = Flags::from_byte(buf[2]);
        let read_u32 = |s: &[u8]| u32::from_be_bytes([s[0], s[1], s[2], s[3]]);
        Ok(Self {
            command,
            flags,
            session_id: read_u32(&buf[4..8]),
            transaction_id: read_u32(&buf[8..12]),
            packet_id: read_u32(&buf[12..16]),
            payload_length: read_u32(&buf[16..20]),
        })
    }
}

pub const HEADER_LENGTH: usize = HEADER_LEN;
