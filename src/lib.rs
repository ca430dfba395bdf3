//! PRIoT, an SNMPv3-style management agent.
//!
//! Speaks a binary management protocol, maintains a hierarchical MIB
//! namespace, dispatches incoming requests to handler subtrees, and
//! supports the AgentX subagent-extension protocol for delegating subtrees
//! to external processes.
//!
//! The crate is organized around the request-processing pipeline: a
//! transport (supplied by the caller; see [`transport`]) delivers framed
//! bytes, [`ber`] decodes them into a [`pdu::Pdu`], [`agent`] resolves each
//! varbind against the [`registry`] tree and dispatches to a
//! [`handler::MibHandler`], and the [`eventmib`] engine independently
//! samples OIDs on a schedule to drive the Event-MIB trigger/notification
//! machinery. [`agentx`] implements the master/subagent session protocol
//! used to delegate a subtree to an external process.

pub mod agent;
pub mod agentx;
pub mod ber;
pub mod config;
pub mod error;
pub mod eventmib;
pub mod handler;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod registry;
pub mod transport;
pub mod util;
pub mod v3;
pub mod value;
pub mod varbind;
pub mod version;

pub use agent::{Agent, AgentBuilder};
pub use error::{Error, Result};
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
