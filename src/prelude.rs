//! Prelude module for convenient imports.
//!
//! This module provides a convenient set of commonly-used types and traits
//! for building a PRIoT agent.
//!
//! # Usage
//!
//! ```rust,no_run
//! use priot::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Agent`], [`AgentBuilder`], [`Oid`], [`Value`], [`VarBind`]
//! - Handler types: [`MibHandler`], [`RequestContext`]
//! - Error handling: [`Error`], [`Result`]
//! - V3 protocols: [`AuthProtocol`], [`PrivProtocol`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::agent::{Agent, AgentBuilder};
pub use crate::error::{Error, Result};
pub use crate::handler::{MibHandler, RequestContext};
pub use crate::oid::Oid;
pub use crate::v3::{AuthProtocol, PrivProtocol};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
