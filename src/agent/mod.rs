//! The agent: registry-backed dispatcher tying together MIB handlers and
//! VACM access control.
//!
//! An [`Agent`] owns one [`crate::registry::Registry`] plus whatever ambient
//! subsystems were wired in by [`AgentBuilder`]. It has no opinion on
//! transport: callers decode a [`Pdu`] off the wire, call [`Agent::dispatch`],
//! and encode whatever comes back.
//!
//! [`crate::agentx`]'s master session table and [`crate::eventmib::Engine`]
//! are peer subsystems, not fields on [`Agent`]: the AgentX master
//! translates delegated requests into [`Agent::dispatch`] calls, and the
//! event engine holds a cloned `Agent` handle to sample and SET through the
//! same public API a wire transport would use. Keeping them outside
//! `AgentInner` means neither one needs `Agent`'s internals, and an
//! `Agent` with no AgentX/event-engine wiring at all is just as valid.

mod overrides;
mod set_handler;
pub mod vacm;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{ErrorStatus, Result};
use crate::handler::{GetNextResult, GetResult, MibHandler, RequestContext};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::registry::{HandlerEntry, Registry};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

use vacm::VacmConfig;

/// Default GETBULK `max-repetitions` applied when a request omits it or
/// asks for an unreasonably large walk (mirrors common agent practice of
/// capping rather than rejecting).
const MAX_BULK_REPETITIONS: u32 = 256;

struct AgentInner {
    registry: Registry,
    vacm: Option<VacmConfig>,
}

/// A registry-backed SNMP agent core.
///
/// Cheap to clone: internally an `Arc`, so the same agent can be shared
/// across however many transport tasks a binary wants to run.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    /// Start building an agent with no handlers registered.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Find the handler owning `oid` in the default context.
    pub(crate) fn find_handler(&self, oid: &Oid) -> Option<HandlerEntry> {
        self.inner
            .registry
            .lookup(crate::registry::DEFAULT_CONTEXT, oid)
    }

    /// Find the handler owning `oid` in a named context.
    pub(crate) fn find_handler_in(&self, context: &str, oid: &Oid) -> Option<HandlerEntry> {
        self.inner.registry.lookup(context, oid)
    }

    fn find_next_handler_in(&self, context: &str, oid: &Oid) -> Option<(Oid, HandlerEntry)> {
        self.inner.registry.lookup_next(context, oid)
    }

    /// Register a handler under `prefix` at the given priority, in the
    /// default context. Lower `priority` values win when subtrees overlap.
    pub fn register(&self, prefix: Oid, priority: u8, handler: Arc<dyn MibHandler>) -> Result<()> {
        self.inner
            .registry
            .register(crate::registry::DEFAULT_CONTEXT, prefix, priority, handler)
    }

    /// Remove a handler previously registered under `prefix`.
    pub fn unregister(&self, prefix: &Oid) -> Result<()> {
        self.inner
            .registry
            .unregister(crate::registry::DEFAULT_CONTEXT, prefix)
    }

    /// Number of subtrees currently registered, across all contexts.
    pub fn registration_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Install the `override` directives from a loaded configuration.
    ///
    /// Overrides register at priority 0, the highest precedence the
    /// registry supports, so a configured override always shadows whatever
    /// a MIB module registered underneath it. `monitor`/`notificationEvent`/
    /// `setEvent` directives are handled separately by
    /// [`crate::eventmib::Engine::apply_config`], since they shape an event
    /// engine's tables, not this agent's registry.
    pub fn apply_config(&self, config: &crate::config::AgentConfig) -> Result<()> {
        for spec in &config.overrides {
            self.inner.registry.register(
                crate::registry::DEFAULT_CONTEXT,
                spec.oid.clone(),
                0,
                Arc::new(overrides::OverrideHandler::new(
                    spec.oid.clone(),
                    spec.value.clone(),
                    spec.writable,
                )),
            )?;
        }
        Ok(())
    }

    /// Dispatch a decoded request PDU, returning the response PDU to encode
    /// and send back.
    ///
    /// Handles `GetRequest`, `GetNextRequest`, `GetBulkRequest`, and
    /// `SetRequest`. Any other PDU type (traps, reports, AgentX control
    /// frames) is not a request this method understands and is reported as
    /// `Err(Error::UnknownPdu)`.
    pub async fn dispatch(&self, ctx: &RequestContext, pdu: &Pdu) -> Result<Pdu> {
        match pdu.pdu_type {
            PduType::GetRequest => self.handle_get(ctx, pdu).await,
            PduType::GetNextRequest => self.handle_get_next(ctx, pdu).await,
            PduType::GetBulkRequest => self.handle_get_bulk(ctx, pdu).await,
            PduType::SetRequest => self.handle_set(ctx, pdu).await,
            other => Err(crate::error::Error::UnknownPdu(other.tag())),
        }
    }

    async fn handle_get(&self, ctx: &RequestContext, pdu: &Pdu) -> Result<Pdu> {
        let mut out = Vec::with_capacity(pdu.varbinds.len());
        let mut error_status = ErrorStatus::NoError;
        let mut error_index = 0i32;

        for (index, vb) in pdu.varbinds.iter().enumerate() {
            if let Some(ref vacm) = self.inner.vacm
                && !vacm.check_access(ctx.read_view.as_ref(), &vb.oid)
            {
                out.push(vb.clone());
                if error_status == ErrorStatus::NoError {
                    error_status = if ctx.version == Version::V1 {
                        ErrorStatus::NoSuchName
                    } else {
                        ErrorStatus::NoAccess
                    };
                    error_index = (index + 1) as i32;
                }
                continue;
            }

            let value = match self.find_handler(&vb.oid) {
                Some(entry) => match entry.handler.get(ctx, &vb.oid).await {
                    GetResult::Value(v) => Some(v),
                    GetResult::NoSuchObject | GetResult::NoSuchInstance => None,
                },
                None => None,
            };

            match value {
                Some(v) => out.push(VarBind::new(vb.oid.clone(), v)),
                None => {
                    if ctx.version == Version::V1 {
                        out.push(vb.clone());
                        if error_status == ErrorStatus::NoError {
                            error_status = ErrorStatus::NoSuchName;
                            error_index = (index + 1) as i32;
                        }
                    } else {
                        out.push(VarBind::new(vb.oid.clone(), Value::NoSuchObject));
                    }
                }
            }
        }

        if ctx.version == Version::V1 && error_status != ErrorStatus::NoError {
            return Ok(Pdu::error_response(
                pdu.request_id,
                error_status.as_i32(),
                error_index,
                pdu.varbinds.clone(),
            ));
        }

        Ok(Pdu::success_response(pdu.request_id, out))
    }

    /// Advance a single OID by one lexicographic step via the registered
    /// handlers, trying the owning subtree first and then walking forward
    /// into the next registered subtree on `EndOfMibView`.
    async fn next_value(&self, ctx: &RequestContext, oid: &Oid) -> Option<VarBind> {
        let mut cursor = oid.clone();
        loop {
            let entry = match self.find_handler(&cursor) {
                Some(entry) => entry,
                // `cursor` isn't inside any registered subtree (the common
                // `snmpwalk` starting point, e.g. GETNEXT at the tree root).
                // Jump forward to the nearest subtree and resume there
                // instead of reporting end-of-MIB.
                None => {
                    let (next_start, _) = self
                        .find_next_handler_in(crate::registry::DEFAULT_CONTEXT, &cursor)?;
                    cursor = next_start;
                    continue;
                }
            };
            match entry.handler.get_next(ctx, &cursor).await {
                GetNextResult::Value(vb) => return Some(vb),
                GetNextResult::EndOfMibView => {
                    let (next_start, _) = self.find_next_handler_in(
                        crate::registry::DEFAULT_CONTEXT,
                        &entry.prefix,
                    )?;
                    if next_start <= cursor {
                        return None;
                    }
                    cursor = next_start;
                }
            }
        }
    }

    async fn handle_get_next(&self, ctx: &RequestContext, pdu: &Pdu) -> Result<Pdu> {
        let mut out = Vec::with_capacity(pdu.varbinds.len());
        let mut error_status = ErrorStatus::NoError;
        let mut error_index = 0i32;

        for (index, vb) in pdu.varbinds.iter().enumerate() {
            match self.next_value(ctx, &vb.oid).await {
                Some(next) => {
                    let visible = self
                        .inner
                        .vacm
                        .as_ref()
                        .is_none_or(|vacm| vacm.check_access(ctx.read_view.as_ref(), &next.oid));
                    if visible {
                        out.push(next);
                    } else if ctx.version == Version::V1 {
                        out.push(vb.clone());
                        if error_status == ErrorStatus::NoError {
                            error_status = ErrorStatus::NoSuchName;
                            error_index = (index + 1) as i32;
                        }
                    } else {
                        out.push(VarBind::new(vb.oid.clone(), Value::EndOfMibView));
                    }
                }
                None => {
                    if ctx.version == Version::V1 {
                        out.push(vb.clone());
                        if error_status == ErrorStatus::NoError {
                            error_status = ErrorStatus::NoSuchName;
                            error_index = (index + 1) as i32;
                        }
                    } else {
                        out.push(VarBind::new(vb.oid.clone(), Value::EndOfMibView));
                    }
                }
            }
        }

        if ctx.version == Version::V1 && error_status != ErrorStatus::NoError {
            return Ok(Pdu::error_response(
                pdu.request_id,
                error_status.as_i32(),
                error_index,
                pdu.varbinds.clone(),
            ));
        }

        Ok(Pdu::success_response(pdu.request_id, out))
    }

    async fn handle_get_bulk(&self, ctx: &RequestContext, pdu: &Pdu) -> Result<Pdu> {
        if ctx.version == Version::V1 {
            return Err(crate::error::Error::WrongVersion(Version::V1.as_i32() as u8));
        }

        let non_repeaters = pdu.error_status.max(0) as usize;
        let max_repetitions = (pdu.error_index.max(0) as u32).min(MAX_BULK_REPETITIONS);

        let mut out = Vec::new();
        let split = non_repeaters.min(pdu.varbinds.len());

        for vb in &pdu.varbinds[..split] {
            match self.next_value(ctx, &vb.oid).await {
                Some(next) => out.push(next),
                None => out.push(VarBind::new(vb.oid.clone(), Value::EndOfMibView)),
            }
        }

        for vb in &pdu.varbinds[split..] {
            let mut cursor = vb.oid.clone();
            for _ in 0..max_repetitions {
                match self.next_value(ctx, &cursor).await {
                    Some(next) => {
                        cursor = next.oid.clone();
                        out.push(next);
                    }
                    None => {
                        out.push(VarBind::new(cursor.clone(), Value::EndOfMibView));
                        break;
                    }
                }
            }
        }

        Ok(Pdu::success_response(pdu.request_id, out))
    }

    /// Encode and reformulate an AgentX `Notify` as a trap, dispatched
    /// through whatever notification sink was configured. The core crate
    /// has no transport of its own, so this simply shapes the PDU; sending
    /// it is the caller's responsibility.
    pub fn build_trap(
        &self,
        context_name: Bytes,
        varbinds: Vec<VarBind>,
    ) -> Pdu {
        Pdu {
            pdu_type: PduType::TrapV2,
            request_id: 0,
            varbinds,
            context_name: Some(context_name),
            ..Default::default()
        }
    }
}

/// Builder for an [`Agent`].
#[derive(Default)]
pub struct AgentBuilder {
    registry: Registry,
    vacm: Option<VacmConfig>,
}

impl AgentBuilder {
    /// Start with no handlers and no VACM.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `prefix` at priority 127 (the conventional
    /// default precedence for application-registered MIB modules).
    pub fn handler(self, prefix: Oid, handler: impl MibHandler) -> Self {
        self.handler_at(prefix, 127, handler)
    }

    /// Register a handler under `prefix` at an explicit priority.
    pub fn handler_at(self, prefix: Oid, priority: u8, handler: impl MibHandler) -> Self {
        self.registry
            .register(
                crate::registry::DEFAULT_CONTEXT,
                prefix,
                priority,
                Arc::new(handler),
            )
            .expect("builder-time registration cannot fail: no prior registration to collide with");
        self
    }

    /// Enable VACM-based access control.
    pub fn vacm(mut self, vacm: VacmConfig) -> Self {
        self.vacm = Some(vacm);
        self
    }

    /// Finish building the agent.
    pub fn build(self) -> Agent {
        Agent {
            inner: Arc::new(AgentInner {
                registry: self.registry,
                vacm: self.vacm,
            }),
        }
    }
}
