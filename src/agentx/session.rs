//! Master-side subagent session table and the master-wide index pool.
//!
//! Grounded in the open/close/register bookkeeping of the original
//! `Firmware/Plugin/Agentx/Master.c`: the master keeps one entry per open
//! subagent session, and registration/unregistration/index allocation all
//! key off that table.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// One open subagent session, as tracked by the master.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: u32,
    pub timeout: Duration,
    /// The subagent's offered identity OID (first varbind of its `Open`).
    pub subagent_oid: Oid,
    pub description: Bytes,
    /// Subtrees this session currently owns, so `Close` can revoke them all.
    pub registrations: Vec<(String, Oid)>,
}

#[derive(Default)]
struct IndexPool {
    /// (OID, declared type discriminant) -> allocated values.
    allocated: HashMap<(Oid, u8), HashSet<Value>>,
}

impl IndexPool {
    fn type_tag(v: &Value) -> u8 {
        match v {
            Value::Integer(_) => 0,
            Value::OctetString(_) => 1,
            Value::ObjectIdentifier(_) => 2,
            Value::IpAddress(_) => 3,
            Value::Counter32(_) | Value::Gauge32(_) | Value::TimeTicks(_) => 4,
            _ => 255,
        }
    }

    fn next_free(&self, oid: &Oid, tag: u8) -> Value {
        let used = self.allocated.get(&(oid.clone(), tag));
        let mut candidate: i32 = 1;
        loop {
            let v = Value::Integer(candidate);
            if used.is_none_or(|u| !u.contains(&v)) {
                return v;
            }
            candidate += 1;
        }
    }

    /// Allocate one index, per the flags semantics in §4.3: `new` picks a
    /// never-before-used value (tracked the same as "free" here, since this
    /// pool never recycles into a value once handed out... except it does
    /// on `deallocate`; callers wanting strict never-reused semantics
    /// should not deallocate `new`-allocated values).
    fn allocate(&mut self, oid: &Oid, requested: Option<Value>, any_or_new: bool) -> Result<Value> {
        let tag = requested
            .as_ref()
            .map(Self::type_tag)
            .unwrap_or(0);
        let key = (oid.clone(), tag);
        let used = self.allocated.entry(key.clone()).or_default();

        let value = if any_or_new || requested.is_none() {
            self.next_free(oid, tag)
        } else {
            let v = requested.unwrap();
            if used.contains(&v) {
                return Err(Error::IndexNoneAvailable { oid: oid.clone() });
            }
            v
        };

        self.allocated.get_mut(&key).unwrap().insert(value.clone());
        Ok(value)
    }

    fn deallocate(&mut self, oid: &Oid, value: &Value) -> Result<()> {
        let tag = Self::type_tag(value);
        let key = (oid.clone(), tag);
        match self.allocated.get_mut(&key) {
            Some(set) => {
                if set.remove(value) {
                    Ok(())
                } else {
                    Err(Error::IndexNotAllocated { oid: oid.clone() })
                }
            }
            None => Err(Error::IndexNotAllocated { oid: oid.clone() }),
        }
    }
}

/// The master's table of open subagent sessions plus the shared index pool.
#[derive(Default)]
pub struct SessionTable {
    sessions: HashMap<u32, Session>,
    next_session_id: u32,
    pool: IndexPool,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            next_session_id: 1,
            ..Default::default()
        }
    }

    /// Handle an `Open`: allocate a fresh session id and record it.
    pub fn open(&mut self, timeout: Duration, subagent_oid: Oid, description: Bytes) -> u32 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        self.sessions.insert(
            id,
            Session {
                id,
                timeout,
                subagent_oid,
                description,
                registrations: Vec::new(),
            },
        );
        id
    }

    pub fn get(&self, id: u32) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Handle a `Close`: `session_id == None` closes every session (used
    /// when the owning transport disconnects). Returns the registrations
    /// that must be revoked from the registry.
    pub fn close(&mut self, session_id: Option<u32>) -> Vec<(String, Oid)> {
        match session_id {
            Some(id) => self
                .sessions
                .remove(&id)
                .map(|s| s.registrations)
                .unwrap_or_default(),
            None => {
                let mut all = Vec::new();
                for (_, s) in self.sessions.drain() {
                    all.extend(s.registrations);
                }
                all
            }
        }
    }

    pub fn record_registration(&mut self, session_id: u32, context: String, oid: Oid) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.registrations.push((context, oid));
        }
    }

    pub fn remove_registration(&mut self, session_id: u32, context: &str, oid: &Oid) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session
                .registrations
                .retain(|(c, o)| !(c == context && o == oid));
        }
    }

    /// `IndexAllocate`: process varbinds one at a time, fully un-reserving
    /// everything granted so far on the first failure.
    pub fn index_allocate(
        &mut self,
        requests: &[(Oid, Option<Value>, bool)],
    ) -> Result<Vec<Value>> {
        let mut granted = Vec::with_capacity(requests.len());
        for (oid, requested, any_or_new) in requests {
            match self.pool.allocate(oid, requested.clone(), *any_or_new) {
                Ok(v) => granted.push((oid.clone(), v)),
                Err(e) => {
                    for (oid, value) in &granted {
                        let _ = self.pool.deallocate(oid, value);
                    }
                    return Err(e);
                }
            }
        }
        Ok(granted.into_iter().map(|(_, v)| v).collect())
    }

    /// `IndexDeallocate`: mirrors allocate, restoring every index released
    /// so far on any failure.
    pub fn index_deallocate(&mut self, releases: &[(Oid, Value)]) -> Result<()> {
        let mut released = Vec::with_capacity(releases.len());
        for (oid, value) in releases {
            match self.pool.deallocate(oid, value) {
                Ok(()) => released.push((oid.clone(), value.clone())),
                Err(e) => {
                    for (oid, value) in &released {
                        let _ = self.pool.allocate(oid, Some(value.clone()), false);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
