//! `override` directive handler: a single constant (or read-write) scalar
//! shadowing whatever else might be registered under its OID.
//!
//! Grounded in the `Scalar`/two-phase-commit patterns already used by
//! [`super::set_handler`] and the test handlers in [`super`]; this is the
//! one concrete [`MibHandler`] the crate ships rather than leaving entirely
//! to callers, since `config::OverrideSpec` has to resolve to *something*
//! registrable.

use std::sync::RwLock;

use crate::handler::{BoxFuture, GetNextResult, GetResult, MibHandler, RequestContext, SetResult};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

pub(super) struct OverrideHandler {
    oid: Oid,
    writable: bool,
    value: RwLock<Value>,
}

impl OverrideHandler {
    pub(super) fn new(oid: Oid, value: Value, writable: bool) -> Self {
        Self {
            oid,
            writable,
            value: RwLock::new(value),
        }
    }
}

impl MibHandler for OverrideHandler {
    fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
        Box::pin(async move {
            if oid == &self.oid {
                GetResult::Value(self.value.read().expect("override lock poisoned").clone())
            } else {
                GetResult::NoSuchObject
            }
        })
    }

    fn get_next<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        oid: &'a Oid,
    ) -> BoxFuture<'a, GetNextResult> {
        Box::pin(async move {
            if oid < &self.oid {
                let value = self.value.read().expect("override lock poisoned").clone();
                GetNextResult::Value(VarBind::new(self.oid.clone(), value))
            } else {
                GetNextResult::EndOfMibView
            }
        })
    }

    fn test_set<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        oid: &'a Oid,
        _value: &'a Value,
    ) -> BoxFuture<'a, SetResult> {
        Box::pin(async move {
            if oid != &self.oid || !self.writable {
                SetResult::NotWritable
            } else {
                SetResult::Ok
            }
        })
    }

    fn commit_set<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        oid: &'a Oid,
        value: &'a Value,
    ) -> BoxFuture<'a, SetResult> {
        Box::pin(async move {
            if oid != &self.oid || !self.writable {
                return SetResult::NotWritable;
            }
            *self.value.write().expect("override lock poisoned") = value.clone();
            SetResult::Ok
        })
    }
}
