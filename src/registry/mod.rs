//! The MIB registry and dispatch tree (RFC-less, net-snmp's `AgentRegistry`
//! design): a prefix-keyed container, scoped per context, that routes a
//! request OID to the handler owning the nearest enclosing subtree.
//!
//! Registrations are kept as a flat, start-ordered list per context rather
//! than a literal nested tree; since subtree containment is equivalent to
//! prefix containment on sorted OIDs, this gives the same dispatch
//! semantics as a real tree with a much simpler implementation, at the cost
//! of `O(log n)` candidate lookup plus a short linear priority scan among
//! overlapping registrations at that point (usually 1, rarely more than a
//! handful).

mod cache;
mod subtree;

pub use cache::LookupCache;
pub use subtree::{HandlerEntry, Subtree};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::handler::MibHandler;
use crate::oid::Oid;

/// Default context name (the empty string), used by requests that carry no
/// `contextName`.
pub const DEFAULT_CONTEXT: &str = "";

struct ContextTree {
    /// Sorted ascending by `(start, priority)`.
    subtrees: Vec<Subtree>,
    cache: LookupCache,
}

impl ContextTree {
    fn new() -> Self {
        Self {
            subtrees: Vec::new(),
            cache: LookupCache::new(8),
        }
    }
}

/// The per-agent registry: one [`ContextTree`] per SNMPv3 context name.
pub struct Registry {
    contexts: RwLock<HashMap<String, ContextTree>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Register `handler` to own every OID under `oid` (inclusive) in
    /// `context`, at `priority` (lower wins when ranges overlap).
    ///
    /// Returns [`Error::DuplicateRegistration`] if an identical
    /// `(oid, priority)` pair is already registered in this context.
    pub fn register(
        &self,
        context: &str,
        oid: Oid,
        priority: u8,
        handler: Arc<dyn MibHandler>,
    ) -> Result<()> {
        let mut contexts = self.contexts.write().unwrap();
        let tree = contexts
            .entry(context.to_string())
            .or_insert_with(ContextTree::new);

        let idx = tree
            .subtrees
            .partition_point(|s| (s.start.clone(), s.priority) < (oid.clone(), priority));
        if let Some(existing) = tree.subtrees.get(idx)
            && existing.start == oid
            && existing.priority == priority
        {
            return Err(Error::DuplicateRegistration { oid, priority });
        }

        tree.subtrees.insert(
            idx,
            Subtree {
                start: oid.clone(),
                priority,
                context: context.to_string(),
                handler,
                delegated: false,
            },
        );
        tree.cache.invalidate();
        Ok(())
    }

    /// Remove the registration for `oid` in `context` at any priority.
    pub fn unregister(&self, context: &str, oid: &Oid) -> Result<()> {
        let mut contexts = self.contexts.write().unwrap();
        let tree = contexts
            .get_mut(context)
            .ok_or_else(|| Error::UnknownRegistration { oid: oid.clone() })?;
        let before = tree.subtrees.len();
        tree.subtrees.retain(|s| &s.start != oid);
        if tree.subtrees.len() == before {
            return Err(Error::UnknownRegistration { oid: oid.clone() });
        }
        tree.cache.invalidate();
        Ok(())
    }

    /// Find the handler owning the nearest enclosing prefix of `oid`,
    /// preferring the lowest (highest-precedence) priority among
    /// overlapping registrations.
    pub fn lookup(&self, context: &str, oid: &Oid) -> Option<HandlerEntry> {
        let contexts = self.contexts.read().unwrap();
        let tree = contexts.get(context)?;
        if let Some(cached) = tree.cache.get(oid) {
            return Some(cached);
        }

        let best = tree
            .subtrees
            .iter()
            .filter(|s| oid.starts_with(&s.start) || oid == &s.start)
            .min_by_key(|s| (s.priority, std::cmp::Reverse(s.start.arcs().len())))?;

        let entry = HandlerEntry {
            handler: best.handler.clone(),
            prefix: best.start.clone(),
            delegated: best.delegated,
        };
        tree.cache.put(oid.clone(), entry.clone());
        Some(entry)
    }

    /// Find the registered subtree whose start is the lexicographically
    /// smallest one strictly greater than `oid`, the subtree a GETNEXT
    /// should move into once the current handler reports end-of-subtree.
    pub fn lookup_next(&self, context: &str, oid: &Oid) -> Option<(Oid, HandlerEntry)> {
        let contexts = self.contexts.read().unwrap();
        let tree = contexts.get(context)?;
        tree.subtrees
            .iter()
            .filter(|s| &s.start > oid)
            .min_by_key(|s| (s.start.clone(), s.priority))
            .map(|s| {
                (
                    s.start.clone(),
                    HandlerEntry {
                        handler: s.handler.clone(),
                        prefix: s.start.clone(),
                        delegated: s.delegated,
                    },
                )
            })
    }

    /// Mark every registration owned by `prefix` (in every context) as
    /// delegated to a subagent, used when an AgentX `Register` claims a
    /// subtree the master previously served locally.
    pub fn set_delegated(&self, context: &str, oid: &Oid, delegated: bool) -> Result<()> {
        let mut contexts = self.contexts.write().unwrap();
        let tree = contexts
            .get_mut(context)
            .ok_or_else(|| Error::UnknownRegistration { oid: oid.clone() })?;
        let entry = tree
            .subtrees
            .iter_mut()
            .find(|s| &s.start == oid)
            .ok_or_else(|| Error::UnknownRegistration { oid: oid.clone() })?;
        entry.delegated = delegated;
        tree.cache.invalidate();
        Ok(())
    }

    /// Number of registrations currently held across all contexts (test/
    /// diagnostic helper).
    pub fn len(&self) -> usize {
        self.contexts
            .read()
            .unwrap()
            .values()
            .map(|t| t.subtrees.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{BoxFuture, GetNextResult, GetResult, RequestContext};
    use crate::oid;
    use crate::value::Value;

    struct Stub(i32);
    impl MibHandler for Stub {
        fn get<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid) -> BoxFuture<'a, GetResult> {
            Box::pin(async move { GetResult::Value(Value::Integer(self.0)) })
        }
        fn get_next<'a>(
            &'a self,
            _ctx: &'a RequestContext,
            _oid: &'a Oid,
        ) -> BoxFuture<'a, GetNextResult> {
            Box::pin(async { GetNextResult::EndOfMibView })
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let reg = Registry::new();
        reg.register("", oid!(1, 3, 6, 1, 4, 1, 1), 127, Arc::new(Stub(1)))
            .unwrap();
        let entry = reg.lookup("", &oid!(1, 3, 6, 1, 4, 1, 1, 0)).unwrap();
        assert_eq!(entry.prefix, oid!(1, 3, 6, 1, 4, 1, 1));
        assert!(reg.lookup("", &oid!(1, 3, 6, 1, 4, 1, 2)).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let reg = Registry::new();
        reg.register("", oid!(1, 3, 6, 1), 127, Arc::new(Stub(1)))
            .unwrap();
        let err = reg
            .register("", oid!(1, 3, 6, 1), 127, Arc::new(Stub(2)))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration { .. }));
    }

    #[test]
    fn test_priority_precedence() {
        let reg = Registry::new();
        reg.register("", oid!(1, 3, 6, 1), 200, Arc::new(Stub(1)))
            .unwrap();
        reg.register("", oid!(1, 3, 6, 1), 10, Arc::new(Stub(2)))
            .unwrap();
        let entry = reg.lookup("", &oid!(1, 3, 6, 1, 5)).unwrap();
        // lower priority number wins
        let ctx = RequestContext::for_test();
        let result = futures::executor::block_on(entry.handler.get(&ctx, &oid!(1, 3, 6, 1, 5)));
        assert_eq!(result, GetResult::Value(Value::Integer(2)));
    }

    #[test]
    fn test_unregister_removes_entry() {
        let reg = Registry::new();
        reg.register("", oid!(1, 3, 6, 1), 127, Arc::new(Stub(1)))
            .unwrap();
        reg.unregister("", &oid!(1, 3, 6, 1)).unwrap();
        assert!(reg.lookup("", &oid!(1, 3, 6, 1, 0)).is_none());
    }

    #[test]
    fn test_lookup_next_finds_following_subtree() {
        let reg = Registry::new();
        reg.register("", oid!(1, 3, 6, 1, 2), 127, Arc::new(Stub(1)))
            .unwrap();
        reg.register("", oid!(1, 3, 6, 1, 4), 127, Arc::new(Stub(2)))
            .unwrap();
        let (next, _) = reg.lookup_next("", &oid!(1, 3, 6, 1, 2, 99)).unwrap();
        assert_eq!(next, oid!(1, 3, 6, 1, 4));
    }

    #[test]
    fn test_contexts_are_isolated() {
        let reg = Registry::new();
        reg.register("ctx-a", oid!(1, 3, 6, 1), 127, Arc::new(Stub(1)))
            .unwrap();
        assert!(reg.lookup("ctx-b", &oid!(1, 3, 6, 1, 0)).is_none());
    }
}
