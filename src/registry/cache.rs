//! Per-context lookup cache.
//!
//! Registry lookups are on the hot path for every inbound varbind, and a
//! walk typically re-queries OIDs that differ only in their last arc from
//! the previous query. A small bounded cache of recent exact-match results
//! avoids re-scanning the subtree list for repeat traffic; any registration
//! change in the context invalidates the whole cache rather than tracking
//! per-entry dependencies, since registration changes are rare compared to
//! lookups.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::oid::Oid;

use super::subtree::HandlerEntry;

/// Bounded circular buffer of `(queried OID, result)` pairs, sized 0..32
/// per the registry's per-context cache budget.
pub struct LookupCache {
    capacity: usize,
    entries: Mutex<VecDeque<(Oid, HandlerEntry)>>,
}

impl LookupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.min(32),
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(32))),
        }
    }

    pub fn get(&self, oid: &Oid) -> Option<HandlerEntry> {
        if self.capacity == 0 {
            return None;
        }
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(cached_oid, _)| cached_oid == oid)
            .map(|(_, entry)| entry.clone())
    }

    pub fn put(&self, oid: Oid, entry: HandlerEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back((oid, entry));
    }

    pub fn invalidate(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{BoxFuture, GetNextResult, GetResult, MibHandler, RequestContext};
    use crate::oid;
    use crate::oid::Oid;
    use std::sync::Arc;

    struct Stub;
    impl MibHandler for Stub {
        fn get<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid) -> BoxFuture<'a, GetResult> {
            Box::pin(async { GetResult::NoSuchObject })
        }
        fn get_next<'a>(
            &'a self,
            _ctx: &'a RequestContext,
            _oid: &'a Oid,
        ) -> BoxFuture<'a, GetNextResult> {
            Box::pin(async { GetNextResult::EndOfMibView })
        }
    }

    fn entry() -> HandlerEntry {
        HandlerEntry {
            handler: Arc::new(Stub),
            prefix: oid!(1, 3, 6, 1),
            delegated: false,
        }
    }

    #[test]
    fn test_cache_hit_and_invalidate() {
        let cache = LookupCache::new(4);
        let o = oid!(1, 3, 6, 1, 1);
        cache.put(o.clone(), entry());
        assert!(cache.get(&o).is_some());
        cache.invalidate();
        assert!(cache.get(&o).is_none());
    }

    #[test]
    fn test_cache_evicts_oldest_when_full() {
        let cache = LookupCache::new(2);
        cache.put(oid!(1, 1), entry());
        cache.put(oid!(1, 2), entry());
        cache.put(oid!(1, 3), entry());
        assert!(cache.get(&oid!(1, 1)).is_none());
        assert!(cache.get(&oid!(1, 3)).is_some());
    }

    #[test]
    fn test_zero_capacity_never_caches() {
        let cache = LookupCache::new(0);
        cache.put(oid!(1, 1), entry());
        assert!(cache.get(&oid!(1, 1)).is_none());
    }
}
