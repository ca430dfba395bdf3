//! A single registered subtree and the handle returned from a lookup.

use std::sync::Arc;

use crate::handler::MibHandler;
use crate::oid::Oid;

/// One registration: `handler` owns every OID in `context` starting at
/// `start`, at `priority`. Overlapping registrations at different
/// priorities are kept as separate [`Subtree`] entries in the same
/// [`super::Registry`] context rather than as an explicit parent/child
/// pointer chain; [`super::Registry::lookup`] resolves precedence at query
/// time by scanning matching entries for the lowest priority.
#[derive(Clone)]
pub struct Subtree {
    pub start: Oid,
    pub priority: u8,
    pub context: String,
    pub handler: Arc<dyn MibHandler>,
    /// Set once an AgentX `Register` has claimed this subtree on behalf of
    /// a subagent; the dispatcher forwards rather than calling the handler
    /// directly.
    pub delegated: bool,
}

impl std::fmt::Debug for Subtree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subtree")
            .field("start", &self.start)
            .field("priority", &self.priority)
            .field("context", &self.context)
            .field("delegated", &self.delegated)
            .finish_non_exhaustive()
    }
}

/// What [`super::Registry::lookup`] returns: the matched handler plus
/// enough of the registration's metadata for the dispatcher to act on.
#[derive(Clone)]
pub struct HandlerEntry {
    pub handler: Arc<dyn MibHandler>,
    pub prefix: Oid,
    pub delegated: bool,
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("prefix", &self.prefix)
            .field("delegated", &self.delegated)
            .finish_non_exhaustive()
    }
}
