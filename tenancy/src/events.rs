//! Subscription events and callback dispatch.

use std::sync::Arc;

use crate::registry::TenantDiff;

/// A change in the platform's subscriber list, derived by diffing two
/// successive polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// Tenant newly present in the latest poll.
    Added(String),
    /// Tenant newly absent from the latest poll.
    Removed(String),
}

impl SubscriptionEvent {
    /// The tenant identifier the event refers to.
    pub fn tenant(&self) -> &str {
        match self {
            Self::Added(t) | Self::Removed(t) => t,
        }
    }
}

type CallbackFn = Arc<dyn Fn(&str) + Send + Sync>;
type DiffFn = Arc<dyn Fn(&TenantDiff) + Send + Sync>;

struct Callback {
    f: CallbackFn,
    blocking: bool,
}

struct DiffCallback {
    f: DiffFn,
    blocking: bool,
}

/// Ordered callback lists for poll diffs and added/removed events.
///
/// Diff callbacks receive each poll's whole [`TenantDiff`] and run before
/// the per-event callbacks of the same poll; a registry kept via
/// `TenantRegistry::apply` in a blocking diff callback is therefore never
/// observable in a half-applied state. All callbacks run in registration
/// order. A blocking callback completes before the poll cycle continues;
/// a non-blocking one is spawned onto the runtime and its ordering
/// relative to subsequent polls is not guaranteed.
#[derive(Default)]
pub struct Callbacks {
    diff: Vec<DiffCallback>,
    added: Vec<Callback>,
    removed: Vec<Callback>,
}

impl Callbacks {
    /// Register a callback for each poll's whole diff.
    pub fn on_diff<F>(&mut self, blocking: bool, f: F)
    where
        F: Fn(&TenantDiff) + Send + Sync + 'static,
    {
        self.diff.push(DiffCallback { f: Arc::new(f), blocking });
    }

    /// Register a callback for [`SubscriptionEvent::Added`].
    pub fn on_added<F>(&mut self, blocking: bool, f: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.added.push(Callback { f: Arc::new(f), blocking });
    }

    /// Register a callback for [`SubscriptionEvent::Removed`].
    pub fn on_removed<F>(&mut self, blocking: bool, f: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.removed.push(Callback { f: Arc::new(f), blocking });
    }

    /// Dispatch one poll's diff to the diff callback list.
    pub fn dispatch_diff(&self, diff: &TenantDiff) {
        for callback in &self.diff {
            if callback.blocking {
                (callback.f)(diff);
            } else {
                let f = callback.f.clone();
                let diff = diff.clone();
                tokio::spawn(async move { f(&diff) });
            }
        }
    }

    /// Dispatch one event to its callback list.
    pub fn dispatch(&self, event: &SubscriptionEvent) {
        let (list, tenant) = match event {
            SubscriptionEvent::Added(t) => (&self.added, t),
            SubscriptionEvent::Removed(t) => (&self.removed, t),
        };
        for callback in list {
            if callback.blocking {
                (callback.f)(tenant);
            } else {
                let f = callback.f.clone();
                let tenant = tenant.clone();
                tokio::spawn(async move { f(&tenant) });
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.diff.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}
