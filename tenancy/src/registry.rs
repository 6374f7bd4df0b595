//! Shared set of subscribed tenant identifiers.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe set of subscribed tenant identifiers.
///
/// Written by the subscription listener's callbacks, read by the
/// background processor and the HTTP handlers. Cloning the handle is
/// cheap and shares the underlying set.
///
/// Membership reflects the last successfully applied poll diff and may be
/// transiently stale between polls.
#[derive(Clone, Default)]
pub struct TenantRegistry {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl TenantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tenant. Idempotent; returns `true` if it was new.
    pub fn add(&self, tenant: &str) -> bool {
        self.inner.write().insert(tenant.to_string())
    }

    /// Remove a tenant. Idempotent; returns `true` if it was present.
    pub fn remove(&self, tenant: &str) -> bool {
        self.inner.write().remove(tenant)
    }

    /// Apply a whole poll diff under a single write guard.
    ///
    /// Readers never observe the removals without the additions of the
    /// same poll.
    pub fn apply(&self, diff: &TenantDiff) {
        let mut set = self.inner.write();
        for tenant in &diff.removed {
            set.remove(tenant);
        }
        for tenant in &diff.added {
            set.insert(tenant.clone());
        }
    }

    /// Point-in-time copy, safe to iterate during slow per-tenant work
    /// without holding the lock.
    pub fn snapshot(&self) -> HashSet<String> {
        self.inner.read().clone()
    }

    /// Whether the tenant is currently a known subscriber.
    pub fn contains(&self, tenant: &str) -> bool {
        self.inner.read().contains(tenant)
    }

    /// Number of known subscribers.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no tenant is subscribed.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Set difference between two successive subscriber polls.
///
/// Always computed from the previous poll's snapshot, never from the live
/// registry, so a poll diff is unaffected by concurrent registry writers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantDiff {
    /// Tenants present in the new poll but not the previous one.
    pub added: Vec<String>,
    /// Tenants present in the previous poll but absent from the new one.
    pub removed: Vec<String>,
}

impl TenantDiff {
    /// Diff two poll snapshots. Output order is lexicographic, which makes
    /// event dispatch deterministic.
    pub fn between(previous: &BTreeSet<String>, current: &BTreeSet<String>) -> Self {
        Self {
            added: current.difference(previous).cloned().collect(),
            removed: previous.difference(current).cloned().collect(),
        }
    }

    /// Whether the two polls were identical.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
