//! Tenant subscription tracking for multi-tenant microservices.
//!
//! The platform is the source of truth for which tenants have subscribed
//! to a microservice. This crate keeps an in-memory [`TenantRegistry`]
//! eventually consistent with that list: a [`SubscriptionListener`]
//! periodically polls a [`SubscriptionSource`], diffs the result against
//! the previous poll and dispatches [`SubscriptionEvent`]s to registered
//! callbacks.
//!
//! Nothing here is persisted; the registry is rebuilt from the platform's
//! live subscriber list whenever the process restarts.

#![warn(missing_docs)]

pub mod events;
pub mod listener;
pub mod registry;

pub use events::{Callbacks, SubscriptionEvent};
pub use listener::{ListenerHandle, SourceError, SubscriptionListener, SubscriptionSource};
pub use registry::{TenantDiff, TenantRegistry};
