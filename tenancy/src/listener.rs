//! Periodic subscription polling.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::events::{Callbacks, SubscriptionEvent};
use crate::registry::TenantDiff;

/// Error produced by a [`SubscriptionSource`] poll.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can report the current set of subscribed tenants.
///
/// In production this is the platform's subscription endpoint; tests use
/// scripted sources.
#[async_trait]
pub trait SubscriptionSource: Send + Sync + 'static {
    /// Fetch the live subscriber set from the platform.
    async fn subscribed_tenants(&self) -> Result<BTreeSet<String>, SourceError>;
}

/// Default polling interval in seconds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Polls a [`SubscriptionSource`] at a fixed interval and dispatches each
/// poll's whole [`TenantDiff`] followed by [`SubscriptionEvent`]s for
/// every change between successive polls.
///
/// The diff is always computed against the previous poll's snapshot, not
/// against any registry the callbacks may maintain, so concurrent registry
/// mutation cannot skew it. A failed poll keeps the last successful
/// snapshot authoritative; no events are emitted for it.
pub struct SubscriptionListener<S: SubscriptionSource> {
    source: Arc<S>,
    interval: Duration,
    callbacks: Callbacks,
}

impl<S: SubscriptionSource> SubscriptionListener<S> {
    /// Create a listener with the default 60s interval.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            interval: DEFAULT_POLL_INTERVAL,
            callbacks: Callbacks::default(),
        }
    }

    /// Override the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Register a callback for each poll's whole diff.
    ///
    /// Diff callbacks run before the per-event callbacks of the same poll;
    /// keeping a registry with `TenantRegistry::apply` here means readers
    /// never observe a poll's removals without its additions.
    pub fn on_diff<F>(&mut self, blocking: bool, f: F)
    where
        F: Fn(&TenantDiff) + Send + Sync + 'static,
    {
        self.callbacks.on_diff(blocking, f);
    }

    /// Register a callback for newly subscribed tenants.
    pub fn on_added<F>(&mut self, blocking: bool, f: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_added(blocking, f);
    }

    /// Register a callback for unsubscribed tenants.
    pub fn on_removed<F>(&mut self, blocking: bool, f: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_removed(blocking, f);
    }

    /// Perform the seeding poll, then spawn the polling loop.
    ///
    /// Every tenant present in the seed poll is dispatched as an `Added`
    /// event before this returns, so callers observe a seeded registry
    /// once startup succeeds. A failing seed poll is a startup error.
    pub async fn start(self) -> Result<ListenerHandle, SourceError> {
        if self.callbacks.is_empty() {
            tracing::warn!("subscription listener started without callbacks");
        }

        let seed = self.source.subscribed_tenants().await?;
        let seed_diff = TenantDiff::between(&BTreeSet::new(), &seed);
        if !seed_diff.is_empty() {
            self.callbacks.dispatch_diff(&seed_diff);
        }
        for tenant in &seed {
            self.callbacks
                .dispatch(&SubscriptionEvent::Added(tenant.clone()));
        }
        tracing::info!(subscribers = seed.len(), "subscription listener seeded");

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let Self { source, interval, callbacks } = self;

        let task = tokio::spawn(async move {
            let mut previous = seed;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; the seed poll covered it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => break,
                }

                // A stop signal arriving from here on is observed only
                // after the poll and its diff are fully dispatched.
                match source.subscribed_tenants().await {
                    Ok(current) => {
                        let diff = TenantDiff::between(&previous, &current);
                        if !diff.is_empty() {
                            tracing::info!(
                                added = diff.added.len(),
                                removed = diff.removed.len(),
                                "subscriber list changed"
                            );
                            callbacks.dispatch_diff(&diff);
                        }
                        for tenant in &diff.removed {
                            callbacks.dispatch(&SubscriptionEvent::Removed(tenant.clone()));
                        }
                        for tenant in &diff.added {
                            callbacks.dispatch(&SubscriptionEvent::Added(tenant.clone()));
                        }
                        previous = current;
                    }
                    Err(err) => {
                        // Last successful snapshot stays authoritative.
                        tracing::warn!("subscription poll failed: {err}");
                    }
                }
            }
            tracing::info!("subscription listener stopped");
        });

        Ok(ListenerHandle { stop: stop_tx, task })
    }
}

/// Handle to a running listener (or other periodic worker) task.
pub struct ListenerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Wrap an externally spawned worker that honors `stop` between
    /// iterations. Used by the background sweep, which shares this
    /// lifecycle.
    pub fn from_parts(stop: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self { stop, task }
    }

    /// Signal the loop to exit. An in-flight poll completes first.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Stop and wait for the task, optionally bounded.
    ///
    /// Returns `false` if the timeout elapsed before the task finished.
    pub async fn shutdown(self, timeout: Option<Duration>) -> bool {
        self.stop();
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.task).await.is_ok(),
            None => {
                let _ = self.task.await;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TenantRegistry;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Source that replays a script of poll results, holding the last one.
    struct ScriptedSource {
        polls: Mutex<VecDeque<Result<BTreeSet<String>, String>>>,
        delay: Duration,
        polled: AtomicBool,
    }

    impl ScriptedSource {
        fn new(polls: Vec<Result<BTreeSet<String>, String>>) -> Self {
            Self {
                polls: Mutex::new(polls.into()),
                delay: Duration::ZERO,
                polled: AtomicBool::new(false),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl SubscriptionSource for ScriptedSource {
        async fn subscribed_tenants(&self) -> Result<BTreeSet<String>, SourceError> {
            let next = {
                let mut polls = self.polls.lock();
                if polls.len() > 1 {
                    polls.pop_front().unwrap()
                } else {
                    polls.front().cloned().unwrap()
                }
            };
            self.polled.store(true, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            next.map_err(|e| e.into())
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn wire_registry(listener: &mut SubscriptionListener<ScriptedSource>) -> TenantRegistry {
        let registry = TenantRegistry::new();
        let r = registry.clone();
        listener.on_diff(true, move |diff| r.apply(diff));
        registry
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..500 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_seed_poll_dispatches_added_events() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(set(&["A", "B"]))]));
        let mut listener =
            SubscriptionListener::new(source).with_interval(Duration::from_secs(3600));
        let registry = wire_registry(&mut listener);

        let handle = listener.start().await.unwrap();
        // Registry is seeded before start() returns.
        assert!(registry.contains("A"));
        assert!(registry.contains("B"));
        assert_eq!(registry.len(), 2);

        assert!(handle.shutdown(Some(Duration::from_secs(1))).await);
    }

    #[tokio::test]
    async fn test_failing_seed_poll_is_a_startup_error() {
        let source = Arc::new(ScriptedSource::new(vec![Err("boom".into())]));
        let listener = SubscriptionListener::new(source);
        assert!(listener.start().await.is_err());
    }

    #[tokio::test]
    async fn test_poll_diff_adds_and_removes() {
        let events: Arc<Mutex<Vec<SubscriptionEvent>>> = Arc::default();
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(set(&["A", "B"])),
            Ok(set(&["B", "C"])),
        ]));
        let mut listener =
            SubscriptionListener::new(source).with_interval(Duration::from_millis(10));
        let registry = wire_registry(&mut listener);
        {
            let events = events.clone();
            listener.on_added(true, move |t| {
                events.lock().push(SubscriptionEvent::Added(t.into()));
            });
        }
        {
            let events = events.clone();
            listener.on_removed(true, move |t| {
                events.lock().push(SubscriptionEvent::Removed(t.into()));
            });
        }

        let handle = listener.start().await.unwrap();
        {
            let registry = registry.clone();
            wait_until(move || registry.contains("C")).await;
        }
        handle.shutdown(None).await;

        assert_eq!(registry.snapshot(), set(&["B", "C"]).into_iter().collect());
        let events = events.lock();
        // Seed: Added(A), Added(B). Second poll: Removed(A) before Added(C).
        assert_eq!(events[0], SubscriptionEvent::Added("A".into()));
        assert_eq!(events[1], SubscriptionEvent::Added("B".into()));
        assert_eq!(events[2], SubscriptionEvent::Removed("A".into()));
        assert_eq!(events[3], SubscriptionEvent::Added("C".into()));
    }

    #[tokio::test]
    async fn test_whole_diff_is_applied_before_event_dispatch() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(set(&["A", "B"])),
            Ok(set(&["B", "C"])),
        ]));
        let mut listener =
            SubscriptionListener::new(source).with_interval(Duration::from_millis(10));
        let registry = wire_registry(&mut listener);

        // By the time any per-event callback fires, the registry already
        // holds the poll's full diff: additions present, removals gone.
        let observations: Arc<Mutex<Vec<(String, bool, bool)>>> = Arc::default();
        {
            let registry = registry.clone();
            let observations = observations.clone();
            listener.on_removed(true, move |t| {
                observations
                    .lock()
                    .push((t.to_string(), registry.contains("C"), registry.contains("A")));
            });
        }

        let handle = listener.start().await.unwrap();
        {
            let registry = registry.clone();
            wait_until(move || registry.contains("C")).await;
        }
        handle.shutdown(None).await;

        let observations = observations.lock();
        assert_eq!(
            *observations,
            vec![("A".to_string(), true, false)],
            "Removed(A) fired with C already added and A already removed"
        );
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_last_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(set(&["A", "B"])),
            Err("network down".into()),
            Ok(set(&["A", "B"])),
        ]));
        let mut listener =
            SubscriptionListener::new(source).with_interval(Duration::from_millis(10));
        let registry = wire_registry(&mut listener);
        let removals = Arc::new(Mutex::new(0u32));
        {
            let removals = removals.clone();
            listener.on_removed(true, move |_| *removals.lock() += 1);
        }

        let handle = listener.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.shutdown(None).await;

        // The failed poll emitted no spurious Removed events.
        assert_eq!(*removals.lock(), 0);
        assert_eq!(registry.snapshot(), set(&["A", "B"]).into_iter().collect());
    }

    #[tokio::test]
    async fn test_stop_during_inflight_poll_applies_full_diff() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(set(&["A", "B"])), Ok(set(&["B", "C"]))])
                .with_delay(Duration::from_millis(50)),
        );
        let mut listener = SubscriptionListener::new(source.clone())
            .with_interval(Duration::from_millis(10));
        let registry = wire_registry(&mut listener);

        let handle = listener.start().await.unwrap();
        source.polled.store(false, Ordering::SeqCst); // seed poll is done

        // Wait for the next poll to start, then stop mid-flight.
        {
            let source = source.clone();
            wait_until(move || source.polled.load(Ordering::SeqCst)).await;
        }
        handle.stop();
        assert!(handle.shutdown(Some(Duration::from_secs(2))).await);

        // The in-flight diff was fully applied before the loop exited.
        assert_eq!(registry.snapshot(), set(&["B", "C"]).into_iter().collect());
    }
}
