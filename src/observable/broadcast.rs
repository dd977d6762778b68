//! # Broadcaster: one upstream subscription shared by many targets.
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//! upstream ─recv─►│ pump (one task per connection/generation) │
//!                 └───────────────┬──────────────────────────┘
//!                                 ▼ fan_out(n): snapshot live targets
//!                  FuturesUnordered { t1.notify(n), t2.notify(n), ... }
//!                                 │ wait for every delivery, then prune
//!                                 ▼
//!                          next upstream notification
//! ```
//!
//! ## Rules
//! - One upstream notification at a time; every live target receives it before
//!   the pump reads the next one. Slow targets delay the others, never lose data.
//! - Each delivery races against that target's own cancellation, so a target
//!   that leaves is never waited on.
//! - Targets are primed with `Start` on subscribe; upstream `Start` is swallowed.
//! - Upstream completion (or error) is latched before it reaches the targets:
//!   later subscribers get `Start` + `Complete`, whatever the teardown policy.
//! - Target set lives behind a `parking_lot::RwLock` that is never held
//!   across an await; targets only touch it through their removal hook.
//!
//! ## Teardown
//! - [`Teardown::KeepAlive`]: upstream stays connected until the last
//!   `Observable` handle is dropped and no target is left.
//! - [`Teardown::WhenEmpty`]: the last target leaving disconnects upstream and
//!   bumps the generation; the next subscriber reconnects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use parking_lot::RwLock;

use crate::config::Config;
use crate::notification::{Notification, Value};
use crate::observable::{Observable, Subscribe};
use crate::policies::Teardown;
use crate::subscription::feed::{self, ErrorMode};
use crate::subscription::{Subscriber, Subscription, SubscriptionRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Completed,
}

struct State<T> {
    phase: Phase,
    targets: HashMap<u64, Subscriber<T>>,
    connection: Option<SubscriptionRef>,
    generation: u64,
    /// Every `Observable` handle to this broadcaster is gone.
    detached: bool,
}

impl<T> State<T> {
    /// Latches the current connection as finished and hands back its targets.
    fn latch(&mut self) -> (Option<SubscriptionRef>, HashMap<u64, Subscriber<T>>) {
        self.phase = Phase::Completed;
        self.generation += 1;
        (self.connection.take(), std::mem::take(&mut self.targets))
    }
}

struct Inner<T> {
    upstream: Observable<T>,
    config: Config,
    next_id: AtomicU64,
    state: RwLock<State<T>>,
}

/// Multicast node returned by [`Observable::publish`].
///
/// Live targets keep the broadcaster running: dropping the last `Observable`
/// handle disconnects upstream only once no target is left.
pub(crate) struct Published<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Value> Published<T> {
    pub(crate) fn new(upstream: Observable<T>, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                upstream,
                config,
                next_id: AtomicU64::new(0),
                state: RwLock::new(State {
                    phase: Phase::Idle,
                    targets: HashMap::new(),
                    connection: None,
                    generation: 0,
                    detached: false,
                }),
            }),
        }
    }
}

impl<T: Value> Subscribe<T> for Published<T> {
    fn subscribe(&self) -> Subscription<T> {
        let (target, subscription) = feed::channel(&self.inner.config, ErrorMode::Mangle);
        target.prime(Notification::Start);

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut state = self.inner.state.write();
            let phase = state.phase;
            match phase {
                Phase::Completed => {
                    drop(state);
                    tokio::spawn(async move {
                        target.complete().await;
                    });
                    return subscription;
                }
                Phase::Idle => {
                    state.targets.insert(id, target.clone());
                    self.inner.connect(&mut state);
                }
                Phase::Running => {
                    state.targets.insert(id, target.clone());
                }
            }
        }

        // The target keeps the broadcaster alive until it leaves.
        let inner = Arc::clone(&self.inner);
        target.add(move || inner.remove(id));
        subscription
    }

    fn connect(&self) {
        let mut state = self.inner.state.write();
        if state.phase == Phase::Idle {
            self.inner.connect(&mut state);
        }
    }
}

impl<T> Drop for Published<T> {
    fn drop(&mut self) {
        let released = {
            let mut state = self.inner.state.write();
            state.detached = true;
            if state.targets.is_empty() {
                Some(state.latch())
            } else {
                None
            }
        };
        match released {
            Some((connection, _)) => {
                tracing::debug!("broadcaster dropped; disconnecting");
                if let Some(connection) = connection {
                    connection.unsubscribe();
                }
            }
            None => tracing::debug!("broadcaster detached; running until its targets leave"),
        }
    }
}

impl<T: Value> Inner<T> {
    /// Subscribes upstream and starts a pump tagged with a fresh generation.
    fn connect(self: &Arc<Self>, state: &mut State<T>) {
        state.generation += 1;
        state.phase = Phase::Running;

        let upstream = self.upstream.subscribe();
        state.connection = Some(upstream.handle());

        let generation = state.generation;
        tokio::spawn(pump(Arc::downgrade(self), upstream, generation));
        tracing::debug!(generation, "broadcaster connected");
    }

    /// Delivers `n` to every live target. Returns `false` once `generation` is stale.
    async fn fan_out(&self, generation: u64, n: Notification<T>) -> bool {
        let targets: Vec<Subscriber<T>> = {
            let state = self.state.read();
            if state.generation != generation || state.phase != Phase::Running {
                return false;
            }
            state
                .targets
                .values()
                .filter(|t| t.is_subscribed())
                .cloned()
                .collect()
        };

        let mut deliveries: FuturesUnordered<_> =
            targets.iter().map(|t| t.notify(n.clone())).collect();
        while deliveries.next().await.is_some() {}
        drop(deliveries);

        self.prune();
        true
    }

    fn prune(&self) {
        let mut state = self.state.write();
        let before = state.targets.len();
        state.targets.retain(|_, t| t.is_subscribed());
        let pruned = before - state.targets.len();
        if pruned > 0 {
            tracing::trace!(pruned, "pruned cancelled targets");
        }
    }

    /// Removal hook of one target.
    fn remove(&self, id: u64) {
        let released = {
            let mut state = self.state.write();
            state.targets.remove(&id);
            if !state.targets.is_empty() || state.phase != Phase::Running {
                None
            } else if state.detached {
                state.latch().0
            } else if self.config.teardown == Teardown::WhenEmpty {
                state.phase = Phase::Idle;
                state.generation += 1;
                state.connection.take()
            } else {
                None
            }
        };
        if let Some(connection) = released {
            tracing::debug!("last target left; releasing upstream");
            connection.unsubscribe();
        }
    }

    /// Upstream ended with `Complete` (or `Error`): latch, then hand the terminal
    /// notification to every target of this generation.
    async fn finish(&self, generation: u64, last: Notification<T>) {
        let targets = {
            let mut state = self.state.write();
            if state.generation != generation || state.phase != Phase::Running {
                return;
            }
            state.latch().1
        };
        tracing::debug!(
            generation,
            targets = targets.len(),
            kind = last.kind().as_label(),
            "upstream ended"
        );

        let mut deliveries: FuturesUnordered<_> = targets
            .values()
            .map(|t| t.notify(last.clone()))
            .collect();
        // Targets mangle `Error` into `Error` + `Complete`.
        while deliveries.next().await.is_some() {}
    }
}

async fn pump<T: Value>(inner: Weak<Inner<T>>, mut upstream: Subscription<T>, generation: u64) {
    let mut last = Notification::Complete;
    while let Some(n) = upstream.recv().await {
        match n {
            Notification::Start => continue,
            Notification::Complete => break,
            Notification::Error(cause) => {
                last = Notification::Error(cause);
                break;
            }
            n @ Notification::Next(_) => {
                let Some(inner) = inner.upgrade() else { return };
                if !inner.fan_out(generation, n).await {
                    return;
                }
            }
        }
    }
    if let Some(inner) = inner.upgrade() {
        inner.finish(generation, last).await;
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StreamError;
    use crate::policies::Teardown;
    use crate::{Config, Notification, Observable, Subscriber, Subscription, SubscriptionRef};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio::time::timeout;

    async fn drain<T: crate::Value>(mut sub: Subscription<T>) -> Vec<Notification<T>> {
        let mut out = Vec::new();
        while let Some(n) = timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("stream stalled")
        {
            out.push(n);
        }
        out
    }

    /// Source that waits for `gate` before emitting `0..count`.
    fn gated(count: u32, gate: Arc<Barrier>) -> Observable<u32> {
        Observable::create(move |sub: Subscriber<u32>| {
            let gate = Arc::clone(&gate);
            async move {
                gate.wait().await;
                for i in 0..count {
                    if !sub.next(i).await {
                        return;
                    }
                }
                sub.complete().await;
            }
        })
    }

    #[tokio::test]
    async fn test_twenty_targets_see_identical_sequence() {
        let gate = Arc::new(Barrier::new(2));
        let published = gated(5, Arc::clone(&gate)).publish();

        let subs: Vec<_> = (0..20).map(|_| published.subscribe()).collect();
        gate.wait().await;

        let all = futures::future::join_all(subs.into_iter().map(drain)).await;
        let mut want = vec![Notification::Start];
        want.extend((0..5).map(Notification::Next));
        want.push(Notification::Complete);
        for got in all {
            assert_eq!(got, want);
        }
    }

    #[tokio::test]
    async fn test_leaving_target_does_not_disturb_others() {
        let gate = Arc::new(Barrier::new(2));
        let published = gated(5, Arc::clone(&gate)).publish();

        let mut quitter = published.subscribe();
        let stayer = published.subscribe();
        gate.wait().await;

        let stayer = tokio::spawn(drain(stayer));
        assert_eq!(quitter.recv().await, Some(Notification::Start));
        assert_eq!(quitter.recv().await, Some(Notification::Next(0)));
        assert_eq!(quitter.recv().await, Some(Notification::Next(1)));
        quitter.unsubscribe();
        assert_eq!(quitter.recv().await, Some(Notification::Complete));
        assert_eq!(quitter.recv().await, None);

        let values: Vec<u32> = stayer
            .await
            .unwrap()
            .into_iter()
            .filter_map(Notification::into_value)
            .collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_upstream_subscribed_once() {
        let subscribes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&subscribes);
        let gate = Arc::new(Barrier::new(2));
        let source_gate = Arc::clone(&gate);
        let published = Observable::create(move |sub: Subscriber<u32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            let gate = Arc::clone(&source_gate);
            async move {
                gate.wait().await;
                sub.next(7).await;
            }
        })
        .publish();

        let a = published.subscribe();
        let b = published.subscribe();
        gate.wait().await;
        let (a, b) = tokio::join!(drain(a), drain(b));
        assert_eq!(a, b);
        assert_eq!(subscribes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_reaches_every_target_then_complete() {
        let gate = Arc::new(Barrier::new(2));
        let source_gate = Arc::clone(&gate);
        let published = Observable::create(move |sub: Subscriber<u32>| {
            let gate = Arc::clone(&source_gate);
            async move {
                gate.wait().await;
                sub.next(1).await;
                sub.error(StreamError::fail("boom")).await;
            }
        })
        .publish();

        let subs: Vec<_> = (0..3).map(|_| published.subscribe()).collect();
        gate.wait().await;
        for got in futures::future::join_all(subs.into_iter().map(drain)).await {
            assert_eq!(
                got,
                vec![
                    Notification::Start,
                    Notification::Next(1),
                    Notification::Error(StreamError::fail("boom")),
                    Notification::Complete
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_late_subscriber_after_completion_is_empty() {
        let published = Observable::from_iter(vec![1u32, 2]).publish();
        let first = drain(published.subscribe()).await;
        assert_eq!(first.len(), 4);

        let late = drain(published.subscribe()).await;
        assert_eq!(late, vec![Notification::Start, Notification::Complete]);
    }

    #[tokio::test]
    async fn test_when_empty_reconnects_upstream() {
        let subscribes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&subscribes);
        let published = Observable::create(move |sub: Subscriber<u32>| {
            let round = counter.fetch_add(1, Ordering::SeqCst) as u32;
            async move {
                sub.next(round).await;
                std::future::pending::<()>().await;
            }
        })
        .with_config(Config::default().with_teardown(Teardown::WhenEmpty))
        .publish();

        let mut first = published.subscribe();
        assert_eq!(first.recv().await, Some(Notification::Start));
        assert_eq!(first.recv().await, Some(Notification::Next(0)));
        drop(first);

        let mut second = published.subscribe();
        assert_eq!(second.recv().await, Some(Notification::Start));
        assert_eq!(
            timeout(Duration::from_secs(2), second.recv()).await.unwrap(),
            Some(Notification::Next(1))
        );
        assert_eq!(subscribes.load(Ordering::SeqCst), 2);
    }

    /// Source that records its upstream handle, emits `values`, then idles.
    fn recorded(values: Vec<u32>, slot: Arc<Mutex<Option<SubscriptionRef>>>) -> Observable<u32> {
        Observable::create(move |sub: Subscriber<u32>| {
            let slot = Arc::clone(&slot);
            let values = values.clone();
            async move {
                *slot.lock() = Some(sub.handle());
                for v in values {
                    if !sub.next(v).await {
                        return;
                    }
                }
                std::future::pending::<()>().await;
            }
        })
    }

    #[tokio::test]
    async fn test_dropped_handle_keeps_serving_live_targets() {
        let slot: Arc<Mutex<Option<SubscriptionRef>>> = Arc::default();
        let published = recorded(vec![1, 2], Arc::clone(&slot)).publish();

        let mut target = published.subscribe();
        assert_eq!(target.recv().await, Some(Notification::Start));
        assert_eq!(target.recv().await, Some(Notification::Next(1)));

        drop(published);
        assert_eq!(
            timeout(Duration::from_secs(2), target.recv()).await.unwrap(),
            Some(Notification::Next(2))
        );

        let upstream = slot.lock().clone().expect("upstream subscribed");
        assert!(upstream.is_subscribed());
        drop(target);
        assert!(!upstream.is_subscribed());
    }

    #[tokio::test]
    async fn test_dropping_idle_handle_disconnects_upstream() {
        let slot: Arc<Mutex<Option<SubscriptionRef>>> = Arc::default();
        let published = recorded(Vec::new(), Arc::clone(&slot)).publish();
        published.connect();

        let upstream = timeout(Duration::from_secs(1), async {
            loop {
                if let Some(handle) = slot.lock().clone() {
                    break handle;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("upstream must start on connect");

        drop(published);
        assert!(!upstream.is_subscribed());
    }

    #[tokio::test]
    async fn test_subscribe_through_temporary_publish() {
        let target = Observable::create(|sub: Subscriber<u32>| async move {
            for i in 0..3 {
                sub.next(i).await;
            }
        })
        .publish()
        .subscribe();

        let got = drain(target).await;
        let mut want = vec![Notification::Start];
        want.extend((0..3).map(Notification::Next));
        want.push(Notification::Complete);
        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn test_error_latches_even_when_empty_teardown() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let published = Observable::create(move |sub: Subscriber<u32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                sub.next(1).await;
                sub.error(StreamError::fail("boom")).await;
            }
        })
        .with_config(Config::default().with_teardown(Teardown::WhenEmpty))
        .publish();

        let first = drain(published.subscribe()).await;
        assert_eq!(
            first,
            vec![
                Notification::Start,
                Notification::Next(1),
                Notification::Error(StreamError::fail("boom")),
                Notification::Complete
            ]
        );

        let late = drain(published.subscribe()).await;
        assert_eq!(late, vec![Notification::Start, Notification::Complete]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_target_sees_same_sequence_as_fast_one() {
        let gate = Arc::new(Barrier::new(2));
        let published = gated(5, Arc::clone(&gate)).publish();

        let fast = published.subscribe();
        let mut slow = published.subscribe();
        gate.wait().await;

        let slow = async move {
            let mut out = Vec::new();
            while let Some(n) = slow.recv().await {
                tokio::time::sleep(Duration::from_millis(15)).await;
                out.push(n);
            }
            out
        };
        let (fast, slow) = tokio::join!(drain(fast), slow);
        assert_eq!(fast, slow);
        assert_eq!(fast.len(), 7);
    }

    #[tokio::test]
    async fn test_connect_starts_before_first_subscriber() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
        let published = Observable::create(move |_sub: Subscriber<u32>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(()).await;
                std::future::pending::<()>().await;
            }
        })
        .publish();

        published.connect();
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("upstream must start on connect");
    }
}
