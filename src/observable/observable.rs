//! # Observable handle.
//!
//! [`Observable`] is a cheap, clonable handle to one node of a stream graph:
//! a leaf source, a lifted stage, a broadcaster or a merge. Subscribing walks
//! upstream through the graph; every node owns its own feeds.
//!
//! ## Config inheritance
//! Derived nodes (`lift`, `map`, `filter`, `publish`, `merge_with`) inherit the
//! [`Config`] of the observable they are built from. [`Observable::with_config`]
//! changes what later derived nodes inherit without touching the node itself.
//!
//! ## Runtime
//! `subscribe`, `connect` and [`Subject`](crate::Subject) construction spawn
//! Tokio tasks and must be called from within a runtime.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::notification::Value;
use crate::observable::broadcast::Published;
use crate::observable::lift::Lift;
use crate::observable::merge::merge;
use crate::observable::source::{ChannelProducer, IterProducer, Source};
use crate::observable::{Operator, Producer, ProducerFn};
use crate::operators::{Filter, Map, Passthrough};
use crate::subscription::{Subscriber, Subscription};

/// A node that can hand out subscriptions.
pub(crate) trait Subscribe<T>: Send + Sync + 'static {
    fn subscribe(&self) -> Subscription<T>;

    /// Starts upstream delivery ahead of the first subscriber, where supported.
    fn connect(&self) {}
}

/// Handle to a stream of `T` values.
pub struct Observable<T> {
    source: Arc<dyn Subscribe<T>>,
    config: Config,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config,
        }
    }
}

impl<T: Value> Observable<T> {
    /// Creates a leaf observable from a producer closure, with default config.
    ///
    /// The closure runs once per subscribe. When its future returns without
    /// completing, `Complete` is delivered on its behalf.
    ///
    /// # Example
    /// ```rust
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use futures::StreamExt;
    /// use flowcast::Observable;
    ///
    /// let evens = Observable::create(|sub| async move {
    ///     for i in 0..10u32 {
    ///         if i % 2 == 0 && !sub.next(i).await {
    ///             return;
    ///         }
    ///     }
    /// });
    /// let got: Vec<u32> = evens.subscribe().values().collect().await;
    /// assert_eq!(got, vec![0, 2, 4, 6, 8]);
    /// # }
    /// ```
    pub fn create<F, Fut>(producer: F) -> Self
    where
        F: Fn(Subscriber<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::create_with(Config::default(), producer)
    }

    /// Creates a leaf observable from a producer closure with an explicit config.
    pub fn create_with<F, Fut>(config: Config, producer: F) -> Self
    where
        F: Fn(Subscriber<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::from_producer(config, ProducerFn::new(producer))
    }

    /// Creates a leaf observable from any [`Producer`].
    pub fn from_producer(config: Config, producer: impl Producer<T>) -> Self {
        Self::from_node(Source::new(Arc::new(producer), config), config)
    }

    /// Adapts a Tokio receiver.
    ///
    /// The stream completes when every sender is dropped. Unsubscribing closes
    /// the receiver. The receiver can only be drained once: later subscribers
    /// get an empty, completed stream.
    pub fn from_channel(rx: mpsc::Receiver<T>) -> Self {
        Self::from_producer(Config::default(), ChannelProducer::new(rx))
    }

    /// Subscribes, starting delivery.
    pub fn subscribe(&self) -> Subscription<T> {
        self.source.subscribe()
    }

    /// Inserts an operator stage.
    pub fn lift<U: Value>(&self, operator: impl Operator<T, U>) -> Observable<U> {
        let stage = Lift::new(self.clone(), Arc::new(operator), self.config);
        Observable::from_node(stage, self.config)
    }

    /// Shares one upstream subscription among all subscribers.
    ///
    /// Upstream is subscribed on the first subscribe (or [`connect`](Self::connect)).
    /// What happens when the last subscriber leaves is set by
    /// [`Config::teardown`].
    pub fn publish(&self) -> Observable<T> {
        Observable::from_node(Published::new(self.clone(), self.config), self.config)
    }

    /// Connects a published observable eagerly. No-op on other nodes.
    pub fn connect(&self) {
        self.source.connect();
    }

    /// Transforms every value.
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.lift(Map::new(f))
    }

    /// Keeps only values matching `predicate`.
    pub fn filter<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.lift(Filter::new(predicate))
    }

    /// Lets the producer run up to `capacity` notifications ahead of the consumer.
    ///
    /// Only this stage's feed is widened; derived nodes keep the inherited config.
    pub fn buffered(&self, capacity: usize) -> Observable<T> {
        let feed = self.config.with_feed_capacity(capacity);
        let stage = Lift::new(self.clone(), Arc::new(Passthrough), feed);
        Observable::from_node(stage, self.config)
    }

    /// Interleaves the notifications of every source.
    ///
    /// Completes once all sources completed. Inherits the config of the first
    /// source (default config when there is none).
    pub fn merge(sources: impl IntoIterator<Item = Observable<T>>) -> Observable<T> {
        let sources: Vec<Observable<T>> = sources.into_iter().collect();
        let config = sources.first().map(|s| s.config).unwrap_or_default();
        merge(sources, config)
    }

    /// Interleaves this observable with `other`.
    pub fn merge_with(&self, other: &Observable<T>) -> Observable<T> {
        merge(vec![self.clone(), other.clone()], self.config)
    }

    /// Logs every notification through `tracing` under `label`.
    #[cfg(feature = "logging")]
    pub fn log(&self, label: impl Into<std::borrow::Cow<'static, str>>) -> Observable<T>
    where
        T: fmt::Debug,
    {
        self.lift(crate::operators::LogWriter::new(label))
    }

    /// Config inherited by nodes derived from this one.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the same node with a different inherited config.
    #[must_use]
    pub fn with_config(&self, config: Config) -> Observable<T> {
        Observable {
            source: Arc::clone(&self.source),
            config,
        }
    }

    fn from_node(node: impl Subscribe<T>, config: Config) -> Self {
        Self {
            source: Arc::new(node),
            config,
        }
    }
}

/// Collects values into a leaf observable that replays them to every subscriber.
///
/// ```rust
/// use flowcast::Observable;
///
/// let obs: Observable<u8> = (1..=3).collect();
/// let same = Observable::from_iter(vec![1u8, 2, 3]);
/// # let _ = (obs, same);
/// ```
impl<T: Value> FromIterator<T> for Observable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        Self::from_producer(Config::default(), IterProducer::new(values))
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, Notification, Observable, Teardown};
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_map_filter_chain() {
        let obs = Observable::from_iter(1..=10u32)
            .filter(|v| v % 3 == 0)
            .map(|v| v * 100);
        let got: Vec<u32> = obs.subscribe().values().collect().await;
        assert_eq!(got, vec![300, 600, 900]);
    }

    #[tokio::test]
    async fn test_derived_nodes_inherit_config() {
        let cfg = Config::default()
            .with_feed_capacity(8)
            .with_teardown(Teardown::WhenEmpty);
        let obs = Observable::create_with(cfg, |sub| async move {
            sub.next(1u8).await;
        });
        assert_eq!(obs.map(|v| v + 1).config(), &cfg);
        assert_eq!(obs.publish().config(), &cfg);
        assert_eq!(obs.buffered(64).config(), &cfg);
        assert_eq!(obs.merge_with(&obs).config(), &cfg);
        assert_eq!(Observable::merge([obs.clone()]).config(), &cfg);
        assert_eq!(Observable::<u8>::merge(Vec::new()).config(), &Config::default());
    }

    #[tokio::test]
    async fn test_buffered_lets_producer_run_ahead() {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let done_tx = std::sync::Arc::new(parking_lot::Mutex::new(Some(done_tx)));
        let obs = Observable::create(move |sub| {
            let done_tx = std::sync::Arc::clone(&done_tx);
            async move {
                for i in 0..4u32 {
                    sub.next(i).await;
                }
                if let Some(tx) = done_tx.lock().take() {
                    let _ = tx.send(());
                }
            }
        })
        .buffered(8);

        let mut sub = obs.subscribe();
        // Nothing is consumed yet, but the producer finishes thanks to the buffer.
        tokio::time::timeout(Duration::from_secs(1), done_rx)
            .await
            .expect("producer must not block")
            .unwrap();
        assert_eq!(sub.recv().await, Some(Notification::Start));
        assert_eq!(sub.recv().await, Some(Notification::Next(0)));
    }
}
