//! # Leaf observables built from producer functions.
//!
//! [`Producer`] is the async, cancelable unit behind every leaf observable and
//! [`ProducerFn`] is its closure-backed form. [`Source`] turns a producer into a
//! subscribable node:
//!
//! ```text
//! subscribe() ──► channel(Mangle) ──► prime Start ──► spawn ─┐
//!                                                           ▼
//!            select! { producer(subscriber), subscriber.cancelled() }
//!                                                           │
//!                                   subscriber.complete() ◄─┘ (no-op if already ended)
//! ```
//!
//! Each subscribe runs a fresh producer future; nothing is shared between
//! subscriptions unless the closure captures it explicitly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};

use crate::config::Config;
use crate::notification::{Notification, Value};
use crate::observable::Subscribe;
use crate::subscription::feed::{self, ErrorMode};
use crate::subscription::{Subscriber, Subscription};

/// Boxed future returned by [`Producer::produce`].
pub type BoxProducerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// # Asynchronous producer of one subscription's notifications.
///
/// `produce` is called once per subscribe with that subscription's
/// [`Subscriber`]. The returned future is dropped as soon as the consumer
/// unsubscribes; when it returns without completing, `Complete` is delivered
/// on its behalf.
///
/// # Example
/// ```
/// use flowcast::{BoxProducerFuture, Observable, Producer, Subscriber};
///
/// struct Countdown(u32);
///
/// impl Producer<u32> for Countdown {
///     fn produce(&self, subscriber: Subscriber<u32>) -> BoxProducerFuture {
///         let from = self.0;
///         Box::pin(async move {
///             for i in (0..=from).rev() {
///                 if !subscriber.next(i).await {
///                     return;
///                 }
///             }
///         })
///     }
/// }
///
/// let _obs = Observable::from_producer(Default::default(), Countdown(3));
/// ```
pub trait Producer<T: Value>: Send + Sync + 'static {
    /// Creates the producing future for one subscription.
    fn produce(&self, subscriber: Subscriber<T>) -> BoxProducerFuture;
}

/// Function-backed producer.
///
/// Wraps a closure that *creates* a new future per subscribe.
#[derive(Debug)]
pub struct ProducerFn<F> {
    f: F,
}

impl<F> ProducerFn<F> {
    /// Wraps a producer closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F, Fut> Producer<T> for ProducerFn<F>
where
    T: Value,
    F: Fn(Subscriber<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn produce(&self, subscriber: Subscriber<T>) -> BoxProducerFuture {
        Box::pin((self.f)(subscriber))
    }
}

/// Leaf node: runs one producer task per subscription.
pub(crate) struct Source<T> {
    producer: Arc<dyn Producer<T>>,
    config: Config,
}

impl<T: Value> Source<T> {
    pub(crate) fn new(producer: Arc<dyn Producer<T>>, config: Config) -> Self {
        Self { producer, config }
    }
}

impl<T: Value> Subscribe<T> for Source<T> {
    fn subscribe(&self) -> Subscription<T> {
        let (subscriber, subscription) = feed::channel(&self.config, ErrorMode::Mangle);
        subscriber.prime(Notification::Start);

        let producing = self.producer.produce(subscriber.clone());
        tokio::spawn(async move {
            tokio::select! {
                _ = producing => {}
                _ = subscriber.cancelled() => {}
            }
            subscriber.complete().await;
        });
        subscription
    }
}

/// Producer draining a shared Tokio receiver.
///
/// Subscriptions compete for the receiver: the first one holds it until it
/// ends, later ones find it closed and complete right away.
pub(crate) struct ChannelProducer<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> ChannelProducer<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

/// Closes the receiver however the draining future ends.
struct ClosingGuard<T>(OwnedMutexGuard<mpsc::Receiver<T>>);

impl<T> Drop for ClosingGuard<T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl<T: Value> Producer<T> for ChannelProducer<T> {
    fn produce(&self, subscriber: Subscriber<T>) -> BoxProducerFuture {
        let rx = Arc::clone(&self.rx);
        Box::pin(async move {
            let mut guard = ClosingGuard(rx.lock_owned().await);
            while let Some(value) = guard.0.recv().await {
                if !subscriber.next(value).await {
                    break;
                }
            }
        })
    }
}

/// Producer replaying a fixed set of values to every subscriber.
pub(crate) struct IterProducer<T> {
    values: Arc<[T]>,
}

impl<T: Value> IterProducer<T> {
    pub(crate) fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl<T: Value> Producer<T> for IterProducer<T> {
    fn produce(&self, subscriber: Subscriber<T>) -> BoxProducerFuture {
        let values = Arc::clone(&self.values);
        Box::pin(async move {
            for value in values.iter() {
                if !subscriber.next(value.clone()).await {
                    return;
                }
            }
        })
    }
}
