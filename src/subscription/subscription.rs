//! # Consumer half of a subscription.
//!
//! [`Subscription`] pulls notifications in order. Dropping it cancels the feed,
//! which unblocks the producer and runs the completion hooks.
//!
//! After an explicit unsubscribe the consumer still observes a clean ending:
//! buffered notifications are discarded and one synthetic `Complete` is yielded,
//! then `None`.

use std::fmt;
use std::sync::Arc;

use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::notification::{Notification, Value};
use crate::subscription::lifecycle::{Lifecycle, SubscriptionRef, Termination};

/// Consumer-side handle of one subscription.
pub struct Subscription<T> {
    rx: mpsc::Receiver<Notification<T>>,
    lifecycle: Arc<Lifecycle>,
    cancel_seen: bool,
    done: bool,
}

enum Step<T> {
    Received(Option<Notification<T>>),
    Cancelled,
}

impl<T: Value> Subscription<T> {
    pub(crate) fn new(rx: mpsc::Receiver<Notification<T>>, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            rx,
            lifecycle,
            cancel_seen: false,
            done: false,
        }
    }

    /// Receives the next notification.
    ///
    /// Yields exactly one `Complete` per subscription, then `None` forever.
    pub async fn recv(&mut self) -> Option<Notification<T>> {
        if self.done {
            return None;
        }
        if self.lifecycle.termination() == Some(Termination::Unsubscribed) {
            return Some(self.finish());
        }

        loop {
            let step = tokio::select! {
                n = self.rx.recv() => Step::Received(n),
                _ = self.lifecycle.token().cancelled(), if !self.cancel_seen => Step::Cancelled,
            };

            match step {
                Step::Received(Some(n)) => {
                    if n.is_complete() {
                        self.done = true;
                    }
                    return Some(n);
                }
                Step::Received(None) => return Some(self.finish()),
                Step::Cancelled => {
                    if self.lifecycle.termination() == Some(Termination::Unsubscribed) {
                        return Some(self.finish());
                    }
                    // Completed: the terminal notification is already buffered.
                    self.cancel_seen = true;
                }
            }
        }
    }

    /// Cancels the subscription. Idempotent.
    pub fn unsubscribe(&self) {
        self.lifecycle.terminate(Termination::Unsubscribed);
    }

    /// True until the subscription terminates.
    pub fn is_subscribed(&self) -> bool {
        self.lifecycle.is_subscribed()
    }

    /// Registers a completion hook (runs immediately if already terminated).
    pub fn add(&self, hook: impl FnOnce() + Send + 'static) {
        self.lifecycle.add(Box::new(hook));
    }

    /// Returns a clonable control handle.
    pub fn handle(&self) -> SubscriptionRef {
        SubscriptionRef::new(Arc::clone(&self.lifecycle))
    }

    /// Converts into a [`Stream`] of notifications (ends after `Complete`).
    pub fn into_stream(self) -> impl Stream<Item = Notification<T>> + Send + 'static {
        futures::stream::unfold(self, |mut sub| async move {
            let n = sub.recv().await?;
            Some((n, sub))
        })
    }

    /// Converts into a [`Stream`] of `Next` payloads only.
    pub fn values(self) -> impl Stream<Item = T> + Send + 'static {
        self.into_stream()
            .filter_map(|n| futures::future::ready(n.into_value()))
    }

    fn finish(&mut self) -> Notification<T> {
        self.done = true;
        self.lifecycle.terminate(Termination::Completed);
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        Notification::Complete
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.lifecycle.terminate(Termination::Unsubscribed);
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscribed", &self.lifecycle.is_subscribed())
            .field("done", &self.done)
            .finish()
    }
}
