//! # Producer half of a subscription.
//!
//! [`Subscriber`] is what producers and operators push into. It is cheap to
//! clone; all clones feed the same consumer.
//!
//! ## Delivery rules
//! - `Start` / `Next`: shared gate; dropped once the feed terminated or errored.
//! - `Error`: exclusive gate; at most one per feed. Leaf and broadcast feeds
//!   follow it with a synthetic `Complete`.
//! - `Complete`: exclusive gate; terminates the feed after the hand-off.
//! - Every hand-off races the send against cancellation in one unbiased
//!   `select!`; a cancelled or vanished consumer never blocks the producer.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use flowcast::{Notification, Observable};
//!
//! let obs = Observable::create(|sub| async move {
//!     for i in 0..3 {
//!         if !sub.next(i).await {
//!             return; // consumer left
//!         }
//!     }
//!     sub.complete().await;
//! });
//!
//! let mut subscription = obs.subscribe();
//! assert_eq!(subscription.recv().await, Some(Notification::Start));
//! assert_eq!(subscription.recv().await, Some(Notification::Next(0)));
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::notification::{Notification, Value};
use crate::subscription::feed::ErrorMode;
use crate::subscription::lifecycle::{Lifecycle, SubscriptionRef, Termination};

struct Feed<T> {
    tx: mpsc::Sender<Notification<T>>,
    lifecycle: Arc<Lifecycle>,
    errors: ErrorMode,
}

/// Producer-side handle of one subscription.
pub struct Subscriber<T> {
    feed: Arc<Feed<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            feed: Arc::clone(&self.feed),
        }
    }
}

impl<T: Value> Subscriber<T> {
    pub(crate) fn new(
        tx: mpsc::Sender<Notification<T>>,
        lifecycle: Arc<Lifecycle>,
        errors: ErrorMode,
    ) -> Self {
        Self {
            feed: Arc::new(Feed {
                tx,
                lifecycle,
                errors,
            }),
        }
    }

    /// Delivers one notification.
    ///
    /// Returns `true` if the consumer accepted it, `false` if it was dropped
    /// because the feed already terminated (or errored), or the consumer
    /// cancelled while the send was pending. Never panics.
    pub async fn notify(&self, notification: Notification<T>) -> bool {
        match notification {
            Notification::Complete => self.finish().await,
            Notification::Error(cause) => self.fail(cause).await,
            other @ (Notification::Start | Notification::Next(_)) => self.deliver(other).await,
        }
    }

    /// Delivers `Next(value)`.
    pub async fn next(&self, value: T) -> bool {
        self.notify(Notification::Next(value)).await
    }

    /// Delivers `Error(cause)`.
    pub async fn error(&self, cause: StreamError) -> bool {
        self.notify(Notification::Error(cause)).await
    }

    /// Delivers `Complete` and terminates the feed.
    pub async fn complete(&self) -> bool {
        self.notify(Notification::Complete).await
    }

    /// True until the feed terminates.
    pub fn is_subscribed(&self) -> bool {
        self.feed.lifecycle.is_subscribed()
    }

    /// Registers a completion hook (runs immediately if already terminated).
    pub fn add(&self, hook: impl FnOnce() + Send + 'static) {
        self.feed.lifecycle.add(Box::new(hook));
    }

    /// Returns a control handle for this feed.
    pub fn handle(&self) -> SubscriptionRef {
        SubscriptionRef::new(Arc::clone(&self.feed.lifecycle))
    }

    /// True while `Next` and `Error` can still be delivered.
    pub(crate) fn accepts_values(&self) -> bool {
        self.feed.lifecycle.accepts_values()
    }

    /// Completes once the feed has terminated (completed or cancelled).
    pub async fn cancelled(&self) {
        self.feed.lifecycle.token().cancelled().await
    }

    /// Non-blocking hand-off used to seed a fresh feed (`Start`).
    ///
    /// A new feed has at least one free slot, so this succeeds unless the
    /// consumer is already gone.
    pub(crate) fn prime(&self, notification: Notification<T>) -> bool {
        self.feed.lifecycle.is_subscribed() && self.feed.tx.try_send(notification).is_ok()
    }

    async fn deliver(&self, notification: Notification<T>) -> bool {
        let lifecycle = &self.feed.lifecycle;
        let _shared = lifecycle.gate().read().await;
        if !lifecycle.accepts_values() {
            return false;
        }
        self.send(notification).await
    }

    async fn fail(&self, cause: StreamError) -> bool {
        let lifecycle = &self.feed.lifecycle;
        let _exclusive = lifecycle.gate().write().await;
        if !lifecycle.accepts_values() {
            return false;
        }
        lifecycle.mark_errored();
        if !self.send(Notification::Error(cause)).await {
            return false;
        }

        match self.feed.errors {
            ErrorMode::Forward => true,
            ErrorMode::Mangle => {
                if self.send(Notification::Complete).await {
                    lifecycle.terminate(Termination::Completed);
                }
                true
            }
        }
    }

    async fn finish(&self) -> bool {
        let lifecycle = &self.feed.lifecycle;
        let _exclusive = lifecycle.gate().write().await;
        if !lifecycle.is_subscribed() {
            return false;
        }
        let sent = self.send(Notification::Complete).await;
        if sent {
            lifecycle.terminate(Termination::Completed);
        }
        sent
    }

    async fn send(&self, notification: Notification<T>) -> bool {
        let lifecycle = &self.feed.lifecycle;
        tokio::select! {
            _ = lifecycle.token().cancelled() => false,
            permit = self.feed.tx.reserve() => match permit {
                Ok(permit) => {
                    permit.send(notification);
                    true
                }
                Err(_closed) => {
                    lifecycle.terminate(Termination::Unsubscribed);
                    false
                }
            },
        }
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("subscribed", &self.feed.lifecycle.is_subscribed())
            .field("errors", &self.feed.errors)
            .finish()
    }
}
