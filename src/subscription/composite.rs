//! # Composite subscription.
//!
//! Groups cancellable things so one `unsubscribe` tears them all down. Used by
//! merge to own its child subscriptions.
//!
//! ## Rules
//! - Children added after the composite terminated are cancelled on the spot.
//! - Teardown visits children in insertion order and skips those already gone.

use std::fmt;
use std::sync::Arc;

use crate::notification::Value;
use crate::subscription::lifecycle::{Lifecycle, SubscriptionRef, Termination};
use crate::subscription::Subscription;

/// Anything that can be observed and cancelled like a subscription.
pub trait Cancellable: Send + Sync {
    /// True until terminated.
    fn is_subscribed(&self) -> bool;
    /// Cancels; idempotent.
    fn unsubscribe(&self);
}

impl Cancellable for SubscriptionRef {
    fn is_subscribed(&self) -> bool {
        SubscriptionRef::is_subscribed(self)
    }
    fn unsubscribe(&self) {
        SubscriptionRef::unsubscribe(self)
    }
}

impl<T: Value> Cancellable for Subscription<T> {
    fn is_subscribed(&self) -> bool {
        Subscription::is_subscribed(self)
    }
    fn unsubscribe(&self) {
        Subscription::unsubscribe(self)
    }
}

impl<C: Cancellable + ?Sized> Cancellable for Arc<C> {
    fn is_subscribed(&self) -> bool {
        (**self).is_subscribed()
    }
    fn unsubscribe(&self) {
        (**self).unsubscribe()
    }
}

/// A subscription that owns other subscriptions.
#[derive(Clone)]
pub struct CompositeSubscription {
    lifecycle: Arc<Lifecycle>,
}

impl CompositeSubscription {
    /// Creates an empty, active composite.
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::new(),
        }
    }

    /// Adds a child. Cancelled immediately if the composite is already terminated.
    pub fn add<C: Cancellable + 'static>(&self, child: C) {
        self.lifecycle.add(Box::new(move || {
            if child.is_subscribed() {
                child.unsubscribe();
            }
        }));
    }

    /// Registers a plain completion hook.
    pub fn add_hook(&self, hook: impl FnOnce() + Send + 'static) {
        self.lifecycle.add(Box::new(hook));
    }

    /// Returns a control handle for the composite itself.
    pub fn handle(&self) -> SubscriptionRef {
        SubscriptionRef::new(Arc::clone(&self.lifecycle))
    }
}

impl Default for CompositeSubscription {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CompositeSubscription {
    fn is_subscribed(&self) -> bool {
        self.lifecycle.is_subscribed()
    }

    /// Cancels the composite and every child still subscribed.
    fn unsubscribe(&self) {
        self.lifecycle.terminate(Termination::Unsubscribed);
    }
}

impl fmt::Debug for CompositeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSubscription")
            .field("subscribed", &self.lifecycle.is_subscribed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::subscription::feed::{ErrorMode, channel};

    #[tokio::test]
    async fn test_unsubscribe_cascades_to_children() {
        let composite = CompositeSubscription::new();
        let (a_tx, a_rx) = channel::<u8>(&Config::default(), ErrorMode::Mangle);
        let (b_tx, b_rx) = channel::<u8>(&Config::default(), ErrorMode::Mangle);
        composite.add(a_rx.handle());
        composite.add(b_rx);

        assert!(a_tx.is_subscribed() && b_tx.is_subscribed());
        composite.unsubscribe();
        composite.unsubscribe();

        assert!(!composite.is_subscribed());
        assert!(!a_tx.is_subscribed());
        assert!(!b_tx.is_subscribed());
        drop(a_rx);
    }

    #[tokio::test]
    async fn test_late_child_is_cancelled_immediately() {
        let composite = CompositeSubscription::new();
        composite.unsubscribe();

        let (tx, rx) = channel::<u8>(&Config::default(), ErrorMode::Mangle);
        composite.add(rx.handle());
        assert!(!tx.is_subscribed());
    }

    #[tokio::test]
    async fn test_finished_child_is_skipped() {
        let composite = CompositeSubscription::new();
        let (tx, mut rx) = channel::<u8>(&Config::default(), ErrorMode::Mangle);
        composite.add(rx.handle());

        tokio::spawn(async move { tx.complete().await });
        assert_eq!(rx.recv().await, Some(crate::Notification::Complete));
        assert!(!rx.is_subscribed());

        composite.unsubscribe();
        assert!(!composite.is_subscribed());
    }
}
